use std::collections::HashMap;

use async_trait::async_trait;

use crate::{Filter, Subject, SubjectId, UserId, Vote, VoteValue};

/// Read access to the record store, as needed by the ranking engine
#[async_trait]
pub trait Store: Send + Sync {
    /// All non-deleted subjects matching `filter`, in no particular order
    async fn fetch_candidates(&self, filter: &Filter) -> anyhow::Result<Vec<Subject>>;

    /// Active votes for each of `subjects`; subjects without votes may be absent from the map
    async fn fetch_votes(
        &self,
        subjects: &[SubjectId],
    ) -> anyhow::Result<HashMap<SubjectId, Vec<Vote>>>;

    /// Looks up a single subject, including tombstoned ones
    async fn fetch_subject(&self, id: SubjectId) -> anyhow::Result<Option<Subject>>;
}

/// Write access to the record store. Nothing in the ranking engine needs this.
#[async_trait]
pub trait StoreWrite: Store {
    /// Returns false, writing nothing, if the id is already taken
    async fn insert_subject(&self, subject: Subject) -> anyhow::Result<bool>;

    /// Casts a vote, or changes the value of the voter's active vote on this subject.
    ///
    /// Must never leave more than one active vote per (voter, subject) pair, even when called
    /// concurrently.
    async fn upsert_vote(
        &self,
        voter: UserId,
        subject: SubjectId,
        value: VoteValue,
    ) -> anyhow::Result<()>;

    /// Tombstones the voter's active vote on this subject, if any
    async fn retract_vote(&self, voter: UserId, subject: SubjectId) -> anyhow::Result<()>;
}
