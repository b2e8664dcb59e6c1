use std::collections::{HashMap, HashSet};

use chrono::TimeZone;

use crate::api::{
    CommunityId, Filter, ListedSubject, Store, Subject, SubjectId, SubjectKind, Time, UserId,
    Uuid, Vote, VoteValue,
};

pub fn at(secs: i64) -> Time {
    chrono::Utc
        .timestamp_opt(1_700_000_000 + secs, 0)
        .single()
        .expect("test timestamp out of range")
}

pub fn sid(id: u128) -> SubjectId {
    SubjectId(Uuid::from_u128(id))
}

pub fn post(id: u128, secs: i64) -> Subject {
    Subject {
        id: sid(id),
        author: UserId::stub(),
        created_at: at(secs),
        deleted_at: None,
        body: format!("post {id}"),
        kind: SubjectKind::Post {
            community: CommunityId::stub(),
            title: format!("title {id}"),
        },
    }
}

pub fn comment(id: u128, post: u128, parent: Option<u128>, secs: i64) -> Subject {
    Subject {
        id: sid(id),
        author: UserId::stub(),
        created_at: at(secs),
        deleted_at: None,
        body: format!("comment {id}"),
        kind: SubjectKind::Comment {
            post: sid(post),
            parent: parent.map(sid),
        },
    }
}

pub fn listed(subject: Subject, score: Option<i64>) -> ListedSubject {
    ListedSubject { subject, score }
}

pub fn vote(subject: u128, voter: u128, value: VoteValue, deleted: bool) -> Vote {
    Vote {
        subject_id: sid(subject),
        voter_id: UserId(Uuid::from_u128(voter)),
        value,
        deleted_at: deleted.then(|| at(0)),
    }
}

/// Keeps the first occurrence of each id
pub fn dedup_by_id<A, B>(raw: Vec<(u8, A, B)>) -> Vec<(u8, A, B)> {
    let mut seen = HashSet::new();
    raw.into_iter().filter(|(id, _, _)| seen.insert(*id)).collect()
}

/// A store whose backend is always down
pub struct FailingStore;

#[async_trait::async_trait]
impl Store for FailingStore {
    async fn fetch_candidates(&self, _filter: &Filter) -> anyhow::Result<Vec<Subject>> {
        Err(anyhow::anyhow!("store is down"))
    }

    async fn fetch_votes(
        &self,
        _subjects: &[SubjectId],
    ) -> anyhow::Result<HashMap<SubjectId, Vec<Vote>>> {
        Err(anyhow::anyhow!("store is down"))
    }

    async fn fetch_subject(&self, _id: SubjectId) -> anyhow::Result<Option<Subject>> {
        Err(anyhow::anyhow!("store is down"))
    }
}
