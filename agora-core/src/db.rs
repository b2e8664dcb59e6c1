use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{
    api::{Filter, Store, StoreWrite, Subject, SubjectId, Time, UserId, Vote, VoteValue},
    FilterExt,
};

#[derive(Debug, Default)]
struct Contents {
    subjects: HashMap<SubjectId, Subject>,
    votes: Vec<Vote>,
}

/// In-memory record store, for tests and local runs.
///
/// Votes are kept with their tombstones, like a persistent store would.
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: RwLock<Contents>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Adds records as-is, bypassing all checks. Subjects replace any previous one with the same id.
    pub fn load(&self, subjects: Vec<Subject>, votes: Vec<Vote>) {
        let mut c = self.contents.write();
        c.subjects.extend(subjects.into_iter().map(|s| (s.id, s)));
        c.votes.extend(votes);
    }

    /// Tombstones a subject. Returns false if it does not exist or was already deleted.
    pub fn delete_subject(&self, id: SubjectId, at: Time) -> bool {
        match self.contents.write().subjects.get_mut(&id) {
            Some(s) if !s.is_deleted() => {
                s.deleted_at = Some(at);
                true
            }
            _ => false,
        }
    }

    /// All votes ever cast on `subject`, tombstoned ones included
    pub fn votes_for(&self, subject: SubjectId) -> Vec<Vote> {
        self.contents
            .read()
            .votes
            .iter()
            .filter(|v| v.subject_id == subject)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn fetch_candidates(&self, filter: &Filter) -> anyhow::Result<Vec<Subject>> {
        Ok(self
            .contents
            .read()
            .subjects
            .values()
            .filter(|s| !s.is_deleted() && filter.matches(s))
            .cloned()
            .collect())
    }

    async fn fetch_votes(
        &self,
        subjects: &[SubjectId],
    ) -> anyhow::Result<HashMap<SubjectId, Vec<Vote>>> {
        let c = self.contents.read();
        let mut res = HashMap::<SubjectId, Vec<Vote>>::with_capacity(subjects.len());
        for v in c.votes.iter().filter(|v| v.is_active()) {
            if subjects.contains(&v.subject_id) {
                res.entry(v.subject_id).or_default().push(v.clone());
            }
        }
        Ok(res)
    }

    async fn fetch_subject(&self, id: SubjectId) -> anyhow::Result<Option<Subject>> {
        Ok(self.contents.read().subjects.get(&id).cloned())
    }
}

#[async_trait]
impl StoreWrite for MemoryStore {
    async fn insert_subject(&self, subject: Subject) -> anyhow::Result<bool> {
        let mut c = self.contents.write();
        if c.subjects.contains_key(&subject.id) {
            return Ok(false);
        }
        c.subjects.insert(subject.id, subject);
        Ok(true)
    }

    async fn upsert_vote(
        &self,
        voter: UserId,
        subject: SubjectId,
        value: VoteValue,
    ) -> anyhow::Result<()> {
        // Holding the write lock for the whole lookup-then-insert keeps one active vote per pair
        let mut c = self.contents.write();
        match c
            .votes
            .iter()
            .position(|v| v.is_active() && v.voter_id == voter && v.subject_id == subject)
        {
            Some(i) => c.votes[i].value = value,
            None => c.votes.push(Vote {
                subject_id: subject,
                voter_id: voter,
                value,
                deleted_at: None,
            }),
        }
        Ok(())
    }

    async fn retract_vote(&self, voter: UserId, subject: SubjectId) -> anyhow::Result<()> {
        let now = chrono::Utc::now();
        let mut c = self.contents.write();
        for v in c
            .votes
            .iter_mut()
            .filter(|v| v.is_active() && v.voter_id == voter && v.subject_id == subject)
        {
            v.deleted_at = Some(now);
        }
        Ok(())
    }
}
