use std::collections::HashMap;

use anyhow::Context;

use crate::api::{Store, SubjectId, Vote};

/// Net value of the active votes in `votes`
pub fn tally<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> i64 {
    votes
        .into_iter()
        .filter(|v| v.is_active())
        .map(|v| v.value.as_i64())
        .sum()
}

/// Computes scores from the votes currently in the store. Nothing is cached.
pub struct VoteAggregator<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: Store + ?Sized> VoteAggregator<'s, S> {
    pub fn new(store: &'s S) -> VoteAggregator<'s, S> {
        VoteAggregator { store }
    }

    pub async fn compute_score(&self, subject: SubjectId) -> anyhow::Result<i64> {
        let votes = self
            .store
            .fetch_votes(&[subject])
            .await
            .with_context(|| format!("fetching votes for {subject:?}"))?;
        Ok(votes.get(&subject).map(|v| tally(v)).unwrap_or(0))
    }

    /// Returns a score for every requested subject, 0 for those without votes
    pub async fn compute_scores(
        &self,
        subjects: &[SubjectId],
    ) -> anyhow::Result<HashMap<SubjectId, i64>> {
        if subjects.is_empty() {
            return Ok(HashMap::new());
        }
        let votes = self
            .store
            .fetch_votes(subjects)
            .await
            .with_context(|| format!("fetching votes for {} subjects", subjects.len()))?;
        Ok(subjects
            .iter()
            .map(|s| (*s, votes.get(s).map(|v| tally(v)).unwrap_or(0)))
            .collect())
    }
}
