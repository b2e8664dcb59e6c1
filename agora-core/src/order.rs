use std::cmp::{Ordering, Reverse};

use crate::api::{ListedSubject, SortMode, Subject, SubjectId, Time};

/// The position of a subject in a listing.
///
/// Keys order the way listings are displayed: a key that compares less comes earlier.
/// `Newest` is by creation date then id, `Top` is by score then creation date then id, all
/// descending. Ids are unique, so two keys for distinct subjects are never equal.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum SortKey {
    Newest {
        created_at: Time,
        id: SubjectId,
    },
    Top {
        score: i64,
        created_at: Time,
        id: SubjectId,
    },
}

impl SortKey {
    /// `score` is ignored in `Newest` mode
    pub fn of(mode: SortMode, s: &Subject, score: i64) -> SortKey {
        match mode {
            SortMode::Newest => SortKey::Newest {
                created_at: s.created_at,
                id: s.id,
            },
            SortMode::Top => SortKey::Top {
                score,
                created_at: s.created_at,
                id: s.id,
            },
        }
    }

    /// Unscored subjects rank as if they had no votes
    pub fn of_listed(mode: SortMode, l: &ListedSubject) -> SortKey {
        SortKey::of(mode, &l.subject, l.score.unwrap_or(0))
    }

    pub fn mode(&self) -> SortMode {
        match self {
            SortKey::Newest { .. } => SortMode::Newest,
            SortKey::Top { .. } => SortMode::Top,
        }
    }

    pub fn id(&self) -> SubjectId {
        match self {
            SortKey::Newest { id, .. } | SortKey::Top { id, .. } => *id,
        }
    }

    fn rank(&self) -> (Reverse<i64>, Reverse<Time>, Reverse<SubjectId>) {
        match *self {
            SortKey::Newest { created_at, id } => (Reverse(0), Reverse(created_at), Reverse(id)),
            SortKey::Top {
                score,
                created_at,
                id,
            } => (Reverse(score), Reverse(created_at), Reverse(id)),
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &SortKey) -> Ordering {
        // Keys of different modes never meet in a listing, but Ord must stay total
        self.mode()
            .cmp(&other.mode())
            .then_with(|| self.rank().cmp(&other.rank()))
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &SortKey) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub fn compare(mode: SortMode, a: &ListedSubject, b: &ListedSubject) -> Ordering {
    SortKey::of_listed(mode, a).cmp(&SortKey::of_listed(mode, b))
}

pub trait OrderExt {
    fn sort(&self, items: &mut [ListedSubject]);
}

impl OrderExt for SortMode {
    fn sort(&self, items: &mut [ListedSubject]) {
        match self {
            SortMode::Newest => items.sort_unstable_by_key(|l| {
                (Reverse(l.subject.created_at), Reverse(l.subject.id))
            }),
            SortMode::Top => items.sort_unstable_by_key(|l| {
                (
                    Reverse(l.score.unwrap_or(0)),
                    Reverse(l.subject.created_at),
                    Reverse(l.subject.id),
                )
            }),
        }
    }
}
