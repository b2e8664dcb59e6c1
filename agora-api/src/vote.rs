use std::convert::TryFrom;

use crate::{Error, SubjectId, Time, UserId};

/// A single unit of approval or disapproval, serialized as `1` or `-1`
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    pub fn as_i64(self) -> i64 {
        match self {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
        }
    }
}

impl TryFrom<i64> for VoteValue {
    type Error = Error;

    fn try_from(v: i64) -> Result<VoteValue, Error> {
        match v {
            1 => Ok(VoteValue::Up),
            -1 => Ok(VoteValue::Down),
            v => Err(Error::InvalidVoteValue(v)),
        }
    }
}

impl From<VoteValue> for i64 {
    fn from(v: VoteValue) -> i64 {
        v.as_i64()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Vote {
    pub subject_id: SubjectId,
    pub voter_id: UserId,
    pub value: VoteValue,
    pub deleted_at: Option<Time>,
}

impl Vote {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// A vote submission: `1` or `-1` casts or changes the voter's vote, `0` retracts it
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewVote {
    pub voter: UserId,
    pub value: i64,
}

impl NewVote {
    /// Returns None for a retraction
    pub fn value(&self) -> Result<Option<VoteValue>, Error> {
        match self.value {
            0 => Ok(None),
            v => VoteValue::try_from(v).map(Some),
        }
    }
}

/// Net score of a subject, as reported to clients
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SubjectScore {
    pub id: SubjectId,
    pub score: i64,
}
