use chrono::Utc;

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

mod db;
pub use db::{Store, StoreWrite};

mod error;
pub use error::Error;

mod query;
pub use query::{Filter, SubjectKindTag};

mod search;
pub use search::{CursorPage, ListedSubject, OffsetPage, Page, Pagination, Position, SortMode};

mod subject;
pub use subject::{
    CommentDepth, CommunityId, NewComment, NewPost, Subject, SubjectId, SubjectKind, UserId,
};

mod vote;
pub use vote::{NewVote, SubjectScore, Vote, VoteValue};

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

/// Deepest level a comment may sit at; top-level comments are at depth 0.
pub const MAX_DEPTH: usize = 8;

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

// Postgres rejects NUL bytes in text columns, so refuse them before they get anywhere near a query.
pub fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(String::from(s))),
        false => Ok(()),
    }
}

/// Resolves an optional page size to the effective one, rejecting anything outside `1..=MAX_LIMIT`
pub fn validate_limit(limit: Option<u32>) -> Result<u32, Error> {
    match limit {
        None => Ok(DEFAULT_LIMIT),
        Some(l) if (1..=MAX_LIMIT).contains(&l) => Ok(l),
        Some(l) => Err(Error::InvalidLimit(l)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits() {
        assert_eq!(validate_limit(None), Ok(DEFAULT_LIMIT));
        assert_eq!(validate_limit(Some(1)), Ok(1));
        assert_eq!(validate_limit(Some(MAX_LIMIT)), Ok(MAX_LIMIT));
        assert_eq!(validate_limit(Some(0)), Err(Error::InvalidLimit(0)));
        assert_eq!(
            validate_limit(Some(MAX_LIMIT + 1)),
            Err(Error::InvalidLimit(MAX_LIMIT + 1))
        );
    }

    #[test]
    fn null_bytes() {
        assert_eq!(validate_string("hello"), Ok(()));
        assert_eq!(
            validate_string("hel\0lo"),
            Err(Error::NullByteInString(String::from("hel\0lo")))
        );
    }
}
