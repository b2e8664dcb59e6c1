use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde_json::json;
use uuid::Uuid;

use crate::{SortMode, SubjectId};

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Malformed cursor: {0}")]
    MalformedCursor(String),

    #[error("Cursor was built for sort mode {found}, but {expected} was requested")]
    MismatchedSortMode { expected: SortMode, found: SortMode },

    #[error("Invalid request parameter: {0}")]
    InvalidParameter(String),

    #[error("Page size {0} is out of range")]
    InvalidLimit(u32),

    #[error("Page number {0} is out of range")]
    InvalidPage(u32),

    #[error("Both a cursor and a page number were provided")]
    ConflictingPosition,

    #[error("Parent comment {0:?} not found")]
    ParentNotFound(SubjectId),

    #[error("Comment {0:?} is not part of the expected thread")]
    InvalidParentChain(SubjectId),

    #[error("Comment would be nested at depth {depth}, deeper than {max}")]
    DepthExceeded { depth: usize, max: usize },

    #[error("Subject {0:?} not found")]
    SubjectNotFound(SubjectId),

    #[error("Vote value must be 1 or -1, got {0}")]
    InvalidVoteValue(i64),

    #[error("UUID already used {0}")]
    UuidAlreadyUsed(Uuid),

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),
}

fn uuid_field(data: &serde_json::Value, field: &str) -> anyhow::Result<SubjectId> {
    data.get(field)
        .and_then(|u| u.as_str())
        .and_then(|u| Uuid::from_str(u).ok())
        .map(SubjectId)
        .ok_or_else(|| anyhow!("error is missing uuid field {field:?}"))
}

fn int_field(data: &serde_json::Value, field: &str) -> anyhow::Result<i64> {
    data.get(field)
        .and_then(|n| n.as_i64())
        .ok_or_else(|| anyhow!("error is missing integer field {field:?}"))
}

fn sort_mode_field(data: &serde_json::Value, field: &str) -> anyhow::Result<SortMode> {
    serde_json::from_value(
        data.get(field)
            .cloned()
            .ok_or_else(|| anyhow!("error is missing sort mode field {field:?}"))?,
    )
    .with_context(|| format!("parsing sort mode field {field:?}"))
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::MalformedCursor(_) => StatusCode::BAD_REQUEST,
            Error::MismatchedSortMode { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            Error::InvalidLimit(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPage(_) => StatusCode::BAD_REQUEST,
            Error::ConflictingPosition => StatusCode::BAD_REQUEST,
            Error::ParentNotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidParentChain(_) => StatusCode::BAD_REQUEST,
            Error::DepthExceeded { .. } => StatusCode::BAD_REQUEST,
            Error::SubjectNotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidVoteValue(_) => StatusCode::BAD_REQUEST,
            Error::UuidAlreadyUsed(_) => StatusCode::CONFLICT,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::MalformedCursor(reason) => json!({
                "message": "malformed cursor",
                "type": "malformed-cursor",
                "reason": reason,
            }),
            Error::MismatchedSortMode { expected, found } => json!({
                "message": "cursor does not match the requested sort mode",
                "type": "mismatched-sort-mode",
                "expected": expected,
                "found": found,
            }),
            Error::InvalidParameter(reason) => json!({
                "message": "invalid request parameter",
                "type": "invalid-parameter",
                "reason": reason,
            }),
            Error::InvalidLimit(limit) => json!({
                "message": "page size out of range",
                "type": "invalid-limit",
                "limit": limit,
            }),
            Error::InvalidPage(page) => json!({
                "message": "page number out of range",
                "type": "invalid-page",
                "page": page,
            }),
            Error::ConflictingPosition => json!({
                "message": "cursor and page are mutually exclusive",
                "type": "conflicting-position",
            }),
            Error::ParentNotFound(id) => json!({
                "message": "parent comment not found",
                "type": "parent-not-found",
                "id": id.0,
            }),
            Error::InvalidParentChain(id) => json!({
                "message": "parent chain leaves the thread",
                "type": "invalid-parent-chain",
                "id": id.0,
            }),
            Error::DepthExceeded { depth, max } => json!({
                "message": "comment nested too deeply",
                "type": "depth-exceeded",
                "depth": depth,
                "max": max,
            }),
            Error::SubjectNotFound(id) => json!({
                "message": "subject not found",
                "type": "subject-not-found",
                "id": id.0,
            }),
            Error::InvalidVoteValue(v) => json!({
                "message": "invalid vote value",
                "type": "invalid-vote-value",
                "value": v,
            }),
            Error::UuidAlreadyUsed(id) => json!({
                "message": "uuid conflict",
                "type": "conflict-uuid",
                "uuid": id,
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(String::from(
                    data.get("message")
                        .and_then(|msg| msg.as_str())
                        .unwrap_or(""),
                )),
                "malformed-cursor" => Error::MalformedCursor(String::from(
                    data.get("reason")
                        .and_then(|r| r.as_str())
                        .ok_or_else(|| anyhow!("error is a malformed cursor without a reason"))?,
                )),
                "mismatched-sort-mode" => Error::MismatchedSortMode {
                    expected: sort_mode_field(&data, "expected")?,
                    found: sort_mode_field(&data, "found")?,
                },
                "invalid-parameter" => Error::InvalidParameter(String::from(
                    data.get("reason")
                        .and_then(|r| r.as_str())
                        .ok_or_else(|| anyhow!("error is an invalid parameter without a reason"))?,
                )),
                "invalid-limit" => Error::InvalidLimit(
                    u32::try_from(int_field(&data, "limit")?).context("limit out of range")?,
                ),
                "invalid-page" => Error::InvalidPage(
                    u32::try_from(int_field(&data, "page")?).context("page out of range")?,
                ),
                "conflicting-position" => Error::ConflictingPosition,
                "parent-not-found" => Error::ParentNotFound(uuid_field(&data, "id")?),
                "invalid-parent-chain" => Error::InvalidParentChain(uuid_field(&data, "id")?),
                "depth-exceeded" => Error::DepthExceeded {
                    depth: usize::try_from(int_field(&data, "depth")?)
                        .context("depth out of range")?,
                    max: usize::try_from(int_field(&data, "max")?).context("max out of range")?,
                },
                "subject-not-found" => Error::SubjectNotFound(uuid_field(&data, "id")?),
                "invalid-vote-value" => Error::InvalidVoteValue(int_field(&data, "value")?),
                "conflict-uuid" => Error::UuidAlreadyUsed(uuid_field(&data, "uuid")?.0),
                "null-byte" => Error::NullByteInString(String::from(
                    data.get("string").and_then(|s| s.as_str()).ok_or_else(|| {
                        anyhow!("error is a null-byte-in-string without a string")
                    })?,
                )),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}
