use std::{fmt, str::FromStr};

use crate::{Error, Subject};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub enum SortMode {
    Newest,
    Top,
}

impl Default for SortMode {
    fn default() -> SortMode {
        SortMode::Newest
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::Newest => write!(f, "Newest"),
            SortMode::Top => write!(f, "Top"),
        }
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<SortMode, String> {
        if s.eq_ignore_ascii_case("newest") {
            Ok(SortMode::Newest)
        } else if s.eq_ignore_ascii_case("top") {
            Ok(SortMode::Top)
        } else {
            Err(format!("unknown sort mode {s:?}, expected Newest or Top"))
        }
    }
}

/// Where in the ranked list a page starts
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Position {
    Start,

    /// Resume right after the position encoded in this cursor
    Cursor(String),

    /// 1-based page number, for offset-style callers
    Page(u32),
}

impl Position {
    pub fn from_params(cursor: Option<String>, page: Option<u32>) -> Result<Position, Error> {
        match (cursor, page) {
            (None, None) => Ok(Position::Start),
            (Some(c), None) => Ok(Position::Cursor(c)),
            (None, Some(p)) => Ok(Position::Page(p)),
            (Some(_), Some(_)) => Err(Error::ConflictingPosition),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ListedSubject {
    pub subject: Subject,

    /// Only computed when ranking by score
    pub score: Option<i64>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CursorPage {
    pub data: Vec<ListedSubject>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl CursorPage {
    pub fn has_next(&self) -> bool {
        self.next_cursor.is_some()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Pagination {
    pub current: u32,
    pub limit: u32,
    pub records: u64,
    pub pages: u64,

    /// Offset pages shift when subjects are created or deleted between two requests
    pub stable: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct OffsetPage {
    pub data: Vec<ListedSubject>,
    pub pagination: Pagination,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum Page {
    // Offset first: a cursor page would also accept an offset page's json
    Offset(OffsetPage),
    Cursor(CursorPage),
}

impl Page {
    pub fn data(&self) -> &[ListedSubject] {
        match self {
            Page::Offset(p) => &p.data,
            Page::Cursor(p) => &p.data,
        }
    }

    pub fn into_data(self) -> Vec<ListedSubject> {
        match self {
            Page::Offset(p) => p.data,
            Page::Cursor(p) => p.data,
        }
    }
}
