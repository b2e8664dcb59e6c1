use uuid::Uuid;

use crate::{Error, Time, STUB_UUID};

/// Identifier of a post or a comment.
///
/// Ordering is the byte order of the underlying UUID, which is the same as the
/// lexicographic order of its lowercase hyphenated string form. Rankings use it
/// as their last tie-break.
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct SubjectId(pub Uuid);

impl SubjectId {
    pub fn stub() -> SubjectId {
        SubjectId(STUB_UUID)
    }
}

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommunityId(pub Uuid);

impl CommunityId {
    pub fn stub() -> CommunityId {
        CommunityId(STUB_UUID)
    }
}

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn stub() -> UserId {
        UserId(STUB_UUID)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum SubjectKind {
    Post {
        community: CommunityId,
        title: String,
    },
    Comment {
        post: SubjectId,

        /// None for a top-level comment
        parent: Option<SubjectId>,
    },
}

/// Anything that can be voted on and ranked: a post or a comment
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Subject {
    pub id: SubjectId,
    pub author: UserId,
    pub created_at: Time,
    pub deleted_at: Option<Time>,
    pub body: String,
    pub kind: SubjectKind,
}

impl Subject {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, SubjectKind::Comment { .. })
    }

    pub fn parent_id(&self) -> Option<SubjectId> {
        match self.kind {
            SubjectKind::Post { .. } => None,
            SubjectKind::Comment { parent, .. } => parent,
        }
    }

    /// The post this subject lives in: itself for a post
    pub fn post_id(&self) -> SubjectId {
        match self.kind {
            SubjectKind::Post { .. } => self.id,
            SubjectKind::Comment { post, .. } => post,
        }
    }

    pub fn community_id(&self) -> Option<CommunityId> {
        match self.kind {
            SubjectKind::Post { community, .. } => Some(community),
            SubjectKind::Comment { .. } => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match &self.kind {
            SubjectKind::Post { title, .. } => Some(title),
            SubjectKind::Comment { .. } => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewPost {
    pub id: SubjectId,
    pub author: UserId,
    pub community: CommunityId,
    pub title: String,
    pub body: String,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.title)?;
        crate::validate_string(&self.body)
    }

    pub fn into_subject(self, created_at: Time) -> Subject {
        Subject {
            id: self.id,
            author: self.author,
            created_at,
            deleted_at: None,
            body: self.body,
            kind: SubjectKind::Post {
                community: self.community,
                title: self.title,
            },
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub id: SubjectId,
    pub author: UserId,
    pub parent: Option<SubjectId>,
    pub body: String,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.body)
    }

    pub fn into_subject(self, post: SubjectId, created_at: Time) -> Subject {
        Subject {
            id: self.id,
            author: self.author,
            created_at,
            deleted_at: None,
            body: self.body,
            kind: SubjectKind::Comment {
                post,
                parent: self.parent,
            },
        }
    }
}

/// Depth a comment would be created at
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentDepth {
    pub depth: usize,
}
