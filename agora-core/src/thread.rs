use anyhow::Context;

use crate::{
    api::{Error as ApiError, Store, Subject, SubjectId, MAX_DEPTH},
    Error,
};

/// Checks that a new comment fits in its thread before it gets written
pub struct ThreadDepthValidator<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: Store + ?Sized> ThreadDepthValidator<'s, S> {
    pub fn new(store: &'s S) -> ThreadDepthValidator<'s, S> {
        ThreadDepthValidator { store }
    }

    async fn fetch(&self, id: SubjectId) -> Result<Option<Subject>, Error> {
        Ok(self
            .store
            .fetch_subject(id)
            .await
            .with_context(|| format!("fetching ancestor {id:?}"))?)
    }

    /// Returns the depth a new comment on `post` replying to `parent` would be at.
    ///
    /// Walks at most `MAX_DEPTH` links up the parent chain, so a corrupted (even cyclic)
    /// chain cannot keep it busy.
    pub async fn validate_new_comment(
        &self,
        post: SubjectId,
        parent: Option<SubjectId>,
    ) -> Result<usize, Error> {
        let parent_id = match parent {
            None => return Ok(0),
            Some(p) => p,
        };
        let mut current = match self.fetch(parent_id).await? {
            Some(p) if p.is_comment() && !p.is_deleted() => p,
            _ => return Err(ApiError::ParentNotFound(parent_id).into()),
        };

        let mut depth = 1;
        loop {
            if current.post_id() != post {
                tracing::debug!(?post, ancestor = ?current.id, "parent chain leaves the post");
                return Err(ApiError::InvalidParentChain(current.id).into());
            }
            let next = match current.parent_id() {
                None => return Ok(depth),
                Some(next) => next,
            };
            depth += 1;
            if depth > MAX_DEPTH {
                tracing::debug!(?post, ?parent_id, "refusing comment nested too deeply");
                return Err(ApiError::DepthExceeded {
                    depth,
                    max: MAX_DEPTH,
                }
                .into());
            }
            current = match self.fetch(next).await? {
                // ancestors may be tombstoned, the chain still holds
                Some(c) if c.is_comment() => c,
                _ => return Err(ApiError::InvalidParentChain(next).into()),
            };
        }
    }
}
