use std::sync::Arc;

use agora_core::{
    api::{
        CommentDepth, CommunityId, Filter, NewComment, NewPost, NewVote, Page, Store, StoreWrite,
        Subject, SubjectId, SubjectScore, Uuid,
    },
    PaginationOrchestrator, ThreadDepthValidator, VoteAggregator,
};
use anyhow::Context;
use axum::{
    extract::{Path, State},
    Json,
};

use crate::{extractors::*, Error};

/// Looks up a live subject, failing with `SubjectNotFound` otherwise
async fn live_subject(store: &dyn StoreWrite, id: SubjectId) -> Result<Subject, Error> {
    match store
        .fetch_subject(id)
        .await
        .with_context(|| format!("fetching subject {id:?}"))?
    {
        Some(s) if !s.is_deleted() => Ok(s),
        _ => Err(Error::subject_not_found(id)),
    }
}

/// Looks up a live post, failing with `SubjectNotFound` for comments too
async fn live_post(store: &dyn StoreWrite, id: SubjectId) -> Result<Subject, Error> {
    match live_subject(store, id).await? {
        s if s.is_comment() => Err(Error::subject_not_found(id)),
        s => Ok(s),
    }
}

async fn list(
    store: &dyn StoreWrite,
    filter: &Filter,
    params: &ListParams,
) -> Result<Json<Page>, Error> {
    Ok(Json(
        PaginationOrchestrator::new(store)
            .list_subjects(filter, params.sort, &params.position, params.limit)
            .await?,
    ))
}

pub async fn list_posts(
    State(store): State<Arc<dyn StoreWrite>>,
    Path(community): Path<Uuid>,
    params: ListParams,
) -> Result<Json<Page>, Error> {
    list(&*store, &Filter::posts_in(CommunityId(community)), &params).await
}

pub async fn list_comments(
    State(store): State<Arc<dyn StoreWrite>>,
    Path(post): Path<Uuid>,
    ParentParam(parent): ParentParam,
    params: ListParams,
) -> Result<Json<Page>, Error> {
    let post = SubjectId(post);
    let filter = match parent {
        None => Filter::comments_on(post),
        Some(parent) => Filter::replies_to(post, Some(parent)),
    };
    list(&*store, &filter, &params).await
}

pub async fn search(
    State(store): State<Arc<dyn StoreWrite>>,
    params: ListParams,
    Json(filter): Json<Filter>,
) -> Result<Json<Page>, Error> {
    list(&*store, &filter, &params).await
}

pub async fn score(
    State(store): State<Arc<dyn StoreWrite>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubjectScore>, Error> {
    let id = SubjectId(id);
    live_subject(&*store, id).await?;
    let score = VoteAggregator::new(&*store).compute_score(id).await?;
    Ok(Json(SubjectScore { id, score }))
}

pub async fn depth(
    State(store): State<Arc<dyn StoreWrite>>,
    Path(post): Path<Uuid>,
    ParentParam(parent): ParentParam,
) -> Result<Json<CommentDepth>, Error> {
    let post = SubjectId(post);
    live_post(&*store, post).await?;
    let depth = ThreadDepthValidator::new(&*store)
        .validate_new_comment(post, parent)
        .await?;
    Ok(Json(CommentDepth { depth }))
}

pub async fn create_post(
    State(store): State<Arc<dyn StoreWrite>>,
    Json(data): Json<NewPost>,
) -> Result<Json<Subject>, Error> {
    data.validate()?;
    let subject = data.into_subject(chrono::Utc::now());
    if !store
        .insert_subject(subject.clone())
        .await
        .with_context(|| format!("inserting post {:?}", subject.id))?
    {
        return Err(Error::uuid_already_used(subject.id.0));
    }
    tracing::debug!(id = ?subject.id, "created post");
    Ok(Json(subject))
}

// TODO: run the depth check and the insert in one transaction, a parent deleted in between
// currently still receives the reply
pub async fn create_comment(
    State(store): State<Arc<dyn StoreWrite>>,
    Path(post): Path<Uuid>,
    Json(data): Json<NewComment>,
) -> Result<Json<Subject>, Error> {
    data.validate()?;
    let post = SubjectId(post);
    live_post(&*store, post).await?;
    let depth = ThreadDepthValidator::new(&*store)
        .validate_new_comment(post, data.parent)
        .await?;
    let subject = data.into_subject(post, chrono::Utc::now());
    if !store
        .insert_subject(subject.clone())
        .await
        .with_context(|| format!("inserting comment {:?}", subject.id))?
    {
        return Err(Error::uuid_already_used(subject.id.0));
    }
    tracing::debug!(id = ?subject.id, ?post, depth, "created comment");
    Ok(Json(subject))
}

pub async fn vote(
    State(store): State<Arc<dyn StoreWrite>>,
    Path(id): Path<Uuid>,
    Json(data): Json<NewVote>,
) -> Result<Json<SubjectScore>, Error> {
    let id = SubjectId(id);
    let value = data.value()?;
    live_subject(&*store, id).await?;
    match value {
        Some(value) => store
            .upsert_vote(data.voter, id, value)
            .await
            .context("casting vote")?,
        None => store
            .retract_vote(data.voter, id)
            .await
            .context("retracting vote")?,
    }
    let score = VoteAggregator::new(&*store).compute_score(id).await?;
    Ok(Json(SubjectScore { id, score }))
}
