use std::{str::FromStr, sync::Arc};

use agora_core::api::{Position, SortMode, StoreWrite, SubjectId, Uuid};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Query},
    http::request,
};

use crate::Error;

#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub store: Arc<dyn StoreWrite>,
    pub default_limit: DefaultLimit,
}

/// Page size used when a listing does not ask for one
#[derive(Clone, Copy, Debug)]
pub struct DefaultLimit(pub u32);

async fn parse_query<T, S>(req: &mut request::Parts, state: &S) -> Result<T, Error>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    Query::<T>::from_request_parts(req, state)
        .await
        .map(|Query(q)| q)
        .map_err(|e| Error::invalid_parameter(e.to_string()))
}

#[derive(serde::Deserialize)]
struct RawListParams {
    sort: Option<String>,
    cursor: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

/// `?sort=&cursor=&page=&limit=` of a listing request
#[derive(Debug)]
pub struct ListParams {
    pub sort: SortMode,
    pub position: Position,
    pub limit: Option<u32>,
}

#[async_trait]
impl<S> FromRequestParts<S> for ListParams
where
    S: Send + Sync,
    DefaultLimit: FromRef<S>,
{
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, state: &S) -> Result<ListParams, Error> {
        let raw: RawListParams = parse_query(req, state).await?;
        let sort = match raw.sort {
            None => SortMode::default(),
            Some(s) => SortMode::from_str(&s).map_err(Error::invalid_parameter)?,
        };
        Ok(ListParams {
            sort,
            position: Position::from_params(raw.cursor, raw.page)?,
            limit: raw.limit.or(Some(DefaultLimit::from_ref(state).0)),
        })
    }
}

#[derive(serde::Deserialize)]
struct RawParentParam {
    parent: Option<Uuid>,
}

/// `?parent=`, the comment being replied to. Absent for top-level comments.
pub struct ParentParam(pub Option<SubjectId>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ParentParam {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, state: &S) -> Result<ParentParam, Error> {
        let raw: RawParentParam = parse_query(req, state).await?;
        Ok(ParentParam(raw.parent.map(SubjectId)))
    }
}
