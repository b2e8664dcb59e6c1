use std::collections::HashMap;

use agora_core::api::{
    CommunityId, Filter, Store, StoreWrite, Subject, SubjectId, SubjectKind, Time, UserId, Uuid,
    Vote, VoteValue,
};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use sqlx::Row;

use crate::query::{self, Bind};

const SUBJECT_COLUMNS: &str =
    "s.id, s.author_id, s.created_at, s.deleted_at, s.body, s.community_id, s.title, s.post_id, s.parent_id";

pub struct PostgresStore {
    pool: sqlx::PgPool,
}

impl PostgresStore {
    pub fn new(pool: sqlx::PgPool) -> PostgresStore {
        PostgresStore { pool }
    }
}

fn subject_from_row(row: &sqlx::postgres::PgRow) -> anyhow::Result<Subject> {
    let id = SubjectId(row.try_get("id").context("retrieving the id field")?);
    let community: Option<Uuid> = row
        .try_get("community_id")
        .context("retrieving the community_id field")?;
    let title: Option<String> = row.try_get("title").context("retrieving the title field")?;
    let post: Option<Uuid> = row.try_get("post_id").context("retrieving the post_id field")?;
    let parent: Option<Uuid> = row
        .try_get("parent_id")
        .context("retrieving the parent_id field")?;
    let kind = match (community, title, post) {
        (Some(community), Some(title), None) => SubjectKind::Post {
            community: CommunityId(community),
            title,
        },
        (None, None, Some(post)) => SubjectKind::Comment {
            post: SubjectId(post),
            parent: parent.map(SubjectId),
        },
        _ => return Err(anyhow!("subject {id:?} is neither a post nor a comment")),
    };
    Ok(Subject {
        id,
        author: UserId(
            row.try_get("author_id")
                .context("retrieving the author_id field")?,
        ),
        created_at: row
            .try_get::<Time, _>("created_at")
            .context("retrieving the created_at field")?,
        deleted_at: row
            .try_get::<Option<Time>, _>("deleted_at")
            .context("retrieving the deleted_at field")?,
        body: row.try_get("body").context("retrieving the body field")?,
        kind,
    })
}

#[async_trait]
impl Store for PostgresStore {
    async fn fetch_candidates(&self, filter: &Filter) -> anyhow::Result<Vec<Subject>> {
        let sql = query::to_postgres(filter, 1);
        let query = format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects s WHERE s.deleted_at IS NULL AND {}",
            sql.where_clause
        );
        let mut q = sqlx::query(&query);
        for b in sql.binds {
            q = match b {
                Bind::Uuid(u) => q.bind(u),
                Bind::String(s) => q.bind(s),
                Bind::Time(t) => q.bind(t),
            };
        }
        q.fetch_all(&self.pool)
            .await
            .with_context(|| format!("querying subjects with filter {filter:?}"))?
            .iter()
            .map(subject_from_row)
            .collect()
    }

    async fn fetch_votes(
        &self,
        subjects: &[SubjectId],
    ) -> anyhow::Result<HashMap<SubjectId, Vec<Vote>>> {
        let ids = subjects.iter().map(|s| s.0).collect::<Vec<Uuid>>();
        let rows = sqlx::query(
            "
                SELECT subject_id, voter_id, value
                FROM votes
                WHERE deleted_at IS NULL
                AND subject_id = ANY($1)
            ",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("querying votes for {} subjects", subjects.len()))?;

        let mut res = HashMap::<SubjectId, Vec<Vote>>::with_capacity(subjects.len());
        for row in rows {
            let subject_id = SubjectId(
                row.try_get("subject_id")
                    .context("retrieving the subject_id field")?,
            );
            let value = row
                .try_get::<i16, _>("value")
                .context("retrieving the value field")?;
            res.entry(subject_id).or_default().push(Vote {
                subject_id,
                voter_id: UserId(
                    row.try_get("voter_id")
                        .context("retrieving the voter_id field")?,
                ),
                value: VoteValue::try_from(i64::from(value))
                    .with_context(|| format!("vote on {subject_id:?} has value {value}"))?,
                deleted_at: None,
            });
        }
        Ok(res)
    }

    async fn fetch_subject(&self, id: SubjectId) -> anyhow::Result<Option<Subject>> {
        sqlx::query(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects s WHERE s.id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("querying subject {id:?}"))?
        .as_ref()
        .map(subject_from_row)
        .transpose()
    }
}

#[async_trait]
impl StoreWrite for PostgresStore {
    async fn insert_subject(&self, subject: Subject) -> anyhow::Result<bool> {
        let (community, title, post, parent) = match subject.kind {
            SubjectKind::Post { community, title } => (Some(community.0), Some(title), None, None),
            SubjectKind::Comment { post, parent } => (None, None, Some(post.0), parent.map(|p| p.0)),
        };
        let res = sqlx::query(
            "
                INSERT INTO subjects
                    (id, author_id, created_at, deleted_at, body, community_id, title, post_id, parent_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT DO NOTHING
            ",
        )
        .bind(subject.id.0)
        .bind(subject.author.0)
        .bind(subject.created_at)
        .bind(subject.deleted_at)
        .bind(subject.body)
        .bind(community)
        .bind(title)
        .bind(post)
        .bind(parent)
        .execute(&self.pool)
        .await
        .with_context(|| format!("inserting subject {:?}", subject.id))?;
        Ok(res.rows_affected() == 1)
    }

    async fn upsert_vote(
        &self,
        voter: UserId,
        subject: SubjectId,
        value: VoteValue,
    ) -> anyhow::Result<()> {
        // The partial unique index serializes concurrent upserts for the same pair
        sqlx::query(
            "
                INSERT INTO votes (subject_id, voter_id, value, cast_at)
                VALUES ($1, $2, $3, NOW())
                ON CONFLICT (voter_id, subject_id) WHERE deleted_at IS NULL
                DO UPDATE SET value = EXCLUDED.value
            ",
        )
        .bind(subject.0)
        .bind(voter.0)
        .bind(value.as_i64() as i16)
        .execute(&self.pool)
        .await
        .with_context(|| format!("upserting vote of {voter:?} on {subject:?}"))?;
        Ok(())
    }

    async fn retract_vote(&self, voter: UserId, subject: SubjectId) -> anyhow::Result<()> {
        sqlx::query(
            "
                UPDATE votes
                SET deleted_at = NOW()
                WHERE voter_id = $1
                AND subject_id = $2
                AND deleted_at IS NULL
            ",
        )
        .bind(voter.0)
        .bind(subject.0)
        .execute(&self.pool)
        .await
        .with_context(|| format!("retracting vote of {voter:?} on {subject:?}"))?;
        Ok(())
    }
}
