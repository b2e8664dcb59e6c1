use std::{net::SocketAddr, sync::Arc, time::Duration};

use agora_core::api::MAX_LIMIT;
use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

mod db;
mod error;
mod extractors;
mod handlers;
mod query;

use db::PostgresStore;
use error::Error;
use extractors::{AppState, DefaultLimit};

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, StructOpt)]
#[structopt(name = "agora-server", about = "Ranking and pagination backend for discussions")]
struct Opt {
    /// Postgres connection string
    #[structopt(long, env = "DATABASE_URL")]
    database_url: String,

    #[structopt(long, env = "AGORA_LISTEN", default_value = "127.0.0.1:3000")]
    listen: SocketAddr,

    #[structopt(long, env = "AGORA_DB_MAX_CONNECTIONS", default_value = "10")]
    max_connections: u32,

    /// How long a request may wait for a database connection
    #[structopt(long, default_value = "5")]
    acquire_timeout_secs: u64,

    /// Page size for listings that do not ask for one
    #[structopt(long, default_value = "20")]
    default_limit: u32,
}

async fn create_sqlx_pool(opt: &Opt) -> anyhow::Result<sqlx::PgPool> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(opt.max_connections)
        .acquire_timeout(Duration::from_secs(opt.acquire_timeout_secs))
        .connect(&opt.database_url)
        .await
        .context("opening database connection pool")
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/communities/:id/posts", get(handlers::list_posts))
        .route("/api/posts", post(handlers::create_post))
        .route(
            "/api/posts/:id/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route("/api/posts/:id/depth", get(handlers::depth))
        .route("/api/search", post(handlers::search))
        .route("/api/subjects/:id/score", get(handlers::score))
        .route("/api/subjects/:id/votes", post(handlers::vote))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opt = Opt::from_args();
    anyhow::ensure!(
        (1..=MAX_LIMIT).contains(&opt.default_limit),
        "default limit must be between 1 and {MAX_LIMIT}, got {}",
        opt.default_limit
    );

    let pool = create_sqlx_pool(&opt).await?;
    MIGRATOR
        .run(&pool)
        .await
        .context("applying database migrations")?;

    let state = AppState {
        store: Arc::new(PostgresStore::new(pool)),
        default_limit: DefaultLimit(opt.default_limit),
    };

    tracing::info!("listening on {}", opt.listen);
    axum::Server::bind(&opt.listen)
        .serve(app(state).into_make_service())
        .await
        .context("serving axum webserver")
}
