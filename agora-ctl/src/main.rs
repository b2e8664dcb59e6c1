use agora_api::{Error as ApiError, NewVote, SortMode, UserId, Uuid};
use anyhow::Context;

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(short, long)]
    host: String,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
struct ListOpts {
    /// Newest or Top
    #[structopt(long, default_value = "Newest")]
    sort: SortMode,

    /// Continuation returned by a previous listing
    #[structopt(long, conflicts_with = "page")]
    cursor: Option<String>,

    /// 1-based page number
    #[structopt(long)]
    page: Option<u32>,

    #[structopt(long)]
    limit: Option<u32>,
}

impl ListOpts {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut res = vec![("sort", self.sort.to_string())];
        if let Some(c) = &self.cursor {
            res.push(("cursor", c.clone()));
        }
        if let Some(p) = self.page {
            res.push(("page", p.to_string()));
        }
        if let Some(l) = self.limit {
            res.push(("limit", l.to_string()));
        }
        res
    }
}

#[derive(structopt::StructOpt)]
enum Command {
    /// List the posts of a community
    Posts {
        community: Uuid,

        #[structopt(flatten)]
        list: ListOpts,
    },

    /// List the comments of a post
    Comments {
        post: Uuid,

        /// Only list direct replies to this comment
        #[structopt(long)]
        parent: Option<Uuid>,

        #[structopt(flatten)]
        list: ListOpts,
    },

    /// Show the score of a post or comment
    Score { subject: Uuid },

    /// Show the depth a new comment would be created at
    Depth {
        post: Uuid,

        #[structopt(long)]
        parent: Option<Uuid>,
    },

    /// Vote on a post or comment: 1, -1, or 0 to retract
    Vote {
        subject: Uuid,

        #[structopt(long)]
        voter: Uuid,

        #[structopt(long, allow_hyphen_values = true)]
        value: i64,
    },
}

async fn send(req: reqwest::RequestBuilder) -> anyhow::Result<serde_json::Value> {
    let resp = req.send().await.context("sending request")?;
    let status = resp.status();
    let body = resp.bytes().await.context("reading response body")?;
    if !status.is_success() {
        let err = ApiError::parse(&body)
            .with_context(|| format!("server returned {status} with an unparseable error"))?;
        return Err(err.into());
    }
    serde_json::from_slice(&body).context("parsing response body")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = <Opt as structopt::StructOpt>::from_args();

    let client = reqwest::Client::new();

    let res = match opt.cmd {
        Command::Posts { community, list } => {
            send(
                client
                    .get(format!("{}/api/communities/{community}/posts", opt.host))
                    .query(&list.query()),
            )
            .await?
        }
        Command::Comments { post, parent, list } => {
            let mut query = list.query();
            if let Some(parent) = parent {
                query.push(("parent", parent.to_string()));
            }
            send(
                client
                    .get(format!("{}/api/posts/{post}/comments", opt.host))
                    .query(&query),
            )
            .await?
        }
        Command::Score { subject } => {
            send(client.get(format!("{}/api/subjects/{subject}/score", opt.host))).await?
        }
        Command::Depth { post, parent } => {
            let mut req = client.get(format!("{}/api/posts/{post}/depth", opt.host));
            if let Some(parent) = parent {
                req = req.query(&[("parent", parent.to_string())]);
            }
            send(req).await?
        }
        Command::Vote {
            subject,
            voter,
            value,
        } => {
            let vote = NewVote {
                voter: UserId(voter),
                value,
            };
            vote.value()?;
            send(
                client
                    .post(format!("{}/api/subjects/{subject}/votes", opt.host))
                    .json(&vote),
            )
            .await?
        }
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&res).context("formatting response")?
    );
    Ok(())
}
