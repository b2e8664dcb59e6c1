mod db;
pub use db::MemoryStore;

pub mod cursor;

mod error;
pub use error::Error;

mod order;
pub use order::{compare, OrderExt, SortKey};

mod query;
pub use query::FilterExt;

mod score;
pub use score::{tally, VoteAggregator};

mod search;
pub use search::{slice_after, slice_page, PaginationOrchestrator};

mod thread;
pub use thread::ThreadDepthValidator;

#[cfg(test)]
mod test_util;

pub mod api {
    pub use agora_api::*;
}

pub mod prelude {
    pub use crate::{FilterExt, OrderExt};
}
