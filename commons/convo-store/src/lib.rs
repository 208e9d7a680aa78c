pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{FeedError, StoreError, StoreResult};
pub use traits::{CatalogSource, ChangeFeed, ChangeStream, DocumentStore};
pub use types::{
    AggregateDocument, CatalogDocument, CatalogEntry, ChangeEvent, CommentEntry, CommentEvent,
    ReactionCounts, ReactionEvent, ReactionKind, SequenceToken,
};
