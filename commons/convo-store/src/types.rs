use serde::{Deserialize, Serialize};

/// Opaque resume position within a change feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceToken(String);

impl SequenceToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One change delivered by a feed subscription, in arrival order.
#[derive(Debug, Clone)]
pub struct ChangeEvent<D> {
    pub document: D,
    pub seq: SequenceToken,
}

impl<D> ChangeEvent<D> {
    pub fn new(document: D, seq: SequenceToken) -> Self {
        Self { document, seq }
    }
}

/// Raw ingress document for a new chat comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentEvent {
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
}

/// Raw ingress document for a reaction to an already-materialized
/// comment, addressed by its positional index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub conversation_id: String,
    #[serde(rename = "commentIndex")]
    pub comment_index: usize,
    #[serde(rename = "reactionType")]
    pub reaction_kind: ReactionKind,
}

/// The fixed set of emoji-style reactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Loveface,
    Lol,
    Smile,
    Sad,
    Angry,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 5] = [
        ReactionKind::Loveface,
        ReactionKind::Lol,
        ReactionKind::Smile,
        ReactionKind::Sad,
        ReactionKind::Angry,
    ];
}

/// Per-kind reaction counters for one comment entry. Counts only ever
/// increase under the engine's own writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCounts {
    #[serde(default)]
    pub loveface: u64,
    #[serde(default)]
    pub lol: u64,
    #[serde(default)]
    pub smile: u64,
    #[serde(default)]
    pub sad: u64,
    #[serde(default)]
    pub angry: u64,
}

impl ReactionCounts {
    pub fn get(&self, kind: ReactionKind) -> u64 {
        match kind {
            ReactionKind::Loveface => self.loveface,
            ReactionKind::Lol => self.lol,
            ReactionKind::Smile => self.smile,
            ReactionKind::Sad => self.sad,
            ReactionKind::Angry => self.angry,
        }
    }

    pub fn add(&mut self, kind: ReactionKind, delta: u64) {
        match kind {
            ReactionKind::Loveface => self.loveface += delta,
            ReactionKind::Lol => self.lol += delta,
            ReactionKind::Smile => self.smile += delta,
            ReactionKind::Sad => self.sad += delta,
            ReactionKind::Angry => self.angry += delta,
        }
    }
}

/// One materialized comment. Entries are appended in event order and
/// never reordered or deleted; reaction events address them by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentEntry {
    pub content: String,
    pub sender_id: String,
    pub reactions: ReactionCounts,
}

impl CommentEntry {
    pub fn new(content: impl Into<String>, sender_id: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sender_id: sender_id.into(),
            reactions: ReactionCounts::default(),
        }
    }
}

/// The per-conversation materialized view. Identity is the
/// conversation id; the revision is the store's optimistic-concurrency
/// handle, assigned on every successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default)]
    pub comments: Vec<CommentEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badges: Option<Vec<String>>,
}

impl AggregateDocument {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rev: None,
            comments: Vec::new(),
            title: None,
            url: None,
            badges: None,
        }
    }
}

/// Bootstrap catalog listing the known conversations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub links: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub slug: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub badges: Vec<String>,
}
