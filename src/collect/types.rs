// src/collect/types.rs
use anyhow::Result;

/// A single post from the channel feed, keyed by its exact text.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Post {
    pub text: String,
}

/// The script-rendered feed the loop collects from.
///
/// `handshake` navigates to the feed and confirms at least one post is
/// visible. `reveal_and_capture` nudges the feed to render more content,
/// waits for it to settle, and returns every post text currently visible,
/// in document order. A failure from either operation is fatal for the run.
#[async_trait::async_trait]
pub trait SnapshotSource {
    async fn handshake(&mut self, url: &str) -> Result<()>;
    async fn reveal_and_capture(&mut self) -> Result<Vec<String>>;
}

/// Append-only destination for accepted posts.
pub trait PostSink {
    fn append(&mut self, post: &Post) -> Result<()>;
}
