//! Chat Synchronizer
//!
//! Polling driver for the public chat feed. Every refresh replaces the
//! feed wholesale with the backend's message list (no merge, no
//! incremental diff) and forces the scroll position to the newest
//! message. The backend seam is the [`ChatApi`] trait so polling runs
//! against a mock in tests.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::api::{ApiClient, ChatMessage, ChatPost};
use crate::render::escape_html;
use crate::timefmt;

/// Backend operations the chat needs.
#[async_trait]
pub trait ChatApi: Send + Sync + 'static {
    /// Fetch the complete message list; `None` means the fetch failed
    /// (which leaves the current feed untouched).
    async fn fetch_messages(&self) -> Option<Vec<ChatMessage>>;

    /// Post one message. `Err` carries a user-facing description.
    async fn post_message(&self, content: &str) -> Result<(), String>;
}

#[async_trait]
impl ChatApi for ApiClient {
    async fn fetch_messages(&self) -> Option<Vec<ChatMessage>> {
        let response = self.get("/api/chat/messages").await;
        if !response.success {
            tracing::debug!(status = response.status, "chat fetch failed");
            return None;
        }
        response.decode()
    }

    async fn post_message(&self, content: &str) -> Result<(), String> {
        let response = self
            .post_json(
                "/api/chat/messages",
                ChatPost {
                    content: content.to_string(),
                },
            )
            .await;
        if response.success {
            Ok(())
        } else {
            Err(response.describe_failure())
        }
    }
}

/// One rendered feed entry. Username and content are already escaped.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub username: String,
    pub timestamp: String,
    pub content: String,
}

/// The rendered feed. `scroll` is the index one past the last visible
/// entry; after every refresh it points at the end so the newest message
/// is visible.
#[derive(Debug, Clone, Default)]
pub struct ChatFeed {
    pub entries: Vec<FeedEntry>,
    pub scroll: usize,
}

pub struct ChatSynchronizer<A: ChatApi> {
    api: Arc<A>,
    feed: Arc<RwLock<ChatFeed>>,
    poll_interval: Duration,
    poll_handle: Option<JoinHandle<()>>,
}

impl<A: ChatApi> ChatSynchronizer<A> {
    pub fn new(api: Arc<A>, poll_interval: Duration) -> Self {
        Self {
            api,
            feed: Arc::new(RwLock::new(ChatFeed::default())),
            poll_interval,
            poll_handle: None,
        }
    }

    /// Snapshot of the current feed.
    pub async fn feed(&self) -> ChatFeed {
        self.feed.read().await.clone()
    }

    /// One fetch-and-render pass. Replaces the whole feed on success;
    /// a failed fetch changes nothing.
    pub async fn refresh(&self) {
        Self::refresh_into(&self.api, &self.feed).await;
    }

    /// Trim and post a message. Blank input is a no-op (`Ok(false)`).
    /// On success one immediate refresh runs instead of waiting for the
    /// next poll tick; the caller clears its input field.
    pub async fn send(&self, text: &str) -> Result<bool, String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }

        self.api.post_message(trimmed).await?;
        self.refresh().await;
        Ok(true)
    }

    /// Start the poll loop: one immediate fetch, then one every
    /// configured interval until [`stop_polling`](Self::stop_polling).
    /// Idempotent; any previous timer is cancelled first.
    pub fn start_polling(&mut self) {
        self.stop_polling();

        let api = Arc::clone(&self.api);
        let feed = Arc::clone(&self.feed);
        let interval = self.poll_interval;

        self.poll_handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                // First tick fires immediately.
                ticker.tick().await;
                Self::refresh_into(&api, &feed).await;
            }
        }));
    }

    /// Cancel the active timer, if any. In-flight fetches are not
    /// aborted mid-request; safe to call when not polling.
    pub fn stop_polling(&mut self) {
        if let Some(handle) = self.poll_handle.take() {
            handle.abort();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poll_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    async fn refresh_into(api: &A, feed: &Arc<RwLock<ChatFeed>>) {
        if let Some(messages) = api.fetch_messages().await {
            let entries = build_feed(&messages);
            let mut feed = feed.write().await;
            feed.entries = entries;
            // Whole-feed replacement destroys scroll anchoring; force it
            // back to the newest message.
            feed.scroll = feed.entries.len();
        }
    }
}

impl<A: ChatApi> Drop for ChatSynchronizer<A> {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

/// Escape and format messages for the feed, in backend order.
fn build_feed(messages: &[ChatMessage]) -> Vec<FeedEntry> {
    messages
        .iter()
        .map(|m| FeedEntry {
            username: escape_html(&m.username),
            timestamp: timefmt::normalize(&m.timestamp),
            content: escape_html(&m.content),
        })
        .collect()
}
