//! Synchronizers
//!
//! Fetch-and-render drivers for the two live regions of the client: the
//! measurement history (table + chart) and the public chat feed. Both
//! lean on the API client's never-throws contract and keep their data
//! transforms pure so they test without a backend.

mod chat;
mod history;

pub use chat::{ChatApi, ChatFeed, ChatSynchronizer, FeedEntry};
pub use history::HistorySynchronizer;
