//! # Glicemia
//!
//! Terminal client for a personal glycemia-tracking backend: records
//! measurements, renders the history as a table and a themed line chart,
//! and keeps a public chat feed live by polling.
//!
//! ## Features
//!
//! - **Never-throws API layer**: every call returns a structured outcome
//! - **Dual-format timestamps**: naive local strings stay literal, UTC
//!   instants convert to the viewer's clock
//! - **Live regions**: history and chat synchronizers keep their render
//!   state consistent with the backend
//! - **Theming**: persisted light/dark preference drives chart colors
//!
//! ## Modules
//!
//! - [`api`]: REST client and wire types
//! - [`sync`]: History and chat synchronizers
//! - [`render`]: Table, chart and escaping helpers
//! - [`session`]: Account and record operations
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use glicemia::api::ApiClient;
//! use glicemia::store::Store;
//! use glicemia::sync::HistorySynchronizer;
//! use glicemia::theme::ThemeController;
//! use std::sync::Arc;
//! use tokio::sync::RwLock;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(RwLock::new(Store::open_default().unwrap()));
//!     let api = ApiClient::new("http://127.0.0.1:5000", Arc::clone(&store));
//!
//!     let theme = Arc::new(ThemeController::new(store));
//!     theme.load().await;
//!
//!     let mut history = HistorySynchronizer::new(api, theme);
//!     history.refresh().await;
//!     println!("{}", history.table());
//! }
//! ```

pub mod api;
pub mod config;
pub mod render;
pub mod session;
pub mod store;
pub mod sync;
pub mod theme;
pub mod timefmt;

// Re-export top-level types for convenience
pub use api::{ApiClient, ApiResponse, Payload, RequestBody};

pub use config::{Config, ConfigError};

pub use render::{ChartPalette, LineChart};

pub use session::{Session, SessionError};

pub use store::{Store, StoreError};

pub use sync::{ChatApi, ChatFeed, ChatSynchronizer, FeedEntry, HistorySynchronizer};

pub use theme::{Theme, ThemeController, ThemeIndicator};
