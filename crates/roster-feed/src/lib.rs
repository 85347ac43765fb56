//! Notification feed client and ingestion pipeline.
//!
//! [`FeedClient`] fetches and decodes the remote XML feed.
//! [`Pipeline`] filters the decoded notifications down to joins and leaves
//! and writes them through any [`roster_core::store::StoreProvider`].

pub mod client;
pub mod error;
pub mod ingest;
pub mod record;
pub mod xml;

pub use client::{Credentials, FeedClient};
pub use error::{Error, Result};
pub use ingest::{CycleReport, Pipeline};
pub use record::{FeedPage, NotificationRecord};
