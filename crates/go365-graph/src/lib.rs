//! # go365-graph
//!
//! Microsoft Graph client for mail, calendars and `OneDrive`, built around a
//! single paginated list-retrieval core.
//!
//! ## Features
//!
//! - **Uniform paging**: every list call returns a [`ListResponse`] whose
//!   [`PageToken`] resumes at the next page, whether Graph pages that
//!   collection with `$skiptoken` cursors or `$skip` offsets
//! - **Query building**: `$top`, `$filter`, `$orderby` and paging parameters
//!   rendered from one [`ListRequest`]
//! - **Multi-calendar views**: best-effort fan-out over every calendar, with
//!   per-calendar failures kept in a [`FanOut`]
//! - **Resource APIs**: messages, events, free/busy, meeting suggestions,
//!   drives and drive items
//!
//! ## Quick Start
//!
//! ```ignore
//! use go365_graph::{CalendarViewOptions, GraphClient};
//!
//! #[tokio::main]
//! async fn main() -> go365_graph::Result<()> {
//!     let client = GraphClient::new(access_token);
//!
//!     let mut options = CalendarViewOptions {
//!         start: "2024-01-15T00:00:00Z".into(),
//!         end: "2024-01-16T00:00:00Z".into(),
//!         top: 10,
//!         ..Default::default()
//!     };
//!     loop {
//!         let page = client.calendar_view(&options).await?;
//!         for event in page.items() {
//!             println!("{:?}", event.subject);
//!         }
//!         match page.next_token() {
//!             Some(token) => options.page_token = Some(token.clone()),
//!             None => break,
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod calendar;
mod client;
pub mod drive;
mod error;
pub mod mail;
pub mod pagination;

pub use calendar::{
    CalendarSources, CalendarViewOptions, Event, EventResponse, FindTimeOptions, GetEventOptions,
    ListEventsOptions,
};
pub use client::{GRAPH_API_BASE_URL, GraphClient, MailboxSettings};
pub use drive::{DriveLocation, ListItemsOptions};
pub use error::{Error, Result};
pub use mail::{ListMessagesOptions, Message};
pub use pagination::{FanOut, ListRequest, ListResponse, PageToken};
