//! Paginated list retrieval shared by every Graph collection.
//!
//! A [`ListRequest`] describes the page to fetch and renders the query
//! string; the raw [`Collection`] payload is turned into a [`ListResponse`],
//! whose [`PageToken`] the caller hands back to get the next page. The
//! [`aggregate`] module merges one request across several sources.
//!
//! Nothing here performs I/O except through a [`SourceCollection`], and
//! nothing here logs.

pub mod aggregate;
mod query;
mod response;
mod token;

pub use aggregate::{FanOut, Source, SourceCollection, SourceTagged};
pub use query::{FILTER_PARAM, ListRequest, ORDER_BY_PARAM, TOP_PARAM};
pub use response::{Collection, ListResponse};
pub use token::{EmptyPageToken, PageToken, SKIP_PARAM, SKIP_TOKEN_PARAM};
