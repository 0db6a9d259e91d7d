//! Best-effort fan-out of one list request over several sources.
//!
//! Used for "all calendars" views: every calendar is listed in turn and the
//! results concatenated. A source that fails is recorded and skipped, so one
//! calendar the user lost access to does not hide the others. Only failure to
//! enumerate the sources is fatal. The merged result has no continuation
//! token, since a single token cannot address positions in N streams.

use std::future::Future;

use super::query::ListRequest;
use super::response::ListResponse;

/// A sub-collection taking part in a fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Identifier used to address the source.
    pub id: String,
    /// Human-readable name.
    pub display_name: String,
}

impl Source {
    /// Creates a source descriptor.
    #[must_use]
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Items that can record which source they came from.
pub trait SourceTagged {
    /// Stores the identifier of the originating source.
    fn tag_source(&mut self, source_id: &str);
}

/// Something that can enumerate sources and list items from each.
pub trait SourceCollection {
    /// Item type produced by each source.
    type Item: SourceTagged;
    /// Error type for both enumeration and per-source listing.
    type Error;

    /// Enumerates the sources to fan out over.
    fn list_sources(&self) -> impl Future<Output = Result<Vec<Source>, Self::Error>> + Send;

    /// Lists one page from `source`, using `request` as the template.
    fn list_source(
        &self,
        source: &Source,
        request: &ListRequest,
    ) -> impl Future<Output = Result<ListResponse<Self::Item>, Self::Error>> + Send;
}

/// Outcome of a fan-out, keeping per-source failures visible.
#[derive(Debug)]
pub struct FanOut<T, E> {
    /// Sources that answered, in enumeration order.
    pub succeeded: Vec<(Source, ListResponse<T>)>,
    /// Sources that failed, in enumeration order.
    pub failed: Vec<(Source, E)>,
}

impl<T, E> FanOut<T, E> {
    /// Sources that were skipped because their listing failed.
    pub fn skipped_sources(&self) -> impl Iterator<Item = &Source> {
        self.failed.iter().map(|(source, _)| source)
    }

    /// Concatenates the successful sources in order into one final page.
    #[must_use]
    pub fn into_response(self) -> ListResponse<T> {
        ListResponse::complete(
            self.succeeded
                .into_iter()
                .flat_map(|(_, page)| page.into_items())
                .collect(),
        )
    }
}

/// Lists every source sequentially and merges the results.
///
/// The request's page token and skip offset are not forwarded: each source
/// is read from its first page.
///
/// # Errors
///
/// Returns the error of [`SourceCollection::list_sources`]; per-source errors
/// end up in [`FanOut::failed`] instead.
pub async fn aggregate<C>(
    collection: &C,
    request: &ListRequest,
) -> Result<FanOut<C::Item, C::Error>, C::Error>
where
    C: SourceCollection + Sync,
{
    let sources = collection.list_sources().await?;
    let template = request.clone().with_page_token(None).with_skip(0);

    let mut fan_out = FanOut {
        succeeded: Vec::with_capacity(sources.len()),
        failed: Vec::new(),
    };

    for source in sources {
        match collection.list_source(&source, &template).await {
            Ok(page) => {
                let page = page.map_items(|mut item| {
                    item.tag_source(&source.id);
                    item
                });
                fan_out.succeeded.push((source, page));
            }
            Err(error) => fan_out.failed.push((source, error)),
        }
    }

    Ok(fan_out)
}
