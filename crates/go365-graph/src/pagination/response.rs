//! Normalized list results.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use super::token::PageToken;

/// Raw Graph collection payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    /// Items of this page.
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    /// Link to the next page, if any.
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

/// One page of results in server order.
///
/// The count is the length of this page, not a total, and a next token is
/// present exactly when more pages exist. Both hold by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResponse<T> {
    items: Vec<T>,
    next_token: Option<PageToken>,
}

impl<T> ListResponse<T> {
    /// Builds a page from raw items and the server's continuation link.
    ///
    /// A missing, empty or malformed link means there are no more pages.
    #[must_use]
    pub fn normalize(items: Vec<T>, continuation_link: Option<&str>) -> Self {
        Self {
            items,
            next_token: continuation_link.and_then(PageToken::from_continuation_link),
        }
    }

    /// Normalizes a decoded Graph payload.
    #[must_use]
    pub fn from_collection(collection: Collection<T>) -> Self {
        Self::normalize(collection.value, collection.next_link.as_deref())
    }

    /// A final page with no continuation, used for merged results.
    #[must_use]
    pub const fn complete(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }

    /// Items of this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consumes the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Number of items in this page.
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Whether the server reported another page.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.next_token.is_some()
    }

    /// Token to pass back for the next page.
    #[must_use]
    pub const fn next_token(&self) -> Option<&PageToken> {
        self.next_token.as_ref()
    }

    /// Transforms the items, keeping the continuation.
    #[must_use]
    pub fn map_items<U, F>(self, f: F) -> ListResponse<U>
    where
        F: FnMut(T) -> U,
    {
        ListResponse {
            items: self.items.into_iter().map(f).collect(),
            next_token: self.next_token,
        }
    }
}

impl<T> Default for ListResponse<T> {
    fn default() -> Self {
        Self::complete(Vec::new())
    }
}

/// Serializes as `{"value", "@odata.count", "hasMore", "nextPageToken"}`,
/// omitting a zero count and an absent token.
impl<T: Serialize> Serialize for ListResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let count = self.count();
        let mut state = serializer.serialize_struct("ListResponse", 4)?;
        state.serialize_field("value", &self.items)?;
        if count > 0 {
            state.serialize_field("@odata.count", &count)?;
        } else {
            state.skip_field("@odata.count")?;
        }
        state.serialize_field("hasMore", &self.has_more())?;
        match &self.next_token {
            Some(token) => state.serialize_field("nextPageToken", &token.to_string())?,
            None => state.skip_field("nextPageToken")?,
        }
        state.end()
    }
}
