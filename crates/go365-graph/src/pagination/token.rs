//! Continuation tokens exchanged between invocations.

use std::fmt;
use std::str::FromStr;
use url::Url;

/// Query key Graph uses for opaque cursors.
pub const SKIP_TOKEN_PARAM: &str = "$skiptoken";

/// Query key Graph uses for numeric offsets.
pub const SKIP_PARAM: &str = "$skip";

/// Position of the next page in a Graph collection.
///
/// Some collections continue with an opaque `$skiptoken` cursor, others with
/// a numeric `$skip` offset. The variant decides which query parameter the
/// token is sent back as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageToken {
    /// Opaque server-issued cursor (`$skiptoken`).
    Cursor(String),
    /// Number of items to skip (`$skip`).
    Offset(u64),
}

impl PageToken {
    /// Extracts the token from an `@odata.nextLink` URL.
    ///
    /// A cursor wins over an offset when a link carries both. Empty or
    /// unparseable links, and links without either parameter, yield `None`,
    /// meaning there are no further pages. A non-numeric `$skip` value is kept
    /// verbatim as a cursor.
    #[must_use]
    pub fn from_continuation_link(link: &str) -> Option<Self> {
        if link.is_empty() {
            return None;
        }
        let url = Url::parse(link).ok()?;

        let mut offset = None;
        for (key, value) in url.query_pairs() {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                SKIP_TOKEN_PARAM => return Some(Self::Cursor(value.into_owned())),
                SKIP_PARAM if offset.is_none() => offset = Some(value.into_owned()),
                _ => {}
            }
        }

        offset.map(|value| match value.parse() {
            Ok(n) => Self::Offset(n),
            Err(_) => Self::Cursor(value),
        })
    }

    /// Returns the `(key, value)` query pair that resumes at this position.
    #[must_use]
    pub fn query_pair(&self) -> (&'static str, String) {
        match self {
            Self::Cursor(cursor) => (SKIP_TOKEN_PARAM, cursor.clone()),
            Self::Offset(offset) => (SKIP_PARAM, offset.to_string()),
        }
    }
}

/// Renders the bare token value, as shown in "next page" hints.
impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cursor(cursor) => f.write_str(cursor),
            Self::Offset(offset) => write!(f, "{offset}"),
        }
    }
}

/// Error for an empty `--page-token` value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("page token must not be empty")]
pub struct EmptyPageToken;

/// Parses a token handed back by the user.
///
/// The kind is not carried in the printed form, so an all-digit value is read
/// as an offset and anything else as a cursor. A cursor that happens to be
/// all digits is therefore sent back as `$skip`.
impl FromStr for PageToken {
    type Err = EmptyPageToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmptyPageToken);
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(offset) = s.parse() {
                return Ok(Self::Offset(offset));
            }
        }
        Ok(Self::Cursor(s.to_string()))
    }
}
