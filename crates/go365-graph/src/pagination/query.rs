//! Rendering a logical list request into Graph query parameters.

use url::form_urlencoded;

use super::token::{PageToken, SKIP_PARAM, SKIP_TOKEN_PARAM};

/// Page size parameter.
pub const TOP_PARAM: &str = "$top";
/// Server-side filter parameter.
pub const FILTER_PARAM: &str = "$filter";
/// Server-side ordering parameter.
pub const ORDER_BY_PARAM: &str = "$orderby";

/// One page of a Graph collection, described independently of the wire.
///
/// A page token and a skip offset may both be set; the token wins and the
/// offset is dropped (see [`ListRequest::effective_page`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    path: String,
    params: Vec<(String, String)>,
    limit: u32,
    page_token: Option<PageToken>,
    skip: u64,
    filter: Option<String>,
    order_by: Option<String>,
    time_range: Vec<String>,
}

impl ListRequest {
    /// Creates a request for the collection at `path` (e.g. `/me/messages`).
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Same request against another collection path.
    #[must_use]
    pub fn rebased(&self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..self.clone()
        }
    }

    /// Adds a resource-specific parameter such as `startDateTime`.
    ///
    /// Setting the same key twice keeps the last value.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.params.retain(|(k, _)| *k != key);
        self.params.push((key, value.into()));
        self
    }

    /// Sets the page size; `0` leaves it to the server.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the page size only if none was given.
    #[must_use]
    pub const fn with_default_limit(mut self, limit: u32) -> Self {
        if self.limit == 0 {
            self.limit = limit;
        }
        self
    }

    /// Continues from a token returned by an earlier page.
    #[must_use]
    pub fn with_page_token(mut self, token: Option<PageToken>) -> Self {
        self.page_token = token;
        self
    }

    /// Skips the first `skip` items; ignored when a page token is set.
    #[must_use]
    pub const fn with_skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    /// Sets the caller's OData filter expression.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = non_empty(filter.into());
        self
    }

    /// Sets the OData ordering expression.
    #[must_use]
    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = non_empty(order_by.into());
        self
    }

    /// Adds a time-range clause, ANDed ahead of the caller's filter.
    #[must_use]
    pub fn with_time_range_clause(mut self, clause: impl Into<String>) -> Self {
        if let Some(clause) = non_empty(clause.into()) {
            self.time_range.push(clause);
        }
        self
    }

    /// Collection path without query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Requested page size, if any.
    #[must_use]
    pub const fn limit(&self) -> Option<u32> {
        if self.limit == 0 { None } else { Some(self.limit) }
    }

    /// The position this request resumes from after precedence is applied.
    #[must_use]
    pub fn effective_page(&self) -> Option<PageToken> {
        self.page_token
            .clone()
            .or_else(|| (self.skip > 0).then_some(PageToken::Offset(self.skip)))
    }

    /// Combined `$filter` value: time-range clauses first, then the caller's
    /// expression.
    ///
    /// With more than one clause each is parenthesized, so an `or` inside the
    /// caller's filter stays within the conjunction.
    #[must_use]
    pub fn filter_expression(&self) -> Option<String> {
        let clauses: Vec<&str> = self
            .time_range
            .iter()
            .chain(self.filter.iter())
            .map(String::as_str)
            .collect();
        match clauses.as_slice() {
            [] => None,
            [only] => Some((*only).to_string()),
            _ => Some(
                clauses
                    .iter()
                    .map(|clause| format!("({clause})"))
                    .collect::<Vec<_>>()
                    .join(" and "),
            ),
        }
    }

    /// Ordered query parameters; each key appears once and no value is empty.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .params
            .iter()
            .filter(|(key, value)| !value.is_empty() && !is_paging_key(key))
            .cloned()
            .collect();

        if let Some(limit) = self.limit() {
            pairs.push((TOP_PARAM.to_string(), limit.to_string()));
        }
        if let Some(filter) = self.filter_expression() {
            pairs.push((FILTER_PARAM.to_string(), filter));
        }
        if let Some(order_by) = &self.order_by {
            pairs.push((ORDER_BY_PARAM.to_string(), order_by.clone()));
        }
        if let Some(page) = self.effective_page() {
            let (key, value) = page.query_pair();
            if !value.is_empty() && page != PageToken::Offset(0) {
                pairs.push((key.to_string(), value));
            }
        }

        pairs
    }

    /// Form-encoded query string without the leading `?`.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.query_pairs() {
            serializer.append_pair(&key, &value);
        }
        serializer.finish()
    }

    /// Path plus query string, ready for [`crate::GraphClient::get`].
    #[must_use]
    pub fn path_and_query(&self) -> String {
        let query = self.query_string();
        if query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{query}", self.path)
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Keys the builder owns; fixed parameters may not shadow them.
fn is_paging_key(key: &str) -> bool {
    [
        TOP_PARAM,
        FILTER_PARAM,
        ORDER_BY_PARAM,
        SKIP_PARAM,
        SKIP_TOKEN_PARAM,
    ]
    .contains(&key)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn decoded(request: &ListRequest) -> Vec<(String, String)> {
        form_urlencoded::parse(request.query_string().as_bytes())
            .into_owned()
            .collect()
    }

    fn as_map(request: &ListRequest) -> HashMap<String, String> {
        decoded(request).into_iter().collect()
    }

    #[test]
    fn test_token_beats_skip() {
        let request = ListRequest::new("/me/messages")
            .with_skip(100)
            .with_page_token(Some(PageToken::Cursor("tok".into())));
        let params = as_map(&request);
        assert_eq!(params.get("$skiptoken").map(String::as_str), Some("tok"));
        assert!(!params.contains_key("$skip"));
    }

    #[test]
    fn test_numeric_token_sent_as_skip() {
        let token = "150".parse().unwrap();
        let request = ListRequest::new("/me/events")
            .with_skip(10)
            .with_page_token(Some(token));
        let params = as_map(&request);
        assert_eq!(params.get("$skip").map(String::as_str), Some("150"));
        assert!(!params.contains_key("$skiptoken"));
    }

    #[test]
    fn test_skip_without_token() {
        let request = ListRequest::new("/me/messages").with_skip(40);
        assert_eq!(decoded(&request), vec![("$skip".into(), "40".into())]);
        assert_eq!(request.effective_page(), Some(PageToken::Offset(40)));
    }

    #[test]
    fn test_zero_and_empty_values_omitted() {
        let request = ListRequest::new("/me/messages")
            .with_limit(0)
            .with_skip(0)
            .with_filter("")
            .with_order_by("  ")
            .with_time_range_clause("")
            .with_param("startDateTime", "");
        assert_eq!(request.query_string(), "");
        assert_eq!(request.path_and_query(), "/me/messages");
    }

    #[test]
    fn test_filter_clause_order() {
        let request = ListRequest::new("/me/messages")
            .with_filter("isRead eq false")
            .with_time_range_clause("receivedDateTime ge 2024-01-01T00:00:00Z")
            .with_time_range_clause("receivedDateTime lt 2024-02-01T00:00:00Z");
        assert_eq!(
            request.filter_expression().as_deref(),
            Some(
                "(receivedDateTime ge 2024-01-01T00:00:00Z) and \
                 (receivedDateTime lt 2024-02-01T00:00:00Z) and (isRead eq false)"
            )
        );
    }

    #[test]
    fn test_or_filter_stays_inside_time_range() {
        let request = ListRequest::new("/me/messages")
            .with_time_range_clause("receivedDateTime ge 2024-01-01T00:00:00Z")
            .with_filter("importance eq 'high' or isRead eq false");
        assert_eq!(
            request.filter_expression().as_deref(),
            Some(
                "(receivedDateTime ge 2024-01-01T00:00:00Z) and \
                 (importance eq 'high' or isRead eq false)"
            )
        );
    }

    #[test]
    fn test_single_clause_is_bare() {
        let request = ListRequest::new("/me/events").with_filter("isCancelled eq false");
        assert_eq!(
            request.filter_expression().as_deref(),
            Some("isCancelled eq false")
        );
        let request = ListRequest::new("/me/messages")
            .with_time_range_clause("receivedDateTime ge 2024-01-01T00:00:00Z");
        assert_eq!(
            request.filter_expression().as_deref(),
            Some("receivedDateTime ge 2024-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_parameter_order_and_encoding() {
        let request = ListRequest::new("/me/calendarView")
            .with_param("startDateTime", "2024-01-15T00:00:00+13:00")
            .with_param("endDateTime", "2024-01-16T00:00:00+13:00")
            .with_limit(25)
            .with_order_by("start/dateTime")
            .with_page_token(Some(PageToken::Offset(25)));

        let keys: Vec<String> = decoded(&request).into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            ["startDateTime", "endDateTime", "$top", "$orderby", "$skip"]
        );
        let query = request.query_string();
        assert!(query.contains("%2B13%3A00"));
        assert!(query.starts_with("startDateTime="));
        assert!(request.path_and_query().starts_with("/me/calendarView?"));
    }

    #[test]
    fn test_fixed_params_replace_and_cannot_shadow_paging() {
        let request = ListRequest::new("/me/calendarView")
            .with_param("startDateTime", "a")
            .with_param("startDateTime", "b")
            .with_param("$top", "999")
            .with_limit(5);
        assert_eq!(
            decoded(&request),
            vec![
                ("startDateTime".into(), "b".into()),
                ("$top".into(), "5".into())
            ]
        );
    }

    #[test]
    fn test_default_limit() {
        assert_eq!(
            ListRequest::new("/me/messages").with_default_limit(100).limit(),
            Some(100)
        );
        assert_eq!(
            ListRequest::new("/me/messages")
                .with_limit(7)
                .with_default_limit(100)
                .limit(),
            Some(7)
        );
    }

    #[test]
    fn test_rebased_keeps_everything_but_path() {
        let template = ListRequest::new("/me/calendarView")
            .with_param("startDateTime", "s")
            .with_limit(10);
        let rebased = template.rebased("/me/calendars/abc/calendarView");
        assert_eq!(rebased.path(), "/me/calendars/abc/calendarView");
        assert_eq!(rebased.query_string(), template.query_string());
    }

    proptest! {
        #[test]
        fn prop_token_always_suppresses_offset(cursor in "[^\\s]{1,30}", skip in any::<u64>(), limit in any::<u32>()) {
            let token: PageToken = cursor.parse().unwrap();
            let request = ListRequest::new("/me/events")
                .with_limit(limit)
                .with_skip(skip)
                .with_page_token(Some(token.clone()));
            let pairs = decoded(&request);
            let paging: Vec<_> = pairs
                .iter()
                .filter(|(k, _)| k == "$skip" || k == "$skiptoken")
                .collect();
            if token == PageToken::Offset(0) {
                prop_assert!(paging.is_empty());
                return Ok(());
            }
            prop_assert_eq!(paging.len(), 1);
            let (key, value) = token.query_pair();
            prop_assert_eq!(&paging[0].0, key);
            prop_assert_eq!(&paging[0].1, &value);
        }

        #[test]
        fn prop_keys_unique(filter in "[a-z ]{0,12}", order in "[a-z/]{0,8}", limit in 0u32..500, skip in 0u64..500) {
            let request = ListRequest::new("/me/messages")
                .with_filter(filter)
                .with_order_by(order)
                .with_limit(limit)
                .with_skip(skip)
                .with_time_range_clause("receivedDateTime ge 2024-01-01T00:00:00Z");
            let pairs = decoded(&request);
            let mut keys: Vec<&String> = pairs.iter().map(|(k, _)| k).collect();
            keys.sort();
            keys.dedup();
            prop_assert_eq!(keys.len(), pairs.len());
            prop_assert!(pairs.iter().all(|(_, v)| !v.is_empty()));
        }
    }
}
