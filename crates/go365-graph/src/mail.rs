//! Mailbox messages.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{GraphClient, segment};
use crate::error::{Error, Result};
use crate::pagination::{ListRequest, ListResponse, PageToken};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_MESSAGE_PAGE_SIZE: u32 = 100;

/// An email message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Subject line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Full body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<ItemBody>,
    /// First characters of the body as plain text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_preview: Option<String>,
    /// Sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Recipient>,
    /// To recipients.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to_recipients: Vec<Recipient>,
    /// Cc recipients.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc_recipients: Vec<Recipient>,
    /// Bcc recipients.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcc_recipients: Vec<Recipient>,
    /// When the message arrived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_date_time: Option<DateTime<Utc>>,
    /// When the message was sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_date_time: Option<DateTime<Utc>>,
    /// Whether the message has file attachments.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_attachments: bool,
    /// `low`, `normal` or `high`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<String>,
    /// Read flag.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_read: bool,
    /// Draft flag.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_draft: bool,
    /// Conversation (thread) identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// RFC 5322 `Message-ID`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internet_message_id: Option<String>,
    /// Link that opens the message in Outlook on the web.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_link: Option<String>,
}

/// Body of a message or event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    /// `text` or `html`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Body content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ItemBody {
    /// Creates a body with an explicit content type (`Text` or `HTML`).
    #[must_use]
    pub fn new(content_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            content: Some(content.into()),
        }
    }

    /// Whether the content is HTML.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("html"))
    }
}

/// Sender or recipient of a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    /// Address of the recipient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<EmailAddress>,
}

impl Recipient {
    /// Recipient with an address and no display name.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            email_address: Some(EmailAddress {
                name: None,
                address: Some(address.into()),
            }),
        }
    }

    /// Formats as `Name <address>`, or just the address.
    #[must_use]
    pub fn display(&self) -> String {
        self.email_address
            .as_ref()
            .map(EmailAddress::display)
            .unwrap_or_default()
    }
}

/// Name and SMTP address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// SMTP address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl EmailAddress {
    /// Formats as `Name <address>`, or just the address.
    #[must_use]
    pub fn display(&self) -> String {
        let address = self.address.as_deref().unwrap_or_default();
        match self.name.as_deref() {
            Some(name) if !name.is_empty() && name != address => format!("{name} <{address}>"),
            _ => address.to_string(),
        }
    }
}

/// Body of `POST /me/sendMail`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMailRequest<'a> {
    /// Message to send.
    pub message: &'a Message,
    /// Whether to keep a copy in Sent Items.
    pub save_to_sent_items: bool,
}

/// Options for [`GraphClient::list_messages`].
#[derive(Debug, Clone, Default)]
pub struct ListMessagesOptions {
    /// Folder id or well-known name (`inbox`, `sentitems`); default is all mail.
    pub folder_id: Option<String>,
    /// Page size; defaults to [`DEFAULT_MESSAGE_PAGE_SIZE`].
    pub top: u32,
    /// Offset for the first page; ignored with a page token.
    pub skip: u64,
    /// Token from a previous page.
    pub page_token: Option<PageToken>,
    /// Extra OData filter.
    pub filter: Option<String>,
    /// OData ordering, e.g. `receivedDateTime desc`.
    pub order_by: Option<String>,
    /// Only messages received at or after this instant.
    pub start_time: Option<DateTime<Utc>>,
    /// Only messages received before this instant.
    pub end_time: Option<DateTime<Utc>>,
}

impl ListMessagesOptions {
    /// Renders the options into a list request.
    #[must_use]
    pub fn to_request(&self) -> ListRequest {
        let path = match self.folder_id.as_deref().filter(|f| !f.is_empty()) {
            Some(folder) => format!("/me/mailFolders/{}/messages", segment(folder)),
            None => "/me/messages".to_string(),
        };

        let mut request = ListRequest::new(path)
            .with_limit(self.top)
            .with_default_limit(DEFAULT_MESSAGE_PAGE_SIZE)
            .with_skip(self.skip)
            .with_page_token(self.page_token.clone());

        if let Some(start) = self.start_time {
            request = request.with_time_range_clause(format!(
                "receivedDateTime ge {}",
                start.to_rfc3339_opts(SecondsFormat::Secs, true)
            ));
        }
        if let Some(end) = self.end_time {
            request = request.with_time_range_clause(format!(
                "receivedDateTime lt {}",
                end.to_rfc3339_opts(SecondsFormat::Secs, true)
            ));
        }
        if let Some(filter) = &self.filter {
            request = request.with_filter(filter.as_str());
        }
        if let Some(order_by) = &self.order_by {
            request = request.with_order_by(order_by.as_str());
        }
        request
    }
}

/// Splits a comma-separated address list into recipients.
#[must_use]
pub fn parse_recipients(list: &str) -> Vec<Recipient> {
    list.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(Recipient::new)
        .collect()
}

impl GraphClient {
    /// Lists one page of messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload cannot be decoded.
    pub async fn list_messages(&self, options: &ListMessagesOptions) -> Result<ListResponse<Message>> {
        self.list(&options.to_request()).await
    }

    /// Fetches a single message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty id, otherwise any
    /// request error.
    pub async fn get_message(&self, id: &str) -> Result<Message> {
        if id.is_empty() {
            return Err(Error::invalid("message ID is required"));
        }
        self.get_json(&format!("/me/messages/{}", segment(id))).await
    }

    /// Sends a message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] without a subject or a To recipient,
    /// otherwise any request error.
    pub async fn send_mail(&self, message: &Message, save_to_sent_items: bool) -> Result<()> {
        if message.subject.as_deref().is_none_or(str::is_empty) {
            return Err(Error::invalid("subject is required"));
        }
        if message.to_recipients.is_empty() {
            return Err(Error::invalid("at least one recipient is required"));
        }

        let request = SendMailRequest {
            message,
            save_to_sent_items,
        };
        self.post("/me/sendMail", &request).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::collections::HashMap;
    use url::form_urlencoded;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn query_of(request: &ListRequest) -> HashMap<String, String> {
        form_urlencoded::parse(request.query_string().as_bytes())
            .into_owned()
            .collect()
    }

    #[test]
    fn test_default_request() {
        let request = ListMessagesOptions::default().to_request();
        assert_eq!(request.path(), "/me/messages");
        assert_eq!(request.path_and_query(), "/me/messages?%24top=100");
    }

    #[test]
    fn test_folder_and_time_range() {
        let options = ListMessagesOptions {
            folder_id: Some("inbox".into()),
            top: 10,
            filter: Some("isRead eq false".into()),
            order_by: Some("receivedDateTime desc".into()),
            start_time: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            end_time: Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let request = options.to_request();
        assert_eq!(request.path(), "/me/mailFolders/inbox/messages");

        let query = query_of(&request);
        assert_eq!(query["$top"], "10");
        assert_eq!(
            query["$filter"],
            "(receivedDateTime ge 2024-01-01T00:00:00Z) and \
             (receivedDateTime lt 2024-02-01T00:00:00Z) and (isRead eq false)"
        );
        assert_eq!(query["$orderby"], "receivedDateTime desc");
    }

    #[test]
    fn test_or_filter_keeps_since_bound() {
        let options = ListMessagesOptions {
            filter: Some("importance eq 'high' or isRead eq false".into()),
            start_time: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let query = query_of(&options.to_request());
        assert_eq!(
            query["$filter"],
            "(receivedDateTime ge 2024-01-01T00:00:00Z) and \
             (importance eq 'high' or isRead eq false)"
        );
    }

    #[test]
    fn test_page_token_overrides_skip() {
        let options = ListMessagesOptions {
            skip: 100,
            page_token: Some(PageToken::Cursor("tok".into())),
            ..Default::default()
        };
        let query = query_of(&options.to_request());
        assert_eq!(query["$skiptoken"], "tok");
        assert!(!query.contains_key("$skip"));
    }

    #[test]
    fn test_parse_recipients() {
        let recipients = parse_recipients(" a@contoso.com, ,b@contoso.com,");
        assert_eq!(recipients.len(), 2);
        assert_eq!(recipients[1].display(), "b@contoso.com");
        assert!(parse_recipients("").is_empty());
    }

    #[test]
    fn test_email_display() {
        let named = EmailAddress {
            name: Some("Grace Hopper".into()),
            address: Some("grace@contoso.com".into()),
        };
        assert_eq!(named.display(), "Grace Hopper <grace@contoso.com>");
    }

    #[test]
    fn test_message_serialization_skips_empty() {
        let message = Message {
            subject: Some("Hi".into()),
            to_recipients: parse_recipients("a@contoso.com"),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "subject": "Hi",
                "toRecipients": [{"emailAddress": {"address": "a@contoso.com"}}]
            })
        );
    }

    #[tokio::test]
    async fn test_list_messages_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/messages"))
            .and(query_param("$top", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    {"id": "m1", "subject": "One", "receivedDateTime": "2024-01-15T10:30:00Z", "isRead": true},
                    {"id": "m2", "subject": "Two", "from": {"emailAddress": {"name": "Ada", "address": "ada@contoso.com"}}}
                ],
                "@odata.nextLink": format!("{}/me/messages?%24top=2&%24skip=2", server.uri())
            })))
            .mount(&server)
            .await;

        let client = GraphClient::with_base_url(server.uri(), "t");
        let page = client
            .list_messages(&ListMessagesOptions {
                top: 2,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.count(), 2);
        assert!(page.items()[0].is_read);
        assert_eq!(page.items()[1].from.as_ref().unwrap().display(), "Ada <ada@contoso.com>");
        assert_eq!(page.next_token(), Some(&PageToken::Offset(2)));
    }

    #[tokio::test]
    async fn test_get_message_requires_id() {
        let client = GraphClient::with_base_url("http://127.0.0.1:9", "t");
        assert!(matches!(
            client.get_message("").await,
            Err(Error::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_send_mail_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/me/sendMail"))
            .and(body_json(json!({
                "message": {
                    "subject": "Status",
                    "body": {"contentType": "Text", "content": "All good"},
                    "toRecipients": [{"emailAddress": {"address": "a@contoso.com"}}]
                },
                "saveToSentItems": false
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = GraphClient::with_base_url(server.uri(), "t");
        let message = Message {
            subject: Some("Status".into()),
            body: Some(ItemBody::new("Text", "All good")),
            to_recipients: parse_recipients("a@contoso.com"),
            ..Default::default()
        };
        client.send_mail(&message, false).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_mail_validation() {
        let client = GraphClient::with_base_url("http://127.0.0.1:9", "t");
        let no_subject = Message {
            to_recipients: parse_recipients("a@contoso.com"),
            ..Default::default()
        };
        assert!(matches!(
            client.send_mail(&no_subject, true).await,
            Err(Error::InvalidArgument(m)) if m.contains("subject")
        ));

        let no_recipient = Message {
            subject: Some("Hi".into()),
            ..Default::default()
        };
        assert!(matches!(
            client.send_mail(&no_recipient, true).await,
            Err(Error::InvalidArgument(m)) if m.contains("recipient")
        ));
    }
}
