//! Bearer-token HTTP client for the Microsoft Graph REST API.

use bytes::Bytes;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::debug;

use crate::error::{Error, Result};
use crate::pagination::{Collection, ListRequest, ListResponse};

/// Base URL of the Graph v1.0 endpoint in the public cloud.
pub const GRAPH_API_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Microsoft Graph client.
///
/// Paths passed to the request methods are relative to the base URL and may
/// carry a query string, e.g. `/me/messages?%24top=10`.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: Client,
    base_url: String,
    access_token: String,
}

/// Regional and format preferences of the signed-in user's mailbox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxSettings {
    /// Windows or IANA time zone name.
    #[serde(default)]
    pub time_zone: String,
    /// Preferred date format.
    #[serde(default)]
    pub date_format: String,
    /// Preferred time format.
    #[serde(default)]
    pub time_format: String,
}

impl GraphClient {
    /// Creates a client for the public Graph endpoint.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(GRAPH_API_BASE_URL, access_token)
    }

    /// Creates a client against another base URL (national clouds, mock servers).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// Returns the base URL requests are issued against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "graph request");
        self.http
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(&self.access_token)
    }

    /// Issues a `GET`; only `200 OK` counts as success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure and [`Error::Api`] for any
    /// other status.
    pub async fn get(&self, path: &str) -> Result<Bytes> {
        let response = self.request(Method::GET, path).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            return Err(api_error(status, &body));
        }
        Ok(body)
    }

    /// Issues a `GET` and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`GraphClient::get`], plus [`Error::Json`] if decoding fails.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get(path).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Fetches one page of a collection and normalizes it.
    ///
    /// # Errors
    ///
    /// Same as [`GraphClient::get_json`].
    pub async fn list<T: DeserializeOwned>(&self, request: &ListRequest) -> Result<ListResponse<T>> {
        let collection: Collection<T> = self.get_json(&request.path_and_query()).await?;
        Ok(ListResponse::from_collection(collection))
    }

    /// Issues a `POST` with a JSON body; any 2xx status counts as success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure and [`Error::Api`] for a
    /// non-2xx status.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Bytes> {
        self.send_json(Method::POST, path, body).await
    }

    /// Issues a `POST` and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// Same as [`GraphClient::post`], plus [`Error::Json`] if decoding fails.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.post(path, body).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Issues a `PUT` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure and [`Error::Api`] for a
    /// non-2xx status.
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Bytes> {
        self.send_json(Method::PUT, path, body).await
    }

    /// Issues a `DELETE`; `200 OK` and `204 No Content` count as success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure and [`Error::Api`] for any
    /// other status.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let response = self.request(Method::DELETE, path).send().await?;
        let status = response.status();

        if status != StatusCode::OK && status != StatusCode::NO_CONTENT {
            let body = response.bytes().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }
        Ok(())
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Bytes> {
        let payload = serde_json::to_vec(body)?;
        let response = self
            .request(method, path)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        Ok(body)
    }

    /// Fetches the signed-in user's profile as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON.
    pub async fn get_me(&self) -> Result<serde_json::Value> {
        self.get_json("/me").await
    }

    /// Fetches the signed-in user's mailbox settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn mailbox_settings(&self) -> Result<MailboxSettings> {
        self.get_json("/me/mailboxSettings").await
    }
}

fn api_error(status: StatusCode, body: &[u8]) -> Error {
    Error::Api {
        status: status.as_u16(),
        body: String::from_utf8_lossy(body).into_owned(),
    }
}

/// Percent-encodes an identifier for use as a single path segment.
///
/// `@` is a legal path character and Graph expects it verbatim in UPNs.
pub(crate) fn segment(value: &str) -> Cow<'_, str> {
    let encoded = urlencoding::encode(value);
    if encoded.contains("%40") {
        Cow::Owned(encoded.replace("%40", "@"))
    } else {
        encoded
    }
}
