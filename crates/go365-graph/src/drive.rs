//! OneDrive and SharePoint document libraries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::client::{GraphClient, segment};
use crate::error::Result;
use crate::pagination::{ListRequest, ListResponse, PageToken};

/// A drive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drive {
    /// Drive identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Drive name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `personal`, `business` or `documentLibrary`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_type: Option<String>,
    /// Owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Identity>,
    /// Storage quota.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<DriveQuota>,
    /// Link to the drive in a browser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
}

/// Storage quota in bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveQuota {
    /// Total space.
    #[serde(default)]
    pub total: i64,
    /// Used space.
    #[serde(default)]
    pub used: i64,
    /// Remaining space.
    #[serde(default)]
    pub remaining: i64,
    /// `normal`, `nearing`, `critical` or `exceeded`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Who owns or created something.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User identity, when the owner is a user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<IdentityUser>,
}

/// A user identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityUser {
    /// User id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A file or folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    /// Item identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// File or folder name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Size in bytes (recursive for folders).
    #[serde(default)]
    pub size: i64,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<DateTime<Utc>>,
    /// Last modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date_time: Option<DateTime<Utc>>,
    /// Link to the item in a browser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    /// Present on folders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<FolderFacet>,
    /// Present on files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileFacet>,
    /// Parent folder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_reference: Option<ItemReference>,
    /// Short-lived pre-authenticated download link.
    #[serde(
        default,
        rename = "@microsoft.graph.downloadUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub download_url: Option<String>,
}

impl DriveItem {
    /// Whether this item is a folder.
    #[must_use]
    pub const fn is_folder(&self) -> bool {
        self.folder.is_some()
    }
}

/// Folder facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderFacet {
    /// Number of direct children.
    #[serde(default)]
    pub child_count: i32,
}

/// File facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFacet {
    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Content hashes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashes: Option<Hashes>,
}

/// Content hashes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hashes {
    /// SHA-1, hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1_hash: Option<String>,
    /// OneDrive for Business quickXorHash, base64.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_xor_hash: Option<String>,
}

/// Reference to a parent item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReference {
    /// Drive holding the parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_id: Option<String>,
    /// Type of that drive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_type: Option<String>,
    /// Parent id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Parent path, e.g. `/drive/root:/Documents`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Which drive to address. The first set field wins, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriveLocation {
    /// Drive id.
    pub drive_id: Option<String>,
    /// Another user's OneDrive.
    pub user_id: Option<String>,
    /// A SharePoint site's default library.
    pub site_id: Option<String>,
}

impl DriveLocation {
    /// Graph path of the drive, `/me/drive` when nothing is set.
    #[must_use]
    pub fn path(&self) -> String {
        if let Some(drive) = non_empty_segment(self.drive_id.as_deref()) {
            format!("/drives/{drive}")
        } else if let Some(user) = non_empty_segment(self.user_id.as_deref()) {
            format!("/users/{user}/drive")
        } else if let Some(site) = non_empty_segment(self.site_id.as_deref()) {
            format!("/sites/{site}/drive")
        } else {
            "/me/drive".to_string()
        }
    }
}

/// Options for [`GraphClient::list_items`].
#[derive(Debug, Clone, Default)]
pub struct ListItemsOptions {
    /// Drive to list.
    pub location: DriveLocation,
    /// Folder path relative to the root; the root when empty.
    pub path: Option<String>,
    /// List items shared with the signed-in user instead.
    pub shared: bool,
    /// Page size.
    pub top: u32,
    /// Token from a previous page.
    pub page_token: Option<PageToken>,
    /// OData ordering, e.g. `name` or `lastModifiedDateTime desc`.
    pub order_by: Option<String>,
}

impl ListItemsOptions {
    /// Renders the request.
    #[must_use]
    pub fn to_request(&self) -> ListRequest {
        let path = if self.shared {
            "/me/drive/sharedWithMe".to_string()
        } else {
            let root = self.location.path();
            match folder_path(self.path.as_deref()) {
                Some(folder) => format!("{root}/root:/{folder}:/children"),
                None => format!("{root}/root/children"),
            }
        };

        let mut request = ListRequest::new(path)
            .with_limit(self.top)
            .with_page_token(self.page_token.clone());
        if let Some(order_by) = &self.order_by {
            request = request.with_order_by(order_by.as_str());
        }
        request
    }
}

fn non_empty_segment(value: Option<&str>) -> Option<Cow<'_, str>> {
    value.filter(|v| !v.is_empty()).map(segment)
}

/// Trims slashes and percent-encodes each segment; `None` for the root.
fn folder_path(path: Option<&str>) -> Option<String> {
    let trimmed = path?.trim_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    Some(
        trimmed
            .split('/')
            .filter(|s| !s.is_empty())
            .map(segment)
            .collect::<Vec<_>>()
            .join("/"),
    )
}

impl GraphClient {
    /// Fetches drive metadata and quota.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload cannot be decoded.
    pub async fn get_drive(&self, location: &DriveLocation) -> Result<Drive> {
        self.get_json(&location.path()).await
    }

    /// Lists the children of a folder, or items shared with the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload cannot be decoded.
    pub async fn list_items(&self, options: &ListItemsOptions) -> Result<ListResponse<DriveItem>> {
        self.list(&options.to_request()).await
    }
}
