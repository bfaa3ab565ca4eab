use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_iam::{error::DisplayErrorContext, Client as IamClient};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::pagination::{collect_pages, find_in_pages, Page};

/// Tag key holding the address that warnings are sent to.
pub const EMAIL_TAG_KEY: &str = "email";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessKey {
    pub access_key_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// The slice of the IAM API the key audit needs.
///
/// Each list call returns a single page; callers follow markers through
/// [`crate::pagination`].
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn list_users(&self, marker: Option<String>) -> Result<Page<Principal>>;

    async fn list_user_tags(&self, user_name: &str, marker: Option<String>) -> Result<Page<Tag>>;

    async fn list_access_keys(
        &self,
        user_name: &str,
        marker: Option<String>,
    ) -> Result<Page<AccessKey>>;

    async fn delete_access_key(&self, user_name: &str, access_key_id: &str) -> Result<()>;
}

pub async fn list_all_users(directory: &dyn IdentityDirectory) -> Result<Vec<Principal>> {
    collect_pages(|marker| directory.list_users(marker)).await
}

pub async fn list_all_access_keys(
    directory: &dyn IdentityDirectory,
    user_name: &str,
) -> Result<Vec<AccessKey>> {
    collect_pages(|marker| directory.list_access_keys(user_name, marker)).await
}

/// Value of the user's `email` tag, or `None` when the tag is missing or empty.
pub async fn find_email_tag(
    directory: &dyn IdentityDirectory,
    user_name: &str,
) -> Result<Option<String>> {
    let tag = find_in_pages(
        |marker| directory.list_user_tags(user_name, marker),
        |tag: &Tag| tag.key == EMAIL_TAG_KEY,
    )
    .await?;
    Ok(tag.map(|tag| tag.value).filter(|value| !value.is_empty()))
}

/// [`IdentityDirectory`] backed by the AWS IAM API.
#[derive(Debug, Clone)]
pub struct IamDirectory {
    client: IamClient,
}

impl IamDirectory {
    pub fn new(config: &SdkConfig) -> Self {
        Self { client: IamClient::new(config) }
    }

    pub fn from_client(client: IamClient) -> Self {
        Self { client }
    }
}

fn non_empty_marker(marker: Option<&str>) -> Option<String> {
    marker.filter(|m| !m.is_empty()).map(str::to_string)
}

#[async_trait]
impl IdentityDirectory for IamDirectory {
    async fn list_users(&self, marker: Option<String>) -> Result<Page<Principal>> {
        let resp = self
            .client
            .list_users()
            .set_marker(marker)
            .send()
            .await
            .map_err(|err| anyhow!("iam:ListUsers failed: {}", DisplayErrorContext(&err)))?;

        let users = resp
            .users()
            .iter()
            .map(|user| Principal { user_name: user.user_name().to_string() })
            .collect::<Vec<_>>();
        debug!("iam:ListUsers returned {} users", users.len());
        Ok(Page::new(users, non_empty_marker(resp.marker())))
    }

    async fn list_user_tags(&self, user_name: &str, marker: Option<String>) -> Result<Page<Tag>> {
        let resp = self
            .client
            .list_user_tags()
            .user_name(user_name)
            .set_marker(marker)
            .send()
            .await
            .map_err(|err| {
                anyhow!("iam:ListUserTags failed for user {user_name}: {}", DisplayErrorContext(&err))
            })?;

        let tags = resp
            .tags()
            .iter()
            .map(|tag| Tag { key: tag.key().to_string(), value: tag.value().to_string() })
            .collect();
        Ok(Page::new(tags, non_empty_marker(resp.marker())))
    }

    async fn list_access_keys(
        &self,
        user_name: &str,
        marker: Option<String>,
    ) -> Result<Page<AccessKey>> {
        let resp = self
            .client
            .list_access_keys()
            .user_name(user_name)
            .set_marker(marker)
            .send()
            .await
            .map_err(|err| {
                anyhow!(
                    "iam:ListAccessKeys failed for user {user_name}: {}",
                    DisplayErrorContext(&err)
                )
            })?;

        let mut keys = Vec::new();
        for meta in resp.access_key_metadata() {
            let Some(access_key_id) = meta.access_key_id() else {
                warn!("Skipping access key without an id for user {user_name}");
                continue;
            };
            let Some(created_at) = meta
                .create_date()
                .and_then(|date| DateTime::<Utc>::from_timestamp(date.secs(), date.subsec_nanos()))
            else {
                warn!("Skipping access key {access_key_id} for user {user_name}: no usable CreateDate");
                continue;
            };
            keys.push(AccessKey {
                access_key_id: access_key_id.to_string(),
                created_at,
                status: meta.status().map(|s| s.as_str().to_string()),
            });
        }
        Ok(Page::new(keys, non_empty_marker(resp.marker())))
    }

    async fn delete_access_key(&self, user_name: &str, access_key_id: &str) -> Result<()> {
        self.client
            .delete_access_key()
            .user_name(user_name)
            .access_key_id(access_key_id)
            .send()
            .await
            .map_err(|err| {
                anyhow!(
                    "iam:DeleteAccessKey failed for {access_key_id} (user {user_name}): {}",
                    DisplayErrorContext(&err)
                )
            })?;
        Ok(())
    }
}
