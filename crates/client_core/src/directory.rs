//! Access to the remote user directory.

use async_trait::async_trait;
use reqwest::{header::HeaderMap, header::HeaderValue, Client, Response};
use shared::{
    domain::{UserFields, UserId},
    error::ServiceErrorBody,
    protocol::{UpdateUserRequest, UserPage},
};
use tracing::debug;
use url::Url;

use crate::{
    config::DirectorySettings,
    error::{ClientSetupError, DirectoryAction, DirectoryError},
};

const API_KEY_HEADER: &str = "x-api-key";

/// CRUD surface of the remote directory.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    async fn list_users(&self, page: u32) -> Result<UserPage, DirectoryError>;
    async fn update_user(&self, id: UserId, fields: &UserFields) -> Result<(), DirectoryError>;
    async fn delete_user(&self, id: UserId) -> Result<(), DirectoryError>;
}

pub struct MissingDirectoryService;

#[async_trait]
impl DirectoryService for MissingDirectoryService {
    async fn list_users(&self, _page: u32) -> Result<UserPage, DirectoryError> {
        Err(DirectoryError::new(
            DirectoryAction::LoadUsers,
            "directory service is unavailable",
        ))
    }

    async fn update_user(&self, _id: UserId, _fields: &UserFields) -> Result<(), DirectoryError> {
        Err(DirectoryError::new(
            DirectoryAction::UpdateUser,
            "directory service is unavailable",
        ))
    }

    async fn delete_user(&self, _id: UserId) -> Result<(), DirectoryError> {
        Err(DirectoryError::new(
            DirectoryAction::DeleteUser,
            "directory service is unavailable",
        ))
    }
}

/// `DirectoryService` over the REST endpoints `GET /users?page=`,
/// `PUT /users/{id}` and `DELETE /users/{id}`.
#[derive(Clone)]
pub struct HttpDirectoryService {
    http: Client,
    base_url: Url,
}

impl HttpDirectoryService {
    pub fn new(settings: &DirectorySettings) -> Result<Self, ClientSetupError> {
        let base_url = parse_base_url(&settings.base_url)?;

        let mut headers = HeaderMap::new();
        if let Some(api_key) = &settings.api_key {
            let value = HeaderValue::from_str(api_key)
                .map_err(|err| ClientSetupError::InvalidApiKey(err.to_string()))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientSetupError> {
    let url = Url::parse(raw.trim()).map_err(|err| ClientSetupError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientSetupError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "url cannot carry a path".to_string(),
        });
    }
    Ok(url)
}

async fn ensure_success(
    action: DirectoryAction,
    response: Response,
) -> Result<Response, DirectoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = match ServiceErrorBody::parse(&body) {
        Some(service_error) => format!("{status}: {}", service_error.error),
        None => status.to_string(),
    };
    Err(DirectoryError::new(action, detail))
}

fn transport_error(action: DirectoryAction) -> impl FnOnce(reqwest::Error) -> DirectoryError {
    move |err| DirectoryError::new(action, err.to_string())
}

#[async_trait]
impl DirectoryService for HttpDirectoryService {
    async fn list_users(&self, page: u32) -> Result<UserPage, DirectoryError> {
        let action = DirectoryAction::LoadUsers;
        let url = self.endpoint(&["users"]);
        debug!(%url, page, "listing users");

        let response = self
            .http
            .get(url)
            .query(&[("page", page)])
            .send()
            .await
            .map_err(transport_error(action))?;
        let response = ensure_success(action, response).await?;
        response
            .json::<UserPage>()
            .await
            .map_err(|err| DirectoryError::new(action, format!("invalid user page payload: {err}")))
    }

    async fn update_user(&self, id: UserId, fields: &UserFields) -> Result<(), DirectoryError> {
        let action = DirectoryAction::UpdateUser;
        let id_segment = id.to_string();
        let url = self.endpoint(&["users", &id_segment]);
        debug!(%url, user_id = id.0, "updating user");

        let response = self
            .http
            .put(url)
            .json(&UpdateUserRequest::from(fields.clone()))
            .send()
            .await
            .map_err(transport_error(action))?;
        ensure_success(action, response).await?;
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> Result<(), DirectoryError> {
        let action = DirectoryAction::DeleteUser;
        let id_segment = id.to_string();
        let url = self.endpoint(&["users", &id_segment]);
        debug!(%url, user_id = id.0, "deleting user");

        let response = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(transport_error(action))?;
        ensure_success(action, response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/directory_tests.rs"]
mod tests;
