use std::time::Duration;

use log::debug;
use reqwest::{Client as HttpClient, StatusCode};

use super::http::error_message;
use super::ApiError;
use crate::models::user::UserProfile;

/// Client for the auth endpoints. Only profile lookup is needed here; login
/// itself happens elsewhere and this crate receives the resulting token.
pub struct AuthClient {
    http: HttpClient,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches the signed-in user's profile. The by-id route is used when the
    /// caller knows the stored user id, the bare route otherwise.
    pub async fn fetch_profile(
        &self,
        token: &str,
        user_id: Option<&str>,
    ) -> Result<UserProfile, ApiError> {
        let url = match user_id {
            Some(id) => format!("{}/api/auth/profile/{}", self.base_url, id),
            None => format!("{}/api/auth/profile", self.base_url),
        };
        debug!("GET {}", url);

        let resp = self.http.get(&url).bearer_auth(token).send().await?;
        match resp.status() {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            status if status.is_success() => {
                let body = resp.text().await?;
                Ok(serde_json::from_str(&body)?)
            }
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(ApiError::Status {
                    status: status.as_u16(),
                    message: error_message(&body),
                })
            }
        }
    }
}
