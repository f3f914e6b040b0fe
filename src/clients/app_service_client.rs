use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::db::store::{StoreError, UserDirectory};

/// Client for the user service that owns accounts and profiles
#[derive(Debug)]
pub struct AppServiceClient {
    client: Client,
    base_url: Url,
    jwt_secret: String,
    service_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "type")]
    type_: String,
    exp: usize,
}

#[derive(Debug, Deserialize)]
struct UserProfile {
    name: String,
}

impl AppServiceClient {
    pub fn new(base_url: String, jwt_secret: String, service_name: String) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        let base_url = Url::parse(&base_url)
            .map_err(|e| StoreError::Other(format!("Invalid user service URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Other(format!("User service URL '{}' cannot carry a path", base_url)));
        }

        info!("User service client configured for {}", base_url);
        Ok(Self {
            client,
            base_url,
            jwt_secret,
            service_name,
        })
    }

    fn generate_token(&self) -> Result<String, StoreError> {
        let expiration = Utc::now()
            .checked_add_signed(Duration::seconds(60)) // 1 minute expiration
            .ok_or_else(|| StoreError::Other("token expiry overflow".to_string()))?
            .timestamp();

        let claims = Claims {
            sub: self.service_name.clone(),
            type_: "service".to_string(),
            exp: expiration as usize,
        };

        encode(&Header::default(), &claims, &EncodingKey::from_secret(self.jwt_secret.as_bytes()))
            .map_err(|e| StoreError::Other(format!("Failed to sign service token: {}", e)))
    }

    /// `{base}/users/{uid}` with `uid` escaped as a single path segment
    fn user_url(&self, uid: &str) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("users").push(uid);
        }
        url
    }
}

#[async_trait]
impl UserDirectory for AppServiceClient {
    async fn display_name(&self, uid: &str) -> Result<Option<String>, StoreError> {
        let token = self.generate_token()?;
        let response = self
            .client
            .get(self.user_url(uid))
            .bearer_auth(token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("User {} unknown to the user service", uid);
            return Ok(None);
        }

        let profile: UserProfile = response.error_for_status()?.json().await?;
        Ok(Some(profile.name))
    }
}
