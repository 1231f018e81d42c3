//! HTTP client for the motor backend.
//!
//! Every request carries `Authorization: Bearer <token>` when a session
//! exists. Every 401 clears the session and notifies the unauthorized
//! handler, then still fails the call: the redirect is a side effect, the
//! caller handles the failure like any other.

use crate::client::error::ApiError;
use crate::client::protocol::*;
use crate::client::unauthorized::UnauthorizedHandler;
use crate::session::SessionStore;
use anyhow::{Context, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

/// Environment variable holding the backend base URL.
pub const API_URL_ENV: &str = "MOTORCTL_API_URL";

/// Backend base URL when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Client for the motor backend.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionStore,
    on_unauthorized: Arc<dyn UnauthorizedHandler>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        session: SessionStore,
        on_unauthorized: Arc<dyn UnauthorizedHandler>,
    ) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid backend URL: {}", base_url))?;
        // Endpoints are joined relative to the base path
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url,
            session,
            on_unauthorized,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// `POST /login` with form credentials; persists the token on success.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint("/login")?;
        let request = self
            .http
            .post(url.clone())
            .form(&[("username", username), ("password", password)]);
        let response: LoginResponse = self.decode(url, self.execute(request).await?).await?;

        if !response.access_token.is_empty() {
            self.session
                .set_token(&response.access_token)
                .map_err(|e| ApiError::Session(format!("{:#}", e)))?;
            tracing::info!("logged in as {}", username);
        }
        Ok(response)
    }

    /// Clear the session. No network call.
    pub fn logout(&self) -> Result<()> {
        self.session.clear()
    }

    /// `GET /api/status`.
    pub async fn general_status(&self) -> Result<GeneralStatus, ApiError> {
        self.get_json("/api/status").await
    }

    /// `GET /{motor}/status`.
    pub async fn motor_status(&self, motor: Motor) -> Result<MotorStatus, ApiError> {
        self.get_json(motor.status_path()).await
    }

    /// Stop a motor.
    pub async fn stop(&self, motor: Motor) -> Result<ApiResponse, ApiError> {
        tracing::info!("stopping {} motor", motor);
        self.get_json(motor.stop_path()).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.execute(self.http.get(url.clone())).await?;
        self.decode(url, response).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Attach the bearer token when a session exists.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = self
            .authorize(request)
            .build()
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        let url = request.url().to_string();

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(&url);
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(&self, url: Url, response: Response) -> Result<T, ApiError> {
        response.json().await.map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }

    fn handle_unauthorized(&self, url: &str) {
        tracing::warn!("{} answered 401; clearing session", url);
        if let Err(e) = self.session.clear() {
            tracing::error!("Failed to clear session after 401: {:#}", e);
        }
        self.on_unauthorized.on_unauthorized();
    }
}
