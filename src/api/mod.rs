//! REST API client module.
//!
//! `RequestClient` is the single place where identity headers are attached and failed
//! responses are logged. Everything else talks to the backend through it.

mod auth;
mod resource;

pub use auth::*;
pub use resource::*;

use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};

use crate::auth::{SessionContext, USERNAME_HEADER};
use crate::config::Config;
use crate::errors::{self, ClientError};

/// Which credentials a request was sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Identity {
    Session,
    Anonymous,
}

/// HTTP client bound to one backend and one session context.
#[derive(Clone)]
pub struct RequestClient {
    http: Client,
    base_url: String,
    session: SessionContext,
}

impl RequestClient {
    pub fn new(base_url: impl Into<String>, session: SessionContext) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    /// Build a client with the configured base URL and timeout.
    pub fn from_config(config: &Config, session: SessionContext) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            session,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON body, with optional query parameters.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let request = self.authorized(Method::GET, path).await?.query(query);
        let response = self.execute(Method::GET, path, request, Identity::Session).await?;
        Ok(response.json().await?)
    }

    /// POST a JSON body and decode the JSON answer.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.authorized(Method::POST, path).await?.json(body);
        let response = self.execute(Method::POST, path, request, Identity::Session).await?;
        Ok(response.json().await?)
    }

    /// PUT a JSON body and decode the JSON answer.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.authorized(Method::PUT, path).await?.json(body);
        let response = self.execute(Method::PUT, path, request, Identity::Session).await?;
        Ok(response.json().await?)
    }

    /// DELETE a resource; the response body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let request = self.authorized(Method::DELETE, path).await?;
        self.execute(Method::DELETE, path, request, Identity::Session).await?;
        Ok(())
    }

    /// POST without identity headers, for the login endpoints.
    ///
    /// A 401 here is a rejected password or OTP and leaves the session alone.
    pub async fn post_anonymous<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.post(self.url(path)).json(body);
        let response = self
            .execute(Method::POST, path, request, Identity::Anonymous)
            .await?;
        Ok(response.json().await?)
    }

    /// Start a request carrying the session's identity headers.
    ///
    /// Fails with `MissingAuth` before anything is sent when there is no session.
    async fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let session = self.session.require().await.inspect_err(|_| {
            tracing::warn!("No session for {} {}, login required", method, path);
        })?;

        Ok(self
            .http
            .request(method, self.url(path))
            .header(header::AUTHORIZATION, session.bearer())
            .header(USERNAME_HEADER, session.username))
    }

    /// Send a request and turn non-success statuses into errors.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
        identity: Identity,
    ) -> Result<Response, ClientError> {
        let response = request.send().await.inspect_err(|e| {
            tracing::error!("API Error: {} {} failed to send: {}", method, path, e);
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!("{} {} -> {}", method, path, status);
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!(
            "API Error: {} {} -> status {}, body: {}",
            method,
            path,
            status.as_u16(),
            body
        );

        let err = errors::from_status(status.as_u16(), &body);
        match (identity, err) {
            (Identity::Session, err @ ClientError::Unauthorized(_)) => {
                self.session.invalidate().await;
                Err(err)
            }
            (Identity::Anonymous, ClientError::Unauthorized(message)) => {
                Err(ClientError::InvalidCredentials(message))
            }
            (_, err) => Err(err),
        }
    }
}
