use crate::config::Config;
use crate::error::{Result, VerifyError};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Status and body of one backend response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json_body(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Both 401 and 403 mean the session is gone.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.status == 403
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| VerifyError::Decode(format!("Invalid JSON: {}", e)))
    }
}

/// Authenticated access to the document API. `Err` means the request never
/// produced a response (connect, timeout); HTTP errors come back as `Ok`.
pub trait Transport {
    fn get(&self, path: &str) -> Result<HttpResponse>;

    fn put_json(&self, path: &str, body: &Value) -> Result<HttpResponse>;

    /// Called once when the backend rejects the session.
    fn sign_out(&self) {}
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, path: &str) -> Result<HttpResponse> {
        (**self).get(path)
    }

    fn put_json(&self, path: &str, body: &Value) -> Result<HttpResponse> {
        (**self).put_json(path, body)
    }

    fn sign_out(&self) {
        (**self).sign_out()
    }
}

pub fn document_path(document_id: &str) -> String {
    format!("/api/document/{}", document_id)
}

type SignOutHook = Box<dyn Fn() + Send + Sync>;

/// `reqwest` transport with optional bearer token.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: Option<String>,
    on_sign_out: Option<SignOutHook>,
}

impl HttpTransport {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VerifyError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            on_sign_out: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.base_url,
            config.token.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    pub fn with_sign_out(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_sign_out = Some(Box::new(hook));
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn finish(response: reqwest::blocking::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| VerifyError::Transient(format!("Could not read response body: {}", e)))?;
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

fn network_error(e: reqwest::Error) -> VerifyError {
    VerifyError::Transient(
        if e.is_connect() || e.is_timeout() {
            "Check your internet connection and try again."
        } else {
            "Network error."
        }
        .to_string(),
    )
}

impl Transport for HttpTransport {
    fn get(&self, path: &str) -> Result<HttpResponse> {
        let url = self.url(path);
        log::debug!("GET {}", url);
        let response = self
            .authorize(self.client.get(&url))
            .header("Accept", "application/json")
            .send()
            .map_err(network_error)?;
        Self::finish(response)
    }

    fn put_json(&self, path: &str, body: &Value) -> Result<HttpResponse> {
        let url = self.url(path);
        log::debug!("PUT {}", url);
        let response = self
            .authorize(self.client.put(&url))
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .map_err(network_error)?;
        Self::finish(response)
    }

    fn sign_out(&self) {
        log::info!("Session rejected by backend; signing out");
        if let Some(hook) = &self.on_sign_out {
            hook();
        }
    }
}
