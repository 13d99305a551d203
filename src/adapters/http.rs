use crate::core::{DispatchReport, Dispatcher, RequestMethod};
use crate::utils::error::{PushError, Result};
use async_trait::async_trait;
use digest_auth::{AuthContext, HttpMethod};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    #[default]
    Digest,
    Basic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub pass: String,
    pub scheme: AuthScheme,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    pub endpoint: String,
    pub method: RequestMethod,
    pub auth: Option<Credentials>,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

fn to_reqwest_method(method: RequestMethod) -> Method {
    match method {
        RequestMethod::Post => Method::POST,
        RequestMethod::Put => Method::PUT,
        RequestMethod::Patch => Method::PATCH,
        RequestMethod::Delete => Method::DELETE,
    }
}

/// Builds the `Authorization` value answering a Digest `WWW-Authenticate` challenge.
pub fn digest_authorization(
    challenge: &str,
    credentials: &Credentials,
    method: RequestMethod,
    uri: &str,
    body: &[u8],
) -> Result<String> {
    let mut prompt = digest_auth::parse(challenge).map_err(|e| PushError::DigestAuthError {
        message: e.to_string(),
    })?;

    let context = AuthContext::new_with_method(
        credentials.user.as_str(),
        credentials.pass.as_str(),
        uri,
        Some(body),
        HttpMethod::from(method.as_str()),
    );

    let answer = prompt
        .respond(&context)
        .map_err(|e| PushError::DigestAuthError {
            message: e.to_string(),
        })?;

    Ok(answer.to_header_string())
}

pub struct HttpDispatcher {
    settings: ApiSettings,
    request_uri: String,
    client: Client,
}

impl HttpDispatcher {
    pub fn new(settings: ApiSettings) -> Result<Self> {
        let url = Url::parse(&settings.endpoint).map_err(|e| PushError::InvalidConfigValueError {
            field: "api.endpoint".to_string(),
            value: settings.endpoint.clone(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        let mut request_uri = url.path().to_string();
        if let Some(query) = url.query() {
            request_uri.push('?');
            request_uri.push_str(query);
        }

        Ok(Self {
            settings,
            request_uri,
            client: Client::new(),
        })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    fn build_request(&self, body: &[u8]) -> RequestBuilder {
        let mut request = self
            .client
            .request(to_reqwest_method(self.settings.method), &self.settings.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/plain")
            .body(body.to_vec());

        for (name, value) in &self.settings.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        if let Some(timeout) = self.settings.timeout {
            request = request.timeout(timeout);
        }

        if let Some(credentials) = &self.settings.auth {
            if credentials.scheme == AuthScheme::Basic {
                request = request.basic_auth(&credentials.user, Some(&credentials.pass));
            }
        }

        request
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(&self, payload: &Value) -> Result<DispatchReport> {
        let body = serde_json::to_vec(payload)?;
        let started = Instant::now();

        tracing::debug!(
            "{} {} with {} bytes",
            self.settings.method,
            self.settings.endpoint,
            body.len()
        );
        let mut response = self.build_request(&body).send().await?;

        // Digest needs the server's challenge first, so the first attempt goes out bare.
        if let Some(credentials) = &self.settings.auth {
            if credentials.scheme == AuthScheme::Digest
                && response.status() == StatusCode::UNAUTHORIZED
            {
                let challenge = response
                    .headers()
                    .get(WWW_AUTHENTICATE)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);

                if let Some(challenge) = challenge {
                    tracing::debug!("Answering digest challenge for {}", credentials.user);
                    let authorization = digest_authorization(
                        &challenge,
                        credentials,
                        self.settings.method,
                        &self.request_uri,
                        &body,
                    )?;
                    response = self
                        .build_request(&body)
                        .header(AUTHORIZATION, authorization)
                        .send()
                        .await?;
                }
            }
        }

        let elapsed = started.elapsed();
        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                "{} {} failed with status {}",
                self.settings.method,
                self.settings.endpoint,
                status
            );
            return Err(PushError::HttpStatusError {
                status: status.as_u16(),
                endpoint: self.settings.endpoint.clone(),
            });
        }

        Ok(DispatchReport {
            status: status.as_u16(),
            bytes: body.len(),
            elapsed,
        })
    }
}
