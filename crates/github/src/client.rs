//! Authenticated HTTP transport for the GitHub REST API.

use std::time::Duration;

use provisioning::GithubError;
use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Public GitHub API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version every request pins.
const API_VERSION: &str = "2022-11-28";
const GITHUB_JSON: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("gh-org-provision/", env!("CARGO_PKG_VERSION"));

/// HTTP connect timeout for GitHub API calls.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// HTTP total timeout for GitHub API calls.
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GitHub REST client authenticated with a personal access or app token.
///
/// Implements [`provisioning::OrganizationAdmin`] and
/// [`provisioning::PullRequestReader`].
#[derive(Debug)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
    token: SecretString,
}

impl GithubClient {
    /// Creates a client for the public GitHub API.
    pub fn new(token: SecretString) -> Result<Self, GithubError> {
        Self::with_api_url(token, DEFAULT_API_URL)
    }

    /// Creates a client for a GitHub Enterprise Server or a test double.
    ///
    /// `api_url` is the API root, e.g. `https://ghe.example.com/api/v3`.
    pub fn with_api_url(token: SecretString, api_url: impl Into<String>) -> Result<Self, GithubError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .build()
            .map_err(transport_error)?;
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            api_url,
            token,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Starts a request to `path` (which must begin with `/`) with the
    /// standard GitHub headers and bearer authentication.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.api_url, path))
            .header(header::ACCEPT, GITHUB_JSON)
            .header("X-GitHub-Api-Version", API_VERSION)
            .bearer_auth(self.token.expose_secret())
    }

    /// Sends `request`, turning any non-success status into a [`GithubError`].
    ///
    /// `resource` names what was addressed, for [`GithubError::NotFound`].
    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<Response, GithubError> {
        let response = request.send().await.map_err(transport_error)?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response, resource).await)
        }
    }

    /// Like [`GithubClient::send`] but maps 404 to `Ok(None)`.
    pub(crate) async fn send_optional(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<Option<Response>, GithubError> {
        let response = request.send().await.map_err(transport_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if response.status().is_success() {
            Ok(Some(response))
        } else {
            Err(error_from_response(response, resource).await)
        }
    }
}

/// Deserializes a JSON response body.
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GithubError> {
    response.json::<T>().await.map_err(|err| GithubError::Decode {
        message: err.to_string(),
    })
}

fn transport_error(err: reqwest::Error) -> GithubError {
    GithubError::Transport {
        message: err.to_string(),
    }
}

async fn error_from_response(response: Response, resource: &str) -> GithubError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("no reason given").to_string());

    match status {
        StatusCode::UNAUTHORIZED => GithubError::Unauthorized { message },
        StatusCode::FORBIDDEN => GithubError::Forbidden { message },
        StatusCode::NOT_FOUND => GithubError::NotFound {
            resource: resource.to_string(),
        },
        StatusCode::UNPROCESSABLE_ENTITY => GithubError::Unprocessable { message },
        other => GithubError::UnexpectedStatus {
            status: other.as_u16(),
            message,
        },
    }
}

/// Extracts `message` plus any `errors[]` details from a GitHub error body.
///
/// `errors` entries are either strings or objects with `message`/`code`.
fn error_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    let message = parsed.get("message")?.as_str()?.to_string();
    let details: Vec<String> = parsed
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|entry| match entry {
                    Value::String(text) => Some(text.clone()),
                    Value::Object(fields) => fields
                        .get("message")
                        .or_else(|| fields.get("code"))
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    if details.is_empty() {
        Some(message)
    } else {
        Some(format!("{message} ({})", details.join("; ")))
    }
}
