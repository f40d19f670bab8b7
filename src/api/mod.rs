/// The manoderecha module is for the [`manoderecha::Manoderecha`] task tracker client.
pub mod manoderecha;

/// The jira module is for the [`jira::Jira`] issue tracker client.
pub mod jira;

/// The jenkins module is for looking up the last good build of a CI job.
pub mod jenkins;

use core::fmt;

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{HeaderName, AUTHORIZATION};
use reqwest::StatusCode;
use serde_json::Value;

/// Errors raised while talking to a JSON API.
#[derive(Debug)]
pub enum ApiError {
    /// The API rejected the credentials
    Authentication,
    /// The response body wasn't the expected JSON
    InvalidJson(serde_json::Error),
    /// The request couldn't be sent or its response read
    Transport(reqwest::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return match self {
            ApiError::Authentication => write!(f, "Authentication error"),
            ApiError::InvalidJson(e) => write!(f, "Invalid JSON from API: {e}"),
            ApiError::Transport(e) => write!(f, "Couldn't reach API: {e}"),
        };
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        return match self {
            ApiError::Authentication => None,
            ApiError::InvalidJson(e) => Some(e),
            ApiError::Transport(e) => Some(e),
        };
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        return ApiError::Transport(e);
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        return ApiError::InvalidJson(e);
    }
}

/// A blocking client for a JSON API below a base url.
///
/// Every call is a single `GET`: a `401` is an [`ApiError::Authentication`],
/// a `404` is no data and anything else must carry a JSON body.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: String,
    credentials: Option<(String, String)>,
    auth_copy: Option<HeaderName>,
}

// Keeps the password out of logs
impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_struct("ApiClient")
            .field("base", &self.base)
            .field("user", &self.credentials.as_ref().map(|(user, _)| user))
            .field("auth_copy", &self.auth_copy)
            .finish();
    }
}

impl ApiClient {
    /// Creates an unauthenticated client.
    /// ```
    /// # use release_email::api::ApiClient;
    /// let client = ApiClient::new("http://example.com/api/");
    /// assert_eq!(client.url("tasks/1"), "http://example.com/api/tasks/1");
    /// ```
    pub fn new(base: &str) -> Self {
        return Self {
            client: Client::new(),
            base: base.to_owned(),
            credentials: None,
            auth_copy: None,
        };
    }

    /// Authenticates every request with HTTP basic auth.
    pub fn with_basic_auth(mut self, user: &str, password: &str) -> Self {
        self.credentials = Some((user.to_owned(), password.to_owned()));
        return self;
    }

    /// Also sends the basic auth credentials under another header.
    pub fn with_auth_copy(mut self, header: HeaderName) -> Self {
        self.auth_copy = Some(header);
        return self;
    }

    /// Gets the full url of an API path.
    pub fn url(&self, path: &str) -> String {
        return format!("{}{}", self.base, path);
    }

    /// Calls the API and returns the decoded JSON.
    /// `Ok(None)` means the resource doesn't exist.
    pub fn call(&self, path: &str) -> Result<Option<Value>, ApiError> {
        let url = self.url(path);
        debug!("GET {url}");

        let mut builder = self.client.get(&url);
        if let Some((user, password)) = &self.credentials {
            builder = builder.basic_auth(user, Some(password));
        }
        let mut request = builder.build()?;

        if let Some(header) = &self.auth_copy {
            if let Some(value) = request.headers().get(AUTHORIZATION).cloned() {
                request.headers_mut().insert(header.clone(), value);
            }
        }

        let response = self.client.execute(request)?;
        let status = response.status();
        debug!("GET {url} -> {status}");

        return match status {
            StatusCode::UNAUTHORIZED => Err(ApiError::Authentication),
            StatusCode::NOT_FOUND => Ok(None),
            _ => {
                let body = response.bytes()?;
                Ok(Some(serde_json::from_slice(&body)?))
            },
        };
    }
}

/// Normalizes a base url so paths can be appended to it.
/// ```
/// # use release_email::api::base_url;
/// assert_eq!(base_url("http://ci.example.com"), "http://ci.example.com/");
/// assert_eq!(base_url("http://ci.example.com/"), "http://ci.example.com/");
/// ```
pub fn base_url(url: &str) -> String {
    return format!("{}/", url.trim_end_matches('/'));
}
