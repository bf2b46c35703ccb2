#[derive(Debug)]
/// An error that can occur when interacting with the client.
pub enum ClientError {
    /// An error that occurred when making a request.
    ReqwestError(reqwest::Error),
    /// An error that occurred when deserializing a response.
    DeserializationError(serde_json::Error),
    /// The server answered with a non-success status.
    ApiError {
        /// The HTTP status code.
        status: u16,
        /// The response body, if one could be read.
        body: Option<String>,
    },
}
impl ClientError {
    /// The upstream status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::ReqwestError(e) => e.status().map(|s| s.as_u16()),
            ClientError::DeserializationError(_) => None,
            ClientError::ApiError { status, .. } => Some(*status),
        }
    }

    /// Whether the server rejected the access token.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::ReqwestError(e) => write!(f, "Reqwest error: {e}"),
            ClientError::DeserializationError(e) => write!(f, "Deserialization error: {e}"),
            ClientError::ApiError { status, body } => {
                write!(f, "API error: {status}")?;
                if let Some(body) = body.as_deref().filter(|b| !b.is_empty()) {
                    write!(f, ": {body}")?;
                }
                Ok(())
            }
        }
    }
}
impl std::error::Error for ClientError {}
impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::ReqwestError(e)
    }
}
impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::DeserializationError(e)
    }
}
/// A result type for the client.
pub type ClientResult<T> = Result<T, ClientError>;

/// A bearer token for the Web API.
///
/// Cannot be empty, so a request can never be sent without a credential.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);
impl AccessToken {
    /// Wrap a token, returning `None` if it is empty.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        (!token.is_empty()).then_some(Self(token))
    }

    /// The raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}
impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// A client for the Spotify Web API.
pub struct Client {
    pub(crate) api_base_url: String,
    pub(crate) relay_base_url: Option<String>,
    pub(crate) client: reqwest::Client,
}
impl Client {
    /// The default upstream API base.
    pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

    /// Create a new client talking to `api_base_url`.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: trim_base(api_base_url.into()),
            relay_base_url: None,
            client: reqwest::Client::new(),
        }
    }

    /// Route playlist lookups through a relay instead of the upstream API.
    pub fn with_relay(mut self, relay_base_url: impl Into<String>) -> Self {
        self.relay_base_url = Some(trim_base(relay_base_url.into()));
        self
    }
}
impl Default for Client {
    fn default() -> Self {
        Self::new(Self::DEFAULT_API_BASE_URL)
    }
}

fn trim_base(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tokens_are_rejected() {
        assert!(AccessToken::new("").is_none());
        let token = AccessToken::new("abc").unwrap();
        assert_eq!(token.as_str(), "abc");
        assert_eq!(token.bearer(), "Bearer abc");
        assert_eq!(format!("{token:?}"), "AccessToken(<redacted>)");
    }

    #[test]
    fn base_urls_lose_trailing_slashes() {
        let client = Client::new("http://localhost:1234/v1/").with_relay("http://relay//");
        assert_eq!(client.api_base_url, "http://localhost:1234/v1");
        assert_eq!(client.relay_base_url.as_deref(), Some("http://relay"));
    }

    #[test]
    fn api_errors_report_status() {
        let err = ClientError::ApiError {
            status: 401,
            body: Some("expired".to_string()),
        };
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "API error: 401: expired");

        let err = ClientError::ApiError {
            status: 404,
            body: None,
        };
        assert!(!err.is_unauthorized());
        assert_eq!(err.to_string(), "API error: 404");
    }
}
