//! Authenticated HTTP plumbing for the Jira REST API
//!
//! This is the single boundary where raw failures become classified
//! [`JiraError`]s: transport errors, non-2xx statuses, and response-shape
//! mismatches are all converted here and travel unchanged from this point on.

use jiratool_core::error::{classify_status, JiraError};

/// Jira configuration from environment variables
#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
}

impl JiraConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, JiraError> {
        Ok(Self {
            base_url: require_env("JIRA_BASE_URL")?,
            email: require_env("JIRA_EMAIL")?,
            api_token: require_env("JIRA_API_TOKEN")?,
        })
    }

    /// Base URL without a trailing slash
    pub fn api_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn require_env(name: &str) -> Result<String, JiraError> {
    std::env::var(name)
        .map_err(|_| JiraError::AuthMissing(format!("{name} environment variable not set")))
}

/// Create an authenticated HTTP client with Basic Auth headers
pub fn create_jira_client(config: &JiraConfig) -> Result<reqwest::Client, JiraError> {
    use base64::Engine;
    use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

    let auth_string = format!("{}:{}", config.email, config.api_token);
    let auth_encoded = base64::engine::general_purpose::STANDARD.encode(&auth_string);

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Basic {auth_encoded}"))
            .map_err(|e| JiraError::unexpected(format!("invalid header value: {e}")))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| JiraError::unexpected(format!("failed to build HTTP client: {e}")))
}

/// GET a JSON document from the API
pub async fn api_get(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<serde_json::Value, JiraError> {
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(JiraError::unexpected)?;

    read_json(response).await
}

/// POST a JSON payload to the API
pub async fn api_post(
    client: &reqwest::Client,
    url: &str,
    payload: &serde_json::Value,
) -> Result<serde_json::Value, JiraError> {
    let response = client
        .post(url)
        .json(payload)
        .send()
        .await
        .map_err(JiraError::unexpected)?;

    read_json(response).await
}

async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, JiraError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(classify_status(
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            &body,
        ));
    }

    response
        .json::<serde_json::Value>()
        .await
        .map_err(JiraError::unexpected)
}

/// Deserialize a response value into a typed model
///
/// `context` names the entity being parsed so shape mismatches surface as
/// "Invalid issue search response: ..." instead of a bare serde error.
pub fn parse_value<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    context: &str,
) -> Result<T, JiraError> {
    serde_json::from_value(value).map_err(|e| JiraError::validation(context, e))
}
