//! Judge0 HTTP client

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{JudgeClient, JudgeClientError, JudgeResult};

/// Connection settings for a Judge0 instance
#[derive(Debug, Clone)]
pub struct Judge0Config {
    pub base_url: String,
    /// Sent as `X-Auth-Token` when set
    pub auth_token: Option<String>,
    /// Exchange source, stdin and outputs base64 encoded
    pub base64_encoded: bool,
    pub request_timeout: Duration,
}

impl Default for Judge0Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:2358".into(),
            auth_token: None,
            base64_encoded: false,
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateSubmission {
    source_code: String,
    language_id: u32,
    stdin: String,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    id: i32,
    description: String,
}

/// Judge0 reports `time` as a decimal string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Seconds {
    Number(f64),
    Text(String),
}

impl Seconds {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Seconds::Number(n) => Some(*n),
            Seconds::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SubmissionResponse {
    status: Option<StatusBody>,
    stdout: Option<String>,
    stderr: Option<String>,
    compile_output: Option<String>,
    time: Option<Seconds>,
    memory: Option<u64>,
}

/// Language entry from `GET /languages`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub id: u32,
    pub name: String,
}

/// Stateless client for the Judge0 REST API
#[derive(Debug, Clone)]
pub struct Judge0Client {
    client: Client,
    base_url: String,
    base64_encoded: bool,
}

impl Judge0Client {
    pub fn new(config: Judge0Config) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(token) = &config.auth_token {
            let value = header::HeaderValue::from_str(token)
                .context("Invalid Judge0 auth token")?;
            headers.insert("X-Auth-Token", value);
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            base64_encoded: config.base64_encoded,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn encode(&self, text: &str) -> String {
        if self.base64_encoded {
            general_purpose::STANDARD.encode(text)
        } else {
            text.to_string()
        }
    }

    /// Decode a text field; Judge0 wraps long base64 payloads with newlines
    fn decode(&self, text: Option<String>) -> Result<Option<String>, JudgeClientError> {
        match text {
            Some(text) if self.base64_encoded => {
                let compact: String = text.split_whitespace().collect();
                let bytes = general_purpose::STANDARD.decode(compact).map_err(|e| {
                    JudgeClientError::ResultUnavailable(format!("invalid base64 field: {}", e))
                })?;
                Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
            }
            other => Ok(other),
        }
    }

    /// List the languages the backend accepts
    pub async fn supported_languages(&self) -> Result<Vec<LanguageInfo>, JudgeClientError> {
        let response = self.client.get(self.url("languages")).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(JudgeClientError::ResultUnavailable(format!(
                "languages request failed with HTTP {}",
                status
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            JudgeClientError::ResultUnavailable(format!("malformed languages list: {}", e))
        })
    }
}

#[async_trait]
impl JudgeClient for Judge0Client {
    async fn dispatch(
        &self,
        program: &str,
        language_id: u32,
        stdin: &str,
    ) -> Result<String, JudgeClientError> {
        let request = CreateSubmission {
            source_code: self.encode(program),
            language_id,
            stdin: self.encode(stdin),
        };

        let response = self
            .client
            .post(self.url("submissions"))
            .query(&[("base64_encoded", self.base64_encoded)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::CREATED {
            return Err(JudgeClientError::SubmissionRejected(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let created: CreateResponse = serde_json::from_str(&body).map_err(|e| {
            JudgeClientError::SubmissionRejected(format!("malformed response: {}", e))
        })?;

        let token = created.token.ok_or_else(|| {
            JudgeClientError::SubmissionRejected("response carried no token".into())
        })?;

        debug!("Dispatched program to judge, token={}", token);
        Ok(token)
    }

    async fn fetch(&self, token: &str) -> Result<JudgeResult, JudgeClientError> {
        let response = self
            .client
            .get(self.url(&format!("submissions/{}", token)))
            .query(&[("base64_encoded", self.base64_encoded)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(JudgeClientError::ResultUnavailable(format!(
                "HTTP {} for token {}",
                status, token
            )));
        }

        let parsed: SubmissionResponse = serde_json::from_str(&body).map_err(|e| {
            JudgeClientError::ResultUnavailable(format!("malformed result: {}", e))
        })?;

        let run_status = parsed.status.ok_or_else(|| {
            JudgeClientError::ResultUnavailable(format!("result for {} has no status", token))
        })?;

        Ok(JudgeResult {
            status_id: run_status.id,
            status_description: run_status.description,
            stdout: self.decode(parsed.stdout)?,
            stderr: self.decode(parsed.stderr)?,
            compile_output: self.decode(parsed.compile_output)?,
            time: parsed.time.as_ref().and_then(Seconds::as_f64),
            memory: parsed.memory,
        })
    }
}
