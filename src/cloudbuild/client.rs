use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response, multipart};
use reqwest::header::AUTHORIZATION;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://build-api.cloud.unity3d.com/api/v1";

/// Non-success response from the Cloud Build API
#[derive(Debug, Error)]
#[error("{method} {path} failed with status {status}: {body}")]
pub struct ApiError {
    pub method: String,
    pub path: String,
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Post,
    Put,
}

impl FormMethod {
    fn as_str(&self) -> &'static str {
        match self {
            FormMethod::Post => "POST",
            FormMethod::Put => "PUT",
        }
    }
}

/// Multipart form payload: text fields plus file attachments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<(String, PathBuf)>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    pub fn file(mut self, name: &str, path: &str) -> Self {
        self.files.push((name.to_string(), PathBuf::from(path)));
        self
    }
}

/// HTTP client trait for testing
pub trait HttpClient: Send + Sync {
    /// GET a path relative to the API root, returning the response body
    fn get(&self, path: &str) -> Result<String>;

    /// DELETE a path, returning the response status line
    fn delete(&self, path: &str) -> Result<String>;

    /// Send a multipart form, returning the response body
    fn send_form(&self, method: FormMethod, path: &str, form: UploadForm) -> Result<String>;
}

/// Builds authenticated clients once the API key is known
pub trait ApiConnector: Send + Sync {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn HttpClient>>;
}

/// Real HTTP client using reqwest
pub struct ReqwestClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl ReqwestClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("ucb/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, method: &str, path: &str, request: RequestBuilder) -> Result<Response> {
        tracing::debug!(method, path, "cloud build request");

        let response = request
            .header(AUTHORIZATION, format!("Basic {}", self.api_key))
            .send()
            .with_context(|| format!("Failed to reach {}", self.url(path)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError {
                method: method.to_string(),
                path: path.to_string(),
                status: status.as_u16(),
                body,
            }
            .into());
        }

        Ok(response)
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, path: &str) -> Result<String> {
        self.send("GET", path, self.http.get(self.url(path)))?
            .text()
            .with_context(|| format!("Failed to read response body from: {}", path))
    }

    fn delete(&self, path: &str) -> Result<String> {
        let response = self.send("DELETE", path, self.http.delete(self.url(path)))?;
        Ok(response.status().to_string())
    }

    fn send_form(&self, method: FormMethod, path: &str, form: UploadForm) -> Result<String> {
        let mut body = multipart::Form::new();
        for (name, value) in form.fields {
            body = body.text(name, value);
        }
        for (name, file) in form.files {
            body = body
                .file(name, &file)
                .with_context(|| format!("Failed to attach file: {:?}", file))?;
        }

        let request = match method {
            FormMethod::Post => self.http.post(self.url(path)),
            FormMethod::Put => self.http.put(self.url(path)),
        };

        self.send(method.as_str(), path, request.multipart(body))?
            .text()
            .with_context(|| format!("Failed to read response body from: {}", path))
    }
}

/// Connector producing [`ReqwestClient`]s against a fixed API root
pub struct ReqwestConnector {
    base_url: String,
}

impl ReqwestConnector {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

impl Default for ReqwestConnector {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ApiConnector for ReqwestConnector {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn HttpClient>> {
        Ok(Arc::new(ReqwestClient::new(&self.base_url, api_key)?))
    }
}

/// Request recorded by [`MockHttpClient`]
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub form: Option<UploadForm>,
}

/// Mock HTTP client for testing; answers from canned responses by method and path
#[cfg(test)]
pub struct MockHttpClient {
    responses: std::sync::Mutex<Vec<(String, String, std::result::Result<String, String>)>>,
    requests: std::sync::Mutex<Vec<RecordedRequest>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: std::sync::Mutex::new(Vec::new()),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(self, method: &str, path: &str, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push((method.to_string(), path.to_string(), Ok(body.to_string())));
        self
    }

    pub fn with_failure(self, method: &str, path: &str, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push((method.to_string(), path.to_string(), Err(message.to_string())));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(&self, method: &str, path: &str, form: Option<UploadForm>) -> Result<String> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.to_string(),
            path: path.to_string(),
            form,
        });

        let responses = self.responses.lock().unwrap();
        match responses
            .iter()
            .find(|(m, p, _)| m == method && p == path)
            .map(|(_, _, r)| r.clone())
        {
            Some(Ok(body)) => Ok(body),
            Some(Err(message)) => anyhow::bail!("{}", message),
            None => anyhow::bail!("Unexpected request: {} {}", method, path),
        }
    }
}

#[cfg(test)]
impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl HttpClient for MockHttpClient {
    fn get(&self, path: &str) -> Result<String> {
        self.respond("GET", path, None)
    }

    fn delete(&self, path: &str) -> Result<String> {
        self.respond("DELETE", path, None)
    }

    fn send_form(&self, method: FormMethod, path: &str, form: UploadForm) -> Result<String> {
        self.respond(method.as_str(), path, Some(form))
    }
}

/// Connector handing out a shared [`MockHttpClient`] and recording API keys
#[cfg(test)]
pub struct MockConnector {
    pub client: Arc<MockHttpClient>,
    api_keys: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockConnector {
    pub fn new(client: MockHttpClient) -> Self {
        Self {
            client: Arc::new(client),
            api_keys: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn api_keys(&self) -> Vec<String> {
        self.api_keys.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ApiConnector for MockConnector {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn HttpClient>> {
        self.api_keys.lock().unwrap().push(api_key.to_string());
        Ok(self.client.clone())
    }
}
