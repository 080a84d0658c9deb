//! Thin JSON/text HTTP client bound to one API base URL

use super::error::RemoteError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;
use url::Url;

const USER_AGENT: &str = concat!("drone-trigger/", env!("CARGO_PKG_VERSION"));

/// Builds a request path from raw segments, percent-encoding each one.
///
/// A `/` inside a segment stays a separator, so branch names like
/// `feature/x` keep their shape; `#`, `?` and `%` are escaped.
pub fn encode_path<'a, I>(segments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut url = match Url::parse("http://localhost/") {
        Ok(url) => url,
        Err(_) => return String::new(),
    };

    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty();
        for segment in segments {
            path.extend(segment.split('/'));
        }
    }

    url.path().to_string()
}

/// HTTP client for one remote API.
///
/// Paths passed to the request methods are appended verbatim to the base URL;
/// build them with [`encode_path`] when they carry user-controlled names.
/// Default headers are sent with every request; per-request headers given to
/// [`ApiClient::post_json`] take precedence over them.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http_client: Client,
    headers: HeaderMap,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(RemoteError::ClientInit)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            headers: HeaderMap::new(),
        })
    }

    /// Sets a header sent with every subsequent request.
    pub fn set_header(&mut self, name: HeaderName, value: &str) -> Result<(), RemoteError> {
        let value = header_value(&name, value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and return the body as text, whatever its media type.
    pub async fn get_text(&self, path: &str) -> Result<String, RemoteError> {
        let url = self.url(path);
        let response = self
            .execute(self.http_client.get(&url).headers(self.headers.clone()), &url)
            .await?;

        response
            .text()
            .await
            .map_err(|source| RemoteError::Transport { url, source })
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        let url = self.url(path);
        let response = self
            .execute(self.http_client.get(&url).headers(self.headers.clone()), &url)
            .await?;

        decode_json(response, url).await
    }

    /// POST `body` as JSON to `path` and decode the JSON answer.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        extra_headers: HeaderMap,
    ) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let mut headers = self.headers.clone();
        headers.extend(extra_headers);

        let request = self.http_client.post(&url).headers(headers).json(body);
        let response = self.execute(request, &url).await?;

        decode_json(response, url).await
    }

    async fn execute(&self, request: RequestBuilder, url: &str) -> Result<Response, RemoteError> {
        trace!(url, "Sending request");

        let response = request.send().await.map_err(|source| RemoteError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Err(RemoteError::NoContent {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(RemoteError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

pub(crate) fn header_value(name: &HeaderName, value: &str) -> Result<HeaderValue, RemoteError> {
    HeaderValue::from_str(value).map_err(|_| RemoteError::InvalidHeader {
        name: name.to_string(),
    })
}

async fn decode_json<T: DeserializeOwned>(response: Response, url: String) -> Result<T, RemoteError> {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if !is_json(&content_type) {
        return Err(RemoteError::UnexpectedContentType { url, content_type });
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(source) => return Err(RemoteError::Transport { url, source }),
    };

    serde_json::from_str(&body).map_err(|source| RemoteError::Decode { url, source })
}

fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}
