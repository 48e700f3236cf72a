//! HTTP transport implementation using `reqwest`.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};

use crate::{Body, HttpResponse, Method, RequestDescriptor, Transport, TransportError};

/// Header carrying the [`RequestId`](crate::RequestId).
const REQUEST_ID_HEADER: &str = "x-request-id";

/// A [`Transport`] that talks to the backend over HTTP(S).
///
/// The client keeps a cookie store, so the HttpOnly session cookies the
/// backend sets on login and refresh are sent back on every later call,
/// cross-origin included. The token itself is never visible to callers.
///
/// Cloning is cheap and clones share the cookie jar.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    /// `base_url + api_prefix`, without a trailing slash.
    base: Arc<str>,
}

impl HttpTransport {
    /// Creates a transport for `base_url` (e.g. `https://api.example.com`)
    /// and `api_prefix` (e.g. `/api/v1`).
    pub fn new(base_url: &str, api_prefix: &str) -> Result<Self, TransportError> {
        let base = join_base(base_url, api_prefix);
        reqwest::Url::parse(&base)
            .map_err(|e| TransportError::InvalidUrl(format!("{base}: {e}")))?;

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(TransportError::RequestFailed)?;

        tracing::debug!(%base, "HTTP transport ready");
        Ok(Self {
            client,
            base: base.into(),
        })
    }

    /// The URL every request path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base)
        } else {
            format!("{}/{path}", self.base)
        }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<HttpResponse, TransportError> {
        let method = match request.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, self.url_for(request.path()))
            .header(REQUEST_ID_HEADER, request.id().to_string());

        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body() {
            Body::Empty => builder,
            Body::Json(bytes) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(bytes.clone()),
            Body::Multipart(file) => {
                let part = Part::bytes(file.bytes.clone())
                    .file_name(file.file_name.clone())
                    .mime_str(&file.content_type)
                    .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
                builder.multipart(Form::new().part(file.field.clone(), part))
            }
        };

        let response = builder.send().await.map_err(TransportError::RequestFailed)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(TransportError::BodyRead)?;

        tracing::trace!(
            request_id = %request.id(),
            status,
            bytes = body.len(),
            "HTTP response received"
        );

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn join_base(base_url: &str, api_prefix: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    let prefix = api_prefix.trim_matches('/');
    if prefix.is_empty() {
        base_url.to_string()
    } else {
        format!("{base_url}/{prefix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_base_normalizes_slashes() {
        assert_eq!(
            join_base("http://localhost:5000/", "/api/v1/"),
            "http://localhost:5000/api/v1"
        );
        assert_eq!(join_base("http://localhost:5000", ""), "http://localhost:5000");
    }

    #[test]
    fn test_new_rejects_unparseable_base() {
        let result = HttpTransport::new("not a url", "/api/v1");
        assert!(matches!(result, Err(TransportError::InvalidUrl(_))));
    }

    #[test]
    fn test_url_for_appends_path_to_prefix() {
        let transport = HttpTransport::new("http://localhost:5000", "/api/v1").unwrap();
        assert_eq!(
            transport.url_for("/auth/login"),
            "http://localhost:5000/api/v1/auth/login"
        );
        assert_eq!(
            transport.url_for("users/7"),
            "http://localhost:5000/api/v1/users/7"
        );
    }
}
