//! Executes [`HttpRequest`] values against the network.
//!
//! # Design
//! `Transport` is the only I/O seam in the crate. `MusicClient` builds
//! requests and interprets responses; a transport only moves bytes and
//! reports raw status and body. Status interpretation stays in the client,
//! so a transport must return 4xx/5xx responses as data rather than errors.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Sends one request and blocks until the full response has been read.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    base_url: String,
    headers: Vec<(String, String)>,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        // 4xx/5xx come back as responses so the client can map them.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout())
            .build()
            .new_agent();
        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers: config.headers.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn with_headers<B>(
        &self,
        mut builder: ureq::RequestBuilder<B>,
        request: &HttpRequest,
    ) -> ureq::RequestBuilder<B> {
        for (name, value) in self.headers.iter().chain(&request.headers) {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.url(&self.base_url);
        let body = request.body.as_deref();

        let result = match request.method {
            HttpMethod::Get => self.with_headers(self.agent.get(&url), request).call(),
            HttpMethod::Delete => self.with_headers(self.agent.delete(&url), request).call(),
            HttpMethod::Post => {
                let builder = self.with_headers(self.agent.post(&url), request);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = self.with_headers(self.agent.put(&url), request);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| {
            warn!(method = %request.method, %url, error = %e, "transport failure");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        debug!(method = %request.method, %url, status, "response received");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let transport = UreqTransport::new(&ClientConfig {
            base_url: "http://localhost:3000/api/".to_string(),
            timeout_ms: None,
            headers: Vec::new(),
        });
        assert_eq!(transport.base_url(), "http://localhost:3000/api");
    }

    #[test]
    fn non_ascii_header_values_are_kept_lossily() {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream
                .write_all(
                    b"HTTP/1.1 200 OK\r\nx-note: caf\xe9\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok",
                )
                .unwrap();
        });

        let transport = UreqTransport::new(
            &ClientConfig::new(&format!("http://{addr}"))
                .with_timeout(std::time::Duration::from_secs(5)),
        );
        let response = transport
            .send(&HttpRequest::new(HttpMethod::Get, "admin/info"))
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "ok");
        let note = response
            .headers
            .iter()
            .find(|(name, _)| name == "x-note")
            .map(|(_, value)| value.as_str());
        assert_eq!(note, Some("caf\u{FFFD}"));
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let transport = UreqTransport::new(
            &ClientConfig::new(&format!("http://{addr}"))
                .with_timeout(std::time::Duration::from_secs(2)),
        );
        let err = transport
            .send(&HttpRequest::new(HttpMethod::Get, "admin/info"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
