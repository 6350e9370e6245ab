// src/transport.rs

use crate::config::ClientConfig;
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::{header, Client, ClientBuilder, Proxy};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, instrument, trace};
use url::Url;

/// Envelope code the stock backend uses for success.
pub const DEFAULT_SUCCESS_CODE: i64 = 200;

/// Uniform response wrapper returned by every admin endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn success(code: i64, data: impl Into<Value>) -> Self {
        Self {
            code,
            message: "success".to_string(),
            data: Some(data.into()),
        }
    }

    /// Checks the envelope code and decodes the payload.
    ///
    /// A failure code becomes [`SyncError::Server`] carrying the envelope
    /// message. An absent or `null` payload decodes to `None`.
    pub fn into_data<T: DeserializeOwned>(self, success_code: i64) -> Result<Option<T>> {
        if self.code != success_code {
            return Err(SyncError::server(self.code, self.message));
        }
        match self.data {
            None | Some(Value::Null) => Ok(None),
            Some(data) => serde_json::from_value(data).map(Some).map_err(|e| {
                SyncError::transport(format!("Unexpected response payload: {e}"))
            }),
        }
    }
}

/// Request/response seam to the admin backend.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Envelope>;

    async fn post(&self, path: &str, body: Option<&Value>) -> Result<Envelope>;
}

/// [`Transport`] over HTTP using a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    auth_token: Option<SecretString>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;

        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)));

        if let Some(proxy_url) = config.proxy_url.as_deref().filter(|u| !u.trim().is_empty()) {
            builder = with_proxy(builder, proxy_url)?;
        }

        let client = builder.build().map_err(|e| {
            error!(error = %e, "Failed to build HTTP client");
            SyncError::config(format!("Failed to build HTTP client: {e}"), None::<String>)
        })?;
        info!(base_url = %base_url, "HTTP transport initialized");

        Ok(Self {
            client,
            base_url,
            auth_token: config.auth_token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.header(header::AUTHORIZATION, token.expose_secret().as_str()),
            None => request,
        }
    }

    async fn read_envelope(response: reqwest::Response) -> Result<Envelope> {
        let status = response.status();
        let bytes = response.bytes().await?;
        trace!(status = %status, len = bytes.len(), "Received response body");

        match serde_json::from_slice::<Envelope>(&bytes) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => {
                Err(SyncError::transport(format!("HTTP {status} without a response envelope")))
            }
            Err(e) => Err(SyncError::transport(format!("Malformed response envelope: {e}"))),
        }
    }
}

fn with_proxy(builder: ClientBuilder, proxy_url: &str) -> Result<ClientBuilder> {
    let parsed = Url::parse(proxy_url)?;
    let scheme = parsed.scheme().to_lowercase();
    let proxy = match scheme.as_str() {
        "http" => Proxy::http(proxy_url),
        "https" => Proxy::https(proxy_url),
        "socks5" => Proxy::all(proxy_url),
        _ => {
            return Err(SyncError::config(
                format!("Unsupported proxy scheme: {scheme}"),
                Some("client.proxy_url"),
            ))
        }
    }
    .map_err(|e| SyncError::config(format!("Invalid proxy definition: {e}"), Some("client.proxy_url")))?;

    debug!(scheme = %scheme, "Routing requests through proxy");
    Ok(builder.proxy(proxy))
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(level = "debug", skip(self, query))]
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Envelope> {
        let request = self.authorize(self.client.get(self.url_for(path)).query(query));
        let response = request.send().await?;
        Self::read_envelope(response).await
    }

    #[instrument(level = "debug", skip(self, body))]
    async fn post(&self, path: &str, body: Option<&Value>) -> Result<Envelope> {
        let mut request = self.authorize(self.client.post(self.url_for(path)));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::read_envelope(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_code_becomes_server_error() {
        let envelope = Envelope {
            code: 500,
            message: "invalid aria2 uri".to_string(),
            data: None,
        };
        let err = envelope.into_data::<String>(200).unwrap_err();
        assert!(matches!(err, SyncError::Server { code: 500, ref message } if message == "invalid aria2 uri"));
    }

    #[test]
    fn null_payload_is_none() {
        let envelope: Envelope =
            serde_json::from_value(json!({"code": 200, "message": "ok", "data": null})).unwrap();
        assert_eq!(envelope.into_data::<String>(200).unwrap(), None);
    }

    #[test]
    fn mismatched_payload_is_transport_error() {
        let envelope = Envelope::success(200, json!({"unexpected": true}));
        assert!(envelope.into_data::<String>(200).unwrap_err().is_transport());
    }

    #[test]
    fn url_keeps_base_path() {
        let config = ClientConfig {
            base_url: "http://127.0.0.1:5244/api/".to_string(),
            ..ClientConfig::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(
            transport.url_for("/admin/setting/list"),
            "http://127.0.0.1:5244/api/admin/setting/list"
        );
    }

    #[test]
    fn unsupported_proxy_scheme_is_rejected() {
        let config = ClientConfig {
            proxy_url: Some("ftp://proxy.local:21".to_string()),
            ..ClientConfig::default()
        };
        assert!(HttpTransport::new(&config).is_err());
    }
}
