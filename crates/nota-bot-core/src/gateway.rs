//! Invoice gateway
//!
//! Client for the remote invoicing service: saves transactions and renders
//! notas as PNG images. Failures are reported as a single error family; the
//! dialogue layer does not distinguish between them.

use crate::config::{CoreSettings, GENERATE_NOTA_ENDPOINT, SAVE_TRANSACTION_ENDPOINT};
use crate::session::Order;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client as HttpClient;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors that can occur while talking to the invoicing service
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Error during network communication
    #[error("Network error: {0}")]
    Network(String),
    /// Non-success status returned by the service
    #[error("API error: {0}")]
    Api(String),
    /// Response body is not the expected JSON
    #[error("JSON error: {0}")]
    Json(String),
    /// Rendered image is not valid base64
    #[error("Image decode error: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// A rendered nota image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotaImage {
    /// Raw PNG bytes
    pub bytes: Vec<u8>,
}

/// Interface to the remote invoicing service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvoiceGateway: Send + Sync {
    /// Render the nota with the given number
    async fn generate_nota(&self, nota_no: &str) -> Result<NotaImage, GatewayError>;

    /// Save an order, returning the assigned nota number
    async fn save_transaction(&self, order: &Order) -> Result<String, GatewayError>;
}

/// HTTP implementation of [`InvoiceGateway`]
pub struct HttpInvoiceGateway {
    http_client: HttpClient,
    generate_url: String,
    save_url: String,
}

impl HttpInvoiceGateway {
    /// Create a gateway for the configured API
    #[must_use]
    pub fn new(settings: &CoreSettings) -> Self {
        let http_client = HttpClient::builder()
            .timeout(settings.gateway_timeout())
            .build()
            .unwrap_or_else(|_| HttpClient::new());

        Self {
            http_client,
            generate_url: settings.endpoint_url(GENERATE_NOTA_ENDPOINT),
            save_url: settings.endpoint_url(SAVE_TRANSACTION_ENDPOINT),
        }
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, GatewayError> {
        let response = self
            .http_client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api(clean_error_body(status, &error_text)));
        }

        response
            .json()
            .await
            .map_err(|e| GatewayError::Json(e.to_string()))
    }
}

#[async_trait]
impl InvoiceGateway for HttpInvoiceGateway {
    #[instrument(skip(self))]
    async fn generate_nota(&self, nota_no: &str) -> Result<NotaImage, GatewayError> {
        let res_json = self
            .post_json(&self.generate_url, &json!({ "nota_no": nota_no }))
            .await?;
        let encoded = res_json
            .get("base64")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::Json("missing string field `base64`".to_string()))?;

        let bytes = decode_image(encoded)?;
        debug!(size = bytes.len(), "Nota rendered");
        Ok(NotaImage { bytes })
    }

    #[instrument(skip_all, fields(items = order.barang.len()))]
    async fn save_transaction(&self, order: &Order) -> Result<String, GatewayError> {
        let body = serde_json::to_value(order).map_err(|e| GatewayError::Json(e.to_string()))?;
        let res_json = self.post_json(&self.save_url, &body).await?;
        extract_nota_no(&res_json)
    }
}

/// Reads `nota_no` from a save response; the service may send it as a
/// string or as a number.
///
/// # Errors
///
/// Returns `GatewayError::Json` when the field is missing, blank or of
/// another type.
pub fn extract_nota_no(response: &Value) -> Result<String, GatewayError> {
    let nota_no = match response.get("nota_no") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        other => {
            return Err(GatewayError::Json(format!(
                "expected `nota_no` string or number, got: {other:?}"
            )))
        }
    };
    if nota_no.is_empty() {
        return Err(GatewayError::Json("empty `nota_no`".to_string()));
    }
    Ok(nota_no)
}

/// Decodes a base64 image, tolerating a `data:image/png;base64,` prefix.
///
/// # Errors
///
/// Returns `GatewayError::Decode` on invalid base64.
pub fn decode_image(encoded: &str) -> Result<Vec<u8>, GatewayError> {
    let payload = encoded
        .split_once(";base64,")
        .map_or(encoded, |(_, data)| data)
        .trim();
    Ok(BASE64.decode(payload)?)
}

fn clean_error_body(status: reqwest::StatusCode, body: &str) -> String {
    let trimmed = body.trim_start();
    let is_html = trimmed.starts_with("<!DOCTYPE")
        || trimmed.starts_with("<html")
        || trimmed.starts_with("<HTML");

    if is_html {
        return format!("{status} (server returned HTML error page)");
    }
    if body.chars().count() > 300 {
        let truncated: String = body.chars().take(300).collect();
        return format!("{status} - {truncated}... (truncated)");
    }
    format!("{status} - {body}")
}
