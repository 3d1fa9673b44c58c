use async_trait::async_trait;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::HeaderMap;
use serde_json::Value;

use super::Transport;
use crate::errors::TransportError;
use crate::types::{Body, RequestOptions, Response};

#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn exchange(&self, options: RequestOptions) -> Result<Response, TransportError> {
        let mut builder = self
            .client
            .request(options.method.clone(), options.url.clone())
            .headers(options.headers.clone());

        match &options.body {
            Body::Empty => {}
            Body::Text(text) => {
                builder = builder.body(text.clone());
            }
            Body::Json(value) => {
                builder = builder.json(value);
            }
            Body::Bytes(bytes) => {
                builder = builder.body(bytes.clone());
            }
            Body::Form(form) => {
                if !options.headers.contains_key(CONTENT_TYPE) {
                    if let Ok(value) = HeaderValue::from_str(&form.content_type()) {
                        builder = builder.header(CONTENT_TYPE, value);
                    }
                }
                builder = builder.body(form.encode());
            }
        }

        if let Some(timeout) = options.timeout.receive {
            builder = builder.timeout(timeout);
        }

        let sent = builder.send().await.map_err(map_error)?;

        let status = sent.status();
        let status_message = status.canonical_reason().map(str::to_owned);
        let headers = sent.headers().clone();
        let text = sent
            .text()
            .await
            .map_err(|err| TransportError::Connection(format!("response body: {err}")))?;

        Ok(Response {
            options,
            status,
            status_message,
            headers: headers.clone(),
            body: decode_body(&headers, &text),
        })
    }
}

fn map_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        if err.is_connect() {
            TransportError::ConnectTimeout
        } else {
            TransportError::ReceiveTimeout
        }
    } else if err.is_connect() {
        let detail = err.to_string();
        if detail.contains("certificate") {
            TransportError::BadCertificate(detail)
        } else {
            TransportError::Connection(detail)
        }
    } else if err.is_request() || err.is_body() {
        TransportError::Connection(err.to_string())
    } else {
        TransportError::Other(err.into())
    }
}

fn decode_body(headers: &HeaderMap, text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    let json_like = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("json"))
        .unwrap_or(false);
    if json_like {
        serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
    } else {
        Value::String(text.to_owned())
    }
}
