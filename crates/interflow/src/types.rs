use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use http::header::HeaderValue;
use http::{HeaderMap, HeaderName, Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::cancel::CancelToken;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TimeoutCfg {
    pub connect: Option<Duration>,
    pub send: Option<Duration>,
    pub receive: Option<Duration>,
}

static BOUNDARY_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Debug)]
pub struct FormBody {
    boundary: String,
    parts: Vec<(String, String)>,
}

impl FormBody {
    pub fn new() -> Self {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or_default();
        let seq = BOUNDARY_SEQ.fetch_add(1, Ordering::Relaxed);
        Self {
            boundary: format!("interflow-boundary-{stamp:x}-{seq:x}"),
            parts: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), value.into()));
        self
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn parts(&self) -> &[(String, String)] {
        &self.parts
    }

    pub fn encode(&self) -> Bytes {
        let mut encoded = String::new();
        for (name, value) in &self.parts {
            encoded.push_str("--");
            encoded.push_str(&self.boundary);
            encoded.push_str("\r\n");
            encoded.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
            ));
            encoded.push_str(value);
            encoded.push_str("\r\n");
        }
        encoded.push_str("--");
        encoded.push_str(&self.boundary);
        encoded.push_str("--\r\n");
        Bytes::from(encoded)
    }
}

impl Default for FormBody {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, Default)]
pub enum Body {
    #[default]
    Empty,
    Text(String),
    Json(Value),
    Bytes(Bytes),
    Form(FormBody),
}

impl Body {
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

#[derive(Clone, Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Body,
    pub content_type: Option<String>,
    pub timeout: TimeoutCfg,
    pub extras: HashMap<String, Value>,
    pub cancel_token: Option<CancelToken>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            url: Url::parse("http://127.0.0.1/").expect("static url"),
            headers: HeaderMap::new(),
            body: Body::Empty,
            content_type: None,
            timeout: TimeoutCfg::default(),
            extras: HashMap::new(),
            cancel_token: None,
        }
    }
}

impl RequestOptions {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            ..Self::default()
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_timeout(mut self, timeout: TimeoutCfg) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel_token = Some(token);
        self
    }
}

#[derive(Clone, Debug)]
pub struct Response {
    pub options: RequestOptions,
    pub status: StatusCode,
    pub status_message: Option<String>,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Response {
    pub fn new(options: RequestOptions, status: StatusCode) -> Self {
        Self {
            options,
            status,
            status_message: status.canonical_reason().map(str::to_owned),
            headers: HeaderMap::new(),
            body: Value::Null,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_status_message(mut self, message: impl Into<String>) -> Self {
        self.status_message = Some(message.into());
        self
    }
}
