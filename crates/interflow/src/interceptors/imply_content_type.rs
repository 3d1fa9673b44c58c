use std::sync::Arc;

use async_trait::async_trait;
use http::header::{HeaderValue, CONTENT_TYPE};
use serde_json::Value;

use super::{HookOutcome, Interceptor};
use crate::handler::RequestHandler;
use crate::observe::{NoopLogSink, SharedLogSink};
use crate::types::{Body, RequestOptions};

pub const APPLICATION_JSON: &str = "application/json";

pub struct ImplyContentType {
    sink: SharedLogSink,
}

impl ImplyContentType {
    pub fn new() -> Self {
        Self {
            sink: Arc::new(NoopLogSink),
        }
    }

    pub fn with_sink(sink: SharedLogSink) -> Self {
        Self { sink }
    }

    fn imply(&self, options: &RequestOptions) -> Option<String> {
        match &options.body {
            Body::Empty => None,
            Body::Form(form) => Some(form.content_type()),
            Body::Text(_) => Some(APPLICATION_JSON.to_string()),
            Body::Json(value) => match value {
                Value::String(_) | Value::Object(_) => Some(APPLICATION_JSON.to_string()),
                Value::Array(items) if items.iter().all(Value::is_object) => {
                    Some(APPLICATION_JSON.to_string())
                }
                _ => {
                    self.unsupported();
                    None
                }
            },
            Body::Bytes(_) => {
                self.unsupported();
                None
            }
        }
    }

    fn unsupported(&self) {
        self.sink.notice(
            "no content type can be implied for this body shape, set one explicitly",
        );
    }
}

impl Default for ImplyContentType {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Interceptor for ImplyContentType {
    async fn on_request(&self, mut options: RequestOptions, handler: RequestHandler) -> HookOutcome {
        if options.content_type.is_none() && !options.headers.contains_key(CONTENT_TYPE) {
            if let Some(content_type) = self.imply(&options) {
                if let Ok(value) = HeaderValue::from_str(&content_type) {
                    options.headers.insert(CONTENT_TYPE, value);
                }
                options.content_type = Some(content_type);
            }
        }
        handler.next(options)?;
        Ok(())
    }
}
