use async_trait::async_trait;

use crate::errors::TransportError;
use crate::types::{RequestOptions, Response};

#[cfg(feature = "transport-reqwest")]
mod reqwest;
#[cfg(feature = "transport-reqwest")]
pub use self::reqwest::ReqwestTransport;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn exchange(&self, options: RequestOptions) -> Result<Response, TransportError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UnroutableTransport;

#[async_trait]
impl Transport for UnroutableTransport {
    async fn exchange(&self, _options: RequestOptions) -> Result<Response, TransportError> {
        Err(TransportError::Connection(
            "no transport configured".to_string(),
        ))
    }
}
