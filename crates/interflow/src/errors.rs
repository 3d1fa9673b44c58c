use std::{error, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{RequestOptions, Response};

pub type BoxError = Box<dyn error::Error + Send + Sync>;

pub const HANDLER_ALREADY_CALLED: &str =
    "The `handler` has already been called, make sure each handler gets called only once.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    ConnectionTimeout,
    SendTimeout,
    ReceiveTimeout,
    BadCertificate,
    BadResponse,
    Cancelled,
    ConnectionError,
    Unknown,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ConnectionTimeout => "connection_timeout",
            ErrorKind::SendTimeout => "send_timeout",
            ErrorKind::ReceiveTimeout => "receive_timeout",
            ErrorKind::BadCertificate => "bad_certificate",
            ErrorKind::BadResponse => "bad_response",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::ConnectionError => "connection_error",
            ErrorKind::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct InvariantViolation(pub String);

impl InvariantViolation {
    pub(crate) fn handler_already_called() -> Self {
        InvariantViolation(HANDLER_ALREADY_CALLED.to_string())
    }

    pub(crate) fn handler_dropped() -> Self {
        InvariantViolation(
            "the interceptor completed without calling its `handler`".to_string(),
        )
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection could not be established in time")]
    ConnectTimeout,
    #[error("request body could not be sent in time")]
    SendTimeout,
    #[error("response was not received in time")]
    ReceiveTimeout,
    #[error("peer certificate validation failed: {0}")]
    BadCertificate(String),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("exchange aborted")]
    Aborted,
    #[error("{0}")]
    Other(BoxError),
}

#[derive(Debug)]
pub struct ExchangeError {
    kind: ErrorKind,
    options: RequestOptions,
    response: Option<Response>,
    cause: Option<BoxError>,
    message: Option<String>,
}

impl ExchangeError {
    pub fn new(kind: ErrorKind, options: RequestOptions) -> Self {
        Self {
            kind,
            options,
            response: None,
            cause: None,
            message: None,
        }
    }

    pub fn connection_timeout(options: RequestOptions) -> Self {
        Self::new(ErrorKind::ConnectionTimeout, options)
    }

    pub fn send_timeout(options: RequestOptions) -> Self {
        Self::new(ErrorKind::SendTimeout, options)
    }

    pub fn receive_timeout(options: RequestOptions) -> Self {
        Self::new(ErrorKind::ReceiveTimeout, options)
    }

    pub fn bad_certificate(options: RequestOptions, detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadCertificate, options).with_message(detail)
    }

    pub fn bad_response(response: Response, detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadResponse, response.options.clone())
            .with_response(response)
            .with_message(detail)
    }

    pub fn cancelled(options: RequestOptions, reason: Option<String>) -> Self {
        let error = Self::new(ErrorKind::Cancelled, options);
        match reason {
            Some(reason) => error.with_message(reason),
            None => error,
        }
    }

    pub fn connection(options: RequestOptions, detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConnectionError, options).with_message(detail)
    }

    pub fn unknown(options: RequestOptions, cause: BoxError) -> Self {
        Self::new(ErrorKind::Unknown, options).with_cause(cause)
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_response(mut self, response: Response) -> Self {
        self.response = Some(response);
        self
    }

    pub fn with_cause(mut self, cause: BoxError) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn cause(&self) -> Option<&(dyn error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_invariant_violation(&self) -> bool {
        self.cause
            .as_deref()
            .map(|cause| cause.downcast_ref::<InvariantViolation>().is_some())
            .unwrap_or(false)
    }
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.as_str())?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        } else if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl error::Error for ExchangeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.cause {
            Some(cause) => {
                let cause: &(dyn error::Error + 'static) = cause.as_ref();
                Some(cause)
            }
            None => None,
        }
    }
}
