use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::errors::{ExchangeError, InvariantViolation};
use crate::types::{RequestOptions, Response};

#[derive(Debug)]
pub(crate) enum RequestFlow {
    Next(RequestOptions),
    Resolve {
        response: Response,
        call_following: bool,
    },
    Reject {
        error: ExchangeError,
        call_following: bool,
    },
}

#[derive(Debug)]
pub(crate) enum ResponseFlow {
    Next(Response),
    Resolve(Response),
    Reject {
        error: ExchangeError,
        call_following: bool,
    },
}

#[derive(Debug)]
pub(crate) enum ErrorFlow {
    Next(ExchangeError),
    Resolve(Response),
    Reject(ExchangeError),
}

// One-shot completion sink. Taking the sender under the lock is the
// used-flag check; once taken, every later call observes the violation.
struct Gate<T> {
    slot: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> Gate<T> {
    fn channel() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                slot: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    fn fire(&self, value: T) -> Result<(), InvariantViolation> {
        let sender = self
            .slot
            .lock()
            .take()
            .ok_or_else(InvariantViolation::handler_already_called)?;
        let _ = sender.send(value);
        Ok(())
    }
}

pub struct RequestHandler {
    gate: Gate<RequestFlow>,
}

impl RequestHandler {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<RequestFlow>) {
        let (gate, rx) = Gate::channel();
        (Self { gate }, rx)
    }

    pub fn next(&self, options: RequestOptions) -> Result<(), InvariantViolation> {
        self.gate.fire(RequestFlow::Next(options))
    }

    pub fn resolve(&self, response: Response, call_following: bool) -> Result<(), InvariantViolation> {
        self.gate.fire(RequestFlow::Resolve {
            response,
            call_following,
        })
    }

    pub fn reject(&self, error: ExchangeError, call_following: bool) -> Result<(), InvariantViolation> {
        self.gate.fire(RequestFlow::Reject {
            error,
            call_following,
        })
    }
}

pub struct ResponseHandler {
    gate: Gate<ResponseFlow>,
}

impl ResponseHandler {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<ResponseFlow>) {
        let (gate, rx) = Gate::channel();
        (Self { gate }, rx)
    }

    pub fn next(&self, response: Response) -> Result<(), InvariantViolation> {
        self.gate.fire(ResponseFlow::Next(response))
    }

    pub fn resolve(&self, response: Response) -> Result<(), InvariantViolation> {
        self.gate.fire(ResponseFlow::Resolve(response))
    }

    pub fn reject(&self, error: ExchangeError, call_following: bool) -> Result<(), InvariantViolation> {
        self.gate.fire(ResponseFlow::Reject {
            error,
            call_following,
        })
    }
}

pub struct ErrorHandler {
    gate: Gate<ErrorFlow>,
}

impl ErrorHandler {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<ErrorFlow>) {
        let (gate, rx) = Gate::channel();
        (Self { gate }, rx)
    }

    pub fn next(&self, error: ExchangeError) -> Result<(), InvariantViolation> {
        self.gate.fire(ErrorFlow::Next(error))
    }

    pub fn resolve(&self, response: Response) -> Result<(), InvariantViolation> {
        self.gate.fire(ErrorFlow::Resolve(response))
    }

    pub fn reject(&self, error: ExchangeError) -> Result<(), InvariantViolation> {
        self.gate.fire(ErrorFlow::Reject(error))
    }
}
