use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::errors::{BoxError, ExchangeError};
use crate::handler::{ErrorHandler, RequestHandler, ResponseHandler};
use crate::types::{RequestOptions, Response};

pub mod imply_content_type;
pub mod list;

pub type InterceptorObject = Arc<dyn Interceptor>;
pub type HookOutcome = Result<(), BoxError>;

pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[async_trait]
pub trait Interceptor: Send + Sync + AsAny {
    async fn on_request(&self, options: RequestOptions, handler: RequestHandler) -> HookOutcome {
        handler.next(options)?;
        Ok(())
    }

    async fn on_response(&self, response: Response, handler: ResponseHandler) -> HookOutcome {
        handler.next(response)?;
        Ok(())
    }

    async fn on_error(&self, error: ExchangeError, handler: ErrorHandler) -> HookOutcome {
        handler.next(error)?;
        Ok(())
    }

    fn lane(&self) -> Option<&Lane> {
        None
    }
}

// tokio's mutex queues waiters in FIFO order; that ordering is the single-slot
// queue discipline shared by all three hooks of one instance.
#[derive(Clone, Debug, Default)]
pub struct Lane {
    slot: Arc<Mutex<()>>,
}

impl Lane {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn admit(&self) -> OwnedMutexGuard<()> {
        self.slot.clone().lock_owned().await
    }
}

pub struct Queued<I> {
    inner: I,
    lane: Lane,
}

impl<I: Interceptor + 'static> Queued<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            lane: Lane::new(),
        }
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}

#[async_trait]
impl<I: Interceptor + 'static> Interceptor for Queued<I> {
    async fn on_request(&self, options: RequestOptions, handler: RequestHandler) -> HookOutcome {
        self.inner.on_request(options, handler).await
    }

    async fn on_response(&self, response: Response, handler: ResponseHandler) -> HookOutcome {
        self.inner.on_response(response, handler).await
    }

    async fn on_error(&self, error: ExchangeError, handler: ErrorHandler) -> HookOutcome {
        self.inner.on_error(error, handler).await
    }

    fn lane(&self) -> Option<&Lane> {
        Some(&self.lane)
    }
}

type RequestFn =
    Box<dyn Fn(RequestOptions, RequestHandler) -> BoxFuture<'static, HookOutcome> + Send + Sync>;
type ResponseFn =
    Box<dyn Fn(Response, ResponseHandler) -> BoxFuture<'static, HookOutcome> + Send + Sync>;
type ErrorFn =
    Box<dyn Fn(ExchangeError, ErrorHandler) -> BoxFuture<'static, HookOutcome> + Send + Sync>;

#[derive(Default)]
pub struct HookInterceptor {
    request: Option<RequestFn>,
    response: Option<ResponseFn>,
    error: Option<ErrorFn>,
}

impl HookInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request<F>(mut self, hook: F) -> Self
    where
        F: Fn(RequestOptions, RequestHandler) -> BoxFuture<'static, HookOutcome>
            + Send
            + Sync
            + 'static,
    {
        self.request = Some(Box::new(hook));
        self
    }

    pub fn response<F>(mut self, hook: F) -> Self
    where
        F: Fn(Response, ResponseHandler) -> BoxFuture<'static, HookOutcome> + Send + Sync + 'static,
    {
        self.response = Some(Box::new(hook));
        self
    }

    pub fn error<F>(mut self, hook: F) -> Self
    where
        F: Fn(ExchangeError, ErrorHandler) -> BoxFuture<'static, HookOutcome>
            + Send
            + Sync
            + 'static,
    {
        self.error = Some(Box::new(hook));
        self
    }

    pub fn queued(self) -> Queued<HookInterceptor> {
        Queued::new(self)
    }
}

impl fmt::Debug for HookInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookInterceptor")
            .field("request", &self.request.is_some())
            .field("response", &self.response.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

#[async_trait]
impl Interceptor for HookInterceptor {
    async fn on_request(&self, options: RequestOptions, handler: RequestHandler) -> HookOutcome {
        match &self.request {
            Some(hook) => hook(options, handler).await,
            None => {
                handler.next(options)?;
                Ok(())
            }
        }
    }

    async fn on_response(&self, response: Response, handler: ResponseHandler) -> HookOutcome {
        match &self.response {
            Some(hook) => hook(response, handler).await,
            None => {
                handler.next(response)?;
                Ok(())
            }
        }
    }

    async fn on_error(&self, error: ExchangeError, handler: ErrorHandler) -> HookOutcome {
        match &self.error {
            Some(hook) => hook(error, handler).await,
            None => {
                handler.next(error)?;
                Ok(())
            }
        }
    }
}
