pub use crate::cancel::CancelToken;
pub use crate::client::{Client, ClientBuilder};
pub use crate::dispatch::Dispatcher;
pub use crate::errors::{
    BoxError, ErrorKind, ExchangeError, InvariantViolation, TransportError,
    HANDLER_ALREADY_CALLED,
};
pub use crate::handler::{ErrorHandler, RequestHandler, ResponseHandler};
pub use crate::interceptors::imply_content_type::{ImplyContentType, APPLICATION_JSON};
pub use crate::interceptors::list::InterceptorList;
pub use crate::interceptors::{
    HookInterceptor, HookOutcome, Interceptor, InterceptorObject, Lane, Queued,
};
pub use crate::observe::{LogSink, NoopLogSink, SharedLogSink, TracingLogSink};
#[cfg(feature = "transport-reqwest")]
pub use crate::transport::ReqwestTransport;
pub use crate::transport::{Transport, UnroutableTransport};
pub use crate::types::{Body, FormBody, RequestOptions, Response, TimeoutCfg};
