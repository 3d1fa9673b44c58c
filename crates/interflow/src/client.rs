use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::dispatch::Dispatcher;
use crate::errors::ExchangeError;
use crate::interceptors::imply_content_type::ImplyContentType;
use crate::interceptors::list::InterceptorList;
use crate::interceptors::Interceptor;
use crate::observe::{LogSink, NoopLogSink, SharedLogSink};
use crate::transport::Transport;
use crate::types::{RequestOptions, Response};

pub struct Client {
    transport: Arc<dyn Transport>,
    interceptors: Mutex<InterceptorList>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn interceptors(&self) -> MutexGuard<'_, InterceptorList> {
        self.interceptors.lock()
    }

    pub async fn dispatch(&self, options: RequestOptions) -> Result<Response, ExchangeError> {
        let chain = self.interceptors.lock().snapshot();
        let token = options.cancel_token.clone().unwrap_or_default();
        Dispatcher::new(chain, self.transport.clone(), token)
            .run(options)
            .await
    }
}

pub struct ClientBuilder {
    transport: Option<Arc<dyn Transport>>,
    interceptors: InterceptorList,
    sink: Option<SharedLogSink>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            transport: None,
            interceptors: InterceptorList::new(),
            sink: None,
        }
    }
}

impl ClientBuilder {
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn with_log_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn build(self) -> Client {
        let transport = self.transport.unwrap_or_else(default_transport);
        let sink = self.sink.unwrap_or_else(|| Arc::new(NoopLogSink));
        let mut interceptors = self.interceptors;
        let slot0_is_builtin = interceptors
            .get(0)
            .map(|entry| entry.as_any().downcast_ref::<ImplyContentType>().is_some())
            .unwrap_or(false);
        if slot0_is_builtin {
            interceptors.set(0, Arc::new(ImplyContentType::with_sink(sink)));
        }
        Client {
            transport,
            interceptors: Mutex::new(interceptors),
        }
    }
}

#[cfg(feature = "transport-reqwest")]
fn default_transport() -> Arc<dyn Transport> {
    Arc::new(crate::transport::ReqwestTransport::default())
}

#[cfg(not(feature = "transport-reqwest"))]
fn default_transport() -> Arc<dyn Transport> {
    Arc::new(crate::transport::UnroutableTransport)
}
