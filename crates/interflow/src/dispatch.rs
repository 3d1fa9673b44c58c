use std::sync::Arc;

use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::errors::{BoxError, ExchangeError, InvariantViolation, TransportError};
use crate::handler::{
    ErrorFlow, ErrorHandler, RequestFlow, RequestHandler, ResponseFlow, ResponseHandler,
};
use crate::interceptors::{HookOutcome, InterceptorObject};
use crate::transport::Transport;
use crate::types::{RequestOptions, Response};

enum Step<F> {
    Flow(F),
    Fault(BoxError),
}

fn step<F>(outcome: HookOutcome, flow: Option<F>) -> Step<F> {
    match (outcome, flow) {
        (Err(fault), _) => Step::Fault(fault),
        (Ok(()), Some(flow)) => Step::Flow(flow),
        (Ok(()), None) => Step::Fault(InvariantViolation::handler_dropped().into()),
    }
}

pub struct Dispatcher {
    chain: Vec<InterceptorObject>,
    transport: Arc<dyn Transport>,
    token: CancelToken,
}

impl Dispatcher {
    pub fn new(
        chain: Vec<InterceptorObject>,
        transport: Arc<dyn Transport>,
        token: CancelToken,
    ) -> Self {
        Self {
            chain,
            transport,
            token,
        }
    }

    pub async fn run(&self, mut options: RequestOptions) -> Result<Response, ExchangeError> {
        if self.token.is_cancelled() {
            return self.error_track(self.cancelled_error(options)).await;
        }

        for interceptor in &self.chain {
            let flow = match self.invoke_request(interceptor, options.clone()).await {
                Step::Flow(flow) => flow,
                Step::Fault(fault) => {
                    warn!(target: "interflow", "request interceptor fault: {fault}");
                    return self.error_track(ExchangeError::unknown(options, fault)).await;
                }
            };
            match self.cancel_rewrite_request(flow) {
                RequestFlow::Next(next) => options = next,
                RequestFlow::Resolve {
                    response,
                    call_following: false,
                } => return Ok(response),
                RequestFlow::Resolve {
                    response,
                    call_following: true,
                } => return self.response_track(response).await,
                RequestFlow::Reject {
                    error,
                    call_following: false,
                } => return Err(error),
                RequestFlow::Reject {
                    error,
                    call_following: true,
                } => return self.error_track(error).await,
            }
        }

        if self.token.is_cancelled() {
            return self.error_track(self.cancelled_error(options)).await;
        }

        debug!(target: "interflow", method = %options.method, url = %options.url, "handing off to transport");
        let outcome = tokio::select! {
            outcome = self.transport.exchange(options.clone()) => outcome,
            _ = self.token.cancelled() => Err(TransportError::Aborted),
        };
        match outcome {
            Ok(response) => self.response_track(response).await,
            Err(err) => {
                let error = self.normalize_transport(options, err);
                self.error_track(error).await
            }
        }
    }

    async fn response_track(&self, mut response: Response) -> Result<Response, ExchangeError> {
        if self.token.is_cancelled() {
            let error = self
                .cancelled_error(response.options.clone())
                .with_response(response);
            return self.error_track(error).await;
        }

        for interceptor in &self.chain {
            let flow = match self.invoke_response(interceptor, response.clone()).await {
                Step::Flow(flow) => flow,
                Step::Fault(fault) => {
                    warn!(target: "interflow", "response interceptor fault: {fault}");
                    let error = ExchangeError::unknown(response.options.clone(), fault)
                        .with_response(response);
                    return self.error_track(error).await;
                }
            };
            if self.token.is_cancelled() {
                let error = match flow {
                    ResponseFlow::Next(interim) | ResponseFlow::Resolve(interim) => self
                        .cancelled_error(interim.options.clone())
                        .with_response(interim),
                    ResponseFlow::Reject { error, .. } => {
                        let options = error.options().clone();
                        self.cancelled_error(options).with_cause(Box::new(error))
                    }
                };
                return self.error_track(error).await;
            }
            match flow {
                ResponseFlow::Next(next) => response = next,
                ResponseFlow::Resolve(next) => return Ok(next),
                ResponseFlow::Reject {
                    error,
                    call_following: false,
                } => return Err(error),
                ResponseFlow::Reject {
                    error,
                    call_following: true,
                } => return self.error_track(error).await,
            }
        }

        Ok(response)
    }

    async fn error_track(&self, mut error: ExchangeError) -> Result<Response, ExchangeError> {
        for interceptor in &self.chain {
            let options = error.options().clone();
            match self.invoke_error(interceptor, error).await {
                Step::Flow(ErrorFlow::Next(next)) => error = next,
                Step::Flow(ErrorFlow::Resolve(response)) => return Ok(response),
                Step::Flow(ErrorFlow::Reject(next)) => return Err(next),
                Step::Fault(fault) => {
                    warn!(target: "interflow", "error interceptor fault: {fault}");
                    error = ExchangeError::unknown(options, fault);
                }
            }
        }
        Err(error)
    }

    async fn invoke_request(
        &self,
        interceptor: &InterceptorObject,
        options: RequestOptions,
    ) -> Step<RequestFlow> {
        let slot = match interceptor.lane() {
            Some(lane) => Some(lane.admit().await),
            None => None,
        };
        let (handler, sink) = RequestHandler::channel();
        let (outcome, flow) = tokio::join!(interceptor.on_request(options, handler), async move {
            let flow = sink.await.ok();
            drop(slot);
            flow
        });
        step(outcome, flow)
    }

    async fn invoke_response(
        &self,
        interceptor: &InterceptorObject,
        response: Response,
    ) -> Step<ResponseFlow> {
        let slot = match interceptor.lane() {
            Some(lane) => Some(lane.admit().await),
            None => None,
        };
        let (handler, sink) = ResponseHandler::channel();
        let (outcome, flow) = tokio::join!(interceptor.on_response(response, handler), async move {
            let flow = sink.await.ok();
            drop(slot);
            flow
        });
        step(outcome, flow)
    }

    async fn invoke_error(
        &self,
        interceptor: &InterceptorObject,
        error: ExchangeError,
    ) -> Step<ErrorFlow> {
        let slot = match interceptor.lane() {
            Some(lane) => Some(lane.admit().await),
            None => None,
        };
        let (handler, sink) = ErrorHandler::channel();
        let (outcome, flow) = tokio::join!(interceptor.on_error(error, handler), async move {
            let flow = sink.await.ok();
            drop(slot);
            flow
        });
        step(outcome, flow)
    }

    fn cancel_rewrite_request(&self, flow: RequestFlow) -> RequestFlow {
        if !self.token.is_cancelled() {
            return flow;
        }
        let error = match flow {
            RequestFlow::Next(options) => self.cancelled_error(options),
            RequestFlow::Resolve { response, .. } => {
                let options = response.options.clone();
                self.cancelled_error(options).with_response(response)
            }
            RequestFlow::Reject { error, .. } => {
                let options = error.options().clone();
                self.cancelled_error(options).with_cause(Box::new(error))
            }
        };
        RequestFlow::Reject {
            error,
            call_following: true,
        }
    }

    fn cancelled_error(&self, options: RequestOptions) -> ExchangeError {
        ExchangeError::cancelled(options, self.token.reason())
    }

    fn normalize_transport(&self, options: RequestOptions, err: TransportError) -> ExchangeError {
        if self.token.is_cancelled() {
            return self.cancelled_error(options).with_cause(Box::new(err));
        }
        match err {
            TransportError::ConnectTimeout => ExchangeError::connection_timeout(options),
            TransportError::SendTimeout => ExchangeError::send_timeout(options),
            TransportError::ReceiveTimeout => ExchangeError::receive_timeout(options),
            TransportError::BadCertificate(detail) => {
                ExchangeError::bad_certificate(options, detail)
            }
            TransportError::Connection(detail) => ExchangeError::connection(options, detail),
            TransportError::Aborted => self.cancelled_error(options),
            TransportError::Other(cause) => ExchangeError::unknown(options, cause),
        }
    }
}
