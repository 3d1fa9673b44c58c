use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use parking_lot::Mutex;
use serde_json::json;
use url::Url;

use interflow::prelude::*;

fn url(path: &str) -> Url {
    Url::parse(&format!("http://test.local{path}")).expect("url")
}

fn bump(mut response: Response) -> Response {
    let current = response.body["data"].as_i64().unwrap_or(0);
    response.body["data"] = json!(current + 1);
    response
}

#[derive(Clone, Default)]
struct EchoTransport {
    seen: Arc<Mutex<Vec<RequestOptions>>>,
}

#[async_trait]
impl Transport for EchoTransport {
    async fn exchange(&self, options: RequestOptions) -> Result<Response, TransportError> {
        self.seen.lock().push(options.clone());
        Ok(Response::new(options, StatusCode::OK).with_body(json!({"echo": true})))
    }
}

#[tokio::test]
async fn request_resolve_short_circuits_transport_and_response_track() {
    let transport = EchoTransport::default();
    let response_hits = Arc::new(Mutex::new(0usize));
    let client = Client::builder()
        .with_transport(transport.clone())
        .with_interceptor(
            HookInterceptor::new()
                .request(|options, handler| {
                    Box::pin(async move {
                        let response = Response::new(options, StatusCode::OK)
                            .with_body(json!({"data": 1}));
                        handler.resolve(response, false)?;
                        Ok(())
                    })
                })
                .response({
                    let hits = response_hits.clone();
                    move |response, handler| {
                        let hits = hits.clone();
                        Box::pin(async move {
                            *hits.lock() += 1;
                            handler.next(response)?;
                            Ok(())
                        })
                    }
                }),
        )
        .build();

    let response = client
        .dispatch(RequestOptions::get(url("/resolve")))
        .await
        .expect("resolved");
    assert_eq!(response.body["data"], 1);
    assert_eq!(*response_hits.lock(), 0);
    assert!(transport.seen.lock().is_empty());
}

#[tokio::test]
async fn resolve_with_call_following_enters_response_track_at_the_front() {
    let transport = EchoTransport::default();
    let client = Client::builder()
        .with_transport(transport.clone())
        .with_interceptor(
            HookInterceptor::new()
                .request(|options, handler| {
                    Box::pin(async move {
                        let response = Response::new(options, StatusCode::OK)
                            .with_body(json!({"data": 2}));
                        handler.resolve(response, true)?;
                        Ok(())
                    })
                })
                .response(|response, handler| {
                    Box::pin(async move {
                        handler.resolve(bump(response))?;
                        Ok(())
                    })
                }),
        )
        .with_interceptor(HookInterceptor::new().response(|response, handler| {
            Box::pin(async move {
                handler.next(bump(response))?;
                Ok(())
            })
        }))
        .build();

    let response = client
        .dispatch(RequestOptions::get(url("/resolve")))
        .await
        .expect("resolved");
    assert_eq!(response.body["data"], 3);
    assert!(transport.seen.lock().is_empty());
}

#[tokio::test]
async fn resolve_with_call_following_and_next_reaches_later_response_interceptors() {
    let transport = EchoTransport::default();
    let client = Client::builder()
        .with_transport(transport.clone())
        .with_interceptor(
            HookInterceptor::new()
                .request(|options, handler| {
                    Box::pin(async move {
                        let response = Response::new(options, StatusCode::OK)
                            .with_body(json!({"data": 2}));
                        handler.resolve(response, true)?;
                        Ok(())
                    })
                })
                .response(|response, handler| {
                    Box::pin(async move {
                        handler.next(bump(response))?;
                        Ok(())
                    })
                }),
        )
        .with_interceptor(HookInterceptor::new().response(|response, handler| {
            Box::pin(async move {
                handler.next(bump(response))?;
                Ok(())
            })
        }))
        .build();

    let response = client
        .dispatch(RequestOptions::get(url("/resolve")))
        .await
        .expect("resolved");
    assert_eq!(response.body["data"], 4);
}

#[tokio::test]
async fn reject_with_call_following_accumulates_across_error_track() {
    let transport = EchoTransport::default();
    let client = Client::builder()
        .with_transport(transport.clone())
        .with_interceptor(
            HookInterceptor::new()
                .request(|options, handler| {
                    Box::pin(async move {
                        let error = ExchangeError::new(ErrorKind::BadResponse, options)
                            .with_message("4");
                        handler.reject(error, true)?;
                        Ok(())
                    })
                })
                .error(|error, handler| {
                    Box::pin(async move {
                        let count: i64 = error.message().unwrap_or("0").parse().unwrap();
                        handler.next(error.with_message((count + 1).to_string()))?;
                        Ok(())
                    })
                }),
        )
        .with_interceptor(HookInterceptor::new().error(|error, handler| {
            Box::pin(async move {
                let count: i64 = error.message().unwrap_or("0").parse().unwrap();
                handler.next(error.with_message((count + 1).to_string()))?;
                Ok(())
            })
        }))
        .build();

    let error = client
        .dispatch(RequestOptions::get(url("/reject")))
        .await
        .expect_err("rejected");
    assert_eq!(error.message(), Some("6"));
    assert!(transport.seen.lock().is_empty());
}

#[tokio::test]
async fn duplicate_handler_call_surfaces_the_invariant_violation() {
    let client = Client::builder()
        .with_transport(EchoTransport::default())
        .with_interceptor(HookInterceptor::new().request(|options, handler| {
            Box::pin(async move {
                handler.next(options.clone())?;
                handler.next(options)?;
                Ok(())
            })
        }))
        .build();

    let error = client
        .dispatch(RequestOptions::get(url("/twice")))
        .await
        .expect_err("must fail");
    assert_eq!(error.kind(), ErrorKind::Unknown);
    assert!(error.is_invariant_violation());
    let cause = error.cause().expect("cause");
    assert_eq!(cause.to_string(), HANDLER_ALREADY_CALLED);
}

#[tokio::test]
async fn hook_fault_before_handler_enters_the_error_track_as_unknown() {
    let recovered = Arc::new(Mutex::new(Vec::new()));
    let client = Client::builder()
        .with_transport(EchoTransport::default())
        .with_interceptor(HookInterceptor::new().request(|_options, _handler| {
            Box::pin(async move { Err::<(), BoxError>("request signing failed".into()) })
        }))
        .with_interceptor(HookInterceptor::new().error({
            let recovered = recovered.clone();
            move |error, handler| {
                let recovered = recovered.clone();
                Box::pin(async move {
                    recovered.lock().push(error.kind());
                    handler.next(error)?;
                    Ok(())
                })
            }
        }))
        .build();

    let error = client
        .dispatch(RequestOptions::get(url("/fault")))
        .await
        .expect_err("must fail");
    assert_eq!(error.kind(), ErrorKind::Unknown);
    assert_eq!(error.cause().expect("cause").to_string(), "request signing failed");
    assert_eq!(recovered.lock().as_slice(), &[ErrorKind::Unknown]);
}

#[tokio::test]
async fn hook_without_handler_call_is_an_invariant_violation() {
    let client = Client::builder()
        .with_transport(EchoTransport::default())
        .with_interceptor(
            HookInterceptor::new()
                .request(|_options, _handler| Box::pin(async move { Ok(()) })),
        )
        .build();

    let error = client
        .dispatch(RequestOptions::get(url("/dropped")))
        .await
        .expect_err("must fail");
    assert_eq!(error.kind(), ErrorKind::Unknown);
    assert!(error.is_invariant_violation());
}

#[tokio::test]
async fn full_chain_runs_request_track_transport_then_response_track_in_order() {
    let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = |tag: &'static str, events: &Arc<Mutex<Vec<String>>>| {
        HookInterceptor::new()
            .request({
                let events = events.clone();
                move |options, handler| {
                    let events = events.clone();
                    Box::pin(async move {
                        events.lock().push(format!("request:{tag}"));
                        handler.next(options)?;
                        Ok(())
                    })
                }
            })
            .response({
                let events = events.clone();
                move |response, handler| {
                    let events = events.clone();
                    Box::pin(async move {
                        events.lock().push(format!("response:{tag}"));
                        handler.next(response)?;
                        Ok(())
                    })
                }
            })
    };

    struct LoggingTransport {
        events: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Transport for LoggingTransport {
        async fn exchange(&self, options: RequestOptions) -> Result<Response, TransportError> {
            self.events.lock().push("transport".to_string());
            Ok(Response::new(options, StatusCode::OK))
        }
    }

    let client = Client::builder()
        .with_transport(LoggingTransport {
            events: events.clone(),
        })
        .with_interceptor(recorder("a", &events))
        .with_interceptor(recorder("b", &events))
        .build();

    client
        .dispatch(RequestOptions::get(url("/order")))
        .await
        .expect("success");
    assert_eq!(
        events.lock().as_slice(),
        &[
            "request:a",
            "request:b",
            "transport",
            "response:a",
            "response:b"
        ]
    );
}

#[tokio::test]
async fn response_reject_with_call_following_restarts_error_track_at_the_front() {
    let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let client = Client::builder()
        .with_transport(EchoTransport::default())
        .with_interceptor(HookInterceptor::new().error({
            let events = events.clone();
            move |error, handler| {
                let events = events.clone();
                Box::pin(async move {
                    events.lock().push("error:first".to_string());
                    handler.next(error)?;
                    Ok(())
                })
            }
        }))
        .with_interceptor(HookInterceptor::new().response(|response, handler| {
            Box::pin(async move {
                let error = ExchangeError::bad_response(response, "policy rejected");
                handler.reject(error, true)?;
                Ok(())
            })
        }))
        .build();

    let error = client
        .dispatch(RequestOptions::get(url("/policy")))
        .await
        .expect_err("rejected");
    assert_eq!(error.kind(), ErrorKind::BadResponse);
    assert_eq!(events.lock().as_slice(), &["error:first"]);
}

#[tokio::test]
async fn response_reject_without_call_following_skips_error_interceptors() {
    let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let client = Client::builder()
        .with_transport(EchoTransport::default())
        .with_interceptor(HookInterceptor::new().error({
            let events = events.clone();
            move |error, handler| {
                let events = events.clone();
                Box::pin(async move {
                    events.lock().push("error:first".to_string());
                    handler.next(error)?;
                    Ok(())
                })
            }
        }))
        .with_interceptor(HookInterceptor::new().response(|response, handler| {
            Box::pin(async move {
                let error = ExchangeError::bad_response(response, "policy rejected");
                handler.reject(error, false)?;
                Ok(())
            })
        }))
        .build();

    let error = client
        .dispatch(RequestOptions::get(url("/policy")))
        .await
        .expect_err("rejected");
    assert_eq!(error.kind(), ErrorKind::BadResponse);
    assert!(events.lock().is_empty());
}

#[tokio::test]
async fn error_track_resolve_recovers_to_success() {
    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn exchange(&self, _options: RequestOptions) -> Result<Response, TransportError> {
            Err(TransportError::Connection("refused".to_string()))
        }
    }

    let client = Client::builder()
        .with_transport(FailingTransport)
        .with_interceptor(HookInterceptor::new().error(|error, handler| {
            Box::pin(async move {
                let fallback = Response::new(error.options().clone(), StatusCode::OK)
                    .with_body(json!({"recovered": true}));
                handler.resolve(fallback)?;
                Ok(())
            })
        }))
        .build();

    let response = client
        .dispatch(RequestOptions::get(url("/flaky")))
        .await
        .expect("recovered");
    assert_eq!(response.body["recovered"], true);
}

#[tokio::test]
async fn transport_errors_are_normalized_into_the_taxonomy() {
    struct TimeoutTransport;

    #[async_trait]
    impl Transport for TimeoutTransport {
        async fn exchange(&self, _options: RequestOptions) -> Result<Response, TransportError> {
            Err(TransportError::ReceiveTimeout)
        }
    }

    let client = Client::builder().with_transport(TimeoutTransport).build();
    let error = client
        .dispatch(RequestOptions::get(url("/slow")))
        .await
        .expect_err("timeout");
    assert_eq!(error.kind(), ErrorKind::ReceiveTimeout);
    assert_eq!(error.options().url.path(), "/slow");
}
