pub mod cancel;
pub mod client;
pub mod dispatch;
pub mod errors;
pub mod handler;
pub mod interceptors;
pub mod observe;
pub mod prelude;
pub mod transport;
pub mod types;

pub use client::{Client, ClientBuilder};
pub use interceptors::{Interceptor, InterceptorObject};
