use std::sync::Arc;

pub type SharedLogSink = Arc<dyn LogSink>;

pub trait LogSink: Send + Sync {
    fn notice(&self, message: &str);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLogSink;

impl LogSink for NoopLogSink {
    fn notice(&self, _message: &str) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn notice(&self, message: &str) {
        tracing::warn!(target: "interflow", "{message}");
    }
}
