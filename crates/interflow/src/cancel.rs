use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

#[derive(Clone)]
pub struct CancelToken {
    shared: Arc<Shared>,
}

struct Shared {
    fired: watch::Sender<bool>,
    reason: Mutex<Option<String>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (fired, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                fired,
                reason: Mutex::new(None),
            }),
        }
    }

    pub fn cancel(&self) {
        self.shared.fired.send_replace(true);
    }

    pub fn cancel_with(&self, reason: impl Into<String>) {
        *self.shared.reason.lock() = Some(reason.into());
        self.shared.fired.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.shared.fired.borrow()
    }

    pub fn reason(&self) -> Option<String> {
        self.shared.reason.lock().clone()
    }

    pub async fn cancelled(&self) {
        let mut rx = self.shared.fired.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
