use std::sync::Arc;

use tokio::sync::watch;

/// One-shot readiness flag. Starts unready; `mark_ready` flips it once and
/// every waiter observes it.
#[derive(Clone)]
pub struct Readiness {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

impl Readiness {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn mark_ready(&self) {
        let changed = self.tx.send_if_modified(|ready| !std::mem::replace(ready, true));
        if changed {
            log::info!("service is ready");
        }
    }

    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the service is ready.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn waiters_resolve_once_marked() {
        let readiness = Readiness::new();
        assert!(!readiness.is_ready());

        let waiter = {
            let r = readiness.clone();
            tokio::spawn(async move { r.wait().await })
        };
        readiness.mark_ready();
        readiness.mark_ready();

        waiter.await.expect("waiter finished");
        assert!(readiness.is_ready());
        readiness.wait().await;
    }
}
