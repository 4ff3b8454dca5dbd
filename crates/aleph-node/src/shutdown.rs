//! Cooperative shutdown signal: every scheduler task selects on
//! `ShutdownHandle::wait` alongside its real work and exits cleanly once
//! it fires, rather than being aborted mid-mutation.

use tokio::sync::watch;

#[derive(Clone)]
pub struct ShutdownHandle {
    receiver: watch::Receiver<bool>,
}

impl ShutdownHandle {
    pub fn is_shutting_down(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once shutdown has been signalled. Safe to call repeatedly
    /// and to race against other branches in a `select!`.
    pub async fn wait(&mut self) {
        let _ = self.receiver.wait_for(|v| *v).await;
    }
}

pub struct ShutdownController {
    sender: watch::Sender<bool>,
}

impl ShutdownController {
    pub fn new() -> (Self, ShutdownHandle) {
        let (sender, receiver) = watch::channel(false);
        (ShutdownController { sender }, ShutdownHandle { receiver })
    }

    pub fn shut_down(&self) {
        let _ = self.sender.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn waiters_are_released_on_shutdown() {
        let (controller, mut handle) = ShutdownController::new();
        assert!(!handle.is_shutting_down());
        controller.shut_down();
        handle.wait().await;
        assert!(handle.is_shutting_down());
    }
}
