//! Transaction intake port: `create_add` pulls from this to fill the next
//! unit. The only adapter implemented is an in-memory queue; a real network
//! listener accepting client transactions is out of scope, matching the
//! client-transaction-intake design note.

use aleph_types::Transaction;
use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

/// What `create_add` drains from on every tick.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Pulls up to `max` queued transactions. Returns fewer than `max`
    /// (including zero) whenever the queue does not hold that many yet;
    /// never blocks waiting for more to arrive.
    async fn drain(&self, max: usize) -> Vec<Transaction>;
}

/// Handle used by whatever feeds transactions in (a test harness, a future
/// client-facing adapter) to enqueue them for `create_add`.
#[derive(Clone)]
pub struct TransactionSender(mpsc::Sender<Transaction>);

impl TransactionSender {
    pub async fn submit(&self, tx: Transaction) -> Result<(), mpsc::error::SendError<Transaction>> {
        self.0.send(tx).await
    }
}

/// Bounded in-memory transaction queue.
pub struct InMemoryTransactionQueue {
    receiver: Mutex<mpsc::Receiver<Transaction>>,
}

impl InMemoryTransactionQueue {
    pub fn new(capacity: usize) -> (Self, TransactionSender) {
        let (tx, rx) = mpsc::channel(capacity);
        (InMemoryTransactionQueue { receiver: Mutex::new(rx) }, TransactionSender(tx))
    }
}

#[async_trait]
impl TransactionSource for InMemoryTransactionQueue {
    async fn drain(&self, max: usize) -> Vec<Transaction> {
        let mut rx = self.receiver.lock().await;
        let mut out = Vec::with_capacity(max.min(64));
        while out.len() < max {
            match rx.try_recv() {
                Ok(tx) => out.push(tx),
                Err(_) => break,
            }
        }
        out
    }
}
