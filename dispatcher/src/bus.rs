use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

/// One undelivered message plus its payload bytes. `id` is only meaningful
/// to the [`MessageBus`] that produced it.
#[derive(Debug, Clone)]
pub struct BusMessage {
    pub id: u64,
    pub payload: Vec<u8>,
}

/// A managed publish/subscribe bus. Deliberately abstract: the
/// dispatcher never assumes a specific broker (Kafka, NATS, a cloud
/// Pub/Sub topic) — it only needs sequential delivery and an ack/nack
/// contract, the same seam `prism-broker::VenueTransport` draws around
/// brokerage wire protocols.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Waits for the next message, or returns `None` once the bus is
    /// closed and drained.
    async fn recv(&self) -> Option<BusMessage>;

    /// Acknowledges successful handling. Only called after the in-memory
    /// handoff to the coordinator or the persistent enqueue has completed.
    async fn ack(&self, message: &BusMessage);

    /// Signals that handling failed before a durable or in-memory handoff
    /// completed; the bus should redeliver.
    async fn nack(&self, message: &BusMessage);
}

/// In-process bus backed by a `tokio::mpsc` channel. The reference
/// transport for a single-node deployment: `nack` redelivers by pushing
/// the message to the back of the same queue, since there is no external
/// broker to ask for redelivery.
pub struct InProcessBus {
    sender: mpsc::UnboundedSender<BusMessage>,
    receiver: Mutex<mpsc::UnboundedReceiver<BusMessage>>,
    next_id: std::sync::atomic::AtomicU64,
}

impl std::fmt::Debug for InProcessBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessBus").finish_non_exhaustive()
    }
}

impl InProcessBus {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
            next_id: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Publishes a raw payload onto the queue. Used by `app`'s producer
    /// side and directly by tests.
    pub fn publish(&self, payload: Vec<u8>) {
        let id = self.next_id.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        // An unbounded sender only fails once every receiver has dropped,
        // which only happens alongside this same struct being dropped.
        let _ = self.sender.send(BusMessage { id, payload });
    }
}

impl Default for InProcessBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBus for InProcessBus {
    async fn recv(&self) -> Option<BusMessage> {
        self.receiver.lock().await.recv().await
    }

    async fn ack(&self, _message: &BusMessage) {}

    async fn nack(&self, message: &BusMessage) {
        let _ = self.sender.send(message.clone());
    }
}
