//! Duplicate suppression for concurrent identical reads.
//!
//! A [`RequestCoalescer`] tracks reads that are currently executing, keyed by
//! [`RequestSignature`]. The first caller for a signature drives the call;
//! callers arriving while it runs wait for the same result. Once the call
//! finishes its entry is dropped, so nothing is cached past the lifetime of
//! the in-flight call.
//!
//! If the driving caller is dropped before publishing, its entry is removed
//! and one of the waiting callers takes over with its own call.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use super::Error;

/// Exact identity of an inbound read: method plus full path and query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestSignature(String);

impl RequestSignature {
    /// Build a signature; the method is upper-cased, the target kept verbatim.
    pub fn new(method: &str, path_and_query: &str) -> Self {
        Self(format!("{} {path_and_query}", method.to_ascii_uppercase()))
    }

    /// Borrow the signature text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

type Outcome<V> = Option<Result<V, Error>>;
type Registry<V> = Arc<Mutex<HashMap<RequestSignature, watch::Receiver<Outcome<V>>>>>;

/// One registry per logical read endpoint.
pub struct RequestCoalescer<V> {
    in_flight: Registry<V>,
}

impl<V> Clone for RequestCoalescer<V> {
    fn clone(&self) -> Self {
        Self {
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<V> Default for RequestCoalescer<V> {
    fn default() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<V> fmt::Debug for RequestCoalescer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestCoalescer")
            .field("in_flight", &lock(&self.in_flight).len())
            .finish()
    }
}

fn lock<V>(registry: &Registry<V>) -> MutexGuard<'_, HashMap<RequestSignature, watch::Receiver<Outcome<V>>>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Publishes the leader's outcome, or clears the entry if the leader is
/// dropped first so waiters can retry.
struct Publisher<V> {
    registry: Registry<V>,
    signature: RequestSignature,
    sender: Option<watch::Sender<Outcome<V>>>,
}

impl<V> Publisher<V> {
    fn publish(mut self, outcome: Result<V, Error>) {
        lock(&self.registry).remove(&self.signature);
        if let Some(sender) = self.sender.take() {
            sender.send_replace(Some(outcome));
        }
    }
}

impl<V> Drop for Publisher<V> {
    fn drop(&mut self) {
        if self.sender.is_some() {
            lock(&self.registry).remove(&self.signature);
        }
    }
}

async fn wait_for_outcome<V: Clone>(receiver: &mut watch::Receiver<Outcome<V>>) -> Outcome<V> {
    receiver
        .wait_for(Option::is_some)
        .await
        .ok()
        .and_then(|value| value.clone())
}

impl<V> RequestCoalescer<V>
where
    V: Clone,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of signatures with a call in flight.
    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }

    /// Run `call` unless an identical read is already in flight, in which
    /// case wait for and share its result.
    ///
    /// `call` is invoked only by the caller that drives the shared call, or
    /// by a waiter taking over from a driver that was dropped.
    ///
    /// # Errors
    ///
    /// Returns the shared call's error.
    pub async fn run<F, Fut>(&self, signature: &RequestSignature, call: F) -> Result<V, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, Error>>,
    {
        let sender = loop {
            match self.join_or_register(signature) {
                Slot::Leader(sender) => break sender,
                Slot::Joined(mut receiver) => {
                    debug!(%signature, "joined in-flight request");
                    if let Some(outcome) = wait_for_outcome(&mut receiver).await {
                        return outcome;
                    }
                    debug!(%signature, "in-flight request abandoned; taking over");
                }
            }
        };

        let publisher = Publisher {
            registry: Arc::clone(&self.in_flight),
            signature: signature.clone(),
            sender: Some(sender),
        };
        let outcome = call().await;
        publisher.publish(outcome.clone());
        outcome
    }

    fn join_or_register(&self, signature: &RequestSignature) -> Slot<V> {
        let mut in_flight = lock(&self.in_flight);
        if let Some(existing) = in_flight.get(signature) {
            return Slot::Joined(existing.clone());
        }
        let (sender, receiver) = watch::channel(None);
        in_flight.insert(signature.clone(), receiver);
        Slot::Leader(sender)
    }
}

/// Outcome of looking a signature up in the registry.
enum Slot<V> {
    /// A call is already running; wait on it.
    Joined(watch::Receiver<Outcome<V>>),
    /// This caller runs the call and publishes through the sender.
    Leader(watch::Sender<Outcome<V>>),
}
