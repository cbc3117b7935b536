use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

type Gate = Arc<tokio::sync::Mutex<()>>;

/// Serialises work per key: callers with the same key run one at a time.
///
/// The second caller runs after the first has finished, so work should
/// re-check whatever the first one produced. Entries leave the map when the
/// last caller for a key is done, including callers that were cancelled.
pub struct SingleFlight<K> {
    gates: Mutex<HashMap<K, Gate>>,
}

impl<K: Eq + Hash + Clone> SingleFlight<K> {
    pub fn new() -> Self {
        SingleFlight {
            gates: Mutex::new(HashMap::new()),
        }
    }

    pub async fn run<F: Future>(&self, key: K, work: F) -> F::Output {
        let gate = {
            let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(gates.entry(key.clone()).or_default())
        };
        let _leave = Leave {
            flight: self,
            key,
            gate: &gate,
        };
        let _held = gate.lock().await;
        work.await
    }

    /// Keys with a caller running or waiting
    pub fn len(&self) -> usize {
        self.gates.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash + Clone> Default for SingleFlight<K> {
    fn default() -> Self {
        Self::new()
    }
}

struct Leave<'a, K: Eq + Hash> {
    flight: &'a SingleFlight<K>,
    key: K,
    gate: &'a Gate,
}

impl<K: Eq + Hash> Drop for Leave<'_, K> {
    fn drop(&mut self) {
        let mut gates = self.flight.gates.lock().unwrap_or_else(PoisonError::into_inner);
        // one reference in the map, one held by this caller: nobody else is waiting
        if Arc::strong_count(self.gate) == 2 {
            gates.remove(&self.key);
        }
    }
}
