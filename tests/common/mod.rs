#![allow(dead_code)]

use crossbeam::channel::{self, Receiver, Sender};
use rkvs::{KvsEngine, MemStore};

/// `GET` of this key blocks the worker running it until the test releases the gate
pub const GATE_KEY: &str = "gate";
/// `GET` of this key panics inside the worker
pub const BOOM_KEY: &str = "boom";

pub fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// A [`MemStore`] that parks the calling worker on `GET gate`
pub struct GateEngine {
    inner: MemStore,
    entered: Sender<()>,
    release: Receiver<()>,
}

/// The test's side of a [`GateEngine`]
pub struct Gate {
    /// receives one message each time a worker reaches the gate
    pub entered: Receiver<()>,
    /// each message lets one parked worker through
    pub release: Sender<()>,
}

impl GateEngine {
    pub fn new() -> (GateEngine, Gate) {
        let (entered_tx, entered_rx) = channel::unbounded();
        let (release_tx, release_rx) = channel::unbounded();
        (
            GateEngine {
                inner: MemStore::new(),
                entered: entered_tx,
                release: release_rx,
            },
            Gate {
                entered: entered_rx,
                release: release_tx,
            },
        )
    }
}

impl KvsEngine for GateEngine {
    fn put(&mut self, key: String, value: String) {
        self.inner.put(key, value);
    }

    fn get(&self, key: &str) -> Option<String> {
        if key == GATE_KEY {
            let _ = self.entered.send(());
            let _ = self.release.recv();
        }
        self.inner.get(key)
    }

    fn delete(&mut self, key: &str) {
        self.inner.delete(key);
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// A [`MemStore`] whose `GET boom` panics
#[derive(Default)]
pub struct PanicEngine {
    inner: MemStore,
}

impl KvsEngine for PanicEngine {
    fn put(&mut self, key: String, value: String) {
        self.inner.put(key, value);
    }

    fn get(&self, key: &str) -> Option<String> {
        if key == BOOM_KEY {
            panic!("engine blew up on '{}'", key);
        }
        self.inner.get(key)
    }

    fn delete(&mut self, key: &str) {
        self.inner.delete(key);
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
