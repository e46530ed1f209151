//! The request-dispatch engine.
//!
//! A [`Dispatcher`] owns the storage engine and a fixed pool of worker threads that consume
//! units of work from a bounded crossbeam channel. Every unit of work runs the command
//! interpreter while holding the single engine lock, so at most one store operation is in
//! flight at any instant no matter how many workers the pool has.
//!
//! Callers get a [`PendingResult`] back from [`Dispatcher::submit`] and block on
//! [`PendingResult::wait`] until their unit of work completes, fails, or the call deadline
//! passes. Each unit of work moves through `Queued -> Running -> Completed | Failed`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TrySendError};
use crossbeam::sync::WaitGroup;
use tracing::{debug, error, info, instrument, warn};

use crate::{interpreter, DispatcherConfig, KvsEngine, KvsError, Result};

/// what a worker hands back to the caller waiting on a unit of work
#[derive(Debug)]
enum Outcome {
    Completed(String),
    Rejected,
}

/// one queued command together with the slot its result goes into
struct Task {
    id: u64,
    command: String,
    args: Vec<String>,
    reply: Sender<Outcome>,
}

/// state shared between the dispatcher and its workers
struct Shared<E> {
    engine: Mutex<E>,
    shutting_down: AtomicBool,
}

/// A bounded worker pool that serializes all access to a [`KvsEngine`].
///
/// Submission never blocks: when all workers are busy the unit of work waits in a queue of
/// fixed capacity, and once that queue is full [`submit`](Dispatcher::submit) fails with
/// [`KvsError::Busy`].
///
/// If a unit of work panics, its worker thread is replaced by a new one and the caller gets
/// [`KvsError::ExecutionFault`]. The dispatcher never retries a unit of work.
pub struct Dispatcher<E: KvsEngine> {
    shared: Arc<Shared<E>>,
    // `None` once shutdown has closed the queue
    tx: Mutex<Option<Sender<Task>>>,
    // every worker holds a clone; waiting on it means waiting for the pool to drain
    workers: Mutex<Option<WaitGroup>>,
    next_id: AtomicU64,
    pool_size: usize,
    call_timeout: Option<Duration>,
}

impl<E: KvsEngine> Dispatcher<E> {
    /// creates a dispatcher that owns `engine`, and starts `config.pool_size` workers
    ///
    /// # Errors
    /// returns [`KvsError::Config`] for an invalid configuration, or [`KvsError::Io`] if a
    /// worker thread could not be spawned
    pub fn new(engine: E, config: &DispatcherConfig) -> Result<Self> {
        config.validate()?;

        let (tx, rx) = channel::bounded::<Task>(config.queue_capacity);
        let shared = Arc::new(Shared {
            engine: Mutex::new(engine),
            shutting_down: AtomicBool::new(false),
        });
        let running = WaitGroup::new();

        for _ in 0..config.pool_size {
            spawn_worker(Worker {
                rx: rx.clone(),
                shared: Arc::clone(&shared),
                _running: running.clone(),
            })?;
        }
        info!(
            pool_size = config.pool_size,
            queue_capacity = config.queue_capacity,
            "dispatcher started"
        );

        Ok(Dispatcher {
            shared,
            tx: Mutex::new(Some(tx)),
            workers: Mutex::new(Some(running)),
            next_id: AtomicU64::new(1),
            pool_size: config.pool_size,
            call_timeout: config.call_timeout,
        })
    }

    /// enqueues `command` with `args` and returns a handle to its eventual result
    ///
    /// # Errors
    /// - [`KvsError::Busy`] if the request queue is full
    /// - [`KvsError::ShuttingDown`] if [`shutdown`](Dispatcher::shutdown) has begun
    /// - [`KvsError::ExecutionFault`] if no worker is left to run the command
    pub fn submit(&self, command: impl Into<String>, args: Vec<String>) -> Result<PendingResult> {
        if self.is_shutting_down() {
            return Err(KvsError::ShuttingDown);
        }

        let guard = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = guard.as_ref().ok_or(KvsError::ShuttingDown)?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply, rx) = channel::bounded(1);
        let task = Task {
            id,
            command: command.into(),
            args,
            reply,
        };

        match tx.try_send(task) {
            Ok(()) => {
                debug!(id, queued = tx.len(), "unit of work queued");
                Ok(PendingResult {
                    id,
                    rx,
                    timeout: self.call_timeout,
                })
            }
            Err(TrySendError::Full(task)) => {
                warn!(id = task.id, command = %task.command, "request queue is full");
                Err(KvsError::Busy)
            }
            Err(TrySendError::Disconnected(_)) => {
                error!(id, "no worker is left to run the command");
                Err(KvsError::ExecutionFault("no workers available".to_owned()))
            }
        }
    }

    /// stops accepting submissions, rejects queued work that has not started, and blocks
    /// until in-flight work has finished. Calling it more than once is harmless.
    pub fn shutdown(&self) {
        if self.shared.shutting_down.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("dispatcher shutting down");

        // closing the queue lets workers exit once it is empty
        drop(self.tx.lock().unwrap_or_else(PoisonError::into_inner).take());

        let running = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(running) = running {
            running.wait();
        }
        info!("dispatcher stopped");
    }

    /// true once [`shutdown`](Dispatcher::shutdown) has been called
    pub fn is_shutting_down(&self) -> bool {
        self.shared.shutting_down.load(Ordering::SeqCst)
    }

    /// number of worker threads in the pool
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }
}

impl<E: KvsEngine> Drop for Dispatcher<E> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A handle to a submitted unit of work
#[derive(Debug)]
pub struct PendingResult {
    id: u64,
    rx: Receiver<Outcome>,
    timeout: Option<Duration>,
}

impl PendingResult {
    /// the dispatcher-assigned id of this unit of work, as it appears in the logs
    pub fn id(&self) -> u64 {
        self.id
    }

    /// blocks until the unit of work finishes and returns its result text
    ///
    /// When the deadline passes first the caller stops waiting, but the unit of work is not
    /// cancelled: it still runs to completion and its result is discarded.
    ///
    /// # Errors
    /// - [`KvsError::DeadlineExceeded`] if the call deadline passed
    /// - [`KvsError::ShuttingDown`] if the work was still queued when shutdown began
    /// - [`KvsError::ExecutionFault`] if the work could not run to completion
    pub fn wait(self) -> Result<String> {
        let fault = || {
            KvsError::ExecutionFault("worker terminated before completing the command".to_owned())
        };

        let outcome = match self.timeout {
            Some(timeout) => self.rx.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => KvsError::DeadlineExceeded(timeout),
                RecvTimeoutError::Disconnected => fault(),
            })?,
            None => self.rx.recv().map_err(|_| fault())?,
        };

        match outcome {
            Outcome::Completed(text) => Ok(text),
            Outcome::Rejected => Err(KvsError::ShuttingDown),
        }
    }
}

/// A worker thread's view of the pool.
///
/// If a unit of work panics, dropping the worker during unwinding starts a replacement
/// so the pool keeps its size.
struct Worker<E: KvsEngine> {
    rx: Receiver<Task>,
    shared: Arc<Shared<E>>,
    _running: WaitGroup,
}

impl<E: KvsEngine> Worker<E> {
    #[instrument(name = "worker", skip(self))]
    fn run(self) {
        for task in self.rx.iter() {
            self.process(task);
        }
        debug!("worker exiting, queue closed");
    }

    fn process(&self, task: Task) {
        let Task {
            id,
            command,
            args,
            reply,
        } = task;

        if self.shared.shutting_down.load(Ordering::SeqCst) {
            warn!(id, %command, "rejecting queued command, server shutting down");
            let _ = reply.send(Outcome::Rejected);
            return;
        }

        debug!(id, "Received command: {} {}", command, args.join(" "));
        let result = {
            // a worker that panicked while holding the lock cannot have left a partial write:
            // every engine primitive is a single map operation
            let mut engine = self
                .shared
                .engine
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            interpreter::execute(&mut *engine, &command, &args)
        };
        debug!(id, "Response: {}", result);

        if reply.send(Outcome::Completed(result)).is_err() {
            debug!(id, "caller stopped waiting, result discarded");
        }
    }
}

impl<E: KvsEngine> Drop for Worker<E> {
    fn drop(&mut self) {
        if thread::panicking() {
            warn!("worker panicked, starting a new worker");
            let replacement = Worker {
                rx: self.rx.clone(),
                shared: Arc::clone(&self.shared),
                _running: self._running.clone(),
            };
            if let Err(e) = spawn_worker(replacement) {
                error!("failed to spawn a replacement worker: {}", e);
            }
        }
    }
}

fn spawn_worker<E: KvsEngine>(worker: Worker<E>) -> Result<()> {
    thread::Builder::new()
        .name("rkvs-worker".to_owned())
        .spawn(move || worker.run())?;
    Ok(())
}
