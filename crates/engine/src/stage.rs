//! Worker pools connected by bounded channels.
//!
//! A pool is N identical workers sharing one input receiver. Every worker
//! holds a clone of the same output sender, so the pool's outputs are merged
//! into a single stream for the next stage. The output channel closes once
//! the last worker (and every other holder of the sender) is gone.

use crate::error::{EngineError, Result};
use crossbeam_channel::{Receiver, Sender};
use std::thread::{self, JoinHandle};

/// One unit of per-record work inside a pool.
pub trait Stage: Send + Sized + 'static {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Name used in thread names and error messages.
    const NAME: &'static str;

    /// Handle one input, emitting zero or more outputs.
    fn process(&mut self, input: Self::Input, out: &Emitter<Self::Output>) -> Result<()>;
}

/// Sending half handed to a stage.
pub struct Emitter<T> {
    tx: Sender<T>,
    stage: &'static str,
}

impl<T> Emitter<T> {
    pub fn new(tx: Sender<T>, stage: &'static str) -> Self {
        Self { tx, stage }
    }

    /// Blocks while the downstream queue is full.
    pub fn emit(&self, item: T) -> Result<()> {
        self.tx
            .send(item)
            .map_err(|_| EngineError::Disconnected(self.stage))
    }
}

/// Handles of a running pool. Joining returns the workers so any state they
/// accumulated can be inspected.
pub struct Pool<S> {
    handles: Vec<JoinHandle<Result<S>>>,
}

impl<S: Stage> Pool<S> {
    pub fn join(self) -> Result<Vec<S>> {
        let mut workers = Vec::with_capacity(self.handles.len());
        let mut first_err = None;
        for handle in self.handles {
            match handle.join() {
                Ok(Ok(worker)) => workers.push(worker),
                Ok(Err(e)) => {
                    first_err.get_or_insert(e);
                }
                Err(_) => {
                    first_err.get_or_insert(EngineError::WorkerPanic(S::NAME));
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(workers),
        }
    }
}

/// Start one thread per worker. The caller's `output` sender is cloned into
/// each worker and then dropped.
pub fn spawn_pool<S: Stage>(
    workers: Vec<S>,
    input: &Receiver<S::Input>,
    output: Sender<S::Output>,
) -> Result<Pool<S>> {
    let mut handles = Vec::with_capacity(workers.len());
    for (idx, mut worker) in workers.into_iter().enumerate() {
        let rx = input.clone();
        let emitter = Emitter::new(output.clone(), S::NAME);
        let handle = thread::Builder::new()
            .name(format!("{}-{idx}", S::NAME))
            .spawn(move || {
                for item in rx {
                    worker.process(item, &emitter)?;
                }
                Ok(worker)
            })?;
        handles.push(handle);
    }
    Ok(Pool { handles })
}
