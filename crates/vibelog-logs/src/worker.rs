//! Background rotation worker

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};
use vibelog_core::constants::ROTATION_QUEUE_CAPACITY;
use vibelog_core::{Error, Result};

use crate::rotation::RotationCore;

/// A queued rotation
#[derive(Debug)]
pub(crate) struct RotationRequest {
    /// Rotate even when the live file is empty
    pub(crate) force: bool,
    /// Rotation generation seen when the request was made
    pub(crate) generation: u64,
    respond_to: Sender<Result<()>>,
}

/// Completion handle for a rotation request.
///
/// Dropping it does not cancel the rotation.
#[derive(Debug)]
pub struct RotationHandle {
    rx: Receiver<Result<()>>,
}

impl RotationHandle {
    /// A handle that is already resolved
    pub(crate) fn ready(result: Result<()>) -> Self {
        let (tx, rx) = bounded(1);
        // Cannot fail: the channel has room and the receiver is alive
        let _ = tx.send(result);
        Self { rx }
    }

    /// Block until the rotation has finished
    pub fn wait(self) -> Result<()> {
        self.rx
            .recv()
            .unwrap_or_else(|_| Err(Error::RotationWorkerGone))
    }

    /// Block for at most `timeout`. Timing out does not stop the rotation.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<()> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(Error::timeout(format!(
                "rotation did not finish within {:?}",
                timeout
            ))),
            Err(RecvTimeoutError::Disconnected) => Err(Error::RotationWorkerGone),
        }
    }

    /// The result if the rotation has finished, without blocking.
    ///
    /// The result is handed out once.
    pub fn try_result(&self) -> Option<Result<()>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Error::RotationWorkerGone)),
        }
    }
}

/// Single background thread that performs queued rotations.
///
/// The queue is bounded; when it is full the submitter runs the rotation
/// itself. The thread exits once the worker is shut down and the queue drains.
#[derive(Debug)]
pub(crate) struct AsyncRotationWorker {
    tx: Sender<RotationRequest>,
    thread: JoinHandle<()>,
}

impl AsyncRotationWorker {
    pub(crate) fn spawn(core: Arc<RotationCore>) -> Result<Self> {
        let (tx, rx) = bounded(ROTATION_QUEUE_CAPACITY);

        let thread = thread::Builder::new()
            .name("vibelog-rotation".to_string())
            .spawn(move || run(core, rx))?;

        Ok(Self { tx, thread })
    }

    /// Queue a request without blocking; `None` when the worker cannot take it
    pub(crate) fn submit(&self, force: bool, generation: u64) -> Option<RotationHandle> {
        let (respond_to, rx) = bounded(1);
        let request = RotationRequest {
            force,
            generation,
            respond_to,
        };
        match self.tx.try_send(request) {
            Ok(()) => Some(RotationHandle { rx }),
            Err(TrySendError::Full(_)) => {
                debug!("Rotation queue full, rotating inline");
                None
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("Rotation worker is gone, rotating inline");
                None
            }
        }
    }

    /// Stop accepting requests. Does not wait for the thread.
    pub(crate) fn shutdown(self) {
        drop(self.tx);
    }

    /// Stop accepting requests and wait until queued rotations are done
    pub(crate) fn shutdown_and_wait(self) {
        drop(self.tx);
        if self.thread.join().is_err() {
            warn!("Rotation worker panicked");
        }
    }
}

fn run(core: Arc<RotationCore>, rx: Receiver<RotationRequest>) {
    debug!("Rotation worker started");

    for request in rx.iter() {
        let result = core.run_request(request.force, request.generation);
        if let Err(e) = &result {
            warn!("Background rotation failed: {}", e);
        }
        if request.respond_to.send(result).is_err() {
            debug!("Rotation requester went away before the result");
        }
    }

    debug!("Rotation worker stopped");
}
