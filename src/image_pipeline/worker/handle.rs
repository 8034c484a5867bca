use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::image_pipeline::common::error::{ProcessingError, Result, SubmitError};
use crate::image_pipeline::worker::kernel::{Kernel, KernelHost};

enum WorkerMessage<K: Kernel> {
    Request(K::Request),
    Ready(K),
    InitFailed(String),
    Exit,
}

/// A kernel running on its own thread.
///
/// The kernel is built by `init` on a helper thread, so [`submit`](Self::submit)
/// can be called straight away: early requests wait behind the init barrier
/// and are answered in submission order. At most `max_in_flight` requests
/// may be outstanding (submitted but not yet received).
pub struct Worker<K: Kernel> {
    name: String,
    tx: Sender<WorkerMessage<K>>,
    rx: Receiver<Result<K::Response>>,
    in_flight: AtomicUsize,
    max_in_flight: usize,
    thread_handle: Option<JoinHandle<()>>,
}

impl<K: Kernel> Worker<K> {
    pub fn spawn<F>(name: impl Into<String>, max_in_flight: usize, init: F) -> Result<Self>
    where
        F: FnOnce() -> Result<K> + Send + 'static,
    {
        let name = name.into();
        let (tx, msg_rx) = mpsc::channel::<WorkerMessage<K>>();
        let (resp_tx, rx) = mpsc::channel::<Result<K::Response>>();

        let thread_handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || worker_loop(msg_rx, resp_tx))?;

        let init_tx = tx.clone();
        thread::Builder::new().name(format!("{}-init", name)).spawn(move || {
            let msg = match init() {
                Ok(kernel) => WorkerMessage::Ready(kernel),
                Err(e) => WorkerMessage::InitFailed(e.to_string()),
            };
            // The worker may already have exited.
            let _ = init_tx.send(msg);
        })?;

        info!(worker = %name, max_in_flight, "Worker started");
        Ok(Self {
            name,
            tx,
            rx,
            in_flight: AtomicUsize::new(0),
            max_in_flight: max_in_flight.max(1),
            thread_handle: Some(thread_handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Queues `request` without blocking.
    ///
    /// When the in-flight cap is reached, or the worker has gone away, the
    /// request comes back inside the error.
    pub fn submit(&self, request: K::Request) -> std::result::Result<(), SubmitError<K::Request>> {
        let in_flight = self.in_flight();
        if in_flight >= self.max_in_flight {
            debug!(worker = %self.name, in_flight, "Worker busy, rejecting request");
            return Err(SubmitError::Busy { request, in_flight });
        }
        match self.tx.send(WorkerMessage::Request(request)) {
            Ok(()) => {
                self.in_flight.fetch_add(1, Ordering::AcqRel);
                Ok(())
            }
            Err(mpsc::SendError(WorkerMessage::Request(request))) => Err(SubmitError::Disconnected(request)),
            Err(_) => unreachable!("submit only sends requests"),
        }
    }

    /// Blocks until the next response arrives.
    pub fn recv(&self) -> Result<K::Response> {
        let response = self.rx.recv().map_err(|_| ProcessingError::WorkerDisconnected)?;
        self.complete();
        response
    }

    pub fn try_recv(&self) -> Result<Option<K::Response>> {
        match self.rx.try_recv() {
            Ok(response) => {
                self.complete();
                response.map(Some)
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(ProcessingError::WorkerDisconnected),
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<K::Response>> {
        match self.rx.recv_timeout(timeout) {
            Ok(response) => {
                self.complete();
                response.map(Some)
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(ProcessingError::WorkerDisconnected),
        }
    }

    /// Stops the worker after the requests already queued ahead of the exit
    /// message have been handled, and joins its thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn complete(&self) {
        let _ = self
            .in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some(n.saturating_sub(1)));
    }

    fn stop(&mut self) {
        let Some(handle) = self.thread_handle.take() else {
            return;
        };
        let _ = self.tx.send(WorkerMessage::Exit);
        if handle.join().is_err() {
            error!(worker = %self.name, "Worker thread panicked");
        } else {
            debug!(worker = %self.name, "Worker stopped");
        }
    }
}

impl<K: Kernel> Drop for Worker<K> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop<K: Kernel>(rx: Receiver<WorkerMessage<K>>, tx: Sender<Result<K::Response>>) {
    let mut host = KernelHost::<K>::new();
    let mut init_error: Option<String> = None;

    while let Ok(msg) = rx.recv() {
        match msg {
            WorkerMessage::Exit => break,
            WorkerMessage::Request(request) => {
                if let Some(reason) = &init_error {
                    if tx.send(Err(ProcessingError::KernelInit(reason.clone()))).is_err() {
                        break;
                    }
                } else if let Some(response) = host.on_request(request) {
                    if tx.send(Ok(response)).is_err() {
                        break;
                    }
                }
            }
            WorkerMessage::Ready(kernel) => {
                host.on_ready(kernel);
                while let Some(response) = host.drain_next() {
                    if tx.send(Ok(response)).is_err() {
                        return;
                    }
                }
            }
            WorkerMessage::InitFailed(reason) => {
                error!(%reason, "Kernel initialisation failed");
                for _ in host.take_queued() {
                    if tx.send(Err(ProcessingError::KernelInit(reason.clone()))).is_err() {
                        return;
                    }
                }
                init_error = Some(reason);
            }
        }
    }

    if host.queued() > 0 {
        warn!(dropped = host.queued(), "Worker exited with requests still queued");
    }
}
