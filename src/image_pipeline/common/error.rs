use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Worker queue is full ({in_flight} requests in flight)")]
    WorkerBusy { in_flight: usize },

    #[error("Worker thread has shut down")]
    WorkerDisconnected,

    #[error("Kernel initialisation failed: {0}")]
    KernelInit(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProcessingError>;

/// A request the worker refused, handed back so it can be resubmitted.
#[derive(Error)]
pub enum SubmitError<T> {
    #[error("Worker queue is full ({in_flight} requests in flight)")]
    Busy { request: T, in_flight: usize },

    #[error("Worker thread has shut down")]
    Disconnected(T),
}

impl<T> SubmitError<T> {
    pub fn into_request(self) -> T {
        match self {
            SubmitError::Busy { request, .. } | SubmitError::Disconnected(request) => request,
        }
    }
}

impl<T> fmt::Debug for SubmitError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Busy { in_flight, .. } => f
                .debug_struct("Busy")
                .field("in_flight", in_flight)
                .finish_non_exhaustive(),
            SubmitError::Disconnected(_) => f.write_str("Disconnected(..)"),
        }
    }
}

impl<T> From<SubmitError<T>> for ProcessingError {
    fn from(err: SubmitError<T>) -> Self {
        match err {
            SubmitError::Busy { in_flight, .. } => ProcessingError::WorkerBusy { in_flight },
            SubmitError::Disconnected(_) => ProcessingError::WorkerDisconnected,
        }
    }
}
