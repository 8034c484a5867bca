use std::collections::VecDeque;

use tracing::{debug, warn};

/// A compute backend that answers requests one at a time once initialised.
pub trait Kernel: Send + 'static {
    type Request: Send + 'static;
    type Response: Send + 'static;

    fn handle(&mut self, request: Self::Request) -> Self::Response;
}

enum HostState<K: Kernel> {
    Uninitialized(VecDeque<K::Request>),
    Draining { kernel: K, queue: VecDeque<K::Request> },
    Ready(K),
}

/// Init barrier in front of a [`Kernel`].
///
/// Requests that arrive before the kernel exists are queued. Once the
/// kernel is handed over with [`on_ready`](Self::on_ready) the queue is
/// replayed in arrival order through [`drain_next`](Self::drain_next), after
/// which requests are answered immediately.
pub struct KernelHost<K: Kernel> {
    state: HostState<K>,
}

impl<K: Kernel> Default for KernelHost<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kernel> KernelHost<K> {
    pub fn new() -> Self {
        Self {
            state: HostState::Uninitialized(VecDeque::new()),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, HostState::Ready(_))
    }

    /// Requests waiting to be handled.
    pub fn queued(&self) -> usize {
        match &self.state {
            HostState::Uninitialized(queue) | HostState::Draining { queue, .. } => queue.len(),
            HostState::Ready(_) => 0,
        }
    }

    /// Handles `request` if the kernel is ready, otherwise queues it behind
    /// any earlier requests and returns `None`.
    pub fn on_request(&mut self, request: K::Request) -> Option<K::Response> {
        match &mut self.state {
            HostState::Ready(kernel) => Some(kernel.handle(request)),
            HostState::Uninitialized(queue) | HostState::Draining { queue, .. } => {
                queue.push_back(request);
                None
            }
        }
    }

    /// Installs the kernel and starts draining queued requests.
    pub fn on_ready(&mut self, kernel: K) {
        let queue = match self.take_state() {
            HostState::Uninitialized(queue) => queue,
            HostState::Draining { queue, .. } => {
                warn!("Kernel replaced while draining");
                queue
            }
            HostState::Ready(_) => {
                warn!("Kernel replaced after initialisation");
                VecDeque::new()
            }
        };
        debug!(queued = queue.len(), "Kernel ready");
        self.state = if queue.is_empty() {
            HostState::Ready(kernel)
        } else {
            HostState::Draining { kernel, queue }
        };
    }

    /// Handles the oldest queued request. Returns `None` once the queue is
    /// empty, at which point the host is ready.
    pub fn drain_next(&mut self) -> Option<K::Response> {
        let HostState::Draining { kernel, queue } = &mut self.state else {
            return None;
        };
        if let Some(request) = queue.pop_front() {
            return Some(kernel.handle(request));
        }
        if let HostState::Draining { kernel, .. } = self.take_state() {
            self.state = HostState::Ready(kernel);
        }
        None
    }

    /// Removes every queued request without handling it.
    pub fn take_queued(&mut self) -> Vec<K::Request> {
        match &mut self.state {
            HostState::Uninitialized(queue) | HostState::Draining { queue, .. } => queue.drain(..).collect(),
            HostState::Ready(_) => Vec::new(),
        }
    }

    fn take_state(&mut self) -> HostState<K> {
        std::mem::replace(&mut self.state, HostState::Uninitialized(VecDeque::new()))
    }
}
