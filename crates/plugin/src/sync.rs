//! Blocking hand-off from connection threads to the main thread.
//!
//! Connection threads push a [`SyncRequest`] and wait on a one-shot reply
//! channel. The main thread drains requests at the start of every tick.
//! Both queueing and waiting for the reply share one bound.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::thread;
use std::time::{Duration, Instant};

use enchantcraft_world::PlayerId;

use crate::error::SyncCallError;

const QUEUE_DEPTH: usize = 64;
const QUEUE_RETRY: Duration = Duration::from_millis(1);
const MAX_WAIT: Duration = Duration::from_secs(24 * 60 * 60);

/// Outcome of a registration pass run on the main thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationSummary {
    /// Definitions with at least one bound key.
    pub definitions: usize,
    /// Registry keys recorded across all definitions.
    pub bound_keys: usize,
    /// Resolved blacklist entries.
    pub blacklisted: usize,
}

/// Work a connection thread needs done on the main thread.
#[derive(Debug)]
pub enum SyncRequest {
    /// Register every definition before `player` finishes logging in.
    PrepareLogin {
        /// Connecting player.
        player: PlayerId,
        /// One-shot reply channel.
        respond_to: SyncSender<RegistrationSummary>,
    },
}

/// Main-thread end of the hand-off.
#[derive(Debug)]
pub struct SyncEndpoint {
    rx: Receiver<SyncRequest>,
}

/// Connection-thread end of the hand-off.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    to_main: SyncSender<SyncRequest>,
    timeout: Duration,
}

/// Create a connected handle/endpoint pair. Calls wait at most `timeout`.
pub fn channel(timeout: Duration) -> (SyncHandle, SyncEndpoint) {
    channel_with_depth(timeout, QUEUE_DEPTH)
}

fn channel_with_depth(timeout: Duration, depth: usize) -> (SyncHandle, SyncEndpoint) {
    let (to_main, rx) = mpsc::sync_channel(depth);
    (SyncHandle { to_main, timeout }, SyncEndpoint { rx })
}

impl SyncHandle {
    /// Bound on how long [`SyncHandle::prepare_login`] waits.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask the main thread to register everything for `player` and block
    /// until it replies or the timeout elapses. A full queue is retried
    /// within the same bound.
    pub fn prepare_login(&self, player: PlayerId) -> Result<RegistrationSummary, SyncCallError> {
        let now = Instant::now();
        let deadline = now.checked_add(self.timeout).unwrap_or(now + MAX_WAIT);
        let (respond_to, reply) = mpsc::sync_channel(1);
        let mut request = SyncRequest::PrepareLogin { player, respond_to };
        loop {
            match self.to_main.try_send(request) {
                Ok(()) => break,
                Err(TrySendError::Full(returned)) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return Err(SyncCallError::Busy);
                    }
                    thread::sleep(left.min(QUEUE_RETRY));
                    request = returned;
                }
                Err(TrySendError::Disconnected(_)) => return Err(SyncCallError::MainThreadGone),
            }
        }
        match reply.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(summary) => Ok(summary),
            Err(RecvTimeoutError::Timeout) => Err(SyncCallError::Timeout(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(SyncCallError::MainThreadGone),
        }
    }
}

impl SyncEndpoint {
    /// Take every request queued so far without blocking.
    pub fn drain(&self) -> Vec<SyncRequest> {
        self.rx.try_iter().collect()
    }
}
