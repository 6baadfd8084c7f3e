//! Tick-stepping harness for deterministic host tests.
//!
//! [`run_ticks`] steps a [`Host`] a fixed number of times and captures a
//! snapshot of selected server state after each step, so tests can assert
//! on the exact sequence of frames.

use enchantcraft_world::{Host, Server};
use serde::Serialize;

/// Single snapshot frame captured at a given tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame<S> {
    /// Tick number.
    pub tick: u64,
    /// Snapshot payload.
    pub snapshot: S,
}

/// Step `host` `ticks` times, capturing a frame after each step.
pub fn run_ticks<S, F>(host: &mut Host, ticks: u64, mut snapshot: F) -> Vec<Frame<S>>
where
    F: FnMut(&Server) -> S,
{
    let mut frames = Vec::with_capacity(ticks as usize);
    for _ in 0..ticks {
        host.tick();
        let server = host.server();
        frames.push(Frame {
            tick: server.tick().0,
            snapshot: snapshot(server),
        });
    }
    frames
}

/// Step `host` until `done` holds or `max_ticks` have run. Returns the number
/// of ticks stepped, or `None` when the condition never held.
pub fn tick_until<F>(host: &mut Host, max_ticks: u64, mut done: F) -> Option<u64>
where
    F: FnMut(&Server) -> bool,
{
    for stepped in 1..=max_ticks {
        host.tick();
        if done(host.server()) {
            return Some(stepped);
        }
        std::thread::yield_now();
    }
    None
}
