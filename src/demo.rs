//! Streaming JSON viewer
//!
//! Reveals a document a few characters at a time, the way a streamed model
//! response appears. Each tick reveals 1-3 characters and the next tick is
//! scheduled 20-60ms later. Cancelling drops the pending timer, so no tick
//! runs after it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

pub const MIN_CHARS_PER_TICK: usize = 1;
pub const MAX_CHARS_PER_TICK: usize = 3;
pub const MIN_TICK_MS: u64 = 20;
pub const MAX_TICK_MS: u64 = 60;

/// A scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub delay: Duration,
}

pub struct Typewriter {
    chars: Vec<char>,
    revealed: usize,
    timer: Option<Timer>,
    rng: StdRng,
}

impl Typewriter {
    pub fn new(text: &str) -> Self {
        Self::with_rng(text, StdRng::from_entropy())
    }

    pub fn with_seed(text: &str, seed: u64) -> Self {
        Self::with_rng(text, StdRng::seed_from_u64(seed))
    }

    fn with_rng(text: &str, rng: StdRng) -> Self {
        Self { chars: text.chars().collect(), revealed: 0, timer: None, rng }
    }

    fn schedule(&mut self) -> Option<Timer> {
        self.timer = if self.is_done() {
            None
        } else {
            Some(Timer { delay: Duration::from_millis(self.rng.gen_range(MIN_TICK_MS..=MAX_TICK_MS)) })
        };
        self.timer
    }

    /// Schedule the first tick
    pub fn start(&mut self) -> Option<Timer> {
        self.schedule()
    }

    /// Fire the pending tick. Returns the newly revealed text, or `None`
    /// when nothing was pending (finished or cancelled).
    pub fn tick(&mut self) -> Option<String> {
        self.timer.take()?;
        let step = self.rng.gen_range(MIN_CHARS_PER_TICK..=MAX_CHARS_PER_TICK);
        let end = (self.revealed + step).min(self.chars.len());
        let chunk: String = self.chars[self.revealed..end].iter().collect();
        self.revealed = end;
        self.schedule();
        Some(chunk)
    }

    pub fn cancel(&mut self) {
        self.timer = None;
    }

    pub fn pending(&self) -> Option<Timer> {
        self.timer
    }

    pub fn is_done(&self) -> bool {
        self.revealed >= self.chars.len()
    }

    pub fn revealed(&self) -> String {
        self.chars[..self.revealed].iter().collect()
    }

    /// Drive the animation on the current thread until the text is fully
    /// shown or `cancel` is raised. Returns the number of characters written.
    pub fn run<W: Write>(&mut self, out: &mut W, cancel: &AtomicBool) -> io::Result<usize> {
        self.start();
        while let Some(timer) = self.pending() {
            thread::sleep(timer.delay);
            if cancel.load(Ordering::Relaxed) {
                self.cancel();
                break;
            }
            if let Some(chunk) = self.tick() {
                out.write_all(chunk.as_bytes())?;
                out.flush()?;
            }
        }
        Ok(self.revealed)
    }
}
