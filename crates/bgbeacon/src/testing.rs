//! In-memory stand-ins for the serial port and the wall clock

use crate::bgapi::transport::Transport;
use crate::error::TransportError;
use crate::scheduler::{CancellationToken, Clock};
use chrono::{DateTime, Local};
use std::cell::Cell;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Records every frame and answers each read with a well-formed response
/// echoing the class and id of the last frame sent.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    pub sent: Vec<Vec<u8>>,
    pub read_lengths: Vec<usize>,
    pub responses: Vec<Vec<u8>>,
    pub flushes: usize,
    fail_reads: Vec<usize>,
    canned: HashMap<usize, Vec<u8>>,
    cancel_on: Option<(usize, CancellationToken)>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time out on the n-th read (1-based)
    pub fn fail_read(mut self, n: usize) -> Self {
        self.fail_reads.push(n);
        self
    }

    /// Cancel `token` while serving the n-th read (1-based)
    pub fn cancel_on_read(mut self, n: usize, token: CancellationToken) -> Self {
        self.cancel_on = Some((n, token));
        self
    }

    /// Answer the n-th read (1-based) with `response`
    pub fn respond_with(mut self, n: usize, response: Vec<u8>) -> Self {
        self.canned.insert(n, response);
        self
    }
}

impl Transport for ScriptedTransport {
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.sent.push(frame.to_vec());
        Ok(())
    }

    fn read_exact(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        self.read_lengths.push(len);
        let n = self.read_lengths.len();

        if let Some((at, token)) = &self.cancel_on {
            if *at == n {
                token.cancel();
            }
        }

        if self.fail_reads.contains(&n) {
            return Err(TransportError::Timeout {
                expected: len,
                received: 0,
            });
        }

        let response = match self.canned.get(&n) {
            Some(response) => response.clone(),
            None => {
                let last = self.sent.last().cloned().unwrap_or_default();
                let mut response = vec![0u8; len];
                response[1] = (len - 4) as u8;
                response[2] = last.get(2).copied().unwrap_or(0);
                response[3] = last.get(3).copied().unwrap_or(0);
                response
            }
        };
        self.responses.push(response.clone());
        Ok(response)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.flushes += 1;
        Ok(())
    }
}

/// Virtual clock: sleeping advances time instantly
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    wall_origin: DateTime<Local>,
    elapsed: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            wall_origin: Local::now(),
            elapsed: Cell::new(Duration::ZERO),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }

    fn wall_time(&self) -> DateTime<Local> {
        self.wall_origin + chrono::Duration::from_std(self.elapsed.get()).unwrap()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Split a payload into (type, value) AD elements, stopping at the first
/// zero length or truncated element
pub fn split_ad_elements(data: &[u8]) -> Vec<(u8, Vec<u8>)> {
    let mut elements = Vec::new();
    let mut rest = data;

    while let Some((&len, tail)) = rest.split_first() {
        let len = usize::from(len);
        if len == 0 || len > tail.len() {
            break;
        }
        elements.push((tail[0], tail[1..len].to_vec()));
        rest = &tail[len..];
    }

    elements
}
