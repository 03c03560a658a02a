// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Periodic re-evaluation on a background thread.
//!
//! The first tick runs immediately; later ticks run every `interval` until the
//! poller is stopped or dropped.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

pub struct Poller {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<u64>>,
}

impl Poller {
    pub fn spawn<F>(interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            let mut ticks = 0u64;
            loop {
                tick();
                ticks += 1;
                match rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    // explicit stop or the poller was dropped
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!(ticks, "Poller stopped");
            ticks
        });
        Poller {
            stop: Some(tx),
            handle: Some(handle),
        }
    }

    /// Stops the loop and waits for the thread; returns how many ticks ran.
    pub fn stop(mut self) -> u64 {
        self.shutdown()
    }

    fn shutdown(&mut self) -> u64 {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
        match self.handle.take().map(JoinHandle::join) {
            Some(Ok(ticks)) => ticks,
            Some(Err(_)) => {
                warn!("Poller thread panicked");
                0
            }
            None => 0,
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
