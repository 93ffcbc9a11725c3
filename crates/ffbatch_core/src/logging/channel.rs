//! Log feed between the worker and the presentation layer.
//!
//! The worker sends formatted lines through a [`LogSender`]; the front end
//! periodically calls [`LogFeed::drain`] to take everything pending. Lines
//! from one sender arrive in the order they were sent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, TryRecvError};

use parking_lot::Mutex;

/// Create a connected sender/feed pair.
pub fn log_channel() -> (LogSender, LogFeed) {
    let (tx, rx) = mpsc::channel();
    (
        LogSender { tx },
        LogFeed {
            rx: Mutex::new(rx),
            closed: AtomicBool::new(false),
        },
    )
}

/// Sending half, cloneable across threads.
#[derive(Debug, Clone)]
pub struct LogSender {
    tx: mpsc::Sender<String>,
}

impl LogSender {
    /// Send a line. Returns false once the feed has been dropped.
    pub fn send(&self, line: impl Into<String>) -> bool {
        self.tx.send(line.into()).is_ok()
    }
}

/// Receiving half, drained by the front end.
#[derive(Debug)]
pub struct LogFeed {
    rx: Mutex<mpsc::Receiver<String>>,
    closed: AtomicBool,
}

impl LogFeed {
    /// Take every pending line, oldest first.
    pub fn drain(&self) -> Vec<String> {
        let rx = self.rx.lock();
        let mut lines = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(line) => lines.push(line),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.closed.store(true, Ordering::SeqCst);
                    break;
                }
            }
        }
        lines
    }

    /// Whether every sender is gone and the feed has been fully drained.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
