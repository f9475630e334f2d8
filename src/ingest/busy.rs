//! Session-level busy flag
//!
//! Set when an exchange starts and cleared when its guard drops, so the flag
//! is released on every exit path, including panics and early returns.

use std::sync::Arc;
use tokio::sync::watch;

/// Observable "exchange in flight" flag
#[derive(Clone)]
pub struct BusyFlag {
    tx: Arc<watch::Sender<bool>>,
}

impl BusyFlag {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_busy(&self) -> bool {
        *self.tx.borrow()
    }

    /// Receiver for the UI; sees every settled value of the flag
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Set the flag until the returned guard is dropped.
    ///
    /// Returns `None` if the flag is already set. The check and the set
    /// happen under the channel's lock, so two callers can never both win.
    pub(crate) fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        let acquired = self.tx.send_if_modified(|busy| {
            if *busy {
                return false;
            }
            *busy = true;
            true
        });
        if acquired {
            Some(BusyGuard { flag: self })
        } else {
            None
        }
    }
}

impl Default for BusyFlag {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct BusyGuard<'a> {
    flag: &'a BusyFlag,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.tx.send_replace(false);
    }
}
