//! Authenticated access to the LinguaLeo service
//!
//! This module handles the session lifecycle: cookie persistence, login and
//! session validation, the TLS fallback, and the request loops behind the
//! collection and word listings.

pub mod cookies;
pub mod manager;

pub use cookies::PersistentCookieJar;
pub use manager::Session;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// Cooperative cancellation flag, shared between an import worker and its
/// controller.
///
/// Cancellation is observed between network requests and between words, so
/// an in-flight request still runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with [`Error::Cancelled`] once cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
