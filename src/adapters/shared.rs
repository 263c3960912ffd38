//! Shared telemetry adapter.
//!
//! Publishes the end-of-cycle snapshot for readers on other threads (an
//! upstream link task, a diagnostics console).  The whole snapshot is copied
//! in under one lock, so a reader sees either the previous cycle or the new
//! one, never a mix.

use std::sync::{Arc, Mutex, PoisonError};

use crate::app::events::NodeEvent;
use crate::app::ports::EventSink;
use crate::telemetry::TelemetrySnapshot;

/// Cloneable handle to the most recent published snapshot.
#[derive(Debug, Clone, Default)]
pub struct SharedTelemetry {
    inner: Arc<Mutex<TelemetrySnapshot>>,
}

impl SharedTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the most recent snapshot.
    pub fn latest(&self) -> TelemetrySnapshot {
        // Every store is one assignment, so a poisoned lock still holds a
        // whole snapshot.
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn publish(&self, snapshot: &TelemetrySnapshot) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = *snapshot;
    }
}

impl EventSink for SharedTelemetry {
    fn emit(&mut self, event: &NodeEvent) {
        if let NodeEvent::Telemetry(snapshot) = event {
            self.publish(snapshot);
        }
    }
}
