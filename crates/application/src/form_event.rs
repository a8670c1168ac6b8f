use std::sync::{Arc, Mutex};

use lumina_core::FormInstanceId;
use serde::Serialize;

use crate::FormStatus;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    /// Action completed.
    Success,
    /// Action failed.
    Error,
}

impl NotificationLevel {
    /// Returns the wire name of the level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Side effect requested by a form, for the presentation layer to carry out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormEvent {
    /// The form moved to a new status.
    StatusChanged {
        /// Form instance.
        form_id: FormInstanceId,
        /// New status.
        status: FormStatus,
    },
    /// A remote call started (`true`) or finished (`false`).
    Loading {
        /// Form instance.
        form_id: FormInstanceId,
        /// Whether a call is in flight.
        active: bool,
    },
    /// Toast-style message.
    Notify {
        /// Form instance.
        form_id: FormInstanceId,
        /// Severity.
        level: NotificationLevel,
        /// Message text.
        message: String,
    },
    /// Request to move to another route.
    Navigate {
        /// Form instance.
        form_id: FormInstanceId,
        /// Route path.
        destination: String,
    },
}

/// Observer port for form side effects.
pub trait FormEventSink: Send + Sync {
    /// Delivers one event. Must not block.
    fn emit(&self, event: FormEvent);
}

/// Sink that keeps every event in memory and optionally forwards it.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<FormEvent>>,
    forward_to: Option<Arc<dyn FormEventSink>>,
}

impl RecordingEventSink {
    /// Creates a recorder that does not forward.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder that also forwards every event to `sink`.
    #[must_use]
    pub fn forwarding_to(sink: Arc<dyn FormEventSink>) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            forward_to: Some(sink),
        }
    }

    /// Returns a copy of the recorded events in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<FormEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Returns the destinations of every navigation event.
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                FormEvent::Navigate { destination, .. } => Some(destination),
                _ => None,
            })
            .collect()
    }
}

impl FormEventSink for RecordingEventSink {
    fn emit(&self, event: FormEvent) {
        if let Some(sink) = &self.forward_to {
            sink.emit(event.clone());
        }

        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
