//! Form event sink that writes every event to tracing output.

use lumina_application::{FormEvent, FormEventSink, NotificationLevel};
use tracing::{debug, info, warn};

/// Logs form events. Used as the default observer in the API.
#[derive(Clone, Default)]
pub struct TracingFormEventSink;

impl TracingFormEventSink {
    /// Creates a new tracing sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FormEventSink for TracingFormEventSink {
    fn emit(&self, event: FormEvent) {
        match event {
            FormEvent::StatusChanged { form_id, status } => {
                debug!(%form_id, ?status, "form status changed");
            }
            FormEvent::Loading { form_id, active } => {
                debug!(%form_id, active, "form loading");
            }
            FormEvent::Notify {
                form_id,
                level: NotificationLevel::Success,
                message,
            } => {
                info!(%form_id, %message, "form notification");
            }
            FormEvent::Notify {
                form_id,
                level: NotificationLevel::Error,
                message,
            } => {
                warn!(%form_id, %message, "form notification");
            }
            FormEvent::Navigate {
                form_id,
                destination,
            } => {
                info!(%form_id, %destination, "form navigation");
            }
        }
    }
}
