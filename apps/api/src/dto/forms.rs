use std::collections::BTreeMap;

use lumina_application::{FormEvent, FormSnapshot, SubmitReport};
use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;

/// Toast-style message produced by a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/notification-response.ts"
)]
pub struct NotificationResponse {
    pub level: String,
    pub message: String,
}

/// Everything the client needs to render a form after one submission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/form-submission-response.ts"
)]
pub struct FormSubmissionResponse {
    pub form_id: String,
    pub status: String,
    pub success: bool,
    pub error: Option<String>,
    #[ts(type = "unknown")]
    pub data: Option<Value>,
    pub field_errors: BTreeMap<String, String>,
    pub notifications: Vec<NotificationResponse>,
    pub navigate_to: Option<String>,
}

impl FormSubmissionResponse {
    pub fn from_submission<M>(
        report: &SubmitReport<M>,
        snapshot: &FormSnapshot,
        events: &[FormEvent],
    ) -> Self {
        let outcome = report.outcome();
        let notifications = events
            .iter()
            .filter_map(|event| match event {
                FormEvent::Notify { level, message, .. } => Some(NotificationResponse {
                    level: level.as_str().to_owned(),
                    message: message.clone(),
                }),
                _ => None,
            })
            .collect();
        let navigate_to = events.iter().rev().find_map(|event| match event {
            FormEvent::Navigate { destination, .. } => Some(destination.clone()),
            _ => None,
        });

        Self {
            form_id: snapshot.form_id.to_string(),
            status: snapshot.status.as_str().to_owned(),
            success: outcome.is_some_and(|outcome| outcome.success()),
            error: outcome.and_then(|outcome| outcome.error().map(ToOwned::to_owned)),
            data: outcome.and_then(|outcome| outcome.data().cloned()),
            field_errors: snapshot
                .errors
                .iter()
                .map(|(field, message)| (field.to_owned(), message.to_owned()))
                .collect(),
            notifications,
            navigate_to,
        }
    }
}
