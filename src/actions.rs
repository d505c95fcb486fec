// Workflow Actions - Action descriptors executed by workflow runs

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Activity kinds an automation can schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Call,
    Email,
    Meeting,
    FollowUp,
    Task,
}

/// Due date in action config: either N calendar days from "now" (resolved at
/// dispatch time) or a literal timestamp string passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DueDate {
    Days(i64),
    Timestamp(String),
}

impl DueDate {
    /// Resolve an optional due date relative to `now`. A missing due date
    /// resolves to `now`; timestamp strings are not validated here.
    pub fn resolve(due_date: Option<&DueDate>, now: DateTime<Utc>) -> String {
        match due_date {
            None => now.to_rfc3339(),
            Some(DueDate::Days(days)) => (now + Duration::days(*days)).to_rfc3339(),
            Some(DueDate::Timestamp(ts)) => ts.clone(),
        }
    }
}

/// An action in a workflow's ordered sequence.
///
/// Serialized as `{"type": "<kind>", "config": {...}}` with camelCase config
/// keys, matching the persisted workflow shape. Each variant carries only the
/// fields its effect port needs; an unrecognized kind fails deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "config",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum WorkflowAction {
    ScheduleActivity {
        activity_type: ActivityType,
        subject: String,
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        due_date: Option<DueDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        assign_to: Option<String>,
    },
    SendEmail {
        email_template: String,
        subject: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email_to: Option<Vec<String>>,
    },
    UpdateField {
        field_name: String,
        field_value: Value,
    },
    CreateTask {
        subject: String,
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        due_date: Option<DueDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        assign_to: Option<String>,
    },
    AssignOwner {
        assign_to: String,
    },
    SendNotification {
        notification_message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        assign_to: Option<String>,
    },
    Webhook {
        webhook_url: String,
    },
}

impl WorkflowAction {
    /// Wire name of this action's kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ScheduleActivity { .. } => "schedule_activity",
            Self::SendEmail { .. } => "send_email",
            Self::UpdateField { .. } => "update_field",
            Self::CreateTask { .. } => "create_task",
            Self::AssignOwner { .. } => "assign_owner",
            Self::SendNotification { .. } => "send_notification",
            Self::Webhook { .. } => "webhook",
        }
    }

    // ===== Action Builders =====

    pub fn schedule_activity(
        activity_type: ActivityType,
        subject: &str,
        description: &str,
        due_date: DueDate,
    ) -> Self {
        Self::ScheduleActivity {
            activity_type,
            subject: subject.to_string(),
            description: description.to_string(),
            due_date: Some(due_date),
            assign_to: None,
        }
    }

    pub fn send_email(email_template: &str, subject: &str) -> Self {
        Self::SendEmail {
            email_template: email_template.to_string(),
            subject: subject.to_string(),
            email_to: None,
        }
    }

    pub fn send_email_to(email_template: &str, subject: &str, recipients: Vec<String>) -> Self {
        Self::SendEmail {
            email_template: email_template.to_string(),
            subject: subject.to_string(),
            email_to: Some(recipients),
        }
    }

    pub fn update_field(field_name: &str, field_value: Value) -> Self {
        Self::UpdateField {
            field_name: field_name.to_string(),
            field_value,
        }
    }

    pub fn create_task(subject: &str, description: &str, due_date: DueDate) -> Self {
        Self::CreateTask {
            subject: subject.to_string(),
            description: description.to_string(),
            due_date: Some(due_date),
            assign_to: None,
        }
    }

    pub fn assign_owner(assign_to: &str) -> Self {
        Self::AssignOwner {
            assign_to: assign_to.to_string(),
        }
    }

    pub fn send_notification(message: &str) -> Self {
        Self::SendNotification {
            notification_message: message.to_string(),
            assign_to: None,
        }
    }

    pub fn webhook(webhook_url: &str) -> Self {
        Self::Webhook {
            webhook_url: webhook_url.to_string(),
        }
    }

    /// Route the action to the given assignee where the kind supports one
    pub fn with_assignee(mut self, assignee: &str) -> Self {
        match &mut self {
            Self::ScheduleActivity { assign_to, .. }
            | Self::CreateTask { assign_to, .. }
            | Self::SendNotification { assign_to, .. } => {
                *assign_to = Some(assignee.to_string());
            }
            Self::AssignOwner { assign_to } => *assign_to = assignee.to_string(),
            Self::SendEmail { .. } | Self::UpdateField { .. } | Self::Webhook { .. } => {}
        }
        self
    }
}
