// Action Dispatcher - Maps action descriptors onto effect-handler ports

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::actions::{ActivityType, DueDate, WorkflowAction};
use crate::error::{AutomationError, Result};
use crate::triggers::EventContext;

/// External capabilities a workflow action can invoke.
///
/// The engine performs no I/O itself; it resolves the action's parameters
/// and calls exactly one of these ports per action. A returned error marks
/// the action (and its run) as failed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EffectHandler: Send + Sync {
    #[cfg_attr(test, mockall::concretize)]
    async fn schedule_activity(
        &self,
        activity_type: ActivityType,
        subject: &str,
        description: &str,
        due_at: &str,
        assign_to: Option<&str>,
        context: &EventContext,
    ) -> anyhow::Result<()>;

    async fn send_email(
        &self,
        template: &str,
        subject: &str,
        recipients: &[String],
        context: &EventContext,
    ) -> anyhow::Result<()>;

    #[cfg_attr(test, mockall::concretize)]
    async fn update_field(
        &self,
        field_name: &str,
        field_value: &Value,
        entity_id: Option<&str>,
    ) -> anyhow::Result<()>;

    #[cfg_attr(test, mockall::concretize)]
    async fn create_task(
        &self,
        subject: &str,
        description: &str,
        due_at: &str,
        assign_to: Option<&str>,
    ) -> anyhow::Result<()>;

    #[cfg_attr(test, mockall::concretize)]
    async fn assign_owner(&self, assign_to: &str, entity_id: Option<&str>) -> anyhow::Result<()>;

    #[cfg_attr(test, mockall::concretize)]
    async fn send_notification(&self, message: &str, recipient: Option<&str>)
        -> anyhow::Result<()>;

    async fn call_webhook(&self, url: &str, payload: &EventContext) -> anyhow::Result<()>;
}

/// Effect handler that only logs each invocation.
///
/// Useful for wiring the engine before real integrations exist, and as the
/// default collaborator in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEffectHandler;

#[async_trait]
impl EffectHandler for LoggingEffectHandler {
    async fn schedule_activity(
        &self,
        activity_type: ActivityType,
        subject: &str,
        description: &str,
        due_at: &str,
        assign_to: Option<&str>,
        _context: &EventContext,
    ) -> anyhow::Result<()> {
        info!(
            ?activity_type,
            subject, description, due_at, assign_to, "Scheduling activity"
        );
        Ok(())
    }

    async fn send_email(
        &self,
        template: &str,
        subject: &str,
        recipients: &[String],
        _context: &EventContext,
    ) -> anyhow::Result<()> {
        info!(template, subject, ?recipients, "Sending email");
        Ok(())
    }

    async fn update_field(
        &self,
        field_name: &str,
        field_value: &Value,
        entity_id: Option<&str>,
    ) -> anyhow::Result<()> {
        info!(field_name, %field_value, entity_id, "Updating field");
        Ok(())
    }

    async fn create_task(
        &self,
        subject: &str,
        description: &str,
        due_at: &str,
        assign_to: Option<&str>,
    ) -> anyhow::Result<()> {
        info!(subject, description, due_at, assign_to, "Creating task");
        Ok(())
    }

    async fn assign_owner(&self, assign_to: &str, entity_id: Option<&str>) -> anyhow::Result<()> {
        info!(assign_to, entity_id, "Assigning owner");
        Ok(())
    }

    async fn send_notification(
        &self,
        message: &str,
        recipient: Option<&str>,
    ) -> anyhow::Result<()> {
        info!(message, recipient, "Sending notification");
        Ok(())
    }

    async fn call_webhook(&self, url: &str, payload: &EventContext) -> anyhow::Result<()> {
        info!(url, %payload, "Calling webhook");
        Ok(())
    }
}

/// Dispatches one action descriptor to its effect port
pub struct ActionDispatcher {
    effects: Arc<dyn EffectHandler>,
}

impl ActionDispatcher {
    pub fn new(effects: Arc<dyn EffectHandler>) -> Self {
        Self { effects }
    }

    /// Execute a single action against the event context.
    ///
    /// Due dates resolve against the clock at dispatch time, not trigger
    /// time. Success is an `Ok` return from the port.
    pub async fn dispatch(&self, action: &WorkflowAction, context: &EventContext) -> Result<()> {
        let outcome = match action {
            WorkflowAction::ScheduleActivity {
                activity_type,
                subject,
                description,
                due_date,
                assign_to,
            } => {
                let due_at = DueDate::resolve(due_date.as_ref(), Utc::now());
                self.effects
                    .schedule_activity(
                        *activity_type,
                        subject,
                        description,
                        &due_at,
                        assign_to.as_deref(),
                        context,
                    )
                    .await
            }
            WorkflowAction::SendEmail {
                email_template,
                subject,
                email_to,
            } => {
                let recipients = email_to.as_deref().unwrap_or_default();
                self.effects
                    .send_email(email_template, subject, recipients, context)
                    .await
            }
            WorkflowAction::UpdateField {
                field_name,
                field_value,
            } => {
                self.effects
                    .update_field(field_name, field_value, entity_id(context))
                    .await
            }
            WorkflowAction::CreateTask {
                subject,
                description,
                due_date,
                assign_to,
            } => {
                let due_at = DueDate::resolve(due_date.as_ref(), Utc::now());
                self.effects
                    .create_task(subject, description, &due_at, assign_to.as_deref())
                    .await
            }
            WorkflowAction::AssignOwner { assign_to } => {
                self.effects
                    .assign_owner(assign_to, entity_id(context))
                    .await
            }
            WorkflowAction::SendNotification {
                notification_message,
                assign_to,
            } => {
                self.effects
                    .send_notification(notification_message, assign_to.as_deref())
                    .await
            }
            WorkflowAction::Webhook { webhook_url } => {
                self.effects.call_webhook(webhook_url, context).await
            }
        };

        outcome.map_err(|e| AutomationError::ActionFailed {
            action: action.kind(),
            message: e.to_string(),
        })
    }
}

/// Entity the action applies to: the deal if present, otherwise the contact
fn entity_id(context: &EventContext) -> Option<&str> {
    context
        .get("dealId")
        .and_then(Value::as_str)
        .or_else(|| context.get("contactId").and_then(Value::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_dispatch_routes_to_matching_port() {
        let mut effects = MockEffectHandler::new();
        effects
            .expect_send_notification()
            .withf(|message, recipient| {
                message == "High-value deal created! Review and prioritize." && recipient.is_none()
            })
            .once()
            .returning(|_, _| Ok(()));

        let dispatcher = ActionDispatcher::new(Arc::new(effects));
        let action = WorkflowAction::send_notification("High-value deal created! Review and prioritize.");
        dispatcher.dispatch(&action, &json!({})).await.unwrap();
    }

    #[tokio::test]
    async fn test_dispatch_resolves_entity_from_deal_then_contact() {
        let mut effects = MockEffectHandler::new();
        effects
            .expect_assign_owner()
            .withf(|assign_to, entity_id| assign_to == "sales_rep_1" && *entity_id == Some("d42"))
            .once()
            .returning(|_, _| Ok(()));
        effects
            .expect_assign_owner()
            .withf(|assign_to, entity_id| assign_to == "sales_rep_1" && *entity_id == Some("c7"))
            .once()
            .returning(|_, _| Ok(()));

        let dispatcher = ActionDispatcher::new(Arc::new(effects));
        let action = WorkflowAction::assign_owner("sales_rep_1");
        dispatcher
            .dispatch(&action, &json!({"dealId": "d42", "contactId": "c7"}))
            .await
            .unwrap();
        dispatcher
            .dispatch(&action, &json!({"contactId": "c7"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dispatch_resolves_due_date_in_days() {
        let mut effects = MockEffectHandler::new();
        effects
            .expect_create_task()
            .withf(|subject, _, due_at, _| {
                let due = due_at.parse::<chrono::DateTime<Utc>>().unwrap();
                let offset = due - Utc::now();
                subject == "Prepare meeting agenda"
                    && offset > chrono::Duration::hours(23)
                    && offset <= chrono::Duration::hours(24)
            })
            .once()
            .returning(|_, _, _, _| Ok(()));

        let dispatcher = ActionDispatcher::new(Arc::new(effects));
        let action = WorkflowAction::create_task(
            "Prepare meeting agenda",
            "Review customer history and prepare meeting agenda",
            DueDate::Days(1),
        );
        dispatcher.dispatch(&action, &json!({})).await.unwrap();
    }

    #[tokio::test]
    async fn test_port_error_becomes_action_failed() {
        let mut effects = MockEffectHandler::new();
        effects
            .expect_call_webhook()
            .once()
            .returning(|_, _| Err(anyhow::anyhow!("connection refused")));

        let dispatcher = ActionDispatcher::new(Arc::new(effects));
        let action = WorkflowAction::webhook("/api/hooks/deals");
        let err = dispatcher.dispatch(&action, &json!({})).await.unwrap_err();

        match err {
            AutomationError::ActionFailed { action, message } => {
                assert_eq!(action, "webhook");
                assert!(message.contains("connection refused"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_send_email_defaults_to_no_recipients() {
        let mut effects = MockEffectHandler::new();
        effects
            .expect_send_email()
            .withf(|template, _, recipients, _| template == "new_lead_intro" && recipients.is_empty())
            .once()
            .returning(|_, _, _, _| Ok(()));

        let dispatcher = ActionDispatcher::new(Arc::new(effects));
        let action = WorkflowAction::send_email("new_lead_intro", "Welcome! Let's connect");
        dispatcher.dispatch(&action, &json!({})).await.unwrap();
    }
}
