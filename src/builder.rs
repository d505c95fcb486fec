// Workflow Builder - Fluent construction of custom workflow definitions

use chrono::Utc;
use serde_json::Value;

use crate::actions::{ActivityType, DueDate, WorkflowAction};
use crate::conditions::{Condition, ConditionOperator};
use crate::engine::Workflow;
use crate::error::{AutomationError, Result};
use crate::registry::WorkflowRegistry;
use crate::triggers::{TriggerType, WorkflowTrigger};

/// Fluent builder for custom workflows.
///
/// Validation happens in `build()`: a workflow needs a name, a description,
/// a trigger, at least one action, and a creator before it can be
/// registered. Nothing reaches the registry on a validation failure.
///
/// ```
/// use cadence_automation::{ActivityType, DueDate, TriggerType, WorkflowBuilder};
/// use serde_json::json;
///
/// let workflow = WorkflowBuilder::new()
///     .name("Deal Stage Change Follow-up")
///     .description("Schedule follow-up when a deal reaches the proposal stage")
///     .trigger(TriggerType::DealStageChanged)
///     .condition("newStage", cadence_automation::ConditionOperator::Equals, json!("proposal"))
///     .schedule_activity(
///         ActivityType::Call,
///         "Follow-up call",
///         "Discuss proposal with customer",
///         DueDate::Days(2),
///     )
///     .send_email("proposal_sent", "Proposal Sent")
///     .created_by("user123")
///     .build()
///     .unwrap();
///
/// assert_eq!(workflow.actions.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct WorkflowBuilder {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    trigger: Option<WorkflowTrigger>,
    actions: Vec<WorkflowAction>,
    created_by: Option<String>,
    is_active: bool,
    condition_without_trigger: bool,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            name: None,
            description: None,
            trigger: None,
            actions: Vec::new(),
            created_by: None,
            is_active: true,
            condition_without_trigger: false,
        }
    }

    /// Seed a builder from an existing workflow for editing
    pub fn from_workflow(workflow: &Workflow) -> Self {
        Self {
            id: Some(workflow.id.clone()),
            name: Some(workflow.name.clone()),
            description: Some(workflow.description.clone()),
            trigger: Some(workflow.trigger.clone()),
            actions: workflow.actions.clone(),
            created_by: Some(workflow.created_by.clone()),
            is_active: workflow.is_active,
            condition_without_trigger: false,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn trigger(mut self, trigger_type: TriggerType) -> Self {
        self.trigger = Some(WorkflowTrigger::new(trigger_type));
        self
    }

    pub fn trigger_with(mut self, trigger: WorkflowTrigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Add a condition to the trigger. The trigger must be set first; a
    /// condition added before it surfaces as a definition error in `build`.
    pub fn condition(mut self, field: &str, operator: ConditionOperator, value: Value) -> Self {
        match self.trigger.as_mut() {
            Some(trigger) => trigger.conditions.push(Condition::new(field, operator, value)),
            None => self.condition_without_trigger = true,
        }
        self
    }

    /// Delay every run of this workflow by the given number of minutes
    pub fn delay_minutes(mut self, minutes: u32) -> Self {
        if let Some(trigger) = self.trigger.as_mut() {
            trigger.time_delay = Some(minutes);
        } else {
            self.condition_without_trigger = true;
        }
        self
    }

    pub fn action(mut self, action: WorkflowAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn schedule_activity(
        self,
        activity_type: ActivityType,
        subject: &str,
        description: &str,
        due_date: DueDate,
    ) -> Self {
        self.action(WorkflowAction::schedule_activity(
            activity_type,
            subject,
            description,
            due_date,
        ))
    }

    pub fn send_email(self, email_template: &str, subject: &str) -> Self {
        self.action(WorkflowAction::send_email(email_template, subject))
    }

    pub fn update_field(self, field_name: &str, field_value: Value) -> Self {
        self.action(WorkflowAction::update_field(field_name, field_value))
    }

    pub fn create_task(self, subject: &str, description: &str, due_date: DueDate) -> Self {
        self.action(WorkflowAction::create_task(subject, description, due_date))
    }

    pub fn assign_owner(self, assign_to: &str) -> Self {
        self.action(WorkflowAction::assign_owner(assign_to))
    }

    pub fn notify(self, message: &str) -> Self {
        self.action(WorkflowAction::send_notification(message))
    }

    pub fn webhook(self, webhook_url: &str) -> Self {
        self.action(WorkflowAction::webhook(webhook_url))
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn created_by(mut self, user_id: &str) -> Self {
        self.created_by = Some(user_id.to_string());
        self
    }

    /// Validate and produce the workflow
    pub fn build(self) -> Result<Workflow> {
        if self.condition_without_trigger {
            return Err(AutomationError::Definition(
                "trigger must be set before conditions or delay".to_string(),
            ));
        }
        let name = self
            .name
            .ok_or_else(|| AutomationError::Definition("workflow name is required".to_string()))?;
        let description = self.description.ok_or_else(|| {
            AutomationError::Definition("workflow description is required".to_string())
        })?;
        let trigger = self.trigger.ok_or_else(|| {
            AutomationError::Definition("workflow trigger is required".to_string())
        })?;
        if self.actions.is_empty() {
            return Err(AutomationError::Definition(
                "at least one action is required".to_string(),
            ));
        }
        let created_by = self.created_by.ok_or_else(|| {
            AutomationError::Definition("workflow creator is required".to_string())
        })?;

        let now = Utc::now();
        Ok(Workflow {
            id: self.id.unwrap_or_else(Workflow::generate_id),
            name,
            description,
            is_active: self.is_active,
            trigger,
            actions: self.actions,
            created_by,
            created_at: now,
            updated_at: now,
            execution_count: 0,
        })
    }

    /// Validate, then register with the given registry
    pub async fn build_and_register(self, registry: &WorkflowRegistry) -> Result<Workflow> {
        let workflow = self.build()?;
        registry.register(workflow.clone()).await;
        Ok(workflow)
    }
}

impl Default for WorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_builder() -> WorkflowBuilder {
        WorkflowBuilder::new()
            .name("New Lead Auto-Assignment")
            .description("Assign new leads and schedule first contact")
            .trigger(TriggerType::ContactCreated)
            .condition("type", ConditionOperator::Equals, json!("lead"))
            .assign_owner("sales_rep_1")
            .schedule_activity(
                ActivityType::Call,
                "Initial contact",
                "Reach out to new lead",
                DueDate::Days(1),
            )
            .created_by("manager1")
    }

    #[test]
    fn test_build_preserves_action_order() {
        let workflow = valid_builder().build().unwrap();
        assert_eq!(workflow.actions[0].kind(), "assign_owner");
        assert_eq!(workflow.actions[1].kind(), "schedule_activity");
        assert!(workflow.is_active);
        assert_eq!(workflow.execution_count, 0);
        assert!(workflow.id.starts_with("workflow_"));
    }

    #[test]
    fn test_each_missing_field_is_a_definition_error() {
        let missing_name = WorkflowBuilder::new()
            .description("d")
            .trigger(TriggerType::DealWon)
            .notify("hi")
            .created_by("u")
            .build();
        assert!(matches!(missing_name, Err(AutomationError::Definition(msg)) if msg.contains("name")));

        let missing_description = WorkflowBuilder::new()
            .name("n")
            .trigger(TriggerType::DealWon)
            .notify("hi")
            .created_by("u")
            .build();
        assert!(
            matches!(missing_description, Err(AutomationError::Definition(msg)) if msg.contains("description"))
        );

        let missing_trigger = WorkflowBuilder::new()
            .name("n")
            .description("d")
            .notify("hi")
            .created_by("u")
            .build();
        assert!(
            matches!(missing_trigger, Err(AutomationError::Definition(msg)) if msg.contains("trigger"))
        );

        let missing_actions = WorkflowBuilder::new()
            .name("n")
            .description("d")
            .trigger(TriggerType::DealWon)
            .created_by("u")
            .build();
        assert!(
            matches!(missing_actions, Err(AutomationError::Definition(msg)) if msg.contains("action"))
        );

        let missing_creator = WorkflowBuilder::new()
            .name("n")
            .description("d")
            .trigger(TriggerType::DealWon)
            .notify("hi")
            .build();
        assert!(
            matches!(missing_creator, Err(AutomationError::Definition(msg)) if msg.contains("creator"))
        );
    }

    #[test]
    fn test_condition_before_trigger_fails_build() {
        let result = WorkflowBuilder::new()
            .name("n")
            .description("d")
            .condition("stage", ConditionOperator::Equals, json!("won"))
            .trigger(TriggerType::DealWon)
            .notify("hi")
            .created_by("u")
            .build();
        assert!(matches!(result, Err(AutomationError::Definition(_))));
    }

    #[test]
    fn test_build_and_register() {
        tokio_test::block_on(async {
            let registry = WorkflowRegistry::new();
            let workflow = valid_builder().build_and_register(&registry).await.unwrap();
            assert_eq!(registry.get(&workflow.id).await.unwrap(), workflow);
        });
    }

    #[test]
    fn test_from_workflow_round_trip() {
        let original = valid_builder().build().unwrap();
        let edited = WorkflowBuilder::from_workflow(&original)
            .active(false)
            .build()
            .unwrap();

        assert_eq!(edited.id, original.id);
        assert_eq!(edited.actions, original.actions);
        assert!(!edited.is_active);
    }
}
