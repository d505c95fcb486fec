// Workflow Manager - Lifecycle operations over registry, engine, and templates

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::actions::WorkflowAction;
use crate::engine::{ExecutionRecord, ExecutionStatus, Workflow, WorkflowEngine};
use crate::error::{AutomationError, Result};
use crate::registry::WorkflowRegistry;
use crate::templates::{TemplateCatalog, WorkflowTemplate};
use crate::triggers::{EventContext, TriggerType, WorkflowTrigger};

/// Aggregate execution statistics for one workflow, computed on demand from
/// its execution history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStats {
    pub total_executions: usize,
    pub successful_executions: usize,
    pub failed_executions: usize,
    /// Average wall time of completed runs; 0 when none completed
    pub average_execution_time_millis: f64,
}

/// Partial update applied over an existing workflow. Unset fields keep their
/// current values; the id can never be changed this way.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub trigger: Option<WorkflowTrigger>,
    pub actions: Option<Vec<WorkflowAction>>,
}

/// High-level facade for managing workflows, templates, and executions
pub struct WorkflowManager {
    registry: Arc<WorkflowRegistry>,
    engine: Arc<WorkflowEngine>,
    templates: TemplateCatalog,
}

impl WorkflowManager {
    pub fn new(engine: Arc<WorkflowEngine>) -> Self {
        Self::with_catalog(engine, TemplateCatalog::builtin())
    }

    pub fn with_catalog(engine: Arc<WorkflowEngine>, templates: TemplateCatalog) -> Self {
        Self {
            registry: engine.registry().clone(),
            engine,
            templates,
        }
    }

    /// Instantiate a workflow from a catalog template.
    ///
    /// The template's trigger and actions are copied, not shared; later
    /// edits to the workflow never touch the catalog.
    pub async fn create_from_template(&self, template_id: &str, user_id: &str) -> Result<Workflow> {
        let template = self
            .templates
            .by_id(template_id)
            .ok_or_else(|| AutomationError::TemplateNotFound(template_id.to_string()))?;

        let now = Utc::now();
        let workflow = Workflow {
            id: Workflow::generate_id(),
            name: template.name.clone(),
            description: template.description.clone(),
            is_active: true,
            trigger: template.trigger.clone(),
            actions: template.actions.clone(),
            created_by: user_id.to_string(),
            created_at: now,
            updated_at: now,
            execution_count: 0,
        };

        self.registry.register(workflow.clone()).await;
        info!("Created workflow '{}' from template {}", workflow.name, template_id);
        Ok(workflow)
    }

    pub fn templates(&self) -> &[WorkflowTemplate] {
        self.templates.all()
    }

    pub fn templates_by_category(&self, category: &str) -> Vec<&WorkflowTemplate> {
        self.templates.by_category(category)
    }

    pub fn search_templates(&self, tag: &str) -> Vec<&WorkflowTemplate> {
        self.templates.search_by_tag(tag)
    }

    pub fn categories(&self) -> Vec<String> {
        self.templates.categories()
    }

    pub async fn get_workflow(&self, workflow_id: &str) -> Option<Workflow> {
        self.registry.get(workflow_id).await
    }

    pub async fn get_active_workflows(&self) -> Vec<Workflow> {
        self.registry.list_active().await
    }

    /// Merge partial fields over an existing workflow and re-register the
    /// result. The id is preserved and `updated_at` is regenerated.
    pub async fn update_workflow(
        &self,
        workflow_id: &str,
        update: WorkflowUpdate,
    ) -> Result<Workflow> {
        let mut workflow = self
            .registry
            .get(workflow_id)
            .await
            .ok_or_else(|| AutomationError::WorkflowNotFound(workflow_id.to_string()))?;

        if let Some(name) = update.name {
            workflow.name = name;
        }
        if let Some(description) = update.description {
            workflow.description = description;
        }
        if let Some(is_active) = update.is_active {
            workflow.is_active = is_active;
        }
        if let Some(trigger) = update.trigger {
            workflow.trigger = trigger;
        }
        if let Some(actions) = update.actions {
            workflow.actions = actions;
        }
        workflow.updated_at = Utc::now();

        self.registry.register(workflow.clone()).await;
        Ok(workflow)
    }

    pub async fn activate_workflow(&self, workflow_id: &str) -> Result<Workflow> {
        self.update_workflow(
            workflow_id,
            WorkflowUpdate {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn deactivate_workflow(&self, workflow_id: &str) -> Result<Workflow> {
        self.update_workflow(
            workflow_id,
            WorkflowUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    /// Remove a workflow from the registry. Deleting an unknown id is a
    /// no-op; execution history is kept.
    pub async fn delete_workflow(&self, workflow_id: &str) {
        self.registry.unregister(workflow_id).await;
    }

    pub async fn trigger_workflows(
        &self,
        trigger_type: TriggerType,
        context: EventContext,
    ) -> Vec<ExecutionRecord> {
        self.engine.trigger_workflows(trigger_type, context).await
    }

    pub async fn get_execution_history(&self, workflow_id: &str) -> Vec<ExecutionRecord> {
        self.engine.get_execution_history(workflow_id).await
    }

    pub async fn get_workflow_stats(&self, workflow_id: &str) -> WorkflowStats {
        let executions = self.engine.get_execution_history(workflow_id).await;

        let successful = executions
            .iter()
            .filter(|e| e.status == ExecutionStatus::Completed)
            .count();
        let failed = executions
            .iter()
            .filter(|e| e.status == ExecutionStatus::Failed)
            .count();

        let completed_times: Vec<f64> = executions
            .iter()
            .filter(|e| e.status == ExecutionStatus::Completed)
            .filter_map(|e| e.completed_at.map(|done| (done - e.triggered_at).num_milliseconds() as f64))
            .collect();
        let average = if completed_times.is_empty() {
            0.0
        } else {
            completed_times.iter().sum::<f64>() / completed_times.len() as f64
        };

        WorkflowStats {
            total_executions: executions.len(),
            successful_executions: successful,
            failed_executions: failed,
            average_execution_time_millis: average,
        }
    }

    /// Serialize a workflow to a self-contained JSON document
    pub async fn export_workflow(&self, workflow_id: &str) -> Result<String> {
        let workflow = self
            .registry
            .get(workflow_id)
            .await
            .ok_or_else(|| AutomationError::WorkflowNotFound(workflow_id.to_string()))?;
        Ok(serde_json::to_string_pretty(&workflow)?)
    }

    /// Parse an exported workflow document and register it as a new
    /// workflow: fresh id, fresh audit stamps, execution count reset.
    pub async fn import_workflow(&self, json: &str, user_id: &str) -> Result<Workflow> {
        let mut workflow: Workflow = serde_json::from_str(json)?;

        let now = Utc::now();
        workflow.id = Workflow::generate_id();
        workflow.created_by = user_id.to_string();
        workflow.created_at = now;
        workflow.updated_at = now;
        workflow.execution_count = 0;

        self.registry.register(workflow.clone()).await;
        Ok(workflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::LoggingEffectHandler;
    use serde_json::json;

    fn manager() -> WorkflowManager {
        let registry = Arc::new(WorkflowRegistry::new());
        let engine = Arc::new(WorkflowEngine::new(registry, Arc::new(LoggingEffectHandler)));
        WorkflowManager::new(engine)
    }

    #[tokio::test]
    async fn test_create_from_template_copies_definition() {
        let manager = manager();
        let workflow = manager
            .create_from_template("template_stale_deal_alert", "user123")
            .await
            .unwrap();

        assert_eq!(workflow.name, "Stale Deal Alert");
        assert_eq!(workflow.created_by, "user123");
        assert_eq!(workflow.execution_count, 0);
        assert!(workflow.is_active);
        assert_eq!(workflow.trigger.conditions.len(), 3);
        let kinds: Vec<&str> = workflow.actions.iter().map(|a| a.kind()).collect();
        assert_eq!(kinds, ["send_notification", "schedule_activity", "update_field"]);

        // registered under its new id, template untouched
        assert!(manager.get_workflow(&workflow.id).await.is_some());
        assert_eq!(manager.templates().len(), 8);
    }

    #[tokio::test]
    async fn test_create_from_unknown_template_fails() {
        let manager = manager();
        let result = manager.create_from_template("template_missing", "user123").await;
        assert!(matches!(result, Err(AutomationError::TemplateNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_preserves_id_and_restamps() {
        let manager = manager();
        let workflow = manager
            .create_from_template("template_deal_won_followup", "user123")
            .await
            .unwrap();

        let updated = manager
            .update_workflow(
                &workflow.id,
                WorkflowUpdate {
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, workflow.id);
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.description, workflow.description);
        assert!(updated.updated_at >= workflow.updated_at);
        assert_eq!(manager.get_workflow(&workflow.id).await.unwrap().name, "Renamed");
    }

    #[tokio::test]
    async fn test_update_unknown_workflow_fails() {
        let manager = manager();
        let result = manager
            .update_workflow("workflow_missing", WorkflowUpdate::default())
            .await;
        assert!(matches!(result, Err(AutomationError::WorkflowNotFound(_))));
    }

    #[tokio::test]
    async fn test_activate_deactivate_toggle() {
        let manager = manager();
        let workflow = manager
            .create_from_template("template_deal_won_followup", "user123")
            .await
            .unwrap();

        let off = manager.deactivate_workflow(&workflow.id).await.unwrap();
        assert!(!off.is_active);
        assert!(manager.get_active_workflows().await.is_empty());

        let on = manager.activate_workflow(&workflow.id).await.unwrap();
        assert!(on.is_active);
        assert_eq!(manager.get_active_workflows().await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let manager = manager();
        let workflow = manager
            .create_from_template("template_deal_won_followup", "user123")
            .await
            .unwrap();

        manager.delete_workflow(&workflow.id).await;
        manager.delete_workflow(&workflow.id).await;
        assert!(manager.get_workflow(&workflow.id).await.is_none());
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let manager = manager();
        let original = manager
            .create_from_template("template_high_value_deal", "user123")
            .await
            .unwrap();

        let exported = manager.export_workflow(&original.id).await.unwrap();
        let imported = manager.import_workflow(&exported, "user456").await.unwrap();

        assert_ne!(imported.id, original.id);
        assert_eq!(imported.name, original.name);
        assert_eq!(imported.description, original.description);
        assert_eq!(imported.trigger, original.trigger);
        assert_eq!(imported.actions, original.actions);
        assert_eq!(imported.created_by, "user456");
        assert_eq!(imported.execution_count, 0);
        assert!(manager.get_workflow(&imported.id).await.is_some());
    }

    #[tokio::test]
    async fn test_export_unknown_workflow_fails() {
        let manager = manager();
        let result = manager.export_workflow("workflow_missing").await;
        assert!(matches!(result, Err(AutomationError::WorkflowNotFound(_))));
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_payload() {
        let manager = manager();
        let result = manager.import_workflow("{\"name\": \"half a workflow\"}", "u").await;
        assert!(matches!(result, Err(AutomationError::Payload(_))));
    }

    #[tokio::test]
    async fn test_stats_on_empty_history() {
        let manager = manager();
        let stats = manager.get_workflow_stats("workflow_missing").await;
        assert_eq!(stats.total_executions, 0);
        assert_eq!(stats.average_execution_time_millis, 0.0);
    }

    #[tokio::test]
    async fn test_stats_counts_completed_runs() {
        let manager = manager();
        let workflow = manager
            .create_from_template("template_deal_won_followup", "user123")
            .await
            .unwrap();

        manager
            .trigger_workflows(TriggerType::DealWon, json!({"dealId": "d1"}))
            .await;
        manager
            .trigger_workflows(TriggerType::DealWon, json!({"dealId": "d2"}))
            .await;

        let stats = manager.get_workflow_stats(&workflow.id).await;
        assert_eq!(stats.total_executions, 2);
        assert_eq!(stats.successful_executions, 2);
        assert_eq!(stats.failed_executions, 0);
        assert!(stats.average_execution_time_millis >= 0.0);
    }
}
