// Workflow Engine - Trigger matching and workflow run execution

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use crate::actions::WorkflowAction;
use crate::conditions::ConditionEvaluator;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::executor::{ActionDispatcher, EffectHandler};
use crate::registry::WorkflowRegistry;
use crate::triggers::{EventContext, TriggerType, WorkflowTrigger};

/// A registered automation definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub trigger: WorkflowTrigger,
    pub actions: Vec<WorkflowAction>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub execution_count: u64,
}

impl Workflow {
    pub fn generate_id() -> String {
        format!("workflow_{}", Uuid::new_v4())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// One workflow run triggered by one matching event.
///
/// Created in `running` state, transitions exactly once to `completed` or
/// `failed`, then never changes. Records outlive their workflow: deleting a
/// workflow does not invalidate its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub id: String,
    pub workflow_id: String,
    pub triggered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub context: EventContext,
}

impl ExecutionRecord {
    fn started(workflow_id: &str, context: EventContext) -> Self {
        Self {
            id: format!("exec_{}", Uuid::new_v4()),
            workflow_id: workflow_id.to_string(),
            triggered_at: Utc::now(),
            completed_at: None,
            status: ExecutionStatus::Running,
            error: None,
            context,
        }
    }
}

/// Core engine: matches trigger events against active workflows and runs
/// their actions in order, tracking each run in an append-only history.
pub struct WorkflowEngine {
    registry: Arc<WorkflowRegistry>,
    dispatcher: ActionDispatcher,
    evaluator: ConditionEvaluator,
    executions: RwLock<HashMap<String, ExecutionRecord>>,
}

impl WorkflowEngine {
    pub fn new(registry: Arc<WorkflowRegistry>, effects: Arc<dyn EffectHandler>) -> Self {
        Self::with_config(registry, effects, EngineConfig::default())
    }

    pub fn with_config(
        registry: Arc<WorkflowRegistry>,
        effects: Arc<dyn EffectHandler>,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry,
            dispatcher: ActionDispatcher::new(effects),
            evaluator: ConditionEvaluator::new(config.strict_absent_contains),
            executions: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<WorkflowRegistry> {
        &self.registry
    }

    /// Run every active workflow matching the trigger kind whose conditions
    /// hold for this context.
    ///
    /// Matching runs execute one after another; a failure in one run never
    /// aborts its siblings. Returns the records of every run started by this
    /// event, failed ones included. No matches is an empty vec, not an error.
    pub async fn trigger_workflows(
        &self,
        trigger_type: TriggerType,
        context: EventContext,
    ) -> Vec<ExecutionRecord> {
        info!("Processing event: {:?}", trigger_type);

        let matching: Vec<Workflow> = self
            .registry
            .list_active()
            .await
            .into_iter()
            .filter(|w| {
                w.trigger.trigger_type == trigger_type
                    && self.evaluator.evaluate(&w.trigger.conditions, &context)
            })
            .collect();

        let mut executions = Vec::with_capacity(matching.len());
        for workflow in &matching {
            executions.push(self.execute_workflow(workflow, context.clone()).await);
        }

        executions
    }

    async fn execute_workflow(&self, workflow: &Workflow, context: EventContext) -> ExecutionRecord {
        let mut record = ExecutionRecord::started(&workflow.id, context.clone());
        self.executions
            .write()
            .await
            .insert(record.id.clone(), record.clone());

        match self.run_actions(workflow, &context).await {
            Ok(()) => {
                record.status = ExecutionStatus::Completed;
                record.completed_at = Some(Utc::now());
                self.registry.record_execution(&workflow.id).await;
                info!("Workflow '{}' executed successfully", workflow.name);
            }
            Err(e) => {
                record.status = ExecutionStatus::Failed;
                record.error = Some(e.to_string());
                record.completed_at = Some(Utc::now());
                error!("Workflow '{}' failed: {}", workflow.name, e);
            }
        }

        self.executions
            .write()
            .await
            .insert(record.id.clone(), record.clone());

        record
    }

    async fn run_actions(&self, workflow: &Workflow, context: &EventContext) -> Result<()> {
        // Cooperative suspension; other runs keep making progress. The delay
        // lives only in memory and does not survive a process restart.
        if let Some(minutes) = workflow.trigger.time_delay {
            tokio::time::sleep(std::time::Duration::from_secs(u64::from(minutes) * 60)).await;
        }

        for action in &workflow.actions {
            self.dispatcher.dispatch(action, context).await?;
        }

        Ok(())
    }

    /// Execution history for one workflow, newest first.
    pub async fn get_execution_history(&self, workflow_id: &str) -> Vec<ExecutionRecord> {
        let mut history: Vec<ExecutionRecord> = self
            .executions
            .read()
            .await
            .values()
            .filter(|e| e.workflow_id == workflow_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.triggered_at.cmp(&a.triggered_at));
        history
    }

    pub async fn get_execution(&self, execution_id: &str) -> Option<ExecutionRecord> {
        self.executions.read().await.get(execution_id).cloned()
    }
}
