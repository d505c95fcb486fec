// Workflow Registry - Id-keyed store of registered workflow definitions

use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::engine::Workflow;

/// In-memory registry of workflow definitions, keyed by workflow id.
///
/// The registry owns every registered record; callers get clones and push
/// changes back through `register` (a full replace).
#[derive(Debug, Default)]
pub struct WorkflowRegistry {
    workflows: RwLock<HashMap<String, Workflow>>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a workflow. Upserts: an existing workflow with the same id
    /// is replaced in place.
    pub async fn register(&self, workflow: Workflow) {
        self.workflows
            .write()
            .await
            .insert(workflow.id.clone(), workflow);
    }

    /// Remove a workflow. Removing an unknown id is not an error.
    pub async fn unregister(&self, workflow_id: &str) {
        self.workflows.write().await.remove(workflow_id);
    }

    pub async fn get(&self, workflow_id: &str) -> Option<Workflow> {
        self.workflows.read().await.get(workflow_id).cloned()
    }

    /// All workflows with `is_active == true`. Ordering is stable within a
    /// single call only.
    pub async fn list_active(&self) -> Vec<Workflow> {
        self.workflows
            .read()
            .await
            .values()
            .filter(|w| w.is_active)
            .cloned()
            .collect()
    }

    /// Bump the workflow's execution counter after a completed run.
    /// The read-modify-write happens under the write lock.
    pub async fn record_execution(&self, workflow_id: &str) {
        if let Some(workflow) = self.workflows.write().await.get_mut(workflow_id) {
            workflow.execution_count += 1;
        }
    }

    pub async fn count(&self) -> usize {
        self.workflows.read().await.len()
    }
}
