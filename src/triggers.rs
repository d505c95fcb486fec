// Workflow Triggers - Event kinds that can start workflow execution

use serde::{Deserialize, Serialize};

use crate::conditions::Condition;

/// Domain events that workflows can react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    DealStageChanged,
    DealCreated,
    DealWon,
    DealLost,
    ContactCreated,
    ActivityCompleted,
    FieldUpdated,
    TimeBased,
}

/// Event context delivered with a trigger
pub type EventContext = serde_json::Value;

/// Trigger attached to a workflow: event kind, conditions, optional delay.
///
/// Immutable once the workflow is registered; edits go through the manager
/// as a full workflow replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTrigger {
    #[serde(rename = "type")]
    pub trigger_type: TriggerType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    /// Minutes to wait after a match before running any action
    #[serde(rename = "timeDelay", default, skip_serializing_if = "Option::is_none")]
    pub time_delay: Option<u32>,
}

impl WorkflowTrigger {
    pub fn new(trigger_type: TriggerType) -> Self {
        Self {
            trigger_type,
            conditions: Vec::new(),
            time_delay: None,
        }
    }

    pub fn with_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_delay_minutes(mut self, minutes: u32) -> Self {
        self.time_delay = Some(minutes);
        self
    }
}
