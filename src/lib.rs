// Cadence Workflow Automation
//
// Event-driven automation engine for the Cadence CRM platform.
// Matches domain events (deals, contacts, activities) against registered
// workflow definitions and runs their actions through injected effect ports.

pub mod actions;
pub mod builder;
pub mod conditions;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod manager;
pub mod registry;
pub mod templates;
pub mod triggers;

pub use actions::{ActivityType, DueDate, WorkflowAction};
pub use builder::WorkflowBuilder;
pub use conditions::{Condition, ConditionEvaluator, ConditionOperator};
pub use config::EngineConfig;
pub use engine::{ExecutionRecord, ExecutionStatus, Workflow, WorkflowEngine};
pub use error::{AutomationError, Result};
pub use executor::{ActionDispatcher, EffectHandler, LoggingEffectHandler};
pub use manager::{WorkflowManager, WorkflowStats, WorkflowUpdate};
pub use registry::WorkflowRegistry;
pub use templates::{TemplateCatalog, WorkflowTemplate};
pub use triggers::{EventContext, TriggerType, WorkflowTrigger};
