// Workflow Templates - Read-only catalog of prebuilt automation blueprints

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::actions::{ActivityType, DueDate, WorkflowAction};
use crate::conditions::Condition;
use crate::triggers::{TriggerType, WorkflowTrigger};

/// A prebuilt workflow blueprint. Templates are never mutated; instantiating
/// one copies its trigger and actions into a fresh workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub trigger: WorkflowTrigger,
    pub actions: Vec<WorkflowAction>,
    pub tags: Vec<String>,
}

/// Catalog of available templates
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<WorkflowTemplate>,
}

impl TemplateCatalog {
    /// Catalog seeded with the built-in templates
    pub fn builtin() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }

    pub fn with_templates(templates: Vec<WorkflowTemplate>) -> Self {
        Self { templates }
    }

    pub fn all(&self) -> &[WorkflowTemplate] {
        &self.templates
    }

    pub fn by_id(&self, id: &str) -> Option<&WorkflowTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn by_category(&self, category: &str) -> Vec<&WorkflowTemplate> {
        self.templates
            .iter()
            .filter(|t| t.category == category)
            .collect()
    }

    /// Case-insensitive substring search over template tags
    pub fn search_by_tag(&self, tag: &str) -> Vec<&WorkflowTemplate> {
        let needle = tag.to_lowercase();
        self.templates
            .iter()
            .filter(|t| t.tags.iter().any(|tag| tag.to_lowercase().contains(&needle)))
            .collect()
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for template in &self.templates {
            if !seen.contains(&template.category) {
                seen.push(template.category.clone());
            }
        }
        seen
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn template(
    id: &str,
    name: &str,
    description: &str,
    category: &str,
    trigger: WorkflowTrigger,
    actions: Vec<WorkflowAction>,
    tags: &[&str],
) -> WorkflowTemplate {
    WorkflowTemplate {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        trigger,
        actions,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

fn builtin_templates() -> Vec<WorkflowTemplate> {
    vec![
        template(
            "template_deal_won_followup",
            "Deal Won Follow-up",
            "Automatically schedule a thank you call and send a welcome email when a deal is won",
            "Deal Management",
            WorkflowTrigger::new(TriggerType::DealWon),
            vec![
                WorkflowAction::send_email("deal_won_welcome", "Thank you for your business!"),
                WorkflowAction::schedule_activity(
                    ActivityType::Call,
                    "Thank you call",
                    "Call customer to thank them and ensure smooth onboarding",
                    DueDate::Days(2),
                ),
                WorkflowAction::update_field("customer_status", json!("active")),
            ],
            &["deal", "won", "follow-up", "onboarding"],
        ),
        template(
            "template_stage_progression",
            "Deal Stage Progression",
            "Automatically schedule follow-up activities when a deal moves to a new stage",
            "Deal Management",
            WorkflowTrigger::new(TriggerType::DealStageChanged),
            vec![
                WorkflowAction::schedule_activity(
                    ActivityType::FollowUp,
                    "Follow up on deal progression",
                    "Check in with customer about next steps",
                    DueDate::Days(3),
                ),
                WorkflowAction::send_notification(
                    "Deal has moved to a new stage. Review and take action.",
                ),
            ],
            &["deal", "stage", "follow-up"],
        ),
        template(
            "template_new_lead_assignment",
            "New Lead Auto-Assignment",
            "Automatically assign new leads to sales reps and schedule first contact",
            "Lead Management",
            WorkflowTrigger::new(TriggerType::ContactCreated)
                .with_condition(Condition::equals("type", json!("lead"))),
            vec![
                WorkflowAction::assign_owner("round_robin"),
                WorkflowAction::schedule_activity(
                    ActivityType::Call,
                    "Initial lead contact",
                    "Reach out to new lead within 24 hours",
                    DueDate::Days(1),
                ),
                WorkflowAction::send_email("new_lead_intro", "Welcome! Let's connect"),
            ],
            &["lead", "assignment", "first-contact"],
        ),
        template(
            "template_stale_deal_alert",
            "Stale Deal Alert",
            "Send alerts and schedule follow-ups for deals that haven't been updated recently",
            "Deal Management",
            WorkflowTrigger::new(TriggerType::TimeBased).with_conditions(vec![
                Condition::greater_than("days_since_update", 14.0),
                Condition::not_equals("stage", json!("won")),
                Condition::not_equals("stage", json!("lost")),
            ]),
            vec![
                WorkflowAction::send_notification(
                    "This deal has not been updated in 14 days. Please review and update.",
                ),
                WorkflowAction::schedule_activity(
                    ActivityType::FollowUp,
                    "Re-engage with stale deal",
                    "Contact customer to move deal forward or close",
                    DueDate::Days(1),
                ),
                WorkflowAction::update_field("priority", json!("high")),
            ],
            &["deal", "stale", "alert", "priority"],
        ),
        template(
            "template_proposal_sent",
            "Proposal Sent Follow-up",
            "Automatically schedule follow-up activities after sending a proposal",
            "Sales Process",
            WorkflowTrigger::new(TriggerType::DealStageChanged)
                .with_condition(Condition::equals("newStage", json!("proposal_sent"))),
            vec![
                WorkflowAction::schedule_activity(
                    ActivityType::Call,
                    "Proposal follow-up call",
                    "Check if customer received proposal and answer any questions",
                    DueDate::Days(2),
                ),
                WorkflowAction::schedule_activity(
                    ActivityType::Email,
                    "Proposal check-in email",
                    "Send email checking if there are any questions about the proposal",
                    DueDate::Days(5),
                ),
                WorkflowAction::send_notification("Proposal sent. Follow-up activities scheduled."),
            ],
            &["proposal", "follow-up", "sales"],
        ),
        template(
            "template_meeting_scheduled",
            "Meeting Preparation",
            "Prepare for upcoming meetings by creating tasks and sending reminders",
            "Activity Management",
            WorkflowTrigger::new(TriggerType::ActivityCompleted)
                .with_condition(Condition::equals("activityType", json!("meeting_scheduled"))),
            vec![
                WorkflowAction::create_task(
                    "Prepare meeting agenda",
                    "Review customer history and prepare meeting agenda",
                    DueDate::Days(1),
                ),
                WorkflowAction::create_task(
                    "Research customer background",
                    "Research customer's company, industry, and recent news",
                    DueDate::Days(1),
                ),
                WorkflowAction::send_email("meeting_confirmation", "Looking forward to our meeting"),
            ],
            &["meeting", "preparation", "tasks"],
        ),
        template(
            "template_lost_deal_analysis",
            "Lost Deal Analysis",
            "Capture feedback and schedule analysis when a deal is lost",
            "Deal Management",
            WorkflowTrigger::new(TriggerType::DealLost),
            vec![
                WorkflowAction::create_task(
                    "Document loss reason",
                    "Document why the deal was lost and any lessons learned",
                    DueDate::Days(0),
                ),
                WorkflowAction::schedule_activity(
                    ActivityType::FollowUp,
                    "Future opportunity check-in",
                    "Check in with prospect about future opportunities",
                    DueDate::Days(90),
                ),
                WorkflowAction::update_field("follow_up_date", json!(90)),
            ],
            &["deal", "lost", "analysis", "future"],
        ),
        template(
            "template_high_value_deal",
            "High-Value Deal Monitoring",
            "Special handling and notifications for high-value deals",
            "Deal Management",
            WorkflowTrigger::new(TriggerType::DealCreated)
                .with_condition(Condition::greater_than("value", 50000.0)),
            vec![
                WorkflowAction::send_notification("High-value deal created! Review and prioritize."),
                WorkflowAction::update_field("priority", json!("high")),
                WorkflowAction::schedule_activity(
                    ActivityType::Meeting,
                    "High-value deal strategy meeting",
                    "Plan approach for this high-value opportunity",
                    DueDate::Days(1),
                ),
                WorkflowAction::webhook("/api/notifications/high-value-deal"),
            ],
            &["deal", "high-value", "priority", "monitoring"],
        ),
    ]
}
