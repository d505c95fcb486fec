use std::env;

/// Engine configuration.
///
/// `strict_absent_contains` controls how the `contains` operator treats a
/// field that is missing from the event context. The compatible default
/// coerces the missing value to the string `"undefined"` before the
/// containment test; strict mode fails the condition instead.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub strict_absent_contains: bool,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            strict_absent_contains: env::var("WORKFLOW_STRICT_CONTAINS")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        }
    }
}
