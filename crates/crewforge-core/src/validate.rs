use crate::config::{is_catalog_tool, Configuration, MIN_EPIC_COUNT};
use crate::template;
use serde::Serialize;

pub const MIN_NAME_LEN: usize = 3;
pub const MIN_DOMAIN_LEN: usize = 3;
pub const MIN_PURPOSE_LEN: usize = 20;
pub const MIN_DESCRIPTION_LEN: usize = 20;
pub const MIN_DEFINITION_LEN: usize = 50;

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorScope {
    Config,
    Epic,
    Agent,
}

/// A user-fixable defect in the configuration. Always derived, never
/// persisted; blocks export, never blocks editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub scope: ErrorScope,
    /// Entity identifier: epic number, agent id, or `"config"`.
    pub key: String,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn config(field: &str, message: impl Into<String>) -> Self {
        Self {
            scope: ErrorScope::Config,
            key: "config".to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }

    fn epic(number: u32, field: &str, message: impl Into<String>) -> Self {
        Self {
            scope: ErrorScope::Epic,
            key: number.to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }

    fn agent(id: &str, field: &str, message: impl Into<String>) -> Self {
        Self {
            scope: ErrorScope::Agent,
            key: id.to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn matches(&self, scope: ErrorScope, key: &str) -> bool {
        self.scope == scope && self.key == key
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

/// Check the full configuration. Pure and deterministic: identical input
/// yields an identical error list in a stable order. Cheap enough to run
/// on every field change — a single pass over epics and agents.
pub fn validate(config: &Configuration) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // 1. Minimum epic count.
    if config.epic_count < MIN_EPIC_COUNT {
        errors.push(ValidationError::config(
            "epic_count",
            format!(
                "epic count is {} but at least {} are required",
                config.epic_count, MIN_EPIC_COUNT
            ),
        ));
    }

    // 2. Declared count must match defined epics. Dormant entries above
    //    the count are deliberately not counted.
    let defined = config.live_epics().count() as u32;
    if defined != config.epic_count {
        errors.push(ValidationError::config(
            "epics",
            format!(
                "declared epic count is {} but {} epic(s) are defined",
                config.epic_count, defined
            ),
        ));
    }

    // 3. Per-epic field checks, in epic-number order.
    for (number, epic) in config.live_epics() {
        if epic.name.chars().count() < MIN_NAME_LEN {
            errors.push(ValidationError::epic(
                number,
                "name",
                format!("name must be at least {MIN_NAME_LEN} characters"),
            ));
        }
        if epic.purpose.chars().count() < MIN_PURPOSE_LEN {
            errors.push(ValidationError::epic(
                number,
                "purpose",
                format!("purpose must be at least {MIN_PURPOSE_LEN} characters"),
            ));
        }
        if epic.definition.chars().count() < MIN_DEFINITION_LEN {
            errors.push(ValidationError::epic(
                number,
                "definition",
                format!("definition must be at least {MIN_DEFINITION_LEN} characters"),
            ));
        }
        if epic.subagents.is_empty() {
            errors.push(ValidationError::epic(
                number,
                "subagents",
                "at least one suggested subagent is required",
            ));
        } else if epic.subagents.iter().any(|s| s.trim().is_empty()) {
            errors.push(ValidationError::epic(
                number,
                "subagents",
                "subagent entries must be non-empty",
            ));
        }
    }

    // Epic name uniqueness: one error per duplicated name, anchored on the
    // first epic (in number order) that carries it.
    let mut seen: Vec<(&str, u32)> = Vec::new();
    let mut reported: Vec<&str> = Vec::new();
    for (number, epic) in config.live_epics() {
        let name = epic.name.as_str();
        if name.is_empty() {
            continue;
        }
        match seen.iter().find(|(n, _)| *n == name) {
            Some((_, first)) => {
                if !reported.contains(&name) {
                    errors.push(ValidationError::epic(
                        *first,
                        "name",
                        format!("epic name '{name}' is used more than once"),
                    ));
                    reported.push(name);
                }
            }
            None => seen.push((name, number)),
        }
    }

    // 4. Agent checks, only when the feature is on.
    if config.agents_enabled() {
        for (id, agent) in &config.agents {
            if agent.name.chars().count() < MIN_NAME_LEN {
                errors.push(ValidationError::agent(
                    id,
                    "name",
                    format!("name must be at least {MIN_NAME_LEN} characters"),
                ));
            }
            if agent.domain.chars().count() < MIN_DOMAIN_LEN {
                errors.push(ValidationError::agent(
                    id,
                    "domain",
                    format!("domain must be at least {MIN_DOMAIN_LEN} characters"),
                ));
            }
            if agent.description.chars().count() < MIN_DESCRIPTION_LEN {
                errors.push(ValidationError::agent(
                    id,
                    "description",
                    format!("description must be at least {MIN_DESCRIPTION_LEN} characters"),
                ));
            }
            if agent.purpose.chars().count() < MIN_PURPOSE_LEN {
                errors.push(ValidationError::agent(
                    id,
                    "purpose",
                    format!("purpose must be at least {MIN_PURPOSE_LEN} characters"),
                ));
            }
            if agent.tools.is_empty() {
                errors.push(ValidationError::agent(
                    id,
                    "tools",
                    "at least one tool grant is required",
                ));
            } else {
                let unknown: Vec<&str> = agent
                    .tools
                    .iter()
                    .filter(|t| !is_catalog_tool(t))
                    .map(String::as_str)
                    .collect();
                if !unknown.is_empty() {
                    errors.push(ValidationError::agent(
                        id,
                        "tools",
                        format!("unknown tool(s): {}", unknown.join(", ")),
                    ));
                }
            }
        }

        let mut seen: Vec<(&str, &str)> = Vec::new();
        let mut reported: Vec<&str> = Vec::new();
        for (id, agent) in &config.agents {
            let name = agent.name.as_str();
            if name.is_empty() {
                continue;
            }
            match seen.iter().find(|(n, _)| *n == name) {
                Some((_, first)) => {
                    if !reported.contains(&name) {
                        errors.push(ValidationError::agent(
                            first,
                            "name",
                            format!("agent name '{name}' is used more than once"),
                        ));
                        reported.push(name);
                    }
                }
                None => seen.push((name, id.as_str())),
            }
        }
    }

    // 5. Unresolved placeholder scan over free text.
    for (number, epic) in config.live_epics() {
        for token in template::placeholders(&epic.definition) {
            if !template::is_recognized_key(&token) {
                errors.push(ValidationError::epic(
                    number,
                    "definition",
                    format!("unresolved template variable '{{{{{token}}}}}'"),
                ));
            }
        }
    }
    if config.agents_enabled() {
        for (id, agent) in &config.agents {
            for token in template::placeholders(&agent.instructions) {
                if !template::is_recognized_key(&token) {
                    errors.push(ValidationError::agent(
                        id,
                        "instructions",
                        format!("unresolved template variable '{{{{{token}}}}}'"),
                    ));
                }
            }
        }
    }

    errors
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Agent, Epic};

    fn valid_epic(name: &str) -> Epic {
        Epic {
            name: name.to_string(),
            purpose: "x".repeat(20),
            definition: "y".repeat(50),
            subagents: vec!["Env Specialist".to_string()],
        }
    }

    fn valid_agent(name: &str) -> Agent {
        Agent {
            name: name.to_string(),
            domain: "testing".to_string(),
            description: "d".repeat(20),
            purpose: "p".repeat(20),
            tools: vec!["Read".to_string()],
            instructions: "Run the suite and report.".to_string(),
            response_format: None,
        }
    }

    fn valid_config() -> Configuration {
        let mut cfg = Configuration::default();
        cfg.epics.insert(1, valid_epic("Setup"));
        cfg.epics.insert(2, valid_epic("Build"));
        cfg
    }

    #[test]
    fn valid_two_epic_configuration_passes() {
        // Concrete scenario A.
        assert!(validate(&valid_config()).is_empty());
    }

    #[test]
    fn epic_count_below_minimum() {
        let mut cfg = valid_config();
        cfg.epic_count = 1;
        let errors = validate(&cfg);
        assert!(errors
            .iter()
            .any(|e| e.scope == ErrorScope::Config && e.field == "epic_count"));
    }

    #[test]
    fn declared_count_must_match_defined_epics() {
        let mut cfg = valid_config();
        cfg.epic_count = 3;
        let errors = validate(&cfg);
        let mismatch: Vec<_> = errors
            .iter()
            .filter(|e| e.scope == ErrorScope::Config && e.field == "epics")
            .collect();
        assert_eq!(mismatch.len(), 1);
        assert!(mismatch[0].message.contains('3'));
        assert!(mismatch[0].message.contains('2'));
    }

    #[test]
    fn duplicated_epic_name_reported_once() {
        let mut cfg = valid_config();
        cfg.epic_count = 3;
        cfg.epics.insert(3, valid_epic("Setup"));
        let errors = validate(&cfg);
        let dupes: Vec<_> = errors
            .iter()
            .filter(|e| e.message.contains("used more than once"))
            .collect();
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].key, "1");
        assert!(dupes[0].message.contains("Setup"));
    }

    #[test]
    fn short_epic_fields_each_produce_an_error() {
        let mut cfg = valid_config();
        cfg.epics.insert(
            2,
            Epic {
                name: "ab".to_string(),
                purpose: "short".to_string(),
                definition: "also short".to_string(),
                subagents: vec![],
            },
        );
        let errors = validate(&cfg);
        for field in ["name", "purpose", "definition", "subagents"] {
            assert!(
                errors
                    .iter()
                    .any(|e| e.key == "2" && e.field == field),
                "missing error for field {field}"
            );
        }
    }

    #[test]
    fn agent_with_empty_tools_yields_exactly_one_tools_error() {
        // Concrete scenario B.
        let mut cfg = valid_config();
        cfg.optional_features.specialized_agents = true;
        let mut agent = valid_agent("Reviewer");
        agent.tools.clear();
        cfg.agents.insert("reviewer".to_string(), agent);
        let errors = validate(&cfg);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "tools");
        assert_eq!(errors[0].key, "reviewer");
    }

    #[test]
    fn agent_rules_skipped_when_feature_disabled() {
        let mut cfg = valid_config();
        let mut agent = valid_agent("Reviewer");
        agent.tools.clear();
        cfg.agents.insert("reviewer".to_string(), agent);
        assert!(validate(&cfg).is_empty());
    }

    #[test]
    fn unknown_tool_is_reported() {
        let mut cfg = valid_config();
        cfg.optional_features.specialized_agents = true;
        let mut agent = valid_agent("Reviewer");
        agent.tools = vec!["Read".to_string(), "Teleport".to_string()];
        cfg.agents.insert("reviewer".to_string(), agent);
        let errors = validate(&cfg);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Teleport"));
    }

    #[test]
    fn unresolved_placeholder_in_definition() {
        let mut cfg = valid_config();
        let mut epic = valid_epic("Build");
        epic.definition = format!("{} uses {{{{BOGUS_VAR}}}}", "y".repeat(50));
        cfg.epics.insert(2, epic);
        let errors = validate(&cfg);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "definition");
        assert!(errors[0].message.contains("BOGUS_VAR"));
    }

    #[test]
    fn recognized_placeholder_in_definition_is_fine() {
        let mut cfg = valid_config();
        let mut epic = valid_epic("Build");
        epic.definition = format!("{} for {{{{PROJECT_NAME}}}}", "y".repeat(50));
        cfg.epics.insert(2, epic);
        assert!(validate(&cfg).is_empty());
    }

    #[test]
    fn dormant_epics_are_ignored() {
        let mut cfg = valid_config();
        // A dormant, completely invalid epic above the count.
        cfg.epics.insert(5, Epic::default());
        assert!(validate(&cfg).is_empty());
    }

    #[test]
    fn result_order_is_stable() {
        let mut cfg = valid_config();
        cfg.epic_count = 1;
        cfg.epics.insert(9, Epic::default());
        let first = validate(&cfg);
        let second = validate(&cfg);
        assert_eq!(first, second);
    }
}
