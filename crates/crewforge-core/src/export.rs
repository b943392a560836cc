use crate::archive;
use crate::config::Configuration;
use crate::error::Result;
use crate::paths;
use crate::template::{TemplateEngine, TemplateName};
use crate::validate::{validate, ValidationError};
use chrono::{DateTime, Utc};

/// Ticks after which a finished trigger reverts from Success/Error to Ready.
pub const REVERT_DELAY: u64 = 20;

/// Placeholder value for a neighbor reference that falls off either end of
/// the epic sequence.
const NO_NEIGHBOR: &str = "none";

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ExportOutcome {
    /// Validation passed; the archive is ready to hand to the platform.
    Archived { archive: Vec<u8>, filename: String },
    /// Validation failed; nothing was rendered and no archive exists.
    Invalid { errors: Vec<ValidationError> },
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Render the complete (path, text) file set for a configuration.
///
/// Pure with respect to its inputs: the same configuration and templates
/// yield byte-identical pairs, which is what makes export idempotent. The
/// configuration is read, never mutated.
pub fn render_files(engine: &TemplateEngine, config: &Configuration) -> Vec<(String, String)> {
    let project_name = config
        .project_name
        .clone()
        .unwrap_or_else(|| "Untitled Project".to_string());
    let epic_count = config.epic_count.to_string();

    let mut files = Vec::new();

    // Orchestrator, always first.
    let orchestrator = engine.load(TemplateName::Orchestrator);
    files.push((
        paths::ORCHESTRATOR_FILE.to_string(),
        engine.render(
            &orchestrator,
            &[
                ("PROJECT_NAME", project_name.clone()),
                ("EPIC_COUNT", epic_count.clone()),
                ("EPIC_LIST", epic_list(config)),
            ],
        ),
    ));

    // Meta-agent, fixed template, no per-entity variables.
    if config.core_components.meta_agent {
        let meta = engine.load(TemplateName::MetaAgent);
        files.push((paths::META_AGENT_FILE.to_string(), engine.render(&meta, &[])));
    }

    // One file per live epic, with derived neighbor references.
    let epic_template = engine.load(TemplateName::Epic);
    for (number, epic) in config.live_epics() {
        let prev = if number > 1 {
            (number - 1).to_string()
        } else {
            NO_NEIGHBOR.to_string()
        };
        let next = if number < config.epic_count {
            (number + 1).to_string()
        } else {
            NO_NEIGHBOR.to_string()
        };
        files.push((
            paths::epic_file(number),
            engine.render(
                &epic_template,
                &[
                    ("PROJECT_NAME", project_name.clone()),
                    ("EPIC_COUNT", epic_count.clone()),
                    ("EPIC_NUMBER", number.to_string()),
                    ("EPIC_NAME", epic.name.clone()),
                    ("EPIC_PURPOSE", epic.purpose.clone()),
                    ("EPIC_DEFINITION", epic.definition.clone()),
                    ("SUBAGENT_LIST", bullet_list(&epic.subagents)),
                    ("PREV_EPIC", prev),
                    ("NEXT_EPIC", next),
                ],
            ),
        ));
    }

    // One file per agent, when the feature is on.
    if config.agents_enabled() {
        let agent_template = engine.load(TemplateName::Agent);
        for (id, agent) in &config.agents {
            files.push((
                paths::agent_file(id),
                engine.render(
                    &agent_template,
                    &[
                        ("AGENT_ID", id.clone()),
                        ("AGENT_NAME", agent.name.clone()),
                        ("AGENT_DOMAIN", agent.domain.clone()),
                        ("AGENT_DESCRIPTION", agent.description.clone()),
                        ("AGENT_PURPOSE", agent.purpose.clone()),
                        ("TOOL_LIST", agent.tools.join(", ")),
                        ("AGENT_INSTRUCTIONS", agent.instructions.clone()),
                        (
                            "RESPONSE_FORMAT",
                            agent
                                .response_format
                                .clone()
                                .unwrap_or_else(|| "Free-form markdown.".to_string()),
                        ),
                    ],
                ),
            ));
        }
    }

    // README last, summarizing the whole configuration.
    let readme = engine.load(TemplateName::Readme);
    files.push((
        paths::README_FILE.to_string(),
        engine.render(
            &readme,
            &[
                ("PROJECT_NAME", project_name),
                ("EPIC_COUNT", epic_count),
                ("EPIC_LIST", epic_list(config)),
                ("AGENT_LIST", agent_list(config)),
                ("DIRECTORY_LAYOUT", directory_layout(config)),
            ],
        ),
    ));

    files
}

/// Deterministic archive filename: fixed prefix plus UTC timestamp.
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!(
        "{}-{}.zip",
        paths::EXPORT_PREFIX,
        now.format("%Y%m%d-%H%M%S")
    )
}

/// Run the full pipeline: validation gate, rendering, archive assembly.
///
/// A failing gate returns `Invalid` without rendering anything. An archive
/// failure after a passing gate is an `Err` — transient, retryable, and
/// the configuration is untouched either way.
pub fn export(
    engine: &TemplateEngine,
    config: &Configuration,
    now: DateTime<Utc>,
) -> Result<ExportOutcome> {
    let errors = validate(config);
    if !errors.is_empty() {
        return Ok(ExportOutcome::Invalid { errors });
    }

    let files = render_files(engine, config);
    let blob = archive::bundle(&files)?;
    Ok(ExportOutcome::Archived {
        archive: blob,
        filename: export_filename(now),
    })
}

// ---------------------------------------------------------------------------
// Summary formatting
// ---------------------------------------------------------------------------

fn epic_list(config: &Configuration) -> String {
    let lines: Vec<String> = config
        .live_epics()
        .map(|(n, e)| format!("{n}. **{}** — {}", e.name, e.purpose))
        .collect();
    lines.join("\n")
}

fn agent_list(config: &Configuration) -> String {
    if !config.agents_enabled() || config.agents.is_empty() {
        return "None — specialized agents are not enabled.".to_string();
    }
    let lines: Vec<String> = config
        .agents
        .iter()
        .map(|(id, a)| format!("- **{}** (`{id}`) — {}", a.name, a.domain))
        .collect();
    lines.join("\n")
}

fn bullet_list(items: &[String]) -> String {
    let lines: Vec<String> = items.iter().map(|s| format!("- {s}")).collect();
    lines.join("\n")
}

fn directory_layout(config: &Configuration) -> String {
    let mut out = String::from("commands/\n  product-manager.md\n");
    if config.core_components.meta_agent {
        out.push_str("  meta-agent.md\n");
    }
    out.push_str("  epics/\n");
    for (n, _) in config.live_epics() {
        out.push_str(&format!("    epic-{n}.md\n"));
    }
    if config.agents_enabled() && !config.agents.is_empty() {
        out.push_str("agents/\n");
        for id in config.agents.keys() {
            out.push_str(&format!("  {id}.md\n"));
        }
    }
    out.push_str("README.md");
    out
}

// ---------------------------------------------------------------------------
// Trigger state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Ready,
    Loading,
    Success,
    Error,
}

/// The user-visible export affordance. `begin` refuses re-entry while an
/// export is in flight, and finished states revert to Ready on their own
/// after [`REVERT_DELAY`] ticks.
#[derive(Debug)]
pub struct ExportTrigger {
    state: TriggerState,
    revert_at: Option<u64>,
}

impl Default for ExportTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportTrigger {
    pub fn new() -> Self {
        Self {
            state: TriggerState::Ready,
            revert_at: None,
        }
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    /// Returns false while an export is already in flight.
    pub fn begin(&mut self) -> bool {
        if self.state == TriggerState::Loading {
            return false;
        }
        self.state = TriggerState::Loading;
        self.revert_at = None;
        true
    }

    pub fn finish_success(&mut self, now: u64) {
        self.state = TriggerState::Success;
        self.revert_at = Some(now + REVERT_DELAY);
    }

    pub fn finish_error(&mut self, now: u64) {
        self.state = TriggerState::Error;
        self.revert_at = Some(now + REVERT_DELAY);
    }

    pub fn poll(&mut self, now: u64) {
        if let Some(at) = self.revert_at {
            if now >= at {
                self.state = TriggerState::Ready;
                self.revert_at = None;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
