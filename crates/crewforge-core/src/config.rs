use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Smallest epic count a project template may declare.
pub const MIN_EPIC_COUNT: u32 = 2;

/// The fixed catalog of tools a specialized agent may be granted.
pub const TOOL_CATALOG: &[&str] = &[
    "Read",
    "Write",
    "Edit",
    "Bash",
    "Glob",
    "Grep",
    "WebFetch",
    "WebSearch",
    "Task",
];

pub fn is_catalog_tool(tool: &str) -> bool {
    TOOL_CATALOG.contains(&tool)
}

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreComponents {
    /// Always true — every template ships a product manager orchestrator.
    #[serde(default = "default_true")]
    pub product_manager: bool,
    #[serde(default = "default_true")]
    pub meta_agent: bool,
}

impl Default for CoreComponents {
    fn default() -> Self {
        Self {
            product_manager: true,
            meta_agent: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionalFeature {
    SpecializedAgents,
    Logging,
    CustomTools,
}

impl OptionalFeature {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionalFeature::SpecializedAgents => "specialized_agents",
            OptionalFeature::Logging => "logging",
            OptionalFeature::CustomTools => "custom_tools",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalFeatures {
    #[serde(default)]
    pub specialized_agents: bool,
    #[serde(default)]
    pub logging: bool,
    #[serde(default)]
    pub custom_tools: bool,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Epic / Agent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epic {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub purpose: String,
    /// Markdown body of the epic command file.
    #[serde(default)]
    pub definition: String,
    /// Suggested helper agents for this epic, at least one.
    #[serde(default)]
    pub subagents: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub purpose: String,
    /// Tool grants, drawn from [`TOOL_CATALOG`].
    #[serde(default)]
    pub tools: Vec<String>,
    /// Markdown body of the agent persona file.
    #[serde(default)]
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,
}

// ---------------------------------------------------------------------------
// Partial updates
// ---------------------------------------------------------------------------

/// Field-level partial update for an epic. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct EpicPatch {
    pub name: Option<String>,
    pub purpose: Option<String>,
    pub definition: Option<String>,
    pub subagents: Option<Vec<String>>,
}

impl EpicPatch {
    pub fn apply(&self, epic: &mut Epic) {
        if let Some(name) = &self.name {
            epic.name = name.clone();
        }
        if let Some(purpose) = &self.purpose {
            epic.purpose = purpose.clone();
        }
        if let Some(definition) = &self.definition {
            epic.definition = definition.clone();
        }
        if let Some(subagents) = &self.subagents {
            epic.subagents = subagents.clone();
        }
    }
}

/// Field-level partial update for an agent. An empty `response_format`
/// clears the field.
#[derive(Debug, Clone, Default)]
pub struct AgentPatch {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub description: Option<String>,
    pub purpose: Option<String>,
    pub tools: Option<Vec<String>>,
    pub instructions: Option<String>,
    pub response_format: Option<String>,
}

impl AgentPatch {
    pub fn apply(&self, agent: &mut Agent) {
        if let Some(name) = &self.name {
            agent.name = name.clone();
        }
        if let Some(domain) = &self.domain {
            agent.domain = domain.clone();
        }
        if let Some(description) = &self.description {
            agent.description = description.clone();
        }
        if let Some(purpose) = &self.purpose {
            agent.purpose = purpose.clone();
        }
        if let Some(tools) = &self.tools {
            agent.tools = tools.clone();
        }
        if let Some(instructions) = &self.instructions {
            agent.instructions = instructions.clone();
        }
        if let Some(format) = &self.response_format {
            agent.response_format = if format.is_empty() {
                None
            } else {
                Some(format.clone())
            };
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration (root aggregate)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default = "default_epic_count")]
    pub epic_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default)]
    pub core_components: CoreComponents,
    #[serde(default)]
    pub optional_features: OptionalFeatures,
    /// Keyed by epic number. Entries above `epic_count` are dormant: they
    /// survive a count decrease and resurface when the count rises again.
    #[serde(default)]
    pub epics: BTreeMap<u32, Epic>,
    /// Keyed by agent id. Only meaningful when specialized agents are on.
    #[serde(default)]
    pub agents: BTreeMap<String, Agent>,
}

fn default_epic_count() -> u32 {
    MIN_EPIC_COUNT
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            epic_count: MIN_EPIC_COUNT,
            project_name: None,
            core_components: CoreComponents::default(),
            optional_features: OptionalFeatures::default(),
            epics: BTreeMap::new(),
            agents: BTreeMap::new(),
        }
    }
}

impl Configuration {
    /// Epics that participate in validation and export: defined entries
    /// with numbers inside 1..=epic_count, in number order.
    pub fn live_epics(&self) -> impl Iterator<Item = (u32, &Epic)> {
        // ..= instead of 1..= so an epic_count of 0 cannot invert the range.
        self.epics
            .range(..=self.epic_count)
            .filter(|(n, _)| **n >= 1)
            .map(|(n, epic)| (*n, epic))
    }

    pub fn agents_enabled(&self) -> bool {
        self.optional_features.specialized_agents
    }

    pub fn feature(&self, feature: OptionalFeature) -> bool {
        match feature {
            OptionalFeature::SpecializedAgents => self.optional_features.specialized_agents,
            OptionalFeature::Logging => self.optional_features.logging,
            OptionalFeature::CustomTools => self.optional_features.custom_tools,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
