use crate::error::Result;
use crate::templates;
use crate::{io, paths};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Placeholder tokens recognized across all templates. Tokens outside this
/// vocabulary found in free text are reported by the Validator as
/// unresolved variables.
pub const RECOGNIZED_KEYS: &[&str] = &[
    "PROJECT_NAME",
    "EPIC_COUNT",
    "EPIC_LIST",
    "EPIC_NUMBER",
    "EPIC_NAME",
    "EPIC_PURPOSE",
    "EPIC_DEFINITION",
    "SUBAGENT_LIST",
    "PREV_EPIC",
    "NEXT_EPIC",
    "AGENT_ID",
    "AGENT_NAME",
    "AGENT_DOMAIN",
    "AGENT_DESCRIPTION",
    "AGENT_PURPOSE",
    "TOOL_LIST",
    "AGENT_INSTRUCTIONS",
    "RESPONSE_FORMAT",
    "AGENT_LIST",
    "DIRECTORY_LAYOUT",
];

pub fn is_recognized_key(key: &str) -> bool {
    RECOGNIZED_KEYS.contains(&key)
}

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{\{([A-Z][A-Z0-9_]*)\}\}").unwrap())
}

/// All placeholder tokens in `text`, deduplicated, in order of first
/// appearance.
pub fn placeholders(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in placeholder_re().captures_iter(text) {
        let token = caps[1].to_string();
        if !seen.contains(&token) {
            seen.push(token);
        }
    }
    seen
}

// ---------------------------------------------------------------------------
// Template names
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateName {
    Orchestrator,
    MetaAgent,
    Epic,
    Agent,
    Readme,
}

impl TemplateName {
    pub const ALL: [TemplateName; 5] = [
        TemplateName::Orchestrator,
        TemplateName::MetaAgent,
        TemplateName::Epic,
        TemplateName::Agent,
        TemplateName::Readme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateName::Orchestrator => "product-manager",
            TemplateName::MetaAgent => "meta-agent",
            TemplateName::Epic => "epic",
            TemplateName::Agent => "agent",
            TemplateName::Readme => "readme",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.md", self.as_str())
    }

    /// Embedded fallback text, always available.
    pub fn default_text(&self) -> &'static str {
        match self {
            TemplateName::Orchestrator => templates::ORCHESTRATOR,
            TemplateName::MetaAgent => templates::META_AGENT,
            TemplateName::Epic => templates::EPIC,
            TemplateName::Agent => templates::AGENT,
            TemplateName::Readme => templates::README,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Loads named template texts and substitutes variables into them.
///
/// Templates resolve from an optional override directory
/// (`.crewforge/templates/<name>.md`); a missing or unreadable override
/// falls back to the embedded default. Loading never surfaces an error to
/// the caller.
#[derive(Debug, Default)]
pub struct TemplateEngine {
    override_dir: Option<PathBuf>,
}

impl TemplateEngine {
    /// Engine that only serves the embedded defaults.
    pub fn embedded() -> Self {
        Self { override_dir: None }
    }

    /// Engine that prefers override files under `dir`.
    pub fn with_overrides(dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: Some(dir.into()),
        }
    }

    /// Engine for a project root: overrides enabled iff the project has a
    /// `.crewforge/templates/` directory.
    pub fn for_root(root: &Path) -> Self {
        let dir = paths::templates_dir(root);
        if dir.is_dir() {
            Self::with_overrides(dir)
        } else {
            Self::embedded()
        }
    }

    pub fn load(&self, name: TemplateName) -> String {
        if let Some(dir) = &self.override_dir {
            let path = dir.join(name.file_name());
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(text) => return text,
                    Err(e) => {
                        tracing::warn!(
                            "failed to read template override {}: {e}; using embedded default",
                            path.display()
                        );
                    }
                }
            }
        }
        name.default_text().to_string()
    }

    /// Literal substitution of every `{{KEY}}` occurrence for its value.
    /// Tokens with no corresponding variable are left untouched; spotting
    /// leftovers is the Validator's job.
    pub fn render(&self, template: &str, variables: &[(&str, String)]) -> String {
        let mut out = template.to_string();
        for (key, value) in variables {
            out = out.replace(&format!("{{{{{key}}}}}"), value);
        }
        out
    }

    /// Write the embedded defaults into `dir` for customization, skipping
    /// files that already exist. Returns the names written.
    pub fn eject(&self, dir: &Path) -> Result<Vec<String>> {
        io::ensure_dir(dir)?;
        let mut written = Vec::new();
        for name in TemplateName::ALL {
            let path = dir.join(name.file_name());
            if io::write_if_missing(&path, name.default_text().as_bytes())? {
                written.push(name.file_name());
            }
        }
        Ok(written)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn render_substitutes_every_occurrence() {
        let engine = TemplateEngine::embedded();
        let out = engine.render(
            "{{EPIC_NAME}} and again {{EPIC_NAME}}, count {{EPIC_COUNT}}",
            &[
                ("EPIC_NAME", "Setup".to_string()),
                ("EPIC_COUNT", "3".to_string()),
            ],
        );
        assert_eq!(out, "Setup and again Setup, count 3");
    }

    #[test]
    fn render_leaves_unknown_tokens_untouched() {
        let engine = TemplateEngine::embedded();
        let out = engine.render("{{MYSTERY_TOKEN}}", &[("EPIC_NAME", "x".to_string())]);
        assert_eq!(out, "{{MYSTERY_TOKEN}}");
    }

    #[test]
    fn render_with_covering_variables_leaves_no_delimiters() {
        let engine = TemplateEngine::embedded();
        for name in TemplateName::ALL {
            let template = engine.load(name);
            let vars: Vec<(&str, String)> = RECOGNIZED_KEYS
                .iter()
                .map(|k| (*k, "value".to_string()))
                .collect();
            let out = engine.render(&template, &vars);
            assert!(
                !out.contains("{{"),
                "template {} left an unresolved token",
                name.as_str()
            );
        }
    }

    #[test]
    fn placeholders_deduplicate_in_first_appearance_order() {
        let found = placeholders("{{B_TOKEN}} {{A_TOKEN}} {{B_TOKEN}} {{a_not_one}}");
        assert_eq!(found, vec!["B_TOKEN".to_string(), "A_TOKEN".to_string()]);
    }

    #[test]
    fn embedded_templates_use_only_recognized_keys() {
        for name in TemplateName::ALL {
            for token in placeholders(name.default_text()) {
                assert!(
                    is_recognized_key(&token),
                    "template {} uses unrecognized token {token}",
                    name.as_str()
                );
            }
        }
    }

    #[test]
    fn override_file_wins_and_missing_falls_back() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("epic.md"), "custom {{EPIC_NAME}}").unwrap();
        let engine = TemplateEngine::with_overrides(dir.path());
        assert_eq!(engine.load(TemplateName::Epic), "custom {{EPIC_NAME}}");
        assert_eq!(
            engine.load(TemplateName::Readme),
            TemplateName::Readme.default_text()
        );
    }

    #[test]
    fn eject_writes_all_templates_once() {
        let dir = TempDir::new().unwrap();
        let engine = TemplateEngine::embedded();
        let written = engine.eject(dir.path()).unwrap();
        assert_eq!(written.len(), TemplateName::ALL.len());
        // Second eject touches nothing.
        assert!(engine.eject(dir.path()).unwrap().is_empty());
    }
}
