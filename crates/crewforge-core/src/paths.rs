use crate::error::{ForgeError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Workspace constants
// ---------------------------------------------------------------------------

pub const CREWFORGE_DIR: &str = ".crewforge";
pub const WIZARD_FILE: &str = ".crewforge/wizard.json";
pub const TEMPLATES_DIR: &str = ".crewforge/templates";

// ---------------------------------------------------------------------------
// Exported archive layout
// ---------------------------------------------------------------------------

pub const COMMANDS_DIR: &str = "commands";
pub const EPICS_DIR: &str = "commands/epics";
pub const AGENTS_DIR: &str = "agents";

pub const ORCHESTRATOR_FILE: &str = "commands/product-manager.md";
pub const META_AGENT_FILE: &str = "commands/meta-agent.md";
pub const README_FILE: &str = "README.md";

/// Fixed prefix of the exported archive filename.
pub const EXPORT_PREFIX: &str = "crewforge-template";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn crewforge_dir(root: &Path) -> PathBuf {
    root.join(CREWFORGE_DIR)
}

pub fn wizard_path(root: &Path) -> PathBuf {
    root.join(WIZARD_FILE)
}

pub fn templates_dir(root: &Path) -> PathBuf {
    root.join(TEMPLATES_DIR)
}

/// Archive-relative path of an epic command file.
pub fn epic_file(number: u32) -> String {
    format!("{EPICS_DIR}/epic-{number}.md")
}

/// Archive-relative path of a specialized agent file.
pub fn agent_file(id: &str) -> String {
    format!("{AGENTS_DIR}/{id}.md")
}

// ---------------------------------------------------------------------------
// Agent id validation
// ---------------------------------------------------------------------------

static AGENT_ID_RE: OnceLock<Regex> = OnceLock::new();

fn agent_id_re() -> &'static Regex {
    AGENT_ID_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

/// Agent ids become archive filenames, so they are restricted to
/// lowercase alphanumerics and interior hyphens, max 64 chars.
pub fn validate_agent_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !agent_id_re().is_match(id) {
        return Err(ForgeError::InvalidAgentId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_agent_ids() {
        for id in ["code-reviewer", "a", "qa-bot-2", "x1"] {
            validate_agent_id(id).unwrap_or_else(|_| panic!("expected valid: {id}"));
        }
    }

    #[test]
    fn invalid_agent_ids() {
        for id in [
            "",
            "-leading-dash",
            "trailing-dash-",
            "has spaces",
            "Upper",
            "under_score",
        ] {
            assert!(validate_agent_id(id).is_err(), "expected invalid: {id}");
        }
    }

    #[test]
    fn archive_paths() {
        assert_eq!(epic_file(3), "commands/epics/epic-3.md");
        assert_eq!(agent_file("code-reviewer"), "agents/code-reviewer.md");
        assert_eq!(
            wizard_path(Path::new("/tmp/proj")),
            PathBuf::from("/tmp/proj/.crewforge/wizard.json")
        );
    }
}
