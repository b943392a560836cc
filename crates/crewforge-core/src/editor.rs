use crate::config::{is_catalog_tool, AgentPatch, EpicPatch};
use crate::error::{ForgeError, Result};
use crate::markdown;
use crate::store::StateStore;
use crate::validate::{validate, ErrorScope, ValidationError};

/// Ticks between automatic flushes of a dirty editor.
pub const AUTOSAVE_INTERVAL: u64 = 30;
/// Ticks of keystroke silence before the markdown preview recomputes.
pub const PREVIEW_DEBOUNCE: u64 = 3;

// ---------------------------------------------------------------------------
// Shared editor bookkeeping
// ---------------------------------------------------------------------------

/// Dirty flag, save/edit timestamps, and the debounced preview cache.
/// Time is an explicit tick parameter so every timer path is deterministic.
#[derive(Debug)]
struct Bookkeeping {
    dirty: bool,
    last_save: u64,
    last_edit: u64,
    preview: String,
    preview_stale: bool,
}

impl Bookkeeping {
    fn new() -> Self {
        Self {
            dirty: false,
            last_save: 0,
            last_edit: 0,
            preview: String::new(),
            preview_stale: true,
        }
    }

    fn mark_edit(&mut self, now: u64) {
        self.dirty = true;
        self.last_edit = now;
    }

    fn mark_text_edit(&mut self, now: u64) {
        self.mark_edit(now);
        self.preview_stale = true;
    }

    fn autosave_due(&self, now: u64) -> bool {
        self.dirty && now.saturating_sub(self.last_save) >= AUTOSAVE_INTERVAL
    }

    fn preview_refresh_due(&self, now: u64) -> bool {
        self.preview_stale && now.saturating_sub(self.last_edit) >= PREVIEW_DEBOUNCE
    }
}

// ---------------------------------------------------------------------------
// EpicEditor
// ---------------------------------------------------------------------------

/// Editing surface bound to a single epic. Field changes write through to
/// the store immediately and re-run validation on the full configuration;
/// the dirty flag only tracks the pending persistence flush.
pub struct EpicEditor<'a> {
    store: &'a mut StateStore,
    number: u32,
    state: Bookkeeping,
    errors: Vec<ValidationError>,
}

impl<'a> EpicEditor<'a> {
    /// Bind to epic `number`, creating an empty entry if none exists yet.
    pub fn new(store: &'a mut StateStore, number: u32) -> Self {
        if !store.config().epics.contains_key(&number) {
            store.set_epic(number, EpicPatch::default());
        }
        let mut editor = Self {
            store,
            number,
            state: Bookkeeping::new(),
            errors: Vec::new(),
        };
        editor.revalidate();
        editor
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn is_dirty(&self) -> bool {
        self.state.dirty
    }

    pub fn set_name(&mut self, now: u64, name: impl Into<String>) {
        self.apply(
            now,
            EpicPatch {
                name: Some(name.into()),
                ..EpicPatch::default()
            },
        );
    }

    pub fn set_purpose(&mut self, now: u64, purpose: impl Into<String>) {
        self.apply(
            now,
            EpicPatch {
                purpose: Some(purpose.into()),
                ..EpicPatch::default()
            },
        );
    }

    pub fn set_definition(&mut self, now: u64, definition: impl Into<String>) {
        self.apply(
            now,
            EpicPatch {
                definition: Some(definition.into()),
                ..EpicPatch::default()
            },
        );
        self.state.preview_stale = true;
    }

    /// Add a subagent chip. Duplicates are rejected without mutating state.
    pub fn add_subagent(&mut self, now: u64, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ForgeError::EmptyEntry { field: "subagents" });
        }
        let current = &self.store.config().epics[&self.number].subagents;
        if current.iter().any(|s| s == value) {
            return Err(ForgeError::DuplicateEntry {
                field: "subagents",
                value: value.to_string(),
            });
        }
        let mut next = current.clone();
        next.push(value.to_string());
        self.apply(
            now,
            EpicPatch {
                subagents: Some(next),
                ..EpicPatch::default()
            },
        );
        Ok(())
    }

    /// Removing an absent subagent is a no-op, not an error.
    pub fn remove_subagent(&mut self, now: u64, value: &str) {
        let current = &self.store.config().epics[&self.number].subagents;
        if !current.iter().any(|s| s == value) {
            return;
        }
        let next: Vec<String> = current.iter().filter(|s| *s != value).cloned().collect();
        self.apply(
            now,
            EpicPatch {
                subagents: Some(next),
                ..EpicPatch::default()
            },
        );
    }

    /// Errors from the latest full-configuration validation that belong to
    /// this epic.
    pub fn errors(&self) -> Vec<&ValidationError> {
        let key = self.number.to_string();
        self.errors
            .iter()
            .filter(|e| e.matches(ErrorScope::Epic, &key))
            .collect()
    }

    pub fn validate(&self) -> bool {
        self.errors().is_empty()
    }

    /// Markdown preview of the definition. Recomputes if stale — the
    /// debounce in `tick` is a responsiveness optimization, not a
    /// correctness gate.
    pub fn render(&mut self) -> &str {
        if self.state.preview_stale {
            self.recompute_preview();
        }
        &self.state.preview
    }

    /// Flush pending changes. Saving a clean editor is a no-op.
    pub fn save(&mut self, now: u64) {
        if !self.state.dirty {
            return;
        }
        self.store.flush();
        self.state.dirty = false;
        self.state.last_save = now;
    }

    /// Drive the auto-save timer and the debounced preview.
    pub fn tick(&mut self, now: u64) {
        if self.state.preview_refresh_due(now) {
            self.recompute_preview();
        }
        if self.state.autosave_due(now) {
            self.save(now);
        }
    }

    /// Tear down the editor, flushing a final save if dirty so navigation
    /// away never loses data.
    pub fn destroy(mut self, now: u64) {
        self.save(now);
    }

    fn apply(&mut self, now: u64, patch: EpicPatch) {
        self.store.set_epic(self.number, patch);
        self.state.mark_edit(now);
        self.revalidate();
    }

    fn revalidate(&mut self) {
        self.errors = validate(self.store.config());
    }

    fn recompute_preview(&mut self) {
        let definition = &self.store.config().epics[&self.number].definition;
        self.state.preview = markdown::to_html(definition);
        self.state.preview_stale = false;
    }
}

// ---------------------------------------------------------------------------
// AgentEditor
// ---------------------------------------------------------------------------

/// Editing surface bound to a single specialized agent.
pub struct AgentEditor<'a> {
    store: &'a mut StateStore,
    id: String,
    state: Bookkeeping,
    errors: Vec<ValidationError>,
}

impl<'a> AgentEditor<'a> {
    /// Bind to agent `id`, creating an empty entry if none exists yet.
    /// Fails only on a malformed id.
    pub fn new(store: &'a mut StateStore, id: &str) -> Result<Self> {
        if !store.config().agents.contains_key(id) {
            store.set_agent(id, AgentPatch::default())?;
        }
        let mut editor = Self {
            store,
            id: id.to_string(),
            state: Bookkeeping::new(),
            errors: Vec::new(),
        };
        editor.revalidate();
        Ok(editor)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_dirty(&self) -> bool {
        self.state.dirty
    }

    pub fn set_name(&mut self, now: u64, name: impl Into<String>) {
        self.apply(
            now,
            AgentPatch {
                name: Some(name.into()),
                ..AgentPatch::default()
            },
        );
    }

    pub fn set_domain(&mut self, now: u64, domain: impl Into<String>) {
        self.apply(
            now,
            AgentPatch {
                domain: Some(domain.into()),
                ..AgentPatch::default()
            },
        );
    }

    pub fn set_description(&mut self, now: u64, description: impl Into<String>) {
        self.apply(
            now,
            AgentPatch {
                description: Some(description.into()),
                ..AgentPatch::default()
            },
        );
    }

    pub fn set_purpose(&mut self, now: u64, purpose: impl Into<String>) {
        self.apply(
            now,
            AgentPatch {
                purpose: Some(purpose.into()),
                ..AgentPatch::default()
            },
        );
    }

    pub fn set_instructions(&mut self, now: u64, instructions: impl Into<String>) {
        self.apply(
            now,
            AgentPatch {
                instructions: Some(instructions.into()),
                ..AgentPatch::default()
            },
        );
        self.state.preview_stale = true;
    }

    /// An empty value clears the response format.
    pub fn set_response_format(&mut self, now: u64, format: impl Into<String>) {
        self.apply(
            now,
            AgentPatch {
                response_format: Some(format.into()),
                ..AgentPatch::default()
            },
        );
    }

    /// Add a tool chip. Duplicates and tools outside the catalog are
    /// rejected without mutating state.
    pub fn add_tool(&mut self, now: u64, tool: &str) -> Result<()> {
        if !is_catalog_tool(tool) {
            return Err(ForgeError::UnknownTool(tool.to_string()));
        }
        let current = &self.store.config().agents[&self.id].tools;
        if current.iter().any(|t| t == tool) {
            return Err(ForgeError::DuplicateEntry {
                field: "tools",
                value: tool.to_string(),
            });
        }
        let mut next = current.clone();
        next.push(tool.to_string());
        self.apply(
            now,
            AgentPatch {
                tools: Some(next),
                ..AgentPatch::default()
            },
        );
        Ok(())
    }

    /// Removing an absent tool is a no-op, not an error.
    pub fn remove_tool(&mut self, now: u64, tool: &str) {
        let current = &self.store.config().agents[&self.id].tools;
        if !current.iter().any(|t| t == tool) {
            return;
        }
        let next: Vec<String> = current.iter().filter(|t| *t != tool).cloned().collect();
        self.apply(
            now,
            AgentPatch {
                tools: Some(next),
                ..AgentPatch::default()
            },
        );
    }

    pub fn errors(&self) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|e| e.matches(ErrorScope::Agent, &self.id))
            .collect()
    }

    pub fn validate(&self) -> bool {
        self.errors().is_empty()
    }

    /// Markdown preview of the instructions.
    pub fn render(&mut self) -> &str {
        if self.state.preview_stale {
            self.recompute_preview();
        }
        &self.state.preview
    }

    pub fn save(&mut self, now: u64) {
        if !self.state.dirty {
            return;
        }
        self.store.flush();
        self.state.dirty = false;
        self.state.last_save = now;
    }

    pub fn tick(&mut self, now: u64) {
        if self.state.preview_refresh_due(now) {
            self.recompute_preview();
        }
        if self.state.autosave_due(now) {
            self.save(now);
        }
    }

    pub fn destroy(mut self, now: u64) {
        self.save(now);
    }

    fn apply(&mut self, now: u64, patch: AgentPatch) {
        // The id was validated at construction; this cannot fail.
        let _ = self.store.set_agent(&self.id, patch);
        self.state.mark_edit(now);
        self.revalidate();
    }

    fn revalidate(&mut self) {
        self.errors = validate(self.store.config());
    }

    fn recompute_preview(&mut self) {
        let instructions = &self.store.config().agents[&self.id].instructions;
        self.state.preview = markdown::to_html(instructions);
        self.state.preview_stale = false;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptionalFeature;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> StateStore {
        StateStore::load(dir.path())
    }

    #[test]
    fn field_change_writes_through_immediately() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let mut editor = EpicEditor::new(&mut store, 1);
        editor.set_name(0, "Setup");
        assert!(editor.is_dirty());
        drop(editor);
        assert_eq!(store.config().epics[&1].name, "Setup");
    }

    #[test]
    fn errors_filter_to_own_entity() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let mut editor = EpicEditor::new(&mut store, 1);
        editor.set_name(0, "Setup");
        // Global list has errors for epic 2 and the config scope; this
        // editor only reports its own.
        assert!(editor.errors().iter().all(|e| e.key == "1"));
        assert!(!editor.validate());

        editor.set_purpose(1, "x".repeat(20));
        editor.set_definition(2, "y".repeat(50));
        editor.add_subagent(3, "Env Specialist").unwrap();
        assert!(editor.validate());
    }

    #[test]
    fn cross_entity_uniqueness_stays_visible() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        {
            let mut other = EpicEditor::new(&mut store, 2);
            other.set_name(0, "Setup");
            other.destroy(0);
        }
        let mut editor = EpicEditor::new(&mut store, 1);
        editor.set_name(1, "Setup");
        assert!(editor
            .errors()
            .iter()
            .any(|e| e.message.contains("used more than once")));
    }

    #[test]
    fn duplicate_subagent_rejected_without_mutation() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let mut editor = EpicEditor::new(&mut store, 1);
        editor.add_subagent(0, "Env Specialist").unwrap();
        let err = editor.add_subagent(1, "Env Specialist").unwrap_err();
        assert!(matches!(err, ForgeError::DuplicateEntry { .. }));
        drop(editor);
        assert_eq!(store.config().epics[&1].subagents.len(), 1);
    }

    #[test]
    fn removing_absent_subagent_is_a_noop() {
        // Concrete scenario D, epic flavor.
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let mut editor = EpicEditor::new(&mut store, 1);
        editor.add_subagent(0, "Env Specialist").unwrap();
        editor.save(0);
        editor.remove_subagent(1, "Never Added");
        assert!(!editor.is_dirty());
        drop(editor);
        assert_eq!(
            store.config().epics[&1].subagents,
            vec!["Env Specialist".to_string()]
        );
    }

    #[test]
    fn autosave_fires_only_after_interval_when_dirty() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let mut editor = EpicEditor::new(&mut store, 1);
        editor.set_name(0, "Setup");
        editor.tick(AUTOSAVE_INTERVAL - 1);
        assert!(editor.is_dirty());
        editor.tick(AUTOSAVE_INTERVAL);
        assert!(!editor.is_dirty());
        // A clean editor stays clean across further ticks.
        editor.tick(AUTOSAVE_INTERVAL * 2);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn destroy_flushes_a_dirty_editor() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let mut editor = EpicEditor::new(&mut store, 1);
        editor.set_name(5, "Setup");
        assert!(editor.is_dirty());
        editor.destroy(6);
        // State survived in the store and on disk.
        let reloaded = StateStore::load(dir.path());
        assert_eq!(reloaded.config().epics[&1].name, "Setup");
    }

    #[test]
    fn preview_debounces_but_render_is_always_current() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let mut editor = EpicEditor::new(&mut store, 1);
        editor.set_definition(10, "# Heading");
        // Debounce window not yet elapsed — tick leaves the cache stale,
        // but render() must still return current output.
        editor.tick(10 + PREVIEW_DEBOUNCE - 1);
        assert!(editor.render().contains("<h1>Heading</h1>"));

        editor.set_definition(20, "## Smaller");
        editor.tick(20 + PREVIEW_DEBOUNCE);
        assert!(editor.render().contains("<h2>Smaller</h2>"));
    }

    #[test]
    fn agent_editor_tool_chips() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        store.set_optional_feature(OptionalFeature::SpecializedAgents, true);
        let mut editor = AgentEditor::new(&mut store, "reviewer").unwrap();
        editor.add_tool(0, "Read").unwrap();
        assert!(matches!(
            editor.add_tool(1, "Read").unwrap_err(),
            ForgeError::DuplicateEntry { .. }
        ));
        assert!(matches!(
            editor.add_tool(2, "Teleport").unwrap_err(),
            ForgeError::UnknownTool(_)
        ));
        // Concrete scenario D: removing a never-added tool changes nothing.
        editor.remove_tool(3, "Bash");
        drop(editor);
        assert_eq!(store.config().agents["reviewer"].tools, vec!["Read"]);
    }

    #[test]
    fn agent_editor_rejects_bad_id() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        assert!(AgentEditor::new(&mut store, "Not A Slug").is_err());
    }
}
