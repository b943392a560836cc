use crate::config::{AgentPatch, Configuration, EpicPatch, OptionalFeature};
use crate::error::Result;
use crate::{io, paths};
use std::path::{Path, PathBuf};

pub type Subscriber = Box<dyn FnMut(&Configuration)>;

/// Owns the single in-memory [`Configuration`] for a wizard session.
///
/// Every setter applies the change in memory, persists the full blob to
/// `.crewforge/wizard.json`, and notifies subscribers synchronously with a
/// fresh snapshot. Persistence failures are logged and swallowed — the
/// in-memory state stays authoritative.
pub struct StateStore {
    root: PathBuf,
    config: Configuration,
    subscribers: Vec<(u64, Subscriber)>,
    next_subscriber: u64,
}

impl StateStore {
    /// Load persisted state from `root`, falling back to defaults when the
    /// blob is absent or malformed. Never fails.
    pub fn load(root: &Path) -> Self {
        let path = paths::wizard_path(root);
        let config = match std::fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str::<Configuration>(&data) {
                Ok(mut cfg) => {
                    // The product manager is not optional, whatever an old
                    // or hand-edited blob claims.
                    cfg.core_components.product_manager = true;
                    cfg
                }
                Err(e) => {
                    tracing::warn!("malformed wizard state at {}: {e}", path.display());
                    Configuration::default()
                }
            },
            Err(_) => Configuration::default(),
        };
        Self {
            root: root.to_path_buf(),
            config,
            subscribers: Vec::new(),
            next_subscriber: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Borrow the live configuration (read-only).
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Deep copy of the configuration; callers cannot mutate shared state.
    pub fn snapshot(&self) -> Configuration {
        self.config.clone()
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    pub fn subscribe(&mut self, callback: Subscriber) -> u64 {
        let id = self.next_subscriber;
        self.next_subscriber += 1;
        self.subscribers.push((id, callback));
        id
    }

    pub fn unsubscribe(&mut self, id: u64) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    // -----------------------------------------------------------------------
    // Setters
    // -----------------------------------------------------------------------

    /// Lowering the count below already-authored epics retains them as
    /// dormant entries; they resurface when the count is raised again.
    pub fn set_epic_count(&mut self, count: u32) {
        self.config.epic_count = count;
        self.commit();
    }

    pub fn set_project_name(&mut self, name: Option<String>) {
        self.config.project_name = name.filter(|n| !n.is_empty());
        self.commit();
    }

    /// The meta agent is the only toggleable core component.
    pub fn set_meta_agent(&mut self, enabled: bool) {
        self.config.core_components.meta_agent = enabled;
        self.commit();
    }

    pub fn set_optional_feature(&mut self, feature: OptionalFeature, enabled: bool) {
        match feature {
            OptionalFeature::SpecializedAgents => {
                self.config.optional_features.specialized_agents = enabled
            }
            OptionalFeature::Logging => self.config.optional_features.logging = enabled,
            OptionalFeature::CustomTools => self.config.optional_features.custom_tools = enabled,
        }
        self.commit();
    }

    /// Apply a partial update to an epic, creating the entry if absent.
    /// Invalid field values are written as-is; the Validator reports them.
    pub fn set_epic(&mut self, number: u32, patch: EpicPatch) {
        patch.apply(self.config.epics.entry(number).or_default());
        self.commit();
    }

    /// Apply a partial update to an agent, creating the entry if absent.
    /// The id is validated because it becomes an archive filename.
    pub fn set_agent(&mut self, id: &str, patch: AgentPatch) -> Result<()> {
        paths::validate_agent_id(id)?;
        patch.apply(self.config.agents.entry(id.to_string()).or_default());
        self.commit();
        Ok(())
    }

    /// Removing an unknown agent is a no-op.
    pub fn remove_agent(&mut self, id: &str) {
        if self.config.agents.remove(id).is_some() {
            self.commit();
        }
    }

    /// Clear persisted storage and republish the default configuration.
    pub fn reset_all(&mut self) {
        let path = paths::wizard_path(&self.root);
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("failed to clear wizard state at {}: {e}", path.display());
            }
        }
        self.config = Configuration::default();
        self.notify();
    }

    /// Re-persist the current configuration. Used by editors as the
    /// synchronous flush behind `save()`; errors are logged, not returned.
    pub fn flush(&mut self) {
        self.persist();
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn commit(&mut self) {
        self.persist();
        self.notify();
    }

    fn persist(&self) {
        let path = paths::wizard_path(&self.root);
        let result = serde_json::to_vec_pretty(&self.config)
            .map_err(crate::ForgeError::from)
            .and_then(|data| io::atomic_write(&path, &data));
        if let Err(e) = result {
            tracing::warn!("failed to persist wizard state to {}: {e}", path.display());
        }
    }

    fn notify(&mut self) {
        let snapshot = self.config.clone();
        for (_, callback) in &mut self.subscribers {
            callback(&snapshot);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Epic;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[test]
    fn load_missing_blob_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::load(dir.path());
        assert_eq!(store.config(), &Configuration::default());
    }

    #[test]
    fn load_malformed_blob_gives_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".crewforge")).unwrap();
        std::fs::write(dir.path().join(".crewforge/wizard.json"), "not json {").unwrap();
        let store = StateStore::load(dir.path());
        assert_eq!(store.config(), &Configuration::default());
    }

    #[test]
    fn setters_persist_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::load(dir.path());
        store.set_project_name(Some("atlas".to_string()));
        store.set_epic_count(3);
        store.set_epic(
            1,
            EpicPatch {
                name: Some("Setup".to_string()),
                ..EpicPatch::default()
            },
        );

        let reloaded = StateStore::load(dir.path());
        assert_eq!(reloaded.config().project_name.as_deref(), Some("atlas"));
        assert_eq!(reloaded.config().epic_count, 3);
        assert_eq!(reloaded.config().epics[&1].name, "Setup");
    }

    #[test]
    fn product_manager_cannot_be_persisted_off() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".crewforge")).unwrap();
        std::fs::write(
            dir.path().join(".crewforge/wizard.json"),
            r#"{"epic_count": 2, "core_components": {"product_manager": false, "meta_agent": false}}"#,
        )
        .unwrap();
        let store = StateStore::load(dir.path());
        assert!(store.config().core_components.product_manager);
        assert!(!store.config().core_components.meta_agent);
    }

    #[test]
    fn snapshot_is_a_deep_copy() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::load(dir.path());
        store.set_epic(
            1,
            EpicPatch {
                name: Some("Setup".to_string()),
                ..EpicPatch::default()
            },
        );
        let mut snap = store.snapshot();
        snap.epics.insert(9, Epic::default());
        assert!(!store.config().epics.contains_key(&9));
    }

    #[test]
    fn subscribers_are_notified_synchronously() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::load(dir.path());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = store.subscribe(Box::new(move |cfg| {
            sink.borrow_mut().push(cfg.epic_count);
        }));

        store.set_epic_count(4);
        store.set_epic_count(5);
        assert_eq!(*seen.borrow(), vec![4, 5]);

        store.unsubscribe(id);
        store.set_epic_count(6);
        assert_eq!(*seen.borrow(), vec![4, 5]);
    }

    #[test]
    fn remove_agent_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::load(dir.path());
        store.set_agent("reviewer", AgentPatch::default()).unwrap();
        store.remove_agent("reviewer");
        store.remove_agent("reviewer");
        assert!(store.config().agents.is_empty());
    }

    #[test]
    fn invalid_agent_id_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::load(dir.path());
        assert!(store.set_agent("Bad Id", AgentPatch::default()).is_err());
        assert!(store.config().agents.is_empty());
    }

    #[test]
    fn reset_clears_storage_and_republishes_defaults() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::load(dir.path());
        store.set_epic_count(7);
        assert!(dir.path().join(".crewforge/wizard.json").exists());

        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        store.subscribe(Box::new(move |cfg| {
            *sink.borrow_mut() = Some(cfg.clone());
        }));

        store.reset_all();
        assert!(!dir.path().join(".crewforge/wizard.json").exists());
        assert_eq!(seen.borrow().as_ref(), Some(&Configuration::default()));

        let reloaded = StateStore::load(dir.path());
        assert_eq!(reloaded.config(), &Configuration::default());
    }

    #[test]
    fn persistence_failure_does_not_block_mutation() {
        let dir = TempDir::new().unwrap();
        // Occupy the .crewforge path with a file so the state dir cannot
        // be created and every persist fails.
        std::fs::write(dir.path().join(".crewforge"), b"in the way").unwrap();
        let mut store = StateStore::load(dir.path());
        store.set_epic_count(9);
        assert_eq!(store.config().epic_count, 9);
    }
}
