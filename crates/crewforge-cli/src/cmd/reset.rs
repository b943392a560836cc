use crewforge_core::store::StateStore;
use std::path::Path;

pub fn run(root: &Path, force: bool) -> anyhow::Result<()> {
    if !force {
        anyhow::bail!("reset discards all authored epics and agents; pass --force to confirm");
    }
    let mut store = StateStore::load(root);
    store.reset_all();
    println!("configuration reset to defaults");
    Ok(())
}
