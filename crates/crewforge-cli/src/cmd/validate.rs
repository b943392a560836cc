use crate::output;
use crewforge_core::store::StateStore;
use crewforge_core::validate::validate;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = StateStore::load(root);
    let errors = validate(store.config());

    if json {
        output::print_json(&errors)?;
    } else if errors.is_empty() {
        println!("configuration is valid");
    } else {
        output::print_errors(&errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} validation error(s)", errors.len())
    }
}
