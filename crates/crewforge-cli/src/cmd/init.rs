use anyhow::Context;
use crewforge_core::config::Configuration;
use crewforge_core::{io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing crewforge in: {}", root.display());

    io::ensure_dir(&paths::crewforge_dir(root))
        .with_context(|| format!("failed to create {}", paths::CREWFORGE_DIR))?;

    let wizard = paths::wizard_path(root);
    if wizard.exists() {
        println!("  exists:  {}", paths::WIZARD_FILE);
    } else {
        let data = serde_json::to_vec_pretty(&Configuration::default())?;
        io::atomic_write(&wizard, &data)
            .with_context(|| format!("failed to write {}", paths::WIZARD_FILE))?;
        println!("  created: {}", paths::WIZARD_FILE);
    }

    println!("\ncrewforge initialized.");
    println!("Next: crewforge set name \"My Project\", then crewforge epic set 1 --name \"...\"");
    Ok(())
}
