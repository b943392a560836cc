use crate::output;
use anyhow::Context;
use chrono::Utc;
use crewforge_core::export::{export, ExportOutcome};
use crewforge_core::store::StateStore;
use crewforge_core::template::TemplateEngine;
use crewforge_core::{io, ForgeError};
use std::path::Path;

pub fn run(root: &Path, out: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let store = StateStore::load(root);
    let engine = TemplateEngine::for_root(root);

    match export(&engine, &store.snapshot(), Utc::now())? {
        ExportOutcome::Invalid { errors } => {
            if json {
                output::print_json(&serde_json::json!({ "errors": errors }))?;
            } else {
                output::print_errors(&errors);
            }
            Err(ForgeError::ExportBlocked(errors.len()).into())
        }
        ExportOutcome::Archived { archive, filename } => {
            let dir = out.unwrap_or(root);
            io::ensure_dir(dir)?;
            let path = dir.join(&filename);
            std::fs::write(&path, &archive)
                .with_context(|| format!("failed to write {}", path.display()))?;

            if json {
                output::print_json(&serde_json::json!({
                    "filename": filename,
                    "path": path,
                    "bytes": archive.len(),
                }))?;
            } else {
                println!("exported: {}", path.display());
            }
            Ok(())
        }
    }
}
