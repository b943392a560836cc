use crate::output;
use clap::Subcommand;
use crewforge_core::paths;
use crewforge_core::template::{TemplateEngine, TemplateName};
use std::path::Path;

#[derive(Subcommand)]
pub enum TemplateSubcommand {
    /// Write the embedded default templates into .crewforge/templates/
    /// for customization (existing files are left alone)
    Eject,

    /// List template names and whether an override is active
    List,
}

pub fn run(root: &Path, subcommand: TemplateSubcommand) -> anyhow::Result<()> {
    match subcommand {
        TemplateSubcommand::Eject => {
            let dir = paths::templates_dir(root);
            let written = TemplateEngine::embedded().eject(&dir)?;
            if written.is_empty() {
                println!("all templates already ejected in {}", paths::TEMPLATES_DIR);
            } else {
                for name in written {
                    println!("  created: {}/{name}", paths::TEMPLATES_DIR);
                }
            }
            Ok(())
        }
        TemplateSubcommand::List => {
            let dir = paths::templates_dir(root);
            let rows = TemplateName::ALL
                .iter()
                .map(|name| {
                    let source = if dir.join(name.file_name()).exists() {
                        "override"
                    } else {
                        "embedded"
                    };
                    vec![name.file_name(), source.to_string()]
                })
                .collect();
            output::print_table(&["template", "source"], rows);
            Ok(())
        }
    }
}
