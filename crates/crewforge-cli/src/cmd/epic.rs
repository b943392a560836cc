use crate::output;
use anyhow::Context;
use clap::Subcommand;
use crewforge_core::editor::EpicEditor;
use crewforge_core::markdown;
use crewforge_core::store::StateStore;
use crewforge_core::validate::{validate, ErrorScope, ValidationError};
use crewforge_core::ForgeError;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum EpicSubcommand {
    /// Update an epic's fields
    Set {
        /// Epic number, 1..=epic-count
        number: u32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        purpose: Option<String>,
        /// Markdown definition, inline
        #[arg(long, conflicts_with = "definition_file")]
        definition: Option<String>,
        /// Markdown definition, read from a file
        #[arg(long)]
        definition_file: Option<PathBuf>,
    },

    /// Show an epic's fields and its validation errors
    Show {
        number: u32,
        /// Also print the rendered markdown preview
        #[arg(long)]
        preview: bool,
    },

    /// Manage an epic's suggested subagent list
    Subagent {
        #[command(subcommand)]
        subcommand: SubagentSubcommand,
    },
}

#[derive(Subcommand)]
pub enum SubagentSubcommand {
    /// Add a subagent (duplicates are rejected)
    Add { number: u32, value: String },
    /// Remove a subagent (removing an absent value is a no-op)
    Remove { number: u32, value: String },
}

fn check_range(store: &StateStore, number: u32) -> anyhow::Result<()> {
    let count = store.config().epic_count;
    if number < 1 || number > count {
        return Err(ForgeError::EpicOutOfRange { number, count }.into());
    }
    Ok(())
}

pub fn run(root: &Path, subcommand: EpicSubcommand, json: bool) -> anyhow::Result<()> {
    let mut store = StateStore::load(root);

    match subcommand {
        EpicSubcommand::Set {
            number,
            name,
            purpose,
            definition,
            definition_file,
        } => {
            check_range(&store, number)?;
            let definition = match definition_file {
                Some(path) => Some(
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?,
                ),
                None => definition,
            };

            let mut editor = EpicEditor::new(&mut store, number);
            if let Some(name) = name {
                editor.set_name(0, name);
            }
            if let Some(purpose) = purpose {
                editor.set_purpose(0, purpose);
            }
            if let Some(definition) = definition {
                editor.set_definition(0, definition);
            }
            let errors: Vec<ValidationError> = editor.errors().into_iter().cloned().collect();
            editor.destroy(0);

            output::report_entity(&errors, json, || println!("epic {number} updated"))
        }

        EpicSubcommand::Show { number, preview } => {
            check_range(&store, number)?;
            let config = store.config();
            let epic = config.epics.get(&number).cloned().unwrap_or_default();
            let key = number.to_string();
            let errors: Vec<ValidationError> = validate(config)
                .into_iter()
                .filter(|e| e.matches(ErrorScope::Epic, &key))
                .collect();
            let rendered = preview.then(|| markdown::to_html(&epic.definition));

            if json {
                output::print_json(&serde_json::json!({
                    "number": number,
                    "epic": epic,
                    "errors": errors,
                    "preview": rendered,
                }))?;
            } else {
                println!("Epic {number}: {}", epic.name);
                println!("  purpose:   {}", epic.purpose);
                println!("  subagents: {}", epic.subagents.join(", "));
                println!("  definition ({} chars)", epic.definition.chars().count());
                if !errors.is_empty() {
                    println!();
                    output::print_errors(&errors);
                }
                if let Some(html) = rendered {
                    println!("\n{html}");
                }
            }
            Ok(())
        }

        EpicSubcommand::Subagent { subcommand } => match subcommand {
            SubagentSubcommand::Add { number, value } => {
                check_range(&store, number)?;
                let mut editor = EpicEditor::new(&mut store, number);
                editor.add_subagent(0, &value)?;
                let errors: Vec<ValidationError> = editor.errors().into_iter().cloned().collect();
                editor.destroy(0);
                output::report_entity(&errors, json, || {
                    println!("added '{value}' to epic {number}")
                })
            }
            SubagentSubcommand::Remove { number, value } => {
                check_range(&store, number)?;
                let mut editor = EpicEditor::new(&mut store, number);
                editor.remove_subagent(0, &value);
                let errors: Vec<ValidationError> = editor.errors().into_iter().cloned().collect();
                editor.destroy(0);
                output::report_entity(&errors, json, || {
                    println!("removed '{value}' from epic {number}")
                })
            }
        },
    }
}
