use crate::output;
use anyhow::Context;
use clap::Subcommand;
use crewforge_core::config::TOOL_CATALOG;
use crewforge_core::editor::AgentEditor;
use crewforge_core::markdown;
use crewforge_core::store::StateStore;
use crewforge_core::validate::{validate, ErrorScope, ValidationError};
use crewforge_core::ForgeError;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum AgentSubcommand {
    /// Create or update a specialized agent
    Set {
        /// Agent id: lowercase alphanumerics and hyphens
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        domain: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        purpose: Option<String>,
        /// Markdown instructions, inline
        #[arg(long, conflicts_with = "instructions_file")]
        instructions: Option<String>,
        /// Markdown instructions, read from a file
        #[arg(long)]
        instructions_file: Option<PathBuf>,
        /// Expected response shape (empty clears it)
        #[arg(long)]
        response_format: Option<String>,
    },

    /// Show an agent's fields and its validation errors
    Show {
        id: String,
        /// Also print the rendered markdown preview
        #[arg(long)]
        preview: bool,
    },

    /// Remove an agent (removing an unknown id is a no-op)
    Remove { id: String },

    /// Manage an agent's tool grants
    Tool {
        #[command(subcommand)]
        subcommand: ToolSubcommand,
    },

    /// List the fixed tool catalog
    Tools,
}

#[derive(Subcommand)]
pub enum ToolSubcommand {
    /// Grant a tool from the catalog (duplicates are rejected)
    Add { id: String, tool: String },
    /// Revoke a tool (revoking an absent tool is a no-op)
    Remove { id: String, tool: String },
}

pub fn run(root: &Path, subcommand: AgentSubcommand, json: bool) -> anyhow::Result<()> {
    let mut store = StateStore::load(root);

    match subcommand {
        AgentSubcommand::Set {
            id,
            name,
            domain,
            description,
            purpose,
            instructions,
            instructions_file,
            response_format,
        } => {
            let instructions = match instructions_file {
                Some(path) => Some(
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?,
                ),
                None => instructions,
            };

            let mut editor = AgentEditor::new(&mut store, &id)?;
            if let Some(name) = name {
                editor.set_name(0, name);
            }
            if let Some(domain) = domain {
                editor.set_domain(0, domain);
            }
            if let Some(description) = description {
                editor.set_description(0, description);
            }
            if let Some(purpose) = purpose {
                editor.set_purpose(0, purpose);
            }
            if let Some(instructions) = instructions {
                editor.set_instructions(0, instructions);
            }
            if let Some(format) = response_format {
                editor.set_response_format(0, format);
            }
            let errors: Vec<ValidationError> = editor.errors().into_iter().cloned().collect();
            editor.destroy(0);

            output::report_entity(&errors, json, || println!("agent '{id}' updated"))
        }

        AgentSubcommand::Show { id, preview } => {
            let config = store.config();
            let agent = config
                .agents
                .get(&id)
                .cloned()
                .ok_or_else(|| ForgeError::AgentNotFound(id.clone()))?;
            let errors: Vec<ValidationError> = validate(config)
                .into_iter()
                .filter(|e| e.matches(ErrorScope::Agent, &id))
                .collect();
            let rendered = preview.then(|| markdown::to_html(&agent.instructions));

            if json {
                output::print_json(&serde_json::json!({
                    "id": id,
                    "agent": agent,
                    "errors": errors,
                    "preview": rendered,
                }))?;
            } else {
                println!("Agent '{id}': {}", agent.name);
                println!("  domain:  {}", agent.domain);
                println!("  tools:   {}", agent.tools.join(", "));
                println!("  purpose: {}", agent.purpose);
                if let Some(format) = &agent.response_format {
                    println!("  format:  {format}");
                }
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

        AgentSubcommand::Remove { id } => {
            store.remove_agent(&id);
            if json {
                output::print_json(&store.snapshot())?;
            } else {
                println!("agent '{id}' removed");
            }
            Ok(())
        }

        AgentSubcommand::Tool { subcommand } => match subcommand {
            ToolSubcommand::Add { id, tool } => {
                let mut editor = AgentEditor::new(&mut store, &id)?;
                editor.add_tool(0, &tool)?;
                let errors: Vec<ValidationError> = editor.errors().into_iter().cloned().collect();
                editor.destroy(0);
                output::report_entity(&errors, json, || println!("granted '{tool}' to '{id}'"))
            }
            ToolSubcommand::Remove { id, tool } => {
                let mut editor = AgentEditor::new(&mut store, &id)?;
                editor.remove_tool(0, &tool);
                let errors: Vec<ValidationError> = editor.errors().into_iter().cloned().collect();
                editor.destroy(0);
                output::report_entity(&errors, json, || println!("revoked '{tool}' from '{id}'"))
            }
        },

        AgentSubcommand::Tools => {
            if json {
                output::print_json(&TOOL_CATALOG)?;
            } else {
                for tool in TOOL_CATALOG {
                    println!("{tool}");
                }
            }
            Ok(())
        }
    }
}
