use crate::output;
use crewforge_core::store::StateStore;
use crewforge_core::validate::validate;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = StateStore::load(root);
    let config = store.config();

    if json {
        return output::print_json(&store.snapshot());
    }

    println!(
        "Project: {}",
        config.project_name.as_deref().unwrap_or("(unnamed)")
    );
    println!("Epic count: {}", config.epic_count);
    println!(
        "Core components: product-manager{}",
        if config.core_components.meta_agent {
            ", meta-agent"
        } else {
            ""
        }
    );
    println!(
        "Features: specialized-agents={} logging={} custom-tools={}",
        config.optional_features.specialized_agents,
        config.optional_features.logging,
        config.optional_features.custom_tools,
    );

    println!();
    let rows = (1..=config.epic_count)
        .map(|n| match config.epics.get(&n) {
            Some(epic) => vec![
                n.to_string(),
                epic.name.clone(),
                epic.subagents.len().to_string(),
            ],
            None => vec![n.to_string(), "(undefined)".to_string(), "0".to_string()],
        })
        .collect();
    output::print_table(&["epic", "name", "subagents"], rows);

    if config.agents_enabled() && !config.agents.is_empty() {
        println!();
        let rows = config
            .agents
            .iter()
            .map(|(id, a)| vec![id.clone(), a.name.clone(), a.tools.join(", ")])
            .collect();
        output::print_table(&["agent", "name", "tools"], rows);
    }

    let errors = validate(config);
    println!();
    if errors.is_empty() {
        println!("configuration is valid and ready to export");
    } else {
        println!("{} validation error(s); run 'crewforge validate'", errors.len());
    }
    Ok(())
}
