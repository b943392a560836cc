use crate::output;
use clap::{Subcommand, ValueEnum};
use crewforge_core::config::OptionalFeature;
use crewforge_core::store::StateStore;
use std::path::Path;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn as_bool(self) -> bool {
        matches!(self, Toggle::On)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FeatureArg {
    SpecializedAgents,
    Logging,
    CustomTools,
}

impl From<FeatureArg> for OptionalFeature {
    fn from(arg: FeatureArg) -> Self {
        match arg {
            FeatureArg::SpecializedAgents => OptionalFeature::SpecializedAgents,
            FeatureArg::Logging => OptionalFeature::Logging,
            FeatureArg::CustomTools => OptionalFeature::CustomTools,
        }
    }
}

#[derive(Subcommand)]
pub enum SetSubcommand {
    /// Set the project name (empty clears it)
    Name { name: String },

    /// Declare the number of epics (minimum 2)
    EpicCount { count: u32 },

    /// Toggle the meta-agent core component
    MetaAgent { state: Toggle },

    /// Toggle an optional feature
    Feature {
        feature: FeatureArg,
        state: Toggle,
    },
}

pub fn run(root: &Path, subcommand: SetSubcommand, json: bool) -> anyhow::Result<()> {
    let mut store = StateStore::load(root);

    match subcommand {
        SetSubcommand::Name { name } => {
            store.set_project_name(Some(name));
        }
        SetSubcommand::EpicCount { count } => {
            store.set_epic_count(count);
        }
        SetSubcommand::MetaAgent { state } => {
            store.set_meta_agent(state.as_bool());
        }
        SetSubcommand::Feature { feature, state } => {
            store.set_optional_feature(feature.into(), state.as_bool());
        }
    }

    if json {
        output::print_json(&store.snapshot())?;
    } else {
        println!("updated");
    }
    Ok(())
}
