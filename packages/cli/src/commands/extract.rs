use super::{prepare_session, EditArgs};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use probation_editor::{GoalKind, Provider, ProviderRole};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Template JSON file (`-` for stdin)
    pub template: PathBuf,

    /// Print providers as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn extract(args: ExtractArgs, config: &Config) -> Result<()> {
    let session = prepare_session(config, Some(args.template.as_path()), &EditArgs::default())?;
    let providers = session.providers();

    if args.json {
        println!("{}", serde_json::to_string_pretty(providers)?);
        return Ok(());
    }

    if providers.is_empty() {
        println!("{} No providers found", "!".yellow());
        return Ok(());
    }

    for provider in providers {
        print_provider(provider);
    }
    println!();
    println!("   Providers: {}", providers.len());

    Ok(())
}

fn print_provider(provider: &Provider) {
    let role = match provider.role {
        ProviderRole::Precondition => "precondition",
        ProviderRole::Action => "action",
        ProviderRole::Filter => "filter",
    };
    let goal = match provider.goal {
        GoalKind::Target => "target",
        GoalKind::Control => "control",
    };

    println!(
        "{} {} {} {}",
        provider.id.as_str().bold(),
        goal.dimmed(),
        role.cyan(),
        provider.provider_type
    );
    for (key, value) in &provider.parameters {
        println!("    {} = {}", key, value);
    }
    if let Some(count) = provider.loop_count {
        println!("    {} = {}", "loopCount".dimmed(), count);
    }
    for (key, values) in provider.loop_parameters.iter().flatten() {
        println!("    {} = [{}]", key.dimmed(), values.join(", "));
    }
}
