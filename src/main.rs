// src/main.rs

use clap::Parser;
use settings_sync::cli::{Cli, Commands};
use settings_sync::collaborators::StaticLabels;
use settings_sync::config::load_existing_config;
use settings_sync::page::{Collaborators, RefreshOutcome};
use settings_sync::save::SaveOutcome;
use settings_sync::token::TokenOutcome;
use settings_sync::{build_page, setup_configuration, GroupId, SettingsPage, SyncError};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn init_tracing(cli: &Cli) {
    let env_filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = if cli.json_logs {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), SyncError> {
    if let Commands::CheckConfig { file } = &cli.command {
        let path = file
            .clone()
            .or_else(|| cli.config.clone())
            .unwrap_or_else(|| settings_sync::DEFAULT_CONFIG_PATH.into());
        let config = load_existing_config(&path)?;
        let registry = config.registry()?;
        println!(
            "{}: ok ({} groups, {} fields)",
            path.display(),
            registry.list_groups().len(),
            registry.field_keys().count()
        );
        return Ok(());
    }

    let config = setup_configuration(cli.config.clone())?;
    let collaborators = Collaborators {
        labels: Arc::new(StaticLabels::new(config.labels.clone())),
        ..Collaborators::default()
    };
    let page = build_page(&config, collaborators)?;

    match cli.command {
        Commands::Groups => print_groups(&page),
        Commands::Show { group } => {
            load(&page).await?;
            print_values(&page, group.map(GroupId::new).as_ref())?;
        }
        Commands::Save { group, set } => {
            load(&page).await?;
            let group = GroupId::new(group);
            let schema = page
                .registry()
                .group(&group)
                .ok_or_else(|| SyncError::UnknownGroup(group.clone()))?;
            for (key, value) in set {
                if schema.field(&key).is_none() {
                    return Err(SyncError::config(
                        format!("Group '{group}' has no field '{key}'"),
                        Some("--set"),
                    ));
                }
                page.set_value(&key, value);
            }
            match page.save(&group).await? {
                SaveOutcome::Saved { message } => println!("{message}"),
                SaveOutcome::Skipped => println!("save already in progress"),
            }
        }
        Commands::ResetToken => {
            page.activate().await?;
            match page.reset_token().await? {
                TokenOutcome::Reset { .. } => page.copy_token(),
                TokenOutcome::Skipped | TokenOutcome::Stale => {
                    println!("token reset did not complete")
                }
            }
        }
        Commands::CheckConfig { .. } => {}
    }

    page.deactivate();
    Ok(())
}

async fn load(page: &SettingsPage) -> Result<(), SyncError> {
    if let RefreshOutcome::Hydrated(report) = page.activate().await? {
        info!(
            hydrated = report.hydrated,
            missing = report.missing_keys.len(),
            "Settings loaded"
        );
    }
    Ok(())
}

fn print_groups(page: &SettingsPage) {
    for group in page.form() {
        println!("{} [{}] -> {}", group.title, group.id, group.button_label);
        for field in group.fields {
            println!("  {:<28} {:?}  {}", field.key, field.kind, field.label);
        }
    }
}

fn print_values(page: &SettingsPage, only: Option<&GroupId>) -> Result<(), SyncError> {
    if let Some(id) = only {
        if page.registry().group(id).is_none() {
            return Err(SyncError::UnknownGroup(id.clone()));
        }
    }

    for group in page.form() {
        if only.is_some_and(|id| *id != group.id) {
            continue;
        }
        println!("{} [{}]", group.title, group.id);
        for field in group.fields {
            println!("  {:<28} = {}", field.key, field.value);
        }
    }

    if only.is_none() {
        let token = page.token_form();
        println!("{}: {}", token.title, token.value);
    }
    Ok(())
}
