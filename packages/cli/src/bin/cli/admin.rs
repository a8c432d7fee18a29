use anyhow::{bail, Result};
use chrono::Utc;
use clap::Subcommand;
use colored::*;
use inquire::{Confirm, MultiSelect, Select, Text};
use std::path::{Path, PathBuf};

use regressivos_cli::input::{ensure_valid, load_squads_file, split_squads};
use regressivos_cli::render::{cycles_table, print_cycle_details, print_notification, squads_table};
use regressivos_console::Notification;
use regressivos_core::{
    validate_cycle_create, validate_cycle_update, validate_hours, AdminActions, CycleCreateInput,
    CycleUpdateInput, Platform, ReleaseKind, ReleaseTestCycle, DEFAULT_SLA_HOURS,
};
use regressivos_core::sla::DEFAULT_EXTENSION_HOURS;
use regressivos_session::Role;

use super::{export_qr_codes, report, Context};

#[derive(Subcommand)]
pub enum AdminCommands {
    /// List every cycle
    List,
    /// Show cycle details
    Show {
        /// Cycle ID (regressivoId)
        id: String,
        /// Directory to write the QR code images to
        #[arg(long)]
        qr_out: Option<PathBuf>,
    },
    /// Show the squad/module catalogue
    Squads,
    /// Create a new cycle
    Create {
        /// Release name, e.g. 5.12.0
        #[arg(short, long)]
        release: Option<String>,
        /// Android or iOS
        #[arg(short, long)]
        platform: Option<Platform>,
        #[arg(long)]
        staging_version: Option<String>,
        #[arg(long)]
        firebase_version: Option<String>,
        #[arg(long)]
        alpha_version: Option<String>,
        /// Test plan URL
        #[arg(long)]
        test_plan: Option<String>,
        /// Normal or Exclusiva
        #[arg(long)]
        kind: Option<ReleaseKind>,
        /// Squad to include (repeatable or comma-separated)
        #[arg(short, long = "squad")]
        squads: Vec<String>,
    },
    /// Update cycle fields
    Update {
        id: String,
        #[arg(short, long)]
        release: Option<String>,
        #[arg(short, long)]
        platform: Option<Platform>,
        #[arg(long)]
        staging_version: Option<String>,
        #[arg(long)]
        firebase_version: Option<String>,
        #[arg(long)]
        alpha_version: Option<String>,
        #[arg(long)]
        test_plan: Option<String>,
        #[arg(long)]
        kind: Option<ReleaseKind>,
    },
    /// Start the SLA clock
    StartSla { id: String },
    /// Stop the SLA clock and finalize the cycle
    StopSla { id: String },
    /// Add hours to a running SLA
    Extend {
        id: String,
        #[arg(long, default_value_t = DEFAULT_EXTENSION_HOURS)]
        hours: u32,
    },
    /// Generate release notes
    ReleaseNotes {
        id: String,
        /// Write the notes to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a cycle and its records
    Delete {
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Replace the squad/module catalogue from a JSON file
    SetSquads { file: PathBuf },
}

pub async fn handle_admin_command(ctx: &Context, command: AdminCommands) -> Result<()> {
    ctx.expect_role(Role::Admin).await?;

    match command {
        AdminCommands::List => list_cycles(ctx).await,
        AdminCommands::Show { id, qr_out } => show_cycle(ctx, &id, qr_out.as_deref()).await,
        AdminCommands::Squads => show_squads(ctx).await,
        AdminCommands::Create {
            release,
            platform,
            staging_version,
            firebase_version,
            alpha_version,
            test_plan,
            kind,
            squads,
        } => {
            let input = CycleCreateInput {
                release: release.unwrap_or_default(),
                platform: platform.unwrap_or_default(),
                staging_version: staging_version.unwrap_or_default(),
                firebase_version: firebase_version.unwrap_or_default(),
                alpha_version: alpha_version.unwrap_or_default(),
                test_plan_link: test_plan.unwrap_or_default(),
                release_kind: kind.unwrap_or_default(),
                selected_squads: split_squads(&squads),
            };
            create_cycle(ctx, input).await
        }
        AdminCommands::Update {
            id,
            release,
            platform,
            staging_version,
            firebase_version,
            alpha_version,
            test_plan,
            kind,
        } => {
            let input = CycleUpdateInput {
                release,
                platform,
                staging_version,
                firebase_version,
                alpha_version,
                test_plan_link: test_plan,
                release_kind: kind,
            };
            update_cycle(ctx, &id, input).await
        }
        AdminCommands::StartSla { id } => start_sla(ctx, &id).await,
        AdminCommands::StopSla { id } => stop_sla(ctx, &id).await,
        AdminCommands::Extend { id, hours } => extend_sla(ctx, &id, hours).await,
        AdminCommands::ReleaseNotes { id, output } => release_notes(ctx, &id, output).await,
        AdminCommands::Delete { id, yes } => delete_cycle(ctx, &id, yes).await,
        AdminCommands::SetSquads { file } => set_squads(ctx, &file).await,
    }
}

pub async fn list_cycles(ctx: &Context) -> Result<()> {
    let cycles = ctx.client.list_cycles().await.map_err(report)?;

    if cycles.is_empty() {
        println!("{}", "No cycles found".yellow());
        println!("{}", "Use 'regressivos admin create' to open one".dimmed());
        return Ok(());
    }

    println!("{}", "📋 Regressivos".blue().bold());
    println!();
    println!("{}", cycles_table(&cycles, Utc::now()));
    println!("Total: {} cycles", cycles.len().to_string().cyan());
    Ok(())
}

async fn show_cycle(ctx: &Context, id: &str, qr_out: Option<&Path>) -> Result<()> {
    let cycle = ctx.client.get_cycle(id).await.map_err(report)?;

    println!("{}", format!("📋 Regressivo {}", cycle.release).blue().bold());
    println!();
    print_cycle_details(&cycle, Utc::now());
    println!();
    print_actions(&AdminActions::for_cycle(&cycle));
    if let Some(dir) = qr_out {
        println!();
        export_qr_codes(&cycle, dir).await?;
    }
    Ok(())
}

fn print_actions(actions: &AdminActions) {
    let mut available = Vec::new();
    if actions.start_sla {
        available.push("start-sla");
    }
    if actions.stop_sla {
        available.push("stop-sla");
    }
    if actions.extend_sla {
        available.push("extend");
    }
    if actions.release_notes {
        available.push("release-notes");
    }
    if actions.delete {
        available.push("delete");
    }
    println!("{} {}", "Actions:".bold(), available.join(", ").dimmed());
}

async fn show_squads(ctx: &Context) -> Result<()> {
    let config = ctx
        .client
        .squads_catalogue()
        .await
        .map_err(report)?
        .unwrap_or_default();

    if config.squads.is_empty() {
        println!("{}", "The squad catalogue is empty".yellow());
        println!("{}", "Use 'regressivos admin set-squads <file.json>' to load one".dimmed());
        return Ok(());
    }

    println!("{}", "👥 Squads".blue().bold());
    println!();
    println!("{}", squads_table(&config));
    Ok(())
}

async fn create_cycle(ctx: &Context, mut input: CycleCreateInput) -> Result<()> {
    println!("{}", "➕ New Regressivo".blue().bold());
    println!();

    let catalogue = ctx.client.squads_catalogue().await.map_err(report)?;
    if catalogue.is_none() {
        println!(
            "{}",
            "No squad catalogue configured; the cycle is created without module records".yellow()
        );
    }

    if input.release.trim().is_empty() {
        input.release = Text::new("Release:").prompt()?;
    }
    if input.platform == Platform::Unknown {
        input.platform = Select::new("Plataforma:", vec![Platform::Android, Platform::Ios]).prompt()?;
    }
    if input.staging_version.is_empty() {
        input.staging_version = Text::new("Versão staging (optional):").prompt()?;
    }
    if input.firebase_version.is_empty() {
        input.firebase_version = Text::new("Versão firebase (optional):").prompt()?;
    }
    if input.alpha_version.is_empty() {
        input.alpha_version = Text::new("Versão alpha (optional):").prompt()?;
    }
    if input.test_plan_link.is_empty() {
        input.test_plan_link = Text::new("Link do plano de testes (optional):").prompt()?;
    }
    if let Some(catalogue) = catalogue.as_ref().filter(|c| !c.squads.is_empty()) {
        if input.selected_squads.is_empty() {
            let names: Vec<String> = catalogue.squad_names().into_iter().map(String::from).collect();
            input.selected_squads = MultiSelect::new("Squads:", names).prompt()?;
        }
    }

    ensure_valid(validate_cycle_create(&input, catalogue.as_ref()))?;

    let modules = catalogue
        .as_ref()
        .map_or(0, |c| c.expand_selection(&input.selected_squads).len());
    let cycle = ctx.client.create_cycle(&input).await.map_err(report)?;

    println!();
    println!(
        "{}",
        format!("✅ Regressivo '{}' created with {} module records", input.release, modules).green()
    );
    println!("ID: {}", cycle.id.cyan());
    println!(
        "{}",
        format!(
            "Start the {}h SLA with 'regressivos admin start-sla {}'",
            DEFAULT_SLA_HOURS, cycle.id
        )
        .dimmed()
    );
    Ok(())
}

async fn update_cycle(ctx: &Context, id: &str, input: CycleUpdateInput) -> Result<()> {
    if input.is_empty() {
        bail!("Nothing to update. Pass at least one field, e.g. --release");
    }
    ensure_valid(validate_cycle_update(&input))?;

    let cycle = ctx.client.update_cycle(id, &input).await.map_err(report)?;
    print_notification(&Notification::success(format!(
        "Regressivo '{}' updated",
        cycle.release
    )));
    Ok(())
}

/// Fetches the cycle and refuses an action its current state does not offer.
async fn cycle_for_action(
    ctx: &Context,
    id: &str,
    allowed: fn(&AdminActions) -> bool,
    refusal: &str,
) -> Result<ReleaseTestCycle> {
    let cycle = ctx.client.get_cycle(id).await.map_err(report)?;
    if !allowed(&AdminActions::for_cycle(&cycle)) {
        print_notification(&Notification::warning(refusal));
        bail!("{} ({})", refusal, cycle.release);
    }
    Ok(cycle)
}

async fn start_sla(ctx: &Context, id: &str) -> Result<()> {
    cycle_for_action(ctx, id, |a| a.start_sla, "SLA already started").await?;

    let cycle = ctx.client.start_sla(id).await.map_err(report)?;
    print_notification(&Notification::success(format!(
        "SLA started: {} remaining",
        cycle.sla_state(Utc::now())
    )));
    Ok(())
}

async fn stop_sla(ctx: &Context, id: &str) -> Result<()> {
    cycle_for_action(ctx, id, |a| a.stop_sla, "SLA is not running").await?;

    let cycle = ctx.client.stop_sla(id).await.map_err(report)?;
    print_notification(&Notification::success(format!(
        "SLA stopped; regressivo is {}",
        cycle.status
    )));
    Ok(())
}

async fn extend_sla(ctx: &Context, id: &str, hours: u32) -> Result<()> {
    let hours = validate_hours(hours).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    cycle_for_action(ctx, id, |a| a.extend_sla, "SLA has not been started").await?;

    let cycle = ctx.client.extend_sla(id, hours).await.map_err(report)?;
    print_notification(&Notification::success(format!(
        "Added {}h; SLA: {}",
        hours,
        cycle.sla_state(Utc::now())
    )));
    Ok(())
}

async fn release_notes(ctx: &Context, id: &str, output: Option<PathBuf>) -> Result<()> {
    let notes = ctx.client.release_notes(id).await.map_err(report)?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, &notes.release_notes).await?;
            print_notification(&Notification::success(format!(
                "Release notes written to {}",
                path.display()
            )));
        }
        None => {
            println!("{}", notes.release_notes);
        }
    }
    if let Some(generated_at) = notes.generated_at {
        println!("{}", format!("Generated at {}", generated_at).dimmed());
    }
    Ok(())
}

async fn delete_cycle(ctx: &Context, id: &str, skip_confirmation: bool) -> Result<()> {
    let cycle = ctx.client.get_cycle(id).await.map_err(report)?;

    println!("{}", format!("🗑️  Delete Regressivo - {}", cycle.release).red().bold());
    println!();
    print_cycle_details(&cycle, Utc::now());
    println!();

    let confirmed = skip_confirmation
        || Confirm::new(&format!(
            "Delete '{}' and all its squad/module records?",
            cycle.release
        ))
        .with_default(false)
        .prompt()?;

    if !confirmed {
        println!("{}", "Deletion cancelled".yellow());
        return Ok(());
    }

    ctx.client.delete_cycle(id).await.map_err(report)?;
    print_notification(&Notification::success(format!(
        "Regressivo '{}' deleted",
        cycle.release
    )));
    Ok(())
}

async fn set_squads(ctx: &Context, file: &std::path::Path) -> Result<()> {
    let config = load_squads_file(file).await?;
    let modules: usize = config.squads.iter().map(|s| s.modules.len()).sum();

    ctx.client.replace_squads_config(&config).await.map_err(report)?;
    print_notification(&Notification::success(format!(
        "Catalogue replaced: {} squads, {} modules",
        config.squads.len(),
        modules
    )));
    Ok(())
}
