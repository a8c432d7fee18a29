use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use colored::*;
use futures::future::join_all;
use inquire::{Select, Text};
use std::path::{Path, PathBuf};

use regressivos_cli::input::{parse_status, record_update};
use regressivos_cli::render::{
    print_cycle_details, print_notification, print_record_details, print_summary, progress_table,
    records_table, sla_label,
};
use regressivos_client::ClientError;
use regressivos_console::Notification;
use regressivos_core::{
    aggregate, cycle_edit_permission, format_datetime, RecordUpdateInput, SlaState,
    SquadModuleRecord, TestStatus,
};
use regressivos_session::Role;

use super::{export_qr_codes, report, watch, Context};

#[derive(Subcommand)]
pub enum QualityCommands {
    /// List active cycles with their progress
    List,
    /// Show a cycle with its squad/module records
    Show {
        id: String,
        /// Directory to write the QR code images to
        #[arg(long)]
        qr_out: Option<PathBuf>,
    },
    /// Progress summary of a cycle
    Summary {
        id: String,
        /// Aggregate the fetched records locally instead of asking the server
        #[arg(long)]
        local: bool,
    },
    /// SLA status of a cycle
    Sla { id: String },
    /// Show one squad/module record
    Record { id: String },
    /// Update a squad/module record
    Update {
        /// Record ID (squadModuloId)
        record_id: String,
        /// Cycle the record belongs to; looked up when omitted
        #[arg(short, long)]
        cycle: Option<String>,
        /// em andamento, concluído, bloqueado or concluido com bugs
        #[arg(short, long)]
        status: Option<String>,
        #[arg(short, long)]
        responsible: Option<String>,
        /// Delivery detail
        #[arg(short, long)]
        detail: Option<String>,
        /// Bug report text
        #[arg(short, long)]
        bug: Option<String>,
        /// Send even when the local check says the record is locked
        #[arg(long)]
        force: bool,
    },
    /// Follow a cycle live until Ctrl+C
    Watch {
        id: String,
        /// Refresh interval in seconds (defaults to the configured interval)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

pub async fn handle_quality_command(ctx: &Context, command: QualityCommands) -> Result<()> {
    ctx.expect_role(Role::Quality).await?;

    match command {
        QualityCommands::List => list_active(ctx).await,
        QualityCommands::Show { id, qr_out } => show_cycle(ctx, &id, qr_out.as_deref()).await,
        QualityCommands::Summary { id, local } => show_summary(ctx, &id, local).await,
        QualityCommands::Sla { id } => show_sla(ctx, &id).await,
        QualityCommands::Record { id } => show_record(ctx, &id).await,
        QualityCommands::Update {
            record_id,
            cycle,
            status,
            responsible,
            detail,
            bug,
            force,
        } => {
            let input = record_update(status.as_deref(), responsible, detail, bug)?;
            update_record(ctx, &record_id, cycle, input, force).await
        }
        QualityCommands::Watch { id, interval } => watch::watch_cycle(ctx, &id, interval).await,
    }
}

pub async fn list_active(ctx: &Context) -> Result<()> {
    let cycles = ctx.client.list_active_cycles().await.map_err(report)?;

    if cycles.is_empty() {
        println!("{}", "No active cycles".yellow());
        return Ok(());
    }

    let summaries = join_all(cycles.iter().map(|c| ctx.client.status_summary(&c.id))).await;
    let rows: Vec<_> = cycles
        .into_iter()
        .zip(summaries)
        .map(|(cycle, summary)| {
            if let Err(e) = &summary {
                tracing::warn!(cycle_id = %cycle.id, "Summary unavailable: {}", e);
            }
            (cycle, summary.ok())
        })
        .collect();

    println!("{}", "🧪 Regressivos ativos".blue().bold());
    println!();
    println!("{}", progress_table(&rows, Utc::now()));
    println!("Total: {} cycles", rows.len().to_string().cyan());
    Ok(())
}

async fn show_cycle(ctx: &Context, id: &str, qr_out: Option<&Path>) -> Result<()> {
    let detail = ctx.client.cycle_detail(id).await.map_err(report)?;
    let now = Utc::now();

    println!("{}", format!("🧪 Regressivo {}", detail.cycle.release).blue().bold());
    println!();
    print_cycle_details(&detail.cycle, now);
    println!();

    if detail.records.is_empty() {
        println!("{}", "No squad/module records".yellow());
    } else {
        println!("{}", records_table(&detail.records));
    }
    println!();
    print_summary(&aggregate(&detail.records));

    let decision = cycle_edit_permission(&detail.cycle, now);
    if !decision.is_allowed() {
        println!();
        print_notification(&Notification::from_decision(decision));
    }
    if let Some(dir) = qr_out {
        println!();
        export_qr_codes(&detail.cycle, dir).await?;
    }
    Ok(())
}

async fn show_summary(ctx: &Context, id: &str, local: bool) -> Result<()> {
    let summary = if local {
        let detail = ctx.client.cycle_detail(id).await.map_err(report)?;
        aggregate(&detail.records)
    } else {
        ctx.client.status_summary(id).await.map_err(report)?
    };

    println!("{}", format!("📊 Progresso - {}", id).blue().bold());
    println!();
    print_summary(&summary);
    Ok(())
}

async fn show_sla(ctx: &Context, id: &str) -> Result<()> {
    let check = ctx.client.check_sla(id).await.map_err(report)?;
    let end = check.sla_end.as_deref().unwrap_or_default();
    let state = SlaState::from_raw(end, Utc::now());

    println!("{}", format!("⏱️  SLA - {}", id).blue().bold());
    println!();
    println!("{:<12} {}", "Status:".bold(), sla_label(&state));
    println!(
        "{:<12} {}",
        "Início:".bold(),
        format_datetime(check.sla_start.as_deref().unwrap_or_default())
    );
    println!("{:<12} {}", "Fim:".bold(), format_datetime(end));

    if check.sla_expired != state.is_expired() {
        tracing::debug!(
            server = check.sla_expired,
            local = state.is_expired(),
            "SLA expiry differs from server; clocks may be skewed"
        );
    }
    Ok(())
}

async fn show_record(ctx: &Context, id: &str) -> Result<()> {
    let detail = ctx.client.get_record(id).await.map_err(report)?;

    println!("{}", "🧩 Squad/Módulo".blue().bold());
    println!();
    print_record_details(&detail.record);
    if detail.sla_expired {
        println!();
        print_notification(&Notification::warning(
            "SLA vencido. Não é possível editar este registro.",
        ));
    }
    Ok(())
}

/// Asks for every field, defaulting to the record's current values.
fn prompt_update(record: &SquadModuleRecord) -> Result<RecordUpdateInput> {
    let known = TestStatus::KNOWN;
    let options: Vec<&str> = known.iter().map(|s| s.as_str()).collect();
    let start = options
        .iter()
        .position(|s| *s == record.status.as_str())
        .unwrap_or(0);
    let status = Select::new("Status:", options)
        .with_starting_cursor(start)
        .prompt()?;

    let responsible = Text::new("Responsável:")
        .with_default(&record.responsible)
        .prompt()?;
    let detail = Text::new("Detalhe da entrega:")
        .with_default(&record.delivery_detail)
        .prompt()?;
    let bug = Text::new("Bug (optional):")
        .with_default(&record.bug_report)
        .prompt()?;

    Ok(RecordUpdateInput {
        status: Some(parse_status(status)?),
        delivery_detail: Some(detail),
        responsible: Some(responsible),
        bug_report: Some(bug),
    })
}

async fn update_record(
    ctx: &Context,
    record_id: &str,
    cycle_id: Option<String>,
    input: RecordUpdateInput,
    force: bool,
) -> Result<()> {
    let current = ctx.client.get_record(record_id).await.map_err(report)?.record;
    let cycle_id = cycle_id.unwrap_or_else(|| current.cycle_id.clone());

    let cycle = ctx.client.cycle_detail(&cycle_id).await.map_err(report)?.cycle;
    let decision = cycle_edit_permission(&cycle, Utc::now());
    if !decision.is_allowed() {
        print_notification(&Notification::from_decision(decision));
        if !force {
            return Err(ClientError::denied(decision).into());
        }
        println!("{}", "Sending anyway (--force); the server has the final say".dimmed());
    }

    let input = if input.is_empty() {
        println!("{}", format!("✏️  {} / {}", current.squad, current.module).blue().bold());
        prompt_update(&current)?
    } else {
        input
    };

    let marks_bugs = input.status.as_ref().map_or(false, |s| s.is_defect());
    let missing_bug = input
        .bug_report
        .as_deref()
        .unwrap_or(&current.bug_report)
        .trim()
        .is_empty();
    if marks_bugs && missing_bug {
        print_notification(&Notification::info(
            "Status 'concluido com bugs' without a bug report",
        ));
    }

    let updated = ctx
        .client
        .update_record(record_id, &input)
        .await
        .map_err(report)?;

    print_notification(&Notification::success(format!(
        "{} / {} updated",
        updated.squad, updated.module
    )));
    print_record_details(&updated);
    Ok(())
}
