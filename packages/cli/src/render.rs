// ABOUTME: Terminal rendering for cycles, records and progress
// ABOUTME: Status badges, SLA labels, progress bars and comfy-table listings

use chrono::{DateTime, Utc};
use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};

use regressivos_console::{Notification, NotificationLevel};
use regressivos_core::{
    format_datetime, truncate, ProgressSummary, QrKind, ReleaseTestCycle, SlaState,
    SquadModuleRecord, SquadsConfig, StatusTone, TestStatus,
};

const FILLED: char = '█';
const EMPTY: char = '░';

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

pub fn status_badge(status: &TestStatus) -> ColoredString {
    let text = status.as_str();
    match status.tone() {
        StatusTone::Success => text.green(),
        StatusTone::Warning => text.yellow(),
        StatusTone::Danger => text.red(),
        StatusTone::Defect => text.magenta(),
        StatusTone::Neutral => text.normal(),
    }
}

pub fn sla_label(state: &SlaState) -> ColoredString {
    let label = state.label();
    match state {
        SlaState::NotStarted => label.dimmed(),
        SlaState::Remaining(_) => label.cyan(),
        SlaState::Expired => label.red().bold(),
    }
}

/// Fixed-width bar for a 0..=100 percentage.
pub fn progress_bar(percentage: u32, width: usize) -> String {
    let pct = percentage.min(100) as usize;
    let filled = (pct * width + 50) / 100;
    let mut bar = String::with_capacity(width * 3);
    bar.extend(std::iter::repeat(FILLED).take(filled));
    bar.extend(std::iter::repeat(EMPTY).take(width - filled));
    bar
}

pub fn cycles_table(cycles: &[ReleaseTestCycle], now: DateTime<Utc>) -> Table {
    let mut table = new_table();
    table.set_header(vec!["ID", "Release", "Plataforma", "Status", "SLA", "Liberado em"]);

    for cycle in cycles {
        table.add_row(vec![
            cycle.id.clone(),
            truncate(&cycle.release, 30),
            cycle.platform.to_string(),
            cycle.status.to_string(),
            cycle.sla_state(now).label(),
            format_datetime(&cycle.released_at),
        ]);
    }
    table
}

/// Active cycles with their progress; a missing summary shows as `-`.
pub fn progress_table(
    rows: &[(ReleaseTestCycle, Option<ProgressSummary>)],
    now: DateTime<Utc>,
) -> Table {
    let mut table = new_table();
    table.set_header(vec!["ID", "Release", "Plataforma", "SLA", "Progresso", "Bugs"]);

    for (cycle, summary) in rows {
        let (progress, bugs) = match summary {
            Some(s) => (
                format!("{} {}%", progress_bar(s.percentage, 10), s.percentage),
                s.bugs_reported.to_string(),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        table.add_row(vec![
            cycle.id.clone(),
            truncate(&cycle.release, 30),
            cycle.platform.to_string(),
            cycle.sla_state(now).label(),
            progress,
            bugs,
        ]);
    }
    table
}

pub fn records_table(records: &[SquadModuleRecord]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "ID",
        "Squad",
        "Módulo",
        "Status",
        "Responsável",
        "Entrega",
        "Bug",
    ]);

    for record in records {
        table.add_row(vec![
            record.id.clone(),
            record.squad.clone(),
            record.module.clone(),
            status_badge(&record.status).to_string(),
            or_dash(&record.responsible),
            truncate(&or_dash(&record.delivery_detail), 30),
            truncate(&or_dash(&record.bug_report), 30),
        ]);
    }
    table
}

pub fn squads_table(config: &SquadsConfig) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Squad", "Módulos"]);
    for entry in &config.squads {
        table.add_row(vec![entry.squad.clone(), entry.modules.join(", ")]);
    }
    table
}

/// One line per status plus totals, in taxonomy order.
pub fn summary_lines(summary: &ProgressSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {}%",
        progress_bar(summary.percentage, 30),
        summary.percentage
    )];

    for status in TestStatus::KNOWN.iter() {
        lines.push(format!(
            "  {:<20} {}",
            status.as_str(),
            summary.status_count.get(status)
        ));
    }

    let unclassified = summary.unclassified();
    if unclassified > 0 {
        lines.push(format!("  {:<20} {}", "outros", unclassified));
    }

    lines.push(format!("  {:<20} {}", "total", summary.total_items));
    lines.push(format!("  {:<20} {}", "bugs reportados", summary.bugs_reported));
    lines
}

pub fn print_summary(summary: &ProgressSummary) {
    for line in summary_lines(summary) {
        println!("{}", line);
    }
}

pub fn print_cycle_details(cycle: &ReleaseTestCycle, now: DateTime<Utc>) {
    let state = cycle.sla_state(now);
    println!("{:<18} {}", "ID:".bold(), cycle.id.cyan());
    println!("{:<18} {}", "Release:".bold(), cycle.release);
    println!("{:<18} {}", "Plataforma:".bold(), cycle.platform);
    println!("{:<18} {}", "Tipo:".bold(), cycle.release_kind);
    println!("{:<18} {}", "Status:".bold(), cycle.status);
    println!("{:<18} {}", "SLA:".bold(), sla_label(&state));
    println!("{:<18} {}", "SLA início:".bold(), format_datetime(&cycle.sla_start_raw));
    println!("{:<18} {}", "SLA fim:".bold(), format_datetime(&cycle.sla_end_raw));
    println!("{:<18} {}", "Liberado em:".bold(), format_datetime(&cycle.released_at));
    println!("{:<18} {}", "Versão staging:".bold(), or_dash(&cycle.staging_version));
    println!("{:<18} {}", "Versão firebase:".bold(), or_dash(&cycle.firebase_version));
    println!("{:<18} {}", "Versão alpha:".bold(), or_dash(&cycle.alpha_version));
    println!(
        "{:<18} {}",
        "Plano de testes:".bold(),
        cycle.test_plan().unwrap_or("-")
    );
    for kind in QrKind::ALL {
        println!(
            "{:<18} {}",
            format!("QR Code {}:", kind.label()).bold(),
            qr_availability(cycle, kind)
        );
    }
}

pub fn qr_availability(cycle: &ReleaseTestCycle, kind: QrKind) -> &'static str {
    if cycle.qr_code(kind).is_some() {
        "disponível (--qr-out)"
    } else {
        "Sem QR"
    }
}

pub fn print_record_details(record: &SquadModuleRecord) {
    println!("{:<16} {}", "ID:".bold(), record.id.cyan());
    println!("{:<16} {}", "Regressivo:".bold(), record.cycle_id);
    println!("{:<16} {}", "Squad:".bold(), record.squad);
    println!("{:<16} {}", "Módulo:".bold(), record.module);
    println!("{:<16} {}", "Status:".bold(), status_badge(&record.status));
    println!("{:<16} {}", "Responsável:".bold(), or_dash(&record.responsible));
    println!("{:<16} {}", "Entrega:".bold(), or_dash(&record.delivery_detail));
    println!("{:<16} {}", "Bug:".bold(), or_dash(&record.bug_report));
}

pub fn print_notification(notification: &Notification) {
    match notification.level {
        NotificationLevel::Success => println!("{}", format!("✅ {}", notification).green()),
        NotificationLevel::Info => println!("{}", format!("ℹ️  {}", notification).blue()),
        NotificationLevel::Warning => eprintln!("{}", format!("⚠️  {}", notification).yellow()),
        NotificationLevel::Error => eprintln!("{}", format!("❌ {}", notification).red()),
    }
}
