use anyhow::Result;
use chrono::Utc;
use colored::*;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use regressivos_cli::render::{print_cycle_details, print_notification, print_summary, records_table};
use regressivos_console::{spawn_refresh, Notification, ViewEvent, ViewState};
use regressivos_core::format_local;

use super::Context;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

/// Redraws the cycle every second so the SLA countdown moves, and refetches it
/// every refresh period until Ctrl+C.
pub async fn watch_cycle(ctx: &Context, id: &str, interval: Option<u64>) -> Result<()> {
    let mut config = ctx.config.clone();
    if let Some(secs) = interval {
        config.refresh_interval_secs = secs;
    }
    let period = config.refresh_interval();

    let state = Arc::new(Mutex::new(ViewState::new()));
    let ticket = state.lock().await.switch_to(id);
    let source = Arc::new(ctx.client.clone());
    let mut refresh = spawn_refresh(source, state.clone(), ticket, period);

    let mut clock = tokio::time::interval(Duration::from_secs(1));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut notice: Option<Notification> = None;
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            event = refresh.next_event() => match event {
                Some(ViewEvent::Updated) => notice = None,
                Some(ViewEvent::FetchFailed(message)) => {
                    notice = Some(Notification::warning(format!(
                        "Falha ao atualizar, mostrando últimos dados: {}",
                        message
                    )));
                }
                Some(ViewEvent::Superseded) | None => break,
            },
            _ = clock.tick() => {}
        }

        draw(&*state.lock().await, period, notice.as_ref());
    }

    refresh.cancel();
    state.lock().await.close();
    println!();
    println!("{}", "Stopped watching".dimmed());
    Ok(())
}

fn draw(view: &ViewState, period: Duration, notice: Option<&Notification>) {
    let now = Utc::now();
    print!("{}", CLEAR_SCREEN);

    let Some(cycle) = view.cycle() else {
        println!(
            "{}",
            format!("👀 Loading {}...", view.cycle_id().unwrap_or("-")).blue().bold()
        );
        if let Some(notice) = notice {
            print_notification(notice);
        }
        let _ = std::io::stdout().flush();
        return;
    };

    println!(
        "{}",
        format!("👀 {} (Ctrl+C to quit)", cycle.release).blue().bold()
    );
    println!();
    print_cycle_details(cycle, now);
    println!();
    println!("{}", records_table(view.records()));
    println!();
    print_summary(&view.summary());

    if let Some(decision) = view.edit_decision(now) {
        if !decision.is_allowed() {
            println!();
            print_notification(&Notification::from_decision(decision));
        }
    }
    if let Some(notice) = notice {
        println!();
        print_notification(notice);
    }

    let updated = view
        .last_updated()
        .map(format_local)
        .unwrap_or_else(|| "-".to_string());
    println!();
    println!(
        "{}",
        format!("Atualizado em {} (a cada {}s)", updated, period.as_secs()).dimmed()
    );
    let _ = std::io::stdout().flush();
}
