use anyhow::Result;
use colored::*;
use inquire::{Select, Text};

use regressivos_session::{Role, Session};

use super::{report, Context};

pub async fn login(ctx: &Context, name: Option<String>, role: Option<String>) -> Result<()> {
    println!("{}", "🔑 Login".blue().bold());
    println!();

    let name = match name {
        Some(n) => n,
        None => Text::new("Nome:").prompt()?,
    };

    let role = match role {
        Some(r) => r.parse::<Role>()?,
        None => Select::new("Perfil:", vec![Role::Admin, Role::Quality]).prompt()?,
    };

    let session = Session::new(name, role)?;
    ctx.sessions.save(&session).await?;

    println!(
        "{}",
        format!("✅ Logged in as {} ({})", session.name, session.role).green()
    );
    let next = if session.is_admin() {
        "regressivos admin list"
    } else {
        "regressivos quality list"
    };
    println!("{}", format!("Next: '{}' or 'regressivos home'", next).dimmed());
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<()> {
    if ctx.sessions.clear().await? {
        println!("{}", "✅ Logged out".green());
    } else {
        println!("{}", "No active session".yellow());
    }
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    match ctx.sessions.load().await? {
        Some(session) => {
            println!("{:<10} {}", "Nome:".bold(), session.name.cyan());
            println!("{:<10} {}", "Perfil:".bold(), session.role);
        }
        None => {
            println!("{}", "Not logged in".yellow());
            println!("{}", "Use 'regressivos login' to start a session".dimmed());
        }
    }
    println!("{:<10} {}", "Servidor:".bold(), ctx.client.base_url());
    Ok(())
}

pub async fn health(ctx: &Context) -> Result<()> {
    let status = ctx.client.health().await.map_err(report)?;

    let service = status.service.as_deref().unwrap_or("regressivos");
    if status.is_healthy() {
        println!("{}", format!("✅ {} is {}", service, status.status).green());
    } else {
        println!("{}", format!("⚠️  {} reported '{}'", service, status.status).yellow());
    }
    println!("{}", ctx.client.base_url().dimmed());
    Ok(())
}
