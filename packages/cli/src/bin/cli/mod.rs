pub mod admin;
pub mod quality;
pub mod session;
pub mod watch;

use anyhow::Result;
use colored::*;
use std::path::Path;

use regressivos_client::{ClientError, RegressivosClient};
use regressivos_config::ConsoleConfig;
use regressivos_console::Notification;
use regressivos_core::ReleaseTestCycle;
use regressivos_session::{Role, Session, SessionStore};

use regressivos_cli::qr::save_qr_codes;
use regressivos_cli::render::print_notification;

/// What every command needs: resolved settings, a client and the session store.
pub struct Context {
    pub config: ConsoleConfig,
    pub client: RegressivosClient,
    pub sessions: SessionStore,
}

impl Context {
    /// Settings come from the config file and env, then `--api-url` on top.
    pub async fn load(api_url: Option<String>) -> Result<Self> {
        let config = ConsoleConfig::load_with_base_url(api_url).await?;
        let client = RegressivosClient::new(&config)?;
        Ok(Self {
            config,
            client,
            sessions: SessionStore::default_location(),
        })
    }

    pub async fn session(&self) -> Result<Session> {
        Ok(self.sessions.require().await?)
    }

    /// Roles only pick views, so a mismatch is reported and the command goes on.
    pub async fn expect_role(&self, role: Role) -> Result<Session> {
        let session = self.session().await?;
        if session.role != role {
            println!(
                "{}",
                format!(
                    "⚠️  Logged in as {} ({}); this is a {} command",
                    session.name, session.role, role
                )
                .yellow()
            );
        }
        Ok(session)
    }
}

/// Prints the operator-facing message for a failed call and hands the error back.
pub fn report(err: ClientError) -> anyhow::Error {
    print_notification(&Notification::from_error(&err));
    err.into()
}

/// Writes the cycle's QR codes for `--qr-out`.
pub async fn export_qr_codes(cycle: &ReleaseTestCycle, dir: &Path) -> Result<()> {
    let written = save_qr_codes(cycle, dir).await?;
    if written.is_empty() {
        println!("{}", "Sem QR: nothing to export".yellow());
    }
    for path in written {
        println!("{} {}", "QR saved:".green(), path.display());
    }
    Ok(())
}
