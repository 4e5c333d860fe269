//! Command dispatch: bridges CLI args -> orchestrator calls -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod olt;
pub mod onu;
pub mod util;

use onuctl_config::SessionStore;
use onuctl_core::{Orchestrator, Session};
use tracing::debug;

use crate::cli::{Command, GlobalOpts};
use crate::config::Target;
use crate::error::CliError;
use crate::output;

/// Everything an API-bound command needs.
pub struct Context<'a> {
    pub orchestrator: Orchestrator,
    pub target: Target,
    pub sessions: SessionStore,
    pub global: &'a GlobalOpts,
}

impl Context<'_> {
    /// Load the persisted session for this profile into the orchestrator.
    ///
    /// A session issued by a different API URL does not count. One whose TTL
    /// has lapsed is deleted from disk.
    pub fn resume(&self) -> Result<Session, CliError> {
        let name = &self.target.profile_name;
        let stored = self
            .sessions
            .load(name)?
            .filter(|s| s.api_url == self.target.olt.url.as_str())
            .ok_or_else(|| CliError::NotSignedIn {
                profile: name.clone(),
            })?;

        match self.orchestrator.restore(stored.to_session()) {
            Ok(session) => Ok(session),
            Err(err) => {
                self.sessions.clear(name)?;
                Err(err.into())
            }
        }
    }

    pub fn color(&self) -> bool {
        output::should_color(&self.global.color)
    }
}

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context<'_>) -> Result<(), CliError> {
    let result = match cmd {
        Command::Login(args) => auth::login(args, ctx).await,
        Command::Logout => auth::logout(ctx),
        Command::Whoami => auth::whoami(ctx),
        Command::Olt(args) => olt::handle(args, ctx).await,
        Command::Onu(args) => onu::handle(args, ctx).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    };

    // The orchestrator already dropped its copy; drop the file too.
    if matches!(result, Err(CliError::SessionExpired)) {
        debug!(profile = %ctx.target.profile_name, "clearing rejected session");
        ctx.sessions.clear(&ctx.target.profile_name)?;
    }
    result
}
