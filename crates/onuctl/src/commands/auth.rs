//! Sign-in, sign-out and session inspection.

use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;

use onuctl_config::{ConfigError, StoredSession};

use super::Context;
use super::util::prompt_err;
use crate::cli::LoginArgs;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct WhoAmI {
    profile: String,
    api_url: String,
    username: String,
    subject: Option<String>,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

fn interactive() -> bool {
    std::io::stdin().is_terminal()
}

fn username_for(args_username: Option<String>, ctx: &Context<'_>) -> Result<String, CliError> {
    if let Some(username) = args_username {
        return Ok(username);
    }
    match onuctl_config::resolve_username(&ctx.target.profile, &ctx.target.profile_name) {
        Ok(username) => Ok(username),
        Err(ConfigError::NoCredentials { .. }) if interactive() => dialoguer::Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(prompt_err),
        Err(e) => Err(e.into()),
    }
}

fn password_for(ask: bool, ctx: &Context<'_>) -> Result<SecretString, CliError> {
    if !ask {
        match onuctl_config::resolve_password(&ctx.target.profile, &ctx.target.profile_name) {
            Ok(password) => return Ok(password),
            Err(ConfigError::NoCredentials { .. }) if interactive() => {}
            Err(e) => return Err(e.into()),
        }
    }
    let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if password.is_empty() {
        return Err(CliError::validation("password", "cannot be empty"));
    }
    Ok(SecretString::from(password))
}

pub async fn login(args: LoginArgs, ctx: &Context<'_>) -> Result<(), CliError> {
    let username = username_for(args.username, ctx)?;
    let password = password_for(args.ask_password, ctx)?;

    let session = ctx.orchestrator.sign_in(&username, &password).await?;
    let api_url = ctx.target.olt.url.as_str();
    ctx.sessions.save(
        &ctx.target.profile_name,
        &StoredSession::new(api_url, &username, &session),
    )?;

    output::notice(
        &format!(
            "Signed in to {api_url} as {username} (session valid until {})",
            session.expires_at().format("%Y-%m-%d %H:%M UTC")
        ),
        ctx.global.quiet,
    );
    Ok(())
}

pub fn logout(ctx: &Context<'_>) -> Result<(), CliError> {
    ctx.orchestrator.sign_out();
    let removed = ctx.sessions.clear(&ctx.target.profile_name)?;
    let message = if removed {
        format!("Signed out of profile '{}'", ctx.target.profile_name)
    } else {
        format!("No session stored for profile '{}'", ctx.target.profile_name)
    };
    output::notice(&message, ctx.global.quiet);
    Ok(())
}

pub fn whoami(ctx: &Context<'_>) -> Result<(), CliError> {
    let session = ctx.resume()?;
    let stored = ctx
        .sessions
        .load(&ctx.target.profile_name)?
        .ok_or_else(|| CliError::NotSignedIn {
            profile: ctx.target.profile_name.clone(),
        })?;

    let me = WhoAmI {
        profile: ctx.target.profile_name.clone(),
        api_url: stored.api_url,
        username: stored.username,
        subject: session.subject(),
        issued_at: session.issued_at(),
        expires_at: session.expires_at(),
    };

    let out = output::render_single(
        &ctx.global.output,
        &me,
        |m| {
            output::detail(&[
                ("Profile", m.profile.clone()),
                ("API", m.api_url.clone()),
                ("Username", m.username.clone()),
                ("Subject", output::or_dash(m.subject.as_deref())),
                ("Issued", m.issued_at.to_rfc3339()),
                ("Expires", m.expires_at.to_rfc3339()),
            ])
        },
        |m| m.username.clone(),
    )?;
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}
