//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};
use secrecy::SecretString;

use onuctl_config::{Config, Profile};

use super::util::prompt_err;
use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::active_profile_name;
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),
        ConfigCommand::Show => show(global),
        ConfigCommand::SetPassword => set_password(global),
    }
}

// ── Init: interactive wizard ─────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = onuctl_config::config_path();
    eprintln!("onuctl configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let mut cfg = onuctl_config::load_config_or_default();

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(global.profile.clone().unwrap_or_else(|| "default".into()))
        .interact_text()
        .map_err(prompt_err)?;

    let api_url: String = Input::new()
        .with_prompt("Device-control API URL")
        .default(
            global
                .api_url
                .clone()
                .unwrap_or_else(|| "https://olt-api.example.net".into()),
        )
        .validate_with(|raw: &String| {
            onuctl_config::parse_api_url(raw)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    let username: String = Input::new()
        .with_prompt("Username")
        .interact_text()
        .map_err(prompt_err)?;

    let password = rpassword::prompt_password("Password (empty to enter at login): ")
        .map_err(prompt_err)?;

    let mut profile = Profile {
        api_url: api_url.trim().to_owned(),
        username: Some(username),
        ..Profile::default()
    };

    if !password.is_empty() {
        let choices = &[
            "Store in system keyring (recommended)",
            "Save to config file (plaintext)",
        ];
        let choice = Select::new()
            .with_prompt("Where to store the password?")
            .items(choices)
            .default(0)
            .interact()
            .map_err(prompt_err)?;

        if choice == 0 {
            onuctl_config::store_password(&profile_name, &SecretString::from(password))?;
            eprintln!("   Password stored in system keyring");
        } else {
            profile.password = Some(password);
        }
    }

    let insecure = Confirm::new()
        .with_prompt("Accept self-signed TLS certificates?")
        .default(false)
        .interact()
        .map_err(prompt_err)?;
    if insecure {
        profile.insecure = Some(true);
    }

    if cfg.profiles.is_empty() {
        cfg.default_profile = Some(profile_name.clone());
    }
    cfg.profiles.insert(profile_name.clone(), profile);
    onuctl_config::save_config(&cfg)?;

    eprintln!("\n   Profile '{profile_name}' saved. Sign in with: onuctl login");
    Ok(())
}

// ── Show ─────────────────────────────────────────────────────────────

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = onuctl_config::load_config()?;
    redact(&mut cfg);

    let out = match global.output {
        OutputFormat::Json => serde_json::to_string_pretty(&cfg)?,
        OutputFormat::JsonCompact => serde_json::to_string(&cfg)?,
        OutputFormat::Yaml => serde_yaml::to_string(&cfg)?,
        OutputFormat::Plain => {
            let mut names: Vec<&String> = cfg.profiles.keys().collect();
            names.sort();
            names
                .into_iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\n")
        }
        OutputFormat::Table => {
            let body = toml::to_string_pretty(&cfg).map_err(|e| CliError::Config {
                message: e.to_string(),
            })?;
            format!(
                "# {}\n# active profile: {}\n\n{body}",
                onuctl_config::config_path().display(),
                active_profile_name(global, &cfg),
            )
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

fn redact(cfg: &mut Config) {
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
    }
}

// ── Set password ─────────────────────────────────────────────────────

fn set_password(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = onuctl_config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if !cfg.profiles.contains_key(&profile_name) {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
        });
    }

    let password = rpassword::prompt_password(format!("Password for '{profile_name}': "))
        .map_err(prompt_err)?;
    if password.is_empty() {
        return Err(CliError::validation("password", "cannot be empty"));
    }

    onuctl_config::store_password(&profile_name, &SecretString::from(password))?;
    output::notice(
        &format!("Password for profile '{profile_name}' stored in system keyring"),
        global.quiet,
    );
    Ok(())
}
