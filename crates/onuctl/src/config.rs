//! Profile selection and `GlobalOpts` overrides on top of `onuctl-config`.
//!
//! Core never sees these types -- it receives a pre-built `OltConfig`.

use onuctl_config::{Config, Profile};
use onuctl_core::OltConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The profile a command runs against, after flag overrides.
#[derive(Debug, Clone)]
pub struct Target {
    pub profile_name: String,
    pub profile: Profile,
    pub olt: OltConfig,
}

/// `--profile` flag, then the config's `default_profile`, then `"default"`.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Resolve the target from the canonical config file.
pub fn resolve_target(global: &GlobalOpts) -> Result<Target, CliError> {
    let cfg = onuctl_config::load_config_or_default();
    resolve_target_from(global, &cfg)
}

/// Resolve the target profile and apply CLI flag overrides.
///
/// A missing profile is fine when `--api-url` is given; credentials then
/// come from the environment or the login prompt.
pub fn resolve_target_from(global: &GlobalOpts, cfg: &Config) -> Result<Target, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut profile = match (cfg.profiles.get(&profile_name), &global.api_url) {
        (Some(profile), _) => profile.clone(),
        (None, Some(_)) => Profile::default(),
        (None, None) if global.profile.is_some() => {
            let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            names.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if names.is_empty() {
                    "(none)".into()
                } else {
                    names.join(", ")
                },
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: onuctl_config::config_path().display().to_string(),
            });
        }
    };

    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let olt = onuctl_config::profile_to_olt_config(&profile, &cfg.defaults)?;
    Ok(Target {
        profile_name,
        profile,
        olt,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use clap::Parser;
    use onuctl_core::TlsVerification;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["onuctl"];
        argv.extend_from_slice(args);
        argv.push("whoami");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with_lab() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                api_url: "https://olt-api.lab.example".into(),
                username: Some("noc".into()),
                timeout: Some(10),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn flags_override_profile() {
        let cfg = config_with_lab();
        let target = resolve_target_from(
            &global(&["--profile", "lab", "--timeout", "60", "--insecure"]),
            &cfg,
        )
        .unwrap();
        assert_eq!(target.profile_name, "lab");
        assert_eq!(target.olt.timeout, Duration::from_secs(60));
        assert_eq!(target.olt.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(target.olt.url.as_str(), "https://olt-api.lab.example/");
    }

    #[test]
    fn api_url_without_profile() {
        let target =
            resolve_target_from(&global(&["--api-url", "http://127.0.0.1:8080"]), &Config::default())
                .unwrap();
        assert_eq!(target.profile_name, "default");
        assert_eq!(target.profile.username, None);
        assert_eq!(target.olt.url.as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn unknown_profile_lists_available() {
        let err = resolve_target_from(&global(&["--profile", "prod"]), &config_with_lab())
            .unwrap_err();
        match err {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "prod");
                assert_eq!(available, "lab");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
