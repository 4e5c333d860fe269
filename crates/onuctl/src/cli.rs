//! Clap derive structures for the `onuctl` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// onuctl -- provision and diagnose ONUs on GPON OLTs
#[derive(Debug, Parser)]
#[command(
    name = "onuctl",
    version,
    about = "Provision and diagnose ONUs through a device-control API",
    long_about = "Operator console for GPON access networks.\n\n\
        Discovers unregistered ONUs, registers them against a service VLAN,\n\
        and reads optical power, deletes, or reboots registered ONUs.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// API profile to use
    #[arg(long, short = 'p', env = "ONUCTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device-control API URL (overrides profile)
    #[arg(long, short = 'a', env = "ONUCTL_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ONUCTL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "ONUCTL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "ONUCTL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and persist the session for this profile
    Login(LoginArgs),

    /// Discard the persisted session
    Logout,

    /// Show who is signed in and when the session expires
    Whoami,

    /// Inspect OLTs and their service profiles
    Olt(OltArgs),

    /// Discover, register, and operate on ONUs
    Onu(OnuArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Login ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (defaults to the profile's username)
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Prompt for the password even if one is configured
    #[arg(long)]
    pub ask_password: bool,
}

// ── OLT ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OltArgs {
    #[command(subcommand)]
    pub command: OltCommand,
}

#[derive(Debug, Subcommand)]
pub enum OltCommand {
    /// List OLTs with their reachability
    #[command(alias = "ls")]
    List,

    /// List service profiles (VLANs) on an OLT
    Services {
        /// OLT id
        olt: String,
    },
}

// ── ONU ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OnuArgs {
    #[command(subcommand)]
    pub command: OnuCommand,
}

#[derive(Debug, Subcommand)]
pub enum OnuCommand {
    /// Scan an OLT for unregistered ONUs
    #[command(alias = "scan")]
    Autofind {
        /// OLT id
        olt: String,
    },

    /// Register an ONU against a service VLAN
    Register {
        /// OLT id
        olt: String,

        /// ONU serial number
        #[arg(long)]
        sn: String,

        /// Frame/slot/port, e.g. 0/1/2
        #[arg(long)]
        fsp: String,

        /// Service VLAN tag, or service id with --service-id
        #[arg(long)]
        service: u32,

        /// Treat --service as a service id instead of a VLAN tag
        #[arg(long)]
        service_id: bool,

        /// Subscriber description (no spaces)
        #[arg(long, short = 'd')]
        description: String,

        /// Mark the service VLAN as native
        #[arg(long)]
        native_vlan: bool,
    },

    /// Look up a registered ONU by serial number
    Search {
        /// OLT id
        olt: String,

        /// ONU serial number
        sn: String,

        /// Skip the optical power reading for online ONUs
        #[arg(long)]
        no_optical: bool,
    },

    /// Read optical receive power for an ONU
    Optical {
        /// OLT id
        olt: String,

        #[arg(long)]
        fsp: String,

        #[arg(long)]
        ontid: String,
    },

    /// Delete an ONU registration
    #[command(alias = "rm")]
    Delete {
        /// OLT id
        olt: String,

        /// ONU serial number
        sn: String,
    },

    /// Reboot an ONU
    Reboot {
        /// OLT id
        olt: String,

        #[arg(long)]
        fsp: String,

        #[arg(long)]
        ontid: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Show the resolved configuration
    Show,

    /// Store a profile's password in the system keyring
    SetPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
