//! Clap derive structures for the `acinfinity` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// acinfinity -- read and control AC Infinity UIS controllers
#[derive(Debug, Parser)]
#[command(
    name = "acinfinity",
    version,
    about = "Monitor and control AC Infinity grow controllers from the command line",
    long_about = "Talks to the AC Infinity cloud the way the mobile app does and exposes\n\
        every controller, port, sensor and setting as an entity you can list,\n\
        read, write and watch.",
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
    /// Account profile to use
    #[arg(long, short = 'p', env = "ACINFINITY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file path
    #[arg(long, env = "ACINFINITY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Account e-mail (overrides profile)
    #[arg(long, short = 'e', env = "ACINFINITY_EMAIL", global = true)]
    pub email: Option<String>,

    /// Account password
    #[arg(long, env = "ACINFINITY_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Cloud host (overrides profile)
    #[arg(long, env = "ACINFINITY_HOST", global = true)]
    pub host: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ACINFINITY_OUTPUT",
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

    /// Request timeout in seconds
    #[arg(long, env = "ACINFINITY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
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

#[derive(Debug, Clone, Copy, ValueEnum)]
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
    /// Validate account credentials against the cloud
    Login,

    /// Inspect controllers on the account
    #[command(alias = "ctl", alias = "c")]
    Controllers(ControllersArgs),

    /// List, read and write entities
    #[command(alias = "ent", alias = "e")]
    Entities(EntitiesArgs),

    /// Poll the cloud and print entity changes
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONTROLLERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ControllersArgs {
    #[command(subcommand)]
    pub command: ControllersCommand,
}

#[derive(Debug, Subcommand)]
pub enum ControllersCommand {
    /// List controllers
    #[command(alias = "ls")]
    List,

    /// Show one controller with its ports and sensors
    Get {
        /// Device id, MAC address or name
        controller: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ENTITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EntitiesArgs {
    #[command(subcommand)]
    pub command: EntitiesCommand,
}

#[derive(Debug, Subcommand)]
pub enum EntitiesCommand {
    /// List entities
    #[command(alias = "ls")]
    List(EntityFilter),

    /// Show one entity
    Get {
        /// Entity id (`number.ac_infinity_...`) or unique id
        entity: String,
    },

    /// Write a value to an entity
    Set {
        /// Entity id or unique id
        entity: String,

        /// New value: a number, on/off, an option label, HH:MM or none
        value: String,
    },
}

/// Filters shared by `entities list` and `watch`.
#[derive(Debug, Clone, Default, Args)]
pub struct EntityFilter {
    /// Only entities of this controller (device id, MAC or name)
    #[arg(long, short = 'c')]
    pub controller: Option<String>,

    /// Only this platform: sensor, binary_sensor, switch, number, select, time
    #[arg(long, short = 'k')]
    pub kind: Option<String>,

    /// Only this category: sensors, controls, settings
    #[arg(long)]
    pub category: Option<String>,

    /// Hide controls the port's active mode ignores
    #[arg(long)]
    pub live_only: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub filter: EntityFilter,

    /// Polling interval in seconds (minimum 5; overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a profile with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Validate a new password and store it in the system keyring
    SetPassword,

    /// Set the polling interval of the active profile
    SetPollingInterval {
        /// Seconds between refreshes (minimum 5)
        seconds: u64,
    },

    /// Choose which entity categories a controller exposes
    SetEntities {
        /// Controller device id
        controller: String,

        /// all, sensors_only, controls_only, settings_only,
        /// sensors_and_controls, sensors_and_settings,
        /// controls_and_settings, disable
        selection: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
