//! Clap derive structures for the `gamenet` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// gamenet -- manage diskless gaming clients from the command line
#[derive(Debug, Parser)]
#[command(
    name = "gamenet",
    version,
    about = "Manage network-booted GameNet clients and VHD images",
    long_about = "A command-line console for a GameNet management server.\n\n\
        Lists and controls diskless clients, watches their live status,\n\
        and manages the VHD images they boot from.",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "GAMENET_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Management server URL (overrides profile)
    #[arg(long, short = 's', env = "GAMENET_SERVER", global = true)]
    pub server: Option<String>,

    /// Login username (overrides profile)
    #[arg(long, short = 'u', env = "GAMENET_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GAMENET_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "GAMENET_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (default: profile, else 30)
    #[arg(long, env = "GAMENET_TIMEOUT", global = true)]
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
    /// Manage diskless clients
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Show the status overview
    #[command(alias = "dash")]
    Dashboard(DashboardArgs),

    /// Manage VHD images
    Vhd(VhdArgs),

    /// Format and validate MAC addresses (offline)
    Mac(MacArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive search over the visible columns
    #[arg(long, short = 'f')]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BootModeArg {
    Uefi,
    Legacy,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CLIENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// List registered clients with live status
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show client details and performance stats
    Get {
        /// Client ID
        client: String,
    },

    /// Register a new client
    Add(ClientFormArgs),

    /// Update a client registration
    Edit {
        /// Client ID
        client: String,

        #[command(flatten)]
        form: ClientEditArgs,
    },

    /// Reboot an online client
    Reboot {
        /// Client ID
        client: String,
    },

    /// Remove a client registration
    #[command(alias = "rm")]
    Delete {
        /// Client ID
        client: String,
    },

    /// Live status table, refreshed on every poll
    Watch {
        /// Poll interval in seconds (overrides profile)
        #[arg(long, short = 'i')]
        interval: Option<u64>,
    },
}

#[derive(Debug, Args)]
pub struct ClientFormArgs {
    /// Client name
    #[arg(long, short = 'n')]
    pub name: String,

    /// MAC address; separators optional, case-insensitive
    #[arg(long, short = 'm')]
    pub mac: String,

    /// VHD image ID to boot
    #[arg(long)]
    pub vhd: Option<String>,

    /// Keep disk writes across reboots
    #[arg(long)]
    pub persistent: bool,

    /// Firmware boot mode
    #[arg(long, value_enum, default_value = "uefi")]
    pub boot_mode: BootModeArg,
}

#[derive(Debug, Args)]
pub struct ClientEditArgs {
    /// New client name (default: unchanged)
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// New MAC address (default: unchanged)
    #[arg(long, short = 'm')]
    pub mac: Option<String>,

    // The server replaces every field below on edit, so each must be
    // given even when it stays the same.
    /// VHD image ID to boot, or `none` to unassign
    #[arg(long, value_name = "ID|none", required = true)]
    pub vhd: String,

    /// Keep disk writes across reboots
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set, required = true)]
    pub persistent: bool,

    /// Firmware boot mode
    #[arg(long, value_enum, required = true)]
    pub boot_mode: BootModeArg,

    /// Script to run after boot; an empty string clears it
    #[arg(long, value_name = "SCRIPT", required = true)]
    pub post_boot_script: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DASHBOARD
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Skip the traffic summary
    #[arg(long)]
    pub no_traffic: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VHD
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VhdArgs {
    #[command(subcommand)]
    pub command: VhdCommand,
}

#[derive(Debug, Subcommand)]
pub enum VhdCommand {
    /// List VHD images
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show image details
    Get {
        /// VHD ID
        vhd: String,
    },

    /// Create an image
    Add {
        /// Image name
        #[arg(long, short = 'n')]
        name: String,

        /// Size in GB
        #[arg(long, default_value = "50")]
        size: String,

        /// Free-text description
        #[arg(long, short = 'd', default_value = "")]
        description: String,

        /// Windows version installed on the image
        #[arg(long, short = 'w', default_value = "")]
        windows: String,

        /// Mark as a template
        #[arg(long)]
        template: bool,
    },

    /// Update image metadata
    Edit {
        /// VHD ID
        vhd: String,

        /// New name (default: unchanged)
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// New description (default: unchanged)
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// New Windows version (default: unchanged)
        #[arg(long, short = 'w')]
        windows: Option<String>,

        /// Template flag (default: unchanged)
        #[arg(long)]
        template: Option<bool>,

        /// Locked flag (default: unchanged)
        #[arg(long)]
        locked: Option<bool>,
    },

    /// Delete an unlocked image
    #[command(alias = "rm")]
    Delete {
        /// VHD ID
        vhd: String,
    },

    /// Clone an image under a new name
    Clone {
        /// VHD ID
        vhd: String,

        /// Name for the copy (default: "Clone of <name>")
        #[arg(long, short = 'n')]
        name: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MAC
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MacArgs {
    #[command(subcommand)]
    pub command: MacCommand,
}

#[derive(Debug, Subcommand)]
pub enum MacCommand {
    /// Apply the input mask (strip, uppercase, insert colons)
    Format {
        /// Raw input
        input: String,
    },

    /// Check a MAC address against XX:XX:XX:XX:XX:XX
    Validate {
        /// MAC address
        mac: String,
    },
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
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
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
