//! Clap derive structures for the `xsched` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// xsched -- drive an xLights xSchedule show controller
#[derive(Debug, Parser)]
#[command(
    name = "xsched",
    version,
    about = "Control xLights xSchedule from the command line",
    long_about = "Control and monitor an xLights xSchedule instance over its web API.\n\n\
        Playback, volume, output and test-mode commands are sent as xSchedule\n\
        commands; status and playlists come from xSchedule queries.",
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
    /// Scheduler profile to use
    #[arg(long, short = 'p', env = "XSCHED_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Scheduler host (overrides profile)
    #[arg(long, short = 'H', env = "XSCHED_HOST", global = true)]
    pub host: Option<String>,

    /// Scheduler web port (overrides profile)
    #[arg(long, env = "XSCHED_PORT", global = true)]
    pub port: Option<u16>,

    /// Scheduler password
    #[arg(long, env = "XSCHED_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "XSCHED_OUTPUT",
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

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "XSCHED_TIMEOUT", global = true)]
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

/// Target state for on/off flags on the scheduler.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Switch {
    On,
    Off,
    Toggle,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show what is playing
    #[command(alias = "st")]
    Status,

    /// Follow status and events until interrupted
    Watch(WatchArgs),

    /// List playlists and their steps
    #[command(alias = "pl")]
    Playlists(PlaylistsArgs),

    /// Play a playlist, or one step of it
    Play {
        /// Playlist name
        playlist: String,

        /// Step name within the playlist
        #[arg(long, short = 's')]
        step: Option<String>,

        /// Loop the playlist (or step)
        #[arg(long, short = 'l')]
        looped: bool,
    },

    /// Unpause, or restart the last playlist when idle
    Resume,

    /// Toggle pause
    Pause,

    /// Stop the current playlist
    Stop {
        /// Stop everything immediately, background playlist included
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Jump to the next step
    Next,

    /// Jump to the previous step
    Prior,

    /// Restart the current step
    Restart,

    /// Move within the current step
    Seek {
        /// Position in milliseconds
        position_ms: i64,
    },

    /// Set, adjust or mute the volume
    #[command(alias = "vol")]
    Volume(VolumeArgs),

    /// Set output brightness
    Brightness {
        /// Brightness percentage (0-100)
        percent: i64,
    },

    /// Turn output to lights on or off
    Output {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Turn looping of the current playlist on or off
    Loop {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Run or stop a test pattern
    TestMode(TestModeArgs),

    /// Manage the background playlist
    #[command(alias = "bg")]
    Background(BackgroundArgs),

    /// Send a raw xSchedule command
    #[command(name = "command", alias = "cmd")]
    RawCommand {
        /// Command name, e.g. "Play specified playlist"
        name: String,

        /// Comma-separated command parameters
        #[arg(long, short = 'P', default_value = "")]
        parameters: String,

        /// Request body forwarded with the command
        #[arg(long)]
        data: Option<String>,
    },

    /// Send a raw xSchedule query
    Query {
        /// Query name, e.g. "GetPlayingStatus"
        name: String,

        /// Query parameters
        #[arg(long, short = 'P', default_value = "")]
        parameters: String,
    },

    /// Close the xSchedule application
    Close,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Only print events, not status changes
    #[arg(long, short = 'e')]
    pub events_only: bool,
}

// ── Playlists ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PlaylistsArgs {
    #[command(subcommand)]
    pub command: PlaylistsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PlaylistsCommand {
    /// List playlists
    #[command(alias = "ls")]
    List,

    /// List the steps of a playlist
    Steps {
        /// Playlist name or id
        playlist: String,
    },
}

// ── Volume ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct VolumeArgs {
    #[command(subcommand)]
    pub command: VolumeCommand,
}

#[derive(Debug, Subcommand)]
pub enum VolumeCommand {
    /// Set an absolute volume (0-100)
    Set { volume: i64 },

    /// Change the volume by a relative amount (-100 to 100)
    Adjust {
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },

    /// Mute, remembering the current volume
    Mute,

    /// Restore the volume from before muting
    Unmute,
}

// ── Test mode ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TestModeArgs {
    #[command(subcommand)]
    pub command: TestModeCommand,
}

#[derive(Debug, Subcommand)]
pub enum TestModeCommand {
    /// Start a test pattern
    Start {
        /// Pattern, e.g. Alternate, "A-B-C", Chase
        #[arg(long, short = 'm')]
        mode: Option<String>,

        /// Limit the test to one model
        #[arg(long)]
        model: Option<String>,

        /// Pattern interval in milliseconds
        #[arg(long)]
        interval: Option<u32>,

        /// Foreground channel value
        #[arg(long)]
        foreground: Option<u32>,

        /// Background channel value
        #[arg(long)]
        background: Option<u32>,
    },

    /// Stop the test pattern
    Stop,
}

// ── Background playlist ──────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BackgroundArgs {
    #[command(subcommand)]
    pub command: BackgroundCommand,
}

#[derive(Debug, Subcommand)]
pub enum BackgroundCommand {
    /// Play a playlist in the background
    Set { playlist: String },

    /// Stop the background playlist
    Clear,
}

// ── Config ───────────────────────────────────────────────────────────

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

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the active profile's password in the system keyring
    SetPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
