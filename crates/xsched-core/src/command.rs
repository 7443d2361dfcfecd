// ── Command API ──
//
// Every user action flows through one `Command` enum. The controller
// routes each variant to the matching client call; desired-state variants
// consult the current snapshot first.

use xsched_api::TestModeRequest;

/// All write operations against a scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // ── Playback ─────────────────────────────────────────────────────
    PlayPlaylist {
        playlist: String,
        looped: bool,
    },
    PlayStep {
        playlist: String,
        step: String,
        looped: bool,
    },
    /// Unpause, or restart the last known playlist when idle.
    Resume,
    PauseToggle,
    Stop,
    /// Stop everything immediately, background playlist included.
    StopAll,
    NextStep,
    PriorStep,
    RestartStep,
    Seek {
        position_ms: i64,
    },

    // ── Audio / output ───────────────────────────────────────────────
    SetVolume(i64),
    AdjustVolume(i64),
    /// `true` mutes; `false` restores the last non-zero volume.
    Mute(bool),
    SetBrightness(i64),
    ToggleOutput,
    SetOutput(bool),
    TogglePlaylistLoop,
    SetPlaylistLoop(bool),

    // ── Test mode ────────────────────────────────────────────────────
    StartTestMode(TestModeRequest),
    StopTestMode,

    // ── Background playlist ──────────────────────────────────────────
    SetBackgroundPlaylist(String),
    ClearBackgroundPlaylist,

    // ── System ───────────────────────────────────────────────────────
    CloseScheduler,
}

/// Outcome of a successfully routed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// The scheduler accepted the command.
    Ok,
    /// Nothing was sent: the scheduler already is in the requested state.
    Unchanged,
}
