// xsched-core: Polling, event detection and command routing between xsched-api and consumers.

pub mod command;
pub mod config;
pub mod controller;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{ControllerConfig, scheduler_url};
pub use controller::{ConnectionState, Controller};
pub use coordinator::{CycleOutcome, DerivedState, DerivedView, PollCoordinator, PollSettings};
pub use error::CoreError;
pub use store::{SnapshotStore, TimedCache, UpdateStatus};
pub use stream::{SnapshotStream, SnapshotWatchStream};

pub use model::{PlaybackStatus, SchedulerEvent, StatusSnapshot};

// Protocol types consumers commonly need alongside the controller.
pub use xsched_api::{NextScheduled, Playlist, PlaylistStep, SessionState, TestModeRequest};
