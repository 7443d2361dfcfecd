// ── Domain model ──

mod event;
mod status;

pub use event::SchedulerEvent;
pub use status::{PlaybackStatus, StatusSnapshot};
