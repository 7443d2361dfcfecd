// xsched-api: Async Rust client for the xLights xSchedule HTTP protocol

pub mod auth;
pub mod client;
pub mod commands;
pub mod error;
pub mod lenient;
pub mod models;
pub mod queries;
pub mod transport;

pub use auth::{AuthSession, SessionState, credential_for};
pub use client::{DEFAULT_REFERENCE, NOT_LOGGED_IN, XScheduleClient, check_result};
pub use error::Error;
pub use models::{NextScheduled, Playlist, PlaylistStep, TestModeRequest};
pub use transport::{Transport, TransportConfig, encode_query};
