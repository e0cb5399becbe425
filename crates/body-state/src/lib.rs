//! body-state: alignment-aware decoder for body/face/eye/hand tracking records
//!
//! An external producer writes one fixed-size, C-laid-out record into a named shared-memory
//! region on every update. This crate describes that layout ([`schema`]), reads it field by
//! field with natural-alignment padding ([`Cursor`]), assembles a typed [`Snapshot`], and runs
//! the acquisition loop ([`Poller`]) over any [`shm_transport::RecordSource`].

pub mod schema;
pub use schema::{
    SchemaVersion, CONFIDENCE_COUNT, EXPRESSION_COUNT, FULL_BODY_JOINT_COUNT, HAND_JOINT_COUNT,
};

mod error;
pub use error::{DecodeError, DecodeResult, Error, Result};

mod cursor;
pub use cursor::Cursor;

mod types;
pub use types::*;

mod decode;
pub use decode::{decode_detect, decode_snapshot, read_array, FromCursor};

mod loader;
pub use loader::{load_config_file, PollConfig, PollPolicy};

mod metrics;
pub use metrics::PollMetrics;

mod poller;
pub use poller::{Frame, PollStats, Poller};

#[cfg(test)]
mod testing;
