//! shm-transport: read-only access to producer-owned shared memory regions
//!
//! This crate provides traits and types for polling fixed-size records that an external
//! process writes into a named region, plus the optional "write complete" signal the
//! producer raises. Backends are feature-gated; the default build enables a `mock`
//! backend and a file backend (POSIX `/dev/shm` objects or plain files).

mod types;
pub use types::{RegionInfo, Timestamp, WaitResult};

mod error;
pub use error::{Result, TransportError};

mod traits;
pub use traits::{FrameSignal, RecordSource};

mod signal;
pub use signal::{ChannelSignal, SignalNotifier};

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::{MockRegion, MockSignal};

#[cfg(feature = "file")]
mod file;

#[cfg(feature = "file")]
pub use file::{FileRegion, DEFAULT_SHM_DIR};
