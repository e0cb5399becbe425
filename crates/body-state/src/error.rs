use shm_transport::TransportError;
use thiserror::Error;

use crate::SchemaVersion;

pub type Result<T, E = Error> = core::result::Result<T, E>;

pub type DecodeResult<T> = core::result::Result<T, DecodeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("read past end of record: {needed} byte(s) at offset {offset}, record is {len} bytes")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        len: usize,
    },
    #[error("schema mismatch ({version}): expected {expected} bytes, got {actual}")]
    SchemaMismatch {
        version: SchemaVersion,
        expected: usize,
        actual: usize,
    },
    #[error("unrecognized record size: {0} bytes")]
    UnknownRecordSize(usize),
    #[error("no field layout known for schema {0}")]
    UnsupportedVersion(SchemaVersion),
}

impl DecodeError {
    /// Whether the failure will repeat on every cycle until producer and
    /// consumer agree on a protocol version.
    pub fn is_version_skew(&self) -> bool {
        !matches!(self, DecodeError::OutOfBounds { .. })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("acquisition failed: {0}")]
    Acquisition(#[from] TransportError),
}
