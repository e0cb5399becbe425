use crate::{RegionInfo, Result, WaitResult};
use std::time::Duration;

/// A fixed-size, named region written by an external producer.
///
/// Implementations never write to the region. Each call to
/// [`RecordSource::read_record`] returns a view that is only valid until the
/// next call, so a decoder always starts from a fresh observation.
pub trait RecordSource {
    /// Open a region by name, expecting exactly `size` bytes.
    fn open(name: &str, size: usize) -> Result<Self>
    where
        Self: Sized;

    /// Attempt to list regions visible to this backend.
    fn list() -> Result<Vec<RegionInfo>>;

    /// Declared record size in bytes.
    fn size(&self) -> usize;

    /// Refresh and return the current region contents.
    fn read_record(&mut self) -> Result<&[u8]>;
}

/// A producer-raised "write complete" signal.
pub trait FrameSignal {
    /// Block for at most `timeout`. A timeout is reported as
    /// [`WaitResult::TimedOut`], not as an error.
    fn wait(&mut self, timeout: Duration) -> Result<WaitResult>;
}

impl<S: FrameSignal + ?Sized> FrameSignal for Box<S> {
    fn wait(&mut self, timeout: Duration) -> Result<WaitResult> {
        (**self).wait(timeout)
    }
}
