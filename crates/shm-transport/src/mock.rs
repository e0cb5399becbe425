use crate::{FrameSignal, RecordSource, RegionInfo, Result, TransportError, WaitResult};
use std::collections::VecDeque;
use std::time::Duration;

/// An in-process region. Each instance owns its own bytes, zeroed on open.
pub struct MockRegion {
    name: String,
    data: Vec<u8>,
    reads: u64,
}

impl MockRegion {
    /// Wrap caller-provided contents; the declared size is `data.len()`.
    pub fn from_bytes(name: &str, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            data,
            reads: 0,
        }
    }

    /// Mutable access for tests and demos that play the producer.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of times the region has been read.
    pub fn reads(&self) -> u64 {
        self.reads
    }
}

impl RecordSource for MockRegion {
    fn open(name: &str, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(TransportError::SizeMismatch {
                expected: 1,
                actual: 0,
            });
        }
        Ok(Self::from_bytes(name, vec![0u8; size]))
    }

    fn list() -> Result<Vec<RegionInfo>> {
        Ok(vec![RegionInfo {
            name: "mock0".to_string(),
            driver: "mock".to_string(),
            size: None,
        }])
    }

    fn size(&self) -> usize {
        self.data.len()
    }

    fn read_record(&mut self) -> Result<&[u8]> {
        self.reads += 1;
        Ok(&self.data)
    }
}

/// A signal that replays a fixed script, then reports `Signaled` forever.
#[derive(Debug, Default)]
pub struct MockSignal {
    script: VecDeque<WaitResult>,
    waits: u64,
}

impl MockSignal {
    pub fn always() -> Self {
        Self::default()
    }

    pub fn scripted(script: impl IntoIterator<Item = WaitResult>) -> Self {
        Self {
            script: script.into_iter().collect(),
            waits: 0,
        }
    }

    pub fn waits(&self) -> u64 {
        self.waits
    }
}

impl FrameSignal for MockSignal {
    fn wait(&mut self, _timeout: Duration) -> Result<WaitResult> {
        self.waits += 1;
        Ok(self.script.pop_front().unwrap_or(WaitResult::Signaled))
    }
}
