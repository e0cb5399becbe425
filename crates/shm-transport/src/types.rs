use core::fmt;
use time::OffsetDateTime;

/// Outcome of a bounded wait on a producer signal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WaitResult {
    /// The producer finished a write; the region is safe to read.
    Signaled,
    /// No fresh data before the timeout. Not an error.
    TimedOut,
}

impl WaitResult {
    pub fn is_signaled(self) -> bool {
        matches!(self, WaitResult::Signaled)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timestamp(pub OffsetDateTime);

impl Timestamp {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    pub fn rfc3339(&self) -> Option<String> {
        self.0
            .format(&time::format_description::well_known::Rfc3339)
            .ok()
    }
}

#[derive(Clone, Debug)]
pub struct RegionInfo {
    pub name: String,
    pub driver: String,
    pub size: Option<u64>,
}

impl fmt::Display for RegionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.size {
            Some(size) => write!(f, "{}\t{}\t{size}", self.name, self.driver),
            None => write!(f, "{}\t{}\t-", self.name, self.driver),
        }
    }
}
