use serde::{Serialize, Serializer};
use shm_transport::{FrameSignal, RecordSource, Timestamp, TransportError, WaitResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::{decode_snapshot, DecodeError, Error, PollConfig, PollMetrics, PollPolicy, Result, Snapshot};

/// A decoded snapshot plus when and in which cycle it was read.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub seq: u64,
    #[serde(serialize_with = "serialize_timestamp")]
    pub captured_at: Timestamp,
    pub snapshot: Snapshot,
}

fn serialize_timestamp<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
    match ts.rfc3339() {
        Some(s) => serializer.serialize_str(&s),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub cycles: u64,
    pub decoded: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Acquisition loop: owns the region and optional producer signal, and hands
/// one fresh view per cycle to the decoder.
pub struct Poller<R: RecordSource> {
    source: R,
    signal: Option<Box<dyn FrameSignal>>,
    config: PollConfig,
    seq: u64,
    metrics: Option<PollMetrics>,
}

impl<R: RecordSource> Poller<R> {
    pub fn new(source: R, config: PollConfig) -> Self {
        Self {
            source,
            signal: None,
            config,
            seq: 0,
            metrics: None,
        }
    }

    pub fn with_signal(mut self, signal: impl FrameSignal + 'static) -> Self {
        self.signal = Some(Box::new(signal));
        self
    }

    pub fn with_metrics(mut self, metrics: PollMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut R {
        &mut self.source
    }

    /// Run one cycle. `Ok(None)` means the producer had nothing new before
    /// the wait timed out.
    pub fn poll_once(&mut self) -> Result<Option<Frame>> {
        if self.config.policy == PollPolicy::EventGated {
            let signal = self.signal.as_mut().ok_or(TransportError::Unsupported(
                "event-gated policy without a signal",
            ))?;
            if signal.wait(self.config.wait_timeout())? == WaitResult::TimedOut {
                tracing::debug!(region = %self.config.region, "no fresh record before timeout");
                if let Some(m) = &self.metrics {
                    m.cycles_skipped.inc();
                }
                return Ok(None);
            }
        }

        let decoded = decode_snapshot(self.source.read_record()?, self.config.schema);
        let snapshot = match decoded {
            Ok(s) => s,
            Err(e) => {
                if let Some(m) = &self.metrics {
                    m.decode_errors.inc();
                }
                return Err(e.into());
            }
        };
        self.seq += 1;
        if let Some(m) = &self.metrics {
            m.snapshots_decoded.inc();
        }
        tracing::trace!(seq = self.seq, "decoded snapshot");
        Ok(Some(Frame {
            seq: self.seq,
            captured_at: Timestamp::now(),
            snapshot,
        }))
    }

    /// Poll until `stop` is set or `max_cycles` is reached, handing each frame
    /// to `on_frame`. `stop` is only checked between cycles.
    ///
    /// Out-of-bounds decodes skip the cycle; version skew and acquisition
    /// failures end the loop.
    pub fn run<F>(&mut self, stop: &AtomicBool, mut on_frame: F) -> Result<PollStats>
    where
        F: FnMut(Frame),
    {
        let mut stats = PollStats::default();
        tracing::info!(
            region = %self.config.region,
            policy = ?self.config.policy,
            schema = %self.config.schema,
            "polling started"
        );
        while !stop.load(Ordering::Relaxed) {
            if self.cycles_exhausted(&stats) {
                break;
            }
            stats.cycles += 1;
            match self.poll_once() {
                Ok(Some(frame)) => {
                    stats.decoded += 1;
                    on_frame(frame);
                }
                Ok(None) => stats.skipped += 1,
                Err(Error::Decode(e @ DecodeError::OutOfBounds { .. })) => {
                    tracing::warn!(error = %e, "dropping cycle");
                    stats.failed += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, "polling aborted");
                    return Err(e);
                }
            }
            if self.cycles_exhausted(&stats) {
                break;
            }
            if self.config.policy == PollPolicy::BlindPoll && !self.config.poll_interval().is_zero() {
                thread::sleep(self.config.poll_interval());
            }
        }
        tracing::info!(?stats, "polling stopped");
        Ok(stats)
    }

    fn cycles_exhausted(&self, stats: &PollStats) -> bool {
        self.config.max_cycles.is_some_and(|max| stats.cycles >= max)
    }
}
