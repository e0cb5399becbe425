use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

/// Per-poller counters, registered in their own registry.
#[derive(Clone)]
pub struct PollMetrics {
    pub registry: Registry,
    pub snapshots_decoded: IntCounter,
    pub cycles_skipped: IntCounter,
    pub decode_errors: IntCounter,
}

impl PollMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let snapshots_decoded =
            IntCounter::new("bs_snapshots_decoded", "Records decoded into snapshots")?;
        let cycles_skipped = IntCounter::new(
            "bs_cycles_skipped",
            "Cycles skipped because the producer signal timed out",
        )?;
        let decode_errors = IntCounter::new("bs_decode_errors", "Cycles that failed to decode")?;
        registry.register(Box::new(snapshots_decoded.clone()))?;
        registry.register(Box::new(cycles_skipped.clone()))?;
        registry.register(Box::new(decode_errors.clone()))?;
        Ok(Self {
            registry,
            snapshots_decoded,
            cycles_skipped,
            decode_errors,
        })
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}
