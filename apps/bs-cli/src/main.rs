use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::fs;
use std::sync::atomic::AtomicBool;
use tracing::info;

use body_state as bs;
use body_state::{PollConfig, PollPolicy, Poller, SchemaVersion, Side};
use shm_transport as shm;
use shm_transport::RecordSource;

#[derive(Parser, Debug)]
#[command(
    name = "bs",
    version,
    about = "Body-state shared memory inspector",
    disable_help_subcommand = true
)]
struct Cli {
    /// Use the in-process mock region instead of shared memory
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum SchemaArg {
    V1,
    V2,
}

impl From<SchemaArg> for SchemaVersion {
    fn from(arg: SchemaArg) -> Self {
        match arg {
            SchemaArg::V1 => SchemaVersion::V1,
            SchemaArg::V2 => SchemaVersion::V2,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Poll a live region and print each decoded snapshot
    Watch {
        /// YAML poll config
        #[arg(long)]
        config: Option<String>,
        /// Region name (overrides config)
        #[arg(long)]
        region: Option<String>,
        /// Directory holding shared memory objects (overrides config)
        #[arg(long)]
        shm_dir: Option<String>,
        /// Number of cycles before exiting (default: run until killed)
        #[arg(long)]
        count: Option<u64>,
        /// Milliseconds between blind-poll cycles (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Schema version (overrides config)
        #[arg(long, value_enum)]
        schema: Option<SchemaArg>,
        /// Print each frame as one JSON line
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
        /// Print prometheus counters on exit
        #[arg(long, action = ArgAction::SetTrue)]
        metrics: bool,
    },
    /// Decode a record dumped to a file
    Decode {
        /// Path to the raw record
        #[arg(long)]
        file: String,
        /// Schema version (detected from file size if omitted)
        #[arg(long, value_enum)]
        schema: Option<SchemaArg>,
        /// Print the full snapshot as JSON
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Print field offsets and sizes for a schema version
    Layout {
        #[arg(long, value_enum, default_value_t = SchemaArg::V2)]
        schema: SchemaArg,
        /// Print as JSON
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// List candidate regions
    Regions {
        /// Directory holding shared memory objects
        #[arg(long, default_value = shm::DEFAULT_SHM_DIR)]
        shm_dir: String,
    },
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            config,
            region,
            shm_dir,
            count,
            interval_ms,
            schema,
            json,
            metrics,
        } => {
            let mut cfg = match config {
                Some(path) => bs::load_config_file(path)?,
                None => PollConfig::default(),
            };
            if let Some(region) = region {
                cfg.region = region;
            }
            if let Some(dir) = shm_dir {
                cfg.shm_dir = dir.into();
            }
            if let Some(ms) = interval_ms {
                cfg.poll_interval_ms = ms;
            }
            if let Some(schema) = schema {
                cfg.schema = schema.into();
            }
            cfg.max_cycles = count.or(cfg.max_cycles);
            cfg.validate()?;
            watch(cli.mock, cfg, json, metrics)
        }
        Commands::Decode { file, schema, json } => decode_file(&file, schema, json),
        Commands::Layout { schema, json } => layout(schema.into(), json),
        Commands::Regions { shm_dir } => regions(cli.mock, &shm_dir),
    }
}

fn setup_tracing() {
    // Best-effort; avoid panics if already set
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn watch(mock: bool, cfg: PollConfig, json: bool, metrics: bool) -> Result<()> {
    let size = cfg.schema.record_size();
    let hub = if metrics {
        Some(bs::PollMetrics::new().map_err(|e| anyhow::anyhow!("metrics init error: {e}"))?)
    } else {
        None
    };
    if mock {
        let region = shm::MockRegion::open(&cfg.region, size)?;
        let gated = cfg.policy == PollPolicy::EventGated;
        let mut poller = Poller::new(region, cfg);
        if gated {
            poller = poller.with_signal(shm::MockSignal::always());
        }
        run_poller(poller, hub, json)
    } else {
        if cfg.policy == PollPolicy::EventGated {
            let name = cfg.signal.as_deref().unwrap_or(bs::schema::SIGNAL_NAME);
            anyhow::bail!(
                "signal {name}: no named-event backend on this platform; use policy blind_poll"
            );
        }
        let region = shm::FileRegion::open_in(&cfg.shm_dir, &cfg.region, size)
            .with_context(|| format!("opening region {}", cfg.region))?;
        info!(path = %region.path().display(), size, schema = %cfg.schema, "watching region");
        run_poller(Poller::new(region, cfg), hub, json)
    }
}

fn run_poller<R: RecordSource>(
    mut poller: Poller<R>,
    hub: Option<bs::PollMetrics>,
    json: bool,
) -> Result<()> {
    if let Some(m) = &hub {
        poller = poller.with_metrics(m.clone());
    }
    let stop = AtomicBool::new(false);
    let mut encode_err = None;
    let stats = poller.run(&stop, |frame| {
        if json {
            match serde_json::to_string(&frame) {
                Ok(line) => println!("{line}"),
                Err(e) => encode_err = Some(e),
            }
        } else {
            print_summary(frame.seq, &frame.captured_at, &frame.snapshot);
        }
    })?;
    if let Some(e) = encode_err {
        return Err(e.into());
    }
    info!(
        cycles = stats.cycles,
        decoded = stats.decoded,
        skipped = stats.skipped,
        failed = stats.failed,
        "watch finished"
    );
    if let Some(m) = hub {
        print!("{}", m.encode_text());
    }
    Ok(())
}

fn print_summary(seq: u64, ts: &shm::Timestamp, s: &bs::Snapshot) {
    let flag = |b: bool| if b { "y" } else { "n" };
    println!(
        "#{seq}\t{ts}\tface={face} eyes={le}/{re} hands={lh}/{rh} body={conf:.2}{cal} skeleton_changes={changes}",
        ts = ts.rfc3339().unwrap_or_default(),
        face = flag(s.face_is_valid),
        le = flag(s.eye_is_valid(Side::Left)),
        re = flag(s.eye_is_valid(Side::Right)),
        lh = flag(s.hand_active(Side::Left)),
        rh = flag(s.hand_active(Side::Right)),
        conf = s.body_tracking_confidence,
        cal = if s.body_tracking_calibrated { " calibrated" } else { "" },
        changes = s.skeleton_changed_count,
    );
}

fn decode_file(file: &str, schema: Option<SchemaArg>, json: bool) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("reading record: {file}"))?;
    let version = match schema {
        Some(s) => s.into(),
        None => SchemaVersion::from_record_size(bytes.len())
            .with_context(|| format!("detecting schema: {file}"))?,
    };
    let snapshot = bs::decode_snapshot(&bytes, version)
        .with_context(|| format!("decoding {file} as {version}"))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_summary(0, &shm::Timestamp::now(), &snapshot);
    }
    Ok(())
}

fn layout(version: SchemaVersion, json: bool) -> Result<()> {
    if !version.is_decodable() {
        anyhow::bail!(
            "schema {version} ({} bytes) has no known field layout",
            version.record_size()
        );
    }
    let fields = bs::schema::layout();
    if json {
        println!("{}", serde_json::to_string_pretty(&fields)?);
        return Ok(());
    }
    println!("offset\tsize\tcount\tkind\tname");
    for f in &fields {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            f.offset, f.size, f.count, f.kind, f.name
        );
    }
    println!(
        "total\t{}\t(declared {})",
        bs::schema::computed_record_size(),
        version.record_size()
    );
    Ok(())
}

fn regions(mock: bool, shm_dir: &str) -> Result<()> {
    let found = if mock {
        shm::MockRegion::list()?
    } else {
        shm::FileRegion::list_in(shm_dir)?
    };
    for info in found {
        let tag = info
            .size
            .and_then(|n| SchemaVersion::from_record_size(n as usize).ok())
            .map(|v| format!("\t[{v}]"))
            .unwrap_or_default();
        println!("{info}{tag}");
    }
    Ok(())
}
