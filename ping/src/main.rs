mod report;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use flexi_logger::{colored_default_format, Logger, LoggerHandle, WriteMode};
use human_panic::setup_panic;
use icmp_ping_request::configuration::PingConfiguration;
use icmp_ping_request::ping::checksum::ChecksumConvention;
use icmp_ping_request::ping::AddressFamily;
use icmp_ping_request::session;
use log::{debug, Level};
use std::process::ExitCode;
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChecksumArg {
    WordSwap,
    Direct,
}

impl From<ChecksumArg> for ChecksumConvention {
    fn from(arg: ChecksumArg) -> Self {
        match arg {
            ChecksumArg::WordSwap => Self::WordSwap,
            ChecksumArg::Direct => Self::Direct,
        }
    }
}

/// Send ICMP echo requests to a host and report round-trip times.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[clap(flatten)]
    verbose: Verbosity<WarnLevel>,

    /// Host name or literal address to ping
    host: String,

    /// Number of echo requests to send
    #[arg(short, long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..))]
    count: u32,

    /// Time to wait for each reply, in milliseconds
    #[arg(short = 'W', long = "timeout", value_name = "MILLIS", default_value_t = 2000,
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: u64,

    /// TTL (IPv4) or hop limit (IPv6) of outgoing requests
    #[arg(short, long, default_value_t = 64, value_parser = clap::value_parser!(u8).range(1..))]
    ttl: u8,

    /// Pause between requests, in seconds
    #[arg(short, long, value_name = "SECONDS", default_value = "1", value_parser = parse_interval)]
    interval: Duration,

    /// Payload size in bytes
    #[arg(short = 's', long = "size", default_value_t = 192)]
    payload_size: usize,

    /// Use IPv4
    #[arg(short = '4', conflicts_with = "ipv6")]
    ipv4: bool,

    /// Use IPv6
    #[arg(short = '6')]
    ipv6: bool,

    /// Byte order convention of the checksum computation
    #[arg(long, value_enum, default_value_t = ChecksumArg::WordSwap)]
    checksum: ChecksumArg,

    /// Do not print the summary at the end of the run
    #[arg(long = "no-stats")]
    no_statistics: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Read the probe settings from a JSON file instead of the flags above
    #[arg(long, value_name = "JSON FILE")]
    config: Option<std::path::PathBuf>,
}

fn parse_interval(value: &str) -> Result<Duration, String> {
    let secs: f64 = value.parse().map_err(|e| format!("{}", e))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| format!("{} is not a valid number of seconds", value))
}

impl Cli {
    fn configuration(&self) -> anyhow::Result<PingConfiguration> {
        if let Some(path) = &self.config {
            let data = std::fs::read(path)
                .with_context(|| format!("Failed to read configuration file {:?}", path))?;
            return PingConfiguration::from_json(&data)
                .with_context(|| format!("Bad configuration file {:?}", path));
        }
        let conf = PingConfiguration {
            count: self.count,
            timeout: Duration::from_millis(self.timeout_ms),
            ttl: self.ttl,
            interval: self.interval,
            payload_size: self.payload_size,
            family: match (self.ipv4, self.ipv6) {
                (false, true) => AddressFamily::V6,
                _ => AddressFamily::V4,
            },
            checksum: self.checksum.into(),
            statistics: !self.no_statistics,
        };
        conf.validate()?;
        Ok(conf)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    setup_panic!();

    let cli: Cli = Cli::parse();
    let logger_handle = configure_logging(&cli).context("Unable to configure logging")?;

    let result = ping(&cli);
    debug!("Finished ping run. Result: {:?}", result);
    logger_handle.flush();
    result
}

fn ping(cli: &Cli) -> anyhow::Result<ExitCode> {
    let conf = cli.configuration()?;
    let identifier = (std::process::id() & 0xffff) as u16;
    let mut pinger = session::open(&cli.host, &conf, identifier)?;

    report::header(&cli.host, pinger.target(), pinger.payload_size());
    let target = pinger.target();
    let stats = session::run(&mut pinger, conf.count, conf.interval, |result| {
        report::probe(target, result)
    })?;

    if conf.statistics {
        if cli.json {
            println!("{}", serde_json::to_string(&stats.summary())?);
        } else {
            report::summary(&cli.host, &stats);
        }
    }

    if conf.count == 1 && stats.received == 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn configure_logging(cli: &Cli) -> anyhow::Result<LoggerHandle> {
    // log_level() returns None iff verbosity < 0, i.e. being most quiet seems reasonable
    let cli_level = cli.verbose.log_level().unwrap_or(Level::Error);

    Logger::try_with_env_or_str(cli_level.to_string())
        .context("Failed to parse logger spec from env RUST_LOG or cli level")?
        .write_mode(WriteMode::Direct)
        .format_for_stderr(colored_default_format)
        .start()
        .context("Failed to start logger handle")
}
