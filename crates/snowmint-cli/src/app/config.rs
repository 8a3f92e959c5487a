use anyhow::bail;
use clap::{Args, Parser, Subcommand, ValueEnum};
use snowmint::{ClockPolicy, SnowflakeId};
use std::time::Duration;

/// Command-line interface of the `snowmint` binary.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "snowmint",
    version,
    about = "Mint and inspect 64-bit Snowflake IDs"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate IDs from a single worker.
    Generate(GenerateArgs),
    /// Decode IDs into timestamp, worker ID and sequence.
    Inspect(InspectArgs),
}

/// Settings for `snowmint generate`.
///
/// All values are parsed from CLI arguments or environment variables. The
/// defaults mirror a small load run: 100k IDs from worker 1 with a short
/// pause between IDs, reporting the rate every second.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Worker ID encoded into every generated ID, in `0..=1023`.
    ///
    /// Environment variable: `WORKER_ID`
    #[arg(long, env = "WORKER_ID", default_value_t = 1, allow_negative_numbers = true)]
    pub worker_id: i64,

    /// Total number of IDs to generate, split across all threads.
    ///
    /// Environment variable: `ID_COUNT`
    #[arg(long, env = "ID_COUNT", default_value_t = 100_000)]
    pub count: u64,

    /// Number of OS threads sharing the one generator.
    ///
    /// Environment variable: `NUM_THREADS`
    #[arg(long, env = "NUM_THREADS", default_value_t = 1)]
    pub threads: usize,

    /// Time source the generator reads.
    ///
    /// Environment variable: `CLOCK`
    #[arg(long, env = "CLOCK", value_enum, default_value_t = ClockArg::Wall)]
    pub clock: ClockArg,

    /// Reaction to the clock moving backwards.
    ///
    /// Environment variable: `CLOCK_POLICY`
    #[arg(long, env = "CLOCK_POLICY", value_enum, default_value_t = ClockPolicyArg::Wait)]
    pub clock_policy: ClockPolicyArg,

    /// Do not print the generation rate. By default one line is printed per
    /// report interval, plus a last one for the partial interval at exit.
    ///
    /// Environment variable: `NO_REPORT`
    #[arg(long, env = "NO_REPORT", default_value_t = false)]
    pub no_report: bool,

    /// Report interval in milliseconds.
    ///
    /// Environment variable: `REPORT_INTERVAL_MS`
    #[arg(long, env = "REPORT_INTERVAL_MS", default_value_t = 1000)]
    pub report_interval_ms: u64,

    /// Pause between two IDs on the same thread, in microseconds. `0`
    /// generates as fast as possible.
    ///
    /// Environment variable: `PAUSE_MICROS`
    #[arg(long, env = "PAUSE_MICROS", default_value_t = 10)]
    pub pause_micros: u64,

    /// Print every generated ID to stdout.
    #[arg(long, default_value_t = false)]
    pub print: bool,

    /// Keep running after generation finishes until Ctrl+C or SIGTERM.
    #[arg(long, default_value_t = false)]
    pub hold: bool,
}

/// Arguments for `snowmint inspect`.
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Decimal IDs to decode.
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockArg {
    /// System wall clock, read on every call.
    Wall,
    /// Clock anchored to the wall clock once, then advanced monotonically.
    Monotonic,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockPolicyArg {
    /// Never reuse an earlier timestamp; wait for the clock to catch up.
    Wait,
    /// Reset the sequence and accept the earlier timestamp.
    Reset,
}

impl From<ClockPolicyArg> for ClockPolicy {
    fn from(value: ClockPolicyArg) -> Self {
        match value {
            ClockPolicyArg::Wait => Self::Wait,
            ClockPolicyArg::Reset => Self::Reset,
        }
    }
}

/// Validated settings for a `generate` run.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub worker_id: i64,
    pub count: u64,
    pub threads: usize,
    pub clock: ClockArg,
    pub clock_policy: ClockPolicy,
    pub report_interval: Option<Duration>,
    pub pause: Duration,
    pub print: bool,
    pub hold: bool,
}

impl TryFrom<GenerateArgs> for GenerateConfig {
    type Error = anyhow::Error;

    fn try_from(args: GenerateArgs) -> Result<Self, Self::Error> {
        let max_worker_id = SnowflakeId::MAX_WORKER_ID;

        if u64::try_from(args.worker_id).map_or(true, |id| id > max_worker_id) {
            bail!(
                "WORKER_ID ({}) is outside the worker ID space (0..={})",
                args.worker_id,
                max_worker_id
            );
        }

        if args.threads == 0 {
            bail!("NUM_THREADS must be greater than 0");
        }

        let report_interval = if !args.no_report {
            if args.report_interval_ms == 0 {
                bail!("REPORT_INTERVAL_MS must be greater than 0");
            }
            Some(Duration::from_millis(args.report_interval_ms))
        } else {
            None
        };

        Ok(Self {
            worker_id: args.worker_id,
            count: args.count,
            threads: args.threads,
            clock: args.clock,
            clock_policy: args.clock_policy.into(),
            report_interval,
            pause: Duration::from_micros(args.pause_micros),
            print: args.print,
            hold: args.hold,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn generate_args(extra: &[&str]) -> GenerateArgs {
        let argv = ["snowmint", "generate"].into_iter().chain(extra.iter().copied());
        match CliArgs::try_parse_from(argv).unwrap().command {
            Command::Generate(args) => args,
            Command::Inspect(_) => panic!("expected generate"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn explicit_flags_are_applied() {
        let args = generate_args(&[
            "--worker-id",
            "1023",
            "--count",
            "5",
            "--threads",
            "4",
            "--clock",
            "monotonic",
            "--clock-policy",
            "reset",
            "--report-interval-ms",
            "250",
            "--pause-micros",
            "0",
            "--print",
        ]);
        let config = GenerateConfig::try_from(args).unwrap();

        assert_eq!(config.worker_id, 1023);
        assert_eq!(config.count, 5);
        assert_eq!(config.threads, 4);
        assert_eq!(config.clock, ClockArg::Monotonic);
        assert_eq!(config.clock_policy, ClockPolicy::Reset);
        assert_eq!(config.report_interval, Some(Duration::from_millis(250)));
        assert_eq!(config.pause, Duration::ZERO);
        assert!(config.print);
        assert!(!config.hold);
    }

    #[test]
    fn reporting_is_on_by_default() {
        let args = generate_args(&["--worker-id", "3"]);
        let config = GenerateConfig::try_from(args).unwrap();
        assert_eq!(config.report_interval, Some(Duration::from_secs(1)));
    }

    #[test]
    fn no_report_disables_reporting() {
        let args = generate_args(&["--worker-id", "3", "--no-report", "--report-interval-ms", "0"]);
        let config = GenerateConfig::try_from(args).unwrap();
        assert_eq!(config.report_interval, None);
    }

    #[test]
    fn rejects_out_of_range_worker_ids() {
        for worker_id in ["-1", "1024"] {
            let args = generate_args(&["--worker-id", worker_id]);
            let err = GenerateConfig::try_from(args).unwrap_err();
            assert!(err.to_string().contains("WORKER_ID"), "{err}");
        }
    }

    #[test]
    fn rejects_zero_threads() {
        let args = generate_args(&["--worker-id", "1", "--threads", "0"]);
        let err = GenerateConfig::try_from(args).unwrap_err();
        assert!(err.to_string().contains("NUM_THREADS"), "{err}");
    }

    #[test]
    fn rejects_zero_report_interval() {
        let args = generate_args(&["--worker-id", "1", "--report-interval-ms", "0"]);
        assert!(GenerateConfig::try_from(args).is_err());
    }

    #[test]
    fn inspect_requires_an_id() {
        assert!(CliArgs::try_parse_from(["snowmint", "inspect"]).is_err());

        let cli = CliArgs::try_parse_from(["snowmint", "inspect", "1", "2"]).unwrap();
        match cli.command {
            Command::Inspect(args) => assert_eq!(args.ids, ["1", "2"]),
            Command::Generate(_) => panic!("expected inspect"),
        }
    }
}
