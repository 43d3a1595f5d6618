use crate::core::RetryPolicy;
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Apply funds transfers exactly once per request id
#[derive(Parser, Debug)]
#[command(name = "transfer-coordinator")]
#[command(about = "Apply funds transfers exactly once per request id", long_about = None)]
pub struct CliArgs {
    /// Account seed CSV file path
    #[arg(value_name = "ACCOUNTS", help = "Path to the account,balance CSV file")]
    pub accounts_file: PathBuf,

    /// Transfer request CSV file path
    #[arg(
        value_name = "TRANSFERS",
        help = "Path to the from,to,amount,request_id CSV file"
    )]
    pub transfers_file: PathBuf,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "concurrent",
        help = "Processing strategy: 'sequential' for file order or 'concurrent' for batched tasks"
    )]
    pub strategy: StrategyType,

    /// Number of transfer rows per batch (concurrent mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of transfer rows per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of transfers in flight (concurrent mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of transfers in flight (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,

    /// Lock acquisition attempts per transfer
    #[arg(
        long = "lock-attempts",
        value_name = "COUNT",
        help = "Lock acquisition attempts before a transfer times out (default: 5)"
    )]
    pub lock_attempts: Option<u32>,

    /// Delay between lock acquisition attempts
    #[arg(
        long = "lock-retry-delay-ms",
        value_name = "MILLIS",
        help = "Delay between lock acquisition attempts in milliseconds (default: 100)"
    )]
    pub lock_retry_delay_ms: Option<u64>,

    /// Log filter used when RUST_LOG is not set
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "warn",
        help = "Log level or filter directive; RUST_LOG takes precedence"
    )]
    pub log_level: String,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sequential,
    Concurrent,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values use the defaults; zero values are replaced by the
    /// defaults with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent.unwrap_or(default.max_concurrent),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Create a RetryPolicy from CLI arguments
    pub fn to_retry_policy(&self) -> RetryPolicy {
        if self.lock_attempts.is_some() || self.lock_retry_delay_ms.is_some() {
            let default = RetryPolicy::default();
            RetryPolicy::new(
                self.lock_attempts.unwrap_or(default.max_attempts),
                self.lock_retry_delay_ms
                    .map(Duration::from_millis)
                    .unwrap_or(default.retry_delay),
            )
        } else {
            RetryPolicy::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // Strategy parsing tests
    #[rstest]
    #[case::default_strategy(&["program", "a.csv", "t.csv"], StrategyType::Concurrent)]
    #[case::explicit_sequential(
        &["program", "--strategy", "sequential", "a.csv", "t.csv"],
        StrategyType::Sequential
    )]
    #[case::explicit_concurrent(
        &["program", "--strategy", "concurrent", "a.csv", "t.csv"],
        StrategyType::Concurrent
    )]
    fn test_strategy_parsing(#[case] args: &[&str], #[case] expected: StrategyType) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.strategy, expected);
    }

    #[test]
    fn test_positional_paths() {
        let parsed = CliArgs::try_parse_from(["program", "accounts.csv", "transfers.csv"]).unwrap();
        assert_eq!(parsed.accounts_file, PathBuf::from("accounts.csv"));
        assert_eq!(parsed.transfers_file, PathBuf::from("transfers.csv"));
        assert_eq!(parsed.log_level, "warn");
    }

    // BatchConfig conversion tests
    #[rstest]
    #[case::all_defaults(&["program", "a.csv", "t.csv"], 1000, num_cpus::get())]
    #[case::custom_batch_size(
        &["program", "--batch-size", "2000", "a.csv", "t.csv"],
        2000,
        num_cpus::get()
    )]
    #[case::custom_max_concurrent(&["program", "--max-concurrent", "8", "a.csv", "t.csv"], 1000, 8)]
    #[case::zero_batch_size_falls_back(&["program", "--batch-size", "0", "a.csv", "t.csv"], 1000, num_cpus::get())]
    #[case::zero_max_concurrent_falls_back(
        &["program", "--max-concurrent", "0", "a.csv", "t.csv"],
        1000,
        num_cpus::get()
    )]
    fn test_batch_config_conversion(
        #[case] args: &[&str],
        #[case] expected_batch_size: usize,
        #[case] expected_max_concurrent: usize,
    ) {
        let config = CliArgs::try_parse_from(args).unwrap().to_batch_config();

        assert_eq!(config.batch_size, expected_batch_size);
        assert_eq!(config.max_concurrent, expected_max_concurrent);
    }

    // RetryPolicy conversion tests
    #[rstest]
    #[case::all_defaults(&["program", "a.csv", "t.csv"], 5, 100)]
    #[case::custom_attempts(&["program", "--lock-attempts", "9", "a.csv", "t.csv"], 9, 100)]
    #[case::custom_delay(&["program", "--lock-retry-delay-ms", "25", "a.csv", "t.csv"], 5, 25)]
    #[case::zero_attempts_falls_back(&["program", "--lock-attempts", "0", "a.csv", "t.csv"], 5, 100)]
    #[case::zero_delay_kept(&["program", "--lock-retry-delay-ms", "0", "a.csv", "t.csv"], 5, 0)]
    fn test_retry_policy_conversion(
        #[case] args: &[&str],
        #[case] expected_attempts: u32,
        #[case] expected_delay_ms: u64,
    ) {
        let policy = CliArgs::try_parse_from(args).unwrap().to_retry_policy();

        assert_eq!(policy.max_attempts, expected_attempts);
        assert_eq!(policy.retry_delay, Duration::from_millis(expected_delay_ms));
    }

    // Error handling tests
    #[rstest]
    #[case::missing_both(&["program"])]
    #[case::missing_transfers(&["program", "a.csv"])]
    #[case::invalid_strategy(&["program", "--strategy", "async", "a.csv", "t.csv"])]
    #[case::negative_attempts(&["program", "--lock-attempts", "-1", "a.csv", "t.csv"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
