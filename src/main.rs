//! Transfer Coordinator CLI
//!
//! Seeds in-memory accounts from one CSV file, applies the transfer requests
//! from a second CSV file, and prints the final balances.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- accounts.csv transfers.csv > balances.csv
//! cargo run -- --strategy sequential accounts.csv transfers.csv > balances.csv
//! cargo run -- --batch-size 500 --max-concurrent 8 accounts.csv transfers.csv > balances.csv
//! cargo run -- --lock-attempts 10 --lock-retry-delay-ms 20 --log-level info accounts.csv transfers.csv
//! ```
//!
//! # Processing Strategies
//!
//! - **sequential**: one transfer at a time, in file order
//! - **concurrent**: batches of transfers in flight on a multi-thread runtime (default)
//!
//! # Exit Codes
//!
//! - 0: Success (individual transfer failures are logged, not fatal)
//! - 1: Error (missing arguments, file not found, output failure, etc.)

use rust_transfer_coordinator::cli;
use rust_transfer_coordinator::logging;
use rust_transfer_coordinator::strategy;
use std::process;
use tracing::error;

fn main() {
    let args = cli::parse_args();

    logging::init_logging(&args.log_level);

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Concurrent) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config, args.to_retry_policy())
    };

    // Output goes to stdout, logs to stderr
    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.accounts_file, &args.transfers_file, &mut output) {
        error!(error = %e, "Transfer run failed");
        process::exit(1);
    }
}
