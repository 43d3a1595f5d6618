//! End-to-end integration tests
//!
//! These tests validate the complete batch pipeline using predefined CSV
//! fixtures. Each test:
//! 1. Seeds accounts from accounts.csv in a fixture directory
//! 2. Runs every request in transfers.csv through the coordinator
//! 3. Generates output CSV
//! 4. Compares actual output with expected.csv
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - Happy path transfers
//! - Idempotent replays of the same request id
//! - Invalid requests (same account, non-positive amounts)
//! - Insufficient funds and the zero-balance boundary
//! - Unknown accounts and malformed rows
//! - Decimal precision
//!
//! Every fixture's outcome is independent of the order in which its
//! transfers run, so each test is run with both strategies.

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_transfer_coordinator::cli::StrategyType;
    use rust_transfer_coordinator::strategy::{create_strategy, BatchConfig};
    use rust_transfer_coordinator::RetryPolicy;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    /// Run a fixture and compare its output with expected.csv
    ///
    /// # Panics
    ///
    /// Panics if a fixture file is missing or the output does not match.
    fn run_test_fixture(fixture_name: &str, strategy_type: StrategyType, batch_size: usize) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let accounts_path = format!("{}/accounts.csv", fixture_dir);
        let transfers_path = format!("{}/transfers.csv", fixture_dir);
        let expected_path = format!("{}/expected.csv", fixture_dir);

        for path in [&accounts_path, &transfers_path, &expected_path] {
            assert!(Path::new(path).exists(), "Fixture file not found: {}", path);
        }

        let strategy = create_strategy(
            strategy_type,
            Some(BatchConfig::new(batch_size, 4)),
            RetryPolicy::new(200, Duration::from_millis(5)),
        );

        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");

        strategy
            .process(
                Path::new(&accounts_path),
                Path::new(&transfers_path),
                &mut temp_output,
            )
            .unwrap_or_else(|e| panic!("Failed to process transfers: {}", e));

        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));

        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (strategy: {:?}, batch size: {})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, strategy_type, batch_size, actual_output, expected_output
        );
    }

    /// End-to-end test for all fixtures with both strategies
    #[rstest]
    #[case("happy_path")]
    #[case("idempotent_replay")]
    #[case("invalid_requests")]
    #[case("insufficient_funds")]
    #[case("zero_balance_boundary")]
    #[case("missing_accounts")]
    #[case("malformed_data")]
    #[case("precision")]
    fn test_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sequential, StrategyType::Concurrent)] strategy: StrategyType,
        #[values(1, 1000)] batch_size: usize,
    ) {
        run_test_fixture(fixture, strategy, batch_size);
    }

    #[test]
    fn test_missing_accounts_file_is_fatal() {
        let strategy = create_strategy(StrategyType::Sequential, None, RetryPolicy::default());
        let mut output = Vec::new();

        let result = strategy.process(
            Path::new("tests/fixtures/does_not_exist/accounts.csv"),
            Path::new("tests/fixtures/happy_path/transfers.csv"),
            &mut output,
        );

        assert!(result.unwrap_err().contains("Failed to open file"));
        assert!(output.is_empty());
    }
}
