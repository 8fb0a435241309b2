//! Command dispatch: argument parsing, operation execution, report rendering

use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::debug;

use crate::cli::args::Cli;
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::domain::{Outcome, SyncResult};
use crate::infrastructure::di::ServiceContainer;

/// Usage summary printed for unrecognized invocations.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

/// Parse command line arguments.
///
/// Any parse failure other than `--help`/`--version` is a usage error
/// carrying the full usage text.
pub fn parse_args<I, T>(args: I) -> CliResult<Cli>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => CliError::Display(e.to_string()),
        _ => {
            debug!("parse_args: {}", e);
            CliError::Usage(usage())
        }
    })
}

/// Run the operation selected on the command line.
pub fn execute_command(cli: &Cli, container: &ServiceContainer) -> SyncResult {
    let operation = cli.operation();
    debug!("execute_command: {}", operation);
    container.sync_service().run(operation)
}

/// Render a result as a human-readable report on stdout.
pub fn print_report(result: &SyncResult) {
    output::header(&format!("catalog {}", result.operation));
    for line in &result.details {
        output::detail(line);
    }
    match result.outcome {
        Outcome::Success => output::success(&result.message),
        Outcome::NoOp => output::unchanged(&result.message),
        Outcome::Warning => output::warning(&result.message),
        Outcome::Failure => output::failure(&result.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Operation;
    use rstest::rstest;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["catalog-sync"], Operation::Status)]
    #[case(&["catalog-sync", "--status"], Operation::Status)]
    #[case(&["catalog-sync", "--init"], Operation::Init)]
    #[case(&["catalog-sync", "--push"], Operation::Push)]
    #[case(&["catalog-sync", "--git"], Operation::Push)]
    #[case(&["catalog-sync", "--pull"], Operation::Pull)]
    #[case(&["catalog-sync", "--full"], Operation::Full)]
    #[case(&["catalog-sync", "-vv", "--full"], Operation::Full)]
    fn given_flag_when_parsing_then_selects_operation(
        #[case] args: &[&str],
        #[case] expected: Operation,
    ) {
        let cli = parse_args(args).unwrap();
        assert_eq!(cli.operation(), expected);
    }

    #[rstest]
    #[case(&["catalog-sync", "--bogus"])]
    #[case(&["catalog-sync", "--PUSH"])]
    #[case(&["catalog-sync", "push"])]
    #[case(&["catalog-sync", "--push", "--pull"])]
    fn given_unrecognized_input_when_parsing_then_usage_error(#[case] args: &[&str]) {
        let err = parse_args(args).unwrap_err();

        assert_eq!(err.exit_code(), crate::exitcode::USAGE);
        match err {
            CliError::Usage(text) => {
                for flag in ["--status", "--init", "--push", "--pull", "--full", "DENG_CATALOG_DIR"] {
                    assert!(text.contains(flag), "usage lacks {flag}: {text}");
                }
            }
            other => panic!("expected usage error, got {other:?}"),
        }
    }

    #[test]
    fn given_help_flag_when_parsing_then_display_with_zero_exit() {
        let err = parse_args(["catalog-sync", "--help"]).unwrap_err();
        assert!(matches!(err, CliError::Display(_)));
        assert_eq!(err.exit_code(), crate::exitcode::OK);
    }
}
