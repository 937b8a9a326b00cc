use crate::args::Args;
use crate::constants::*;
use anyhow::Context;
use ledger_common::constants::LOG_TARGET;
use ledger_common::{run_simulation, SimulationReport};
use log::{error, info, warn};
use std::env;

/// **Initialises logging**
///
/// Logs this workspace's crates at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    if env::var_os(RUST_LOG).is_none() {
        env::set_var(RUST_LOG, format!("{LOG_TARGET}=info"));
    }
    pretty_env_logger::init();
}

/// **Runs one simulation as configured by `args`**
///
/// Returns the process exit status.
///
/// # Errors
/// - The report can't be serialized or written to `stdout`.
pub fn run(args: &Args) -> anyhow::Result<u8> {
    let config = args.to_config();

    let report = match run_simulation(&config) {
        Ok(report) => report,
        Err(err) => {
            error!("{err}");
            return Ok(EXIT_INVALID_CONFIG);
        }
    };

    print_report(&report, args.json)?;

    Ok(exit_code(&report))
}

/// **Prints the final report to `stdout`**
fn print_report(report: &SimulationReport, json: bool) -> anyhow::Result<()> {
    if json {
        let out = serde_json::to_string_pretty(report).context("Failed to serialize the report")?;
        println!("{out}");
    } else {
        println!(
            "Policy: {}, accounts: {}, transfers completed: {}, interrupted: {}, rejected: {}",
            report.policy, report.accounts, report.completed, report.interrupted, report.rejected
        );
        println!(
            "Total balance: {} (expected {}), lowest balance: {}, elapsed: {} ms",
            report.final_total,
            report.expected_total,
            report
                .min_balance
                .map_or_else(|| "-".to_string(), |b| b.to_string()),
            report.elapsed_ms
        );
    }
    Ok(())
}

/// **Maps a report to the process exit status**
///
/// A changed total is a failure for the synchronized policies only.
/// For the unsynchronized policy it is the property being demonstrated.
pub fn exit_code(report: &SimulationReport) -> u8 {
    match report.check() {
        Ok(()) if report.invariant_holds() => {
            info!("Invariant holds: total balance is {}", report.final_total);
            EXIT_OK
        }
        Ok(()) => {
            warn!(
                "Lost updates demonstrated: total balance is {}, expected {} ({} lost)",
                report.final_total,
                report.expected_total,
                report.discrepancy()
            );
            EXIT_OK
        }
        Err(err) => {
            error!("Invariant violated: {err}");
            EXIT_INVARIANT_VIOLATED
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use ledger_common::Policy;

    fn report(policy: Policy, final_total: i64) -> SimulationReport {
        SimulationReport {
            policy,
            accounts: 2,
            initial_balance: 10,
            expected_total: 20,
            final_total,
            completed: 3,
            interrupted: 0,
            rejected: 0,
            min_balance: Some(0),
            elapsed_ms: 1,
            balances: vec![0, final_total],
        }
    }

    #[test]
    fn synchronized_policy_with_intact_total_succeeds() {
        assert_eq!(EXIT_OK, exit_code(&report(Policy::Mutex, 20)));
        assert_eq!(EXIT_OK, exit_code(&report(Policy::Condvar, 20)));
    }

    #[test]
    fn synchronized_policy_with_changed_total_fails() {
        assert_eq!(
            EXIT_INVARIANT_VIOLATED,
            exit_code(&report(Policy::Mutex, 19))
        );
    }

    #[test]
    fn unsynchronized_policy_always_succeeds() {
        assert_eq!(EXIT_OK, exit_code(&report(Policy::None, 20)));
        assert_eq!(EXIT_OK, exit_code(&report(Policy::None, 13)));
    }

    #[test]
    fn invalid_config_exits_with_config_status() {
        let args = Args::try_parse_from(["ledger_cli", "-n", "0"]).unwrap();
        assert_eq!(EXIT_INVALID_CONFIG, run(&args).unwrap());
    }

    #[test]
    fn small_mutex_run_exits_ok() {
        let args =
            Args::try_parse_from(["ledger_cli", "-n", "4", "-p", "mutex", "-t", "100", "--json"])
                .unwrap();
        assert_eq!(EXIT_OK, run(&args).unwrap());
    }
}
