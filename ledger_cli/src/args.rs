//! Command-line parameters of the demonstration harness

use clap::Parser;
use ledger_common::constants::*;
use ledger_common::{Policy, RunLimit, SimulationConfig};
use std::time::Duration;

/// **Runs concurrent random transfers over a ledger and checks its total balance**
#[derive(Parser, Debug)]
#[command(name = "ledger_cli", version)]
pub struct Args {
    /// Number of accounts, and of worker threads
    #[arg(short = 'n', long, env = "LEDGER_ACCOUNTS", default_value_t = DEFAULT_ACCOUNTS)]
    pub accounts: usize,

    /// Initial balance of every account
    #[arg(short = 'b', long, env = "LEDGER_INITIAL_BALANCE", default_value_t = DEFAULT_INITIAL_BALANCE)]
    pub initial_balance: i64,

    /// Concurrency policy: none, mutex or condvar
    #[arg(short, long, env = "LEDGER_POLICY", default_value = "condvar")]
    pub policy: Policy,

    /// Total number of transfers across all workers
    #[arg(short, long, env = "LEDGER_TRANSFERS", default_value_t = DEFAULT_TRANSFERS)]
    pub transfers: usize,

    /// Run for this many milliseconds instead of a fixed number of transfers
    #[arg(short, long, env = "LEDGER_DURATION_MS")]
    pub duration_ms: Option<u64>,

    /// Largest random transfer amount [default: the initial balance]
    #[arg(long, env = "LEDGER_MAX_AMOUNT")]
    pub max_amount: Option<i64>,

    /// Largest random pause after each transfer, in milliseconds
    #[arg(long, env = "LEDGER_JITTER_MS", default_value_t = DEFAULT_JITTER_MS)]
    pub jitter_ms: u64,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Args {
    pub fn to_config(&self) -> SimulationConfig {
        SimulationConfig {
            accounts: self.accounts,
            initial_balance: self.initial_balance,
            policy: self.policy,
            max_amount: self.max_amount,
            limit: match self.duration_ms {
                Some(ms) => RunLimit::Duration(Duration::from_millis(ms)),
                None => RunLimit::Transfers(self.transfers),
            },
            jitter: match self.jitter_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_library_defaults() {
        let args = Args::try_parse_from(["ledger_cli"]).unwrap();
        assert_eq!(SimulationConfig::default(), args.to_config());
        assert!(!args.json);
    }

    #[test]
    fn parses_policy_and_limits() {
        let args = Args::try_parse_from([
            "ledger_cli", "-n", "2", "-b", "10", "-p", "mutex", "-t", "50", "--jitter-ms", "3",
        ])
        .unwrap();
        let config = args.to_config();

        assert_eq!(2, config.accounts);
        assert_eq!(10, config.initial_balance);
        assert_eq!(Policy::Mutex, config.policy);
        assert_eq!(RunLimit::Transfers(50), config.limit);
        assert_eq!(Some(Duration::from_millis(3)), config.jitter);
    }

    #[test]
    fn duration_overrides_transfers() {
        let args = Args::try_parse_from(["ledger_cli", "-t", "50", "-d", "200"]).unwrap();
        assert_eq!(
            RunLimit::Duration(Duration::from_millis(200)),
            args.to_config().limit
        );
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(Args::try_parse_from(["ledger_cli", "--policy", "spin"]).is_err());
    }
}
