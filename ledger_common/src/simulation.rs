//! The demonstration driver: one worker thread per account, each sending
//! random amounts to random accounts until the run is over.

use crate::cancel::CancelToken;
use crate::constants::*;
use crate::errors::LedgerError;
use crate::ledger::{new_ledger, Ledger};
use crate::policy::Policy;
use crate::types::{AccountIndex, Amount, Balance};
use log::{debug, info, warn};
use rand::Rng;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// **When a simulation stops**
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunLimit {
    /// After this many transfer attempts in total, across all workers
    Transfers(usize),

    /// After this much wall-clock time
    Duration(Duration),
}

/// **Parameters of a single simulation run**
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    pub accounts: usize,
    pub initial_balance: Balance,
    pub policy: Policy,
    /// Upper bound of a random transfer amount; the initial balance if `None`
    pub max_amount: Option<Amount>,
    pub limit: RunLimit,
    /// Upper bound of the random pause after each transfer; no pause if `None`
    pub jitter: Option<Duration>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            accounts: DEFAULT_ACCOUNTS,
            initial_balance: DEFAULT_INITIAL_BALANCE,
            policy: Policy::Condvar,
            max_amount: None,
            limit: RunLimit::Transfers(DEFAULT_TRANSFERS),
            jitter: match DEFAULT_JITTER_MS {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
        }
    }
}

impl SimulationConfig {
    pub fn max_amount(&self) -> Amount {
        self.max_amount.unwrap_or(self.initial_balance)
    }

    /// **Rejects configurations that can't run to completion**
    ///
    /// Under the conditional policy, amounts above the initial balance could
    /// park every worker at once. With amounts bounded by it, some account
    /// always holds at least the average balance and can make progress.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.accounts == 0 {
            return Err(LedgerError::InvalidConfig(
                "at least one account is required".to_string(),
            ));
        }
        if self.initial_balance < 0 {
            return Err(LedgerError::InvalidConfig(format!(
                "initial balance {} is negative",
                self.initial_balance
            )));
        }
        let total = Balance::try_from(self.accounts)
            .ok()
            .and_then(|n| n.checked_mul(self.initial_balance));
        if total.is_none() {
            return Err(LedgerError::InvalidConfig(format!(
                "{} accounts of {} overflow the total balance",
                self.accounts, self.initial_balance
            )));
        }
        if self.max_amount() < 0 {
            return Err(LedgerError::NegativeAmount(self.max_amount()));
        }
        if self.policy == Policy::Condvar && self.max_amount() > self.initial_balance {
            return Err(LedgerError::InvalidConfig(format!(
                "max amount {} exceeds the initial balance {}; every worker could end up waiting",
                self.max_amount(),
                self.initial_balance
            )));
        }
        Ok(())
    }
}

/// **The outcome of a simulation run**
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub policy: Policy,
    pub accounts: usize,
    pub initial_balance: Balance,
    pub expected_total: Balance,
    pub final_total: Balance,
    pub completed: usize,
    pub interrupted: usize,
    pub rejected: usize,
    pub min_balance: Option<Balance>,
    pub elapsed_ms: u64,
    pub balances: Vec<Balance>,
}

impl SimulationReport {
    pub fn invariant_holds(&self) -> bool {
        self.final_total == self.expected_total
    }

    /// Money created (negative) or destroyed (positive) by lost updates
    pub fn discrepancy(&self) -> Balance {
        self.expected_total.saturating_sub(self.final_total)
    }

    /// **Surfaces an invariant violation of a synchronized policy**
    ///
    /// The unsynchronized policy is expected to violate the invariant,
    /// so its report always passes.
    ///
    /// # Errors
    /// - Total balance changed under a synchronized policy, `LedgerError::InvariantViolation`.
    pub fn check(&self) -> Result<(), LedgerError> {
        if self.policy.is_synchronized() && !self.invariant_holds() {
            return Err(LedgerError::InvariantViolation {
                expected: self.expected_total,
                actual: self.final_total,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Counters {
    tickets: AtomicUsize,
    completed: AtomicUsize,
    interrupted: AtomicUsize,
    rejected: AtomicUsize,
}

/// **Builds a ledger for `config` and runs the simulation on it**
pub fn run_simulation(config: &SimulationConfig) -> Result<SimulationReport, LedgerError> {
    config.validate()?;
    let ledger = new_ledger(config.policy, config.accounts, config.initial_balance);
    Ok(run_on(ledger.as_ref(), config))
}

/// **Runs the simulation on an existing ledger**
///
/// Spawns one worker per account of `ledger` and returns once all of them
/// have stopped. Workers parked on insufficient funds when the run ends are
/// interrupted, so this never hangs on a valid configuration.
///
/// # Panics
/// Panics if `config` has a negative max amount; [`run_simulation`] validates it first.
pub fn run_on(ledger: &dyn Ledger, config: &SimulationConfig) -> SimulationReport {
    info!(
        "Running {} workers under the \"{}\" policy, initial balance {}, limit {:?}",
        ledger.len(),
        ledger.policy(),
        config.initial_balance,
        config.limit
    );

    let stop = CancelToken::new();
    let counters = Counters::default();
    let start = Instant::now();

    thread::scope(|s| {
        for from in 0..ledger.len() {
            let (stop, counters) = (&stop, &counters);
            s.spawn(move || worker(ledger, config, from, stop, counters));
        }

        if let RunLimit::Duration(duration) = config.limit {
            thread::sleep(duration);
            debug!("Run time of {duration:?} elapsed; stopping workers");
            ledger.interrupt(&stop);
        }
    });

    let balances = ledger.balances();
    let report = SimulationReport {
        policy: ledger.policy(),
        accounts: ledger.len(),
        initial_balance: config.initial_balance,
        expected_total: ledger.expected_total(),
        final_total: ledger.total(),
        completed: counters.completed.load(Ordering::SeqCst),
        interrupted: counters.interrupted.load(Ordering::SeqCst),
        rejected: counters.rejected.load(Ordering::SeqCst),
        min_balance: balances.iter().copied().min(),
        elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        balances,
    };

    info!(
        "Finished: {} completed, {} interrupted, {} rejected; total {} (expected {})",
        report.completed,
        report.interrupted,
        report.rejected,
        report.final_total,
        report.expected_total
    );

    report
}

/// Claims a transfer ticket. Once they run out, stops every other worker.
fn claim_ticket(
    ledger: &dyn Ledger,
    config: &SimulationConfig,
    stop: &CancelToken,
    counters: &Counters,
) -> bool {
    match config.limit {
        RunLimit::Transfers(limit) => {
            if counters.tickets.fetch_add(1, Ordering::SeqCst) < limit {
                true
            } else {
                ledger.interrupt(stop);
                false
            }
        }
        RunLimit::Duration(_) => true,
    }
}

fn worker(
    ledger: &dyn Ledger,
    config: &SimulationConfig,
    from: AccountIndex,
    stop: &CancelToken,
    counters: &Counters,
) {
    let mut rng = rand::thread_rng();
    let accounts = ledger.len();
    let max_amount = config.max_amount();

    while !stop.is_cancelled() && claim_ticket(ledger, config, stop, counters) {
        let to = rng.gen_range(0..accounts);
        let amount = rng.gen_range(0..=max_amount);

        match ledger.transfer(from, to, amount, stop) {
            Ok(receipt) => {
                counters.completed.fetch_add(1, Ordering::SeqCst);
                info!("{receipt}");
            }
            Err(LedgerError::InterruptedWhileWaiting) => {
                counters.interrupted.fetch_add(1, Ordering::SeqCst);
                debug!("Worker {from} interrupted while waiting to send {amount}");
                break;
            }
            Err(err) => {
                counters.rejected.fetch_add(1, Ordering::SeqCst);
                warn!("Worker {from} failed to send {amount} to {to}: {err}");
            }
        }

        if let Some(jitter) = config.jitter {
            let max_ms = u64::try_from(jitter.as_millis()).unwrap_or(u64::MAX);
            thread::sleep(Duration::from_millis(rng.gen_range(0..=max_ms)));
        }
    }
}
