pub mod cancel;
pub mod constants;
pub mod errors;
pub mod ledger;
pub mod policy;
pub mod simulation;
pub mod tx;
pub mod types;
pub mod validation;

pub use cancel::CancelToken;
pub use errors::LedgerError;
pub use ledger::{new_ledger, Ledger};
pub use policy::Policy;
pub use simulation::{run_simulation, RunLimit, SimulationConfig, SimulationReport};
