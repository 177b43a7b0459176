pub mod rate_governor;
pub mod concurrency_gate;

pub use concurrency_gate::{ConcurrencyGate, GatePermit};
pub use rate_governor::RateGovernor;
