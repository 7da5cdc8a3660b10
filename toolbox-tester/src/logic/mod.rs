pub mod reports;
pub mod simulation;
pub mod tester;

pub use simulation::{Activity, SimulationPlan, SimulationSummary};
pub use tester::*;
