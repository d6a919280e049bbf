pub mod controllers;
pub mod services;

pub use controllers::run_sweep;
pub use services::{OverdueSweep, SweepOutcome};
