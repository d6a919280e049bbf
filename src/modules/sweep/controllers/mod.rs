pub mod sweep_controller;

pub use sweep_controller::run_sweep;
