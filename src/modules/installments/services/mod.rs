pub mod overdue_tracker;

pub use overdue_tracker::{OverdueSummary, OverdueTracker};
