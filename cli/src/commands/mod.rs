//! Command implementations for the limits CLI
//!
//! Each command lives in its own file and returns its rendered output.

pub mod check;
pub mod limits;
pub mod payments;
pub mod workspaces;

// Re-export command execution functions for easy access
pub use check::execute as execute_check;
pub use limits::execute as execute_limits;
pub use payments::execute as execute_payments;
pub use workspaces::execute as execute_workspaces;
