pub mod run;
pub mod status;

// Re-export command functions for convenience
pub use run::run;
pub use status::{overview, status};
