pub mod cli;
pub mod headers;
pub mod state;
pub mod walk;
