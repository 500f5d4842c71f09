//! # Flock Application Library
//!
//! Library surface of the Flock binary, exposed so integration tests
//! can build the router without spawning a process.

pub mod api;
pub mod cli;
