//! Wrapper around the external `HarpRegulator` executable.
//!
//! Builds argument vectors, runs one process per call and maps exit codes and
//! output into typed results.

pub mod client;
pub mod commands;
pub mod response;
pub mod runner;

pub use client::RegulatorClient;
pub use commands::{ListOptions, UploadOptions};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};
