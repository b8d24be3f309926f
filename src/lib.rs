//! Roster is an employee directory HTTP API wrapped in a diagnostic
//! request pipeline.
//!
//! Every request is tagged with a correlation id, logged on the way in and
//! out (with sensitive JSON fields masked), and any failure escaping the
//! application is translated into a uniform JSON error payload.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, validate, health).
//! - [`config`] -- Config file discovery, parsing and validation.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`middleware`] -- The diagnostic pipeline: correlation, request/response
//!   logging, response capture, and exception translation.
//! - [`api`] -- Route matching and the employee/manager controllers.
//! - [`directory`] -- Domain models, in-memory repositories and services.
//! - [`health`] -- `GET /health` payload and request statistics.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`server`] -- Axum server setup, shared state, and graceful shutdown.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file format backends |
//! | `full` | All features |

// Binary crate: public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod directory;
pub mod error;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod server;
