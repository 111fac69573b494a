//! # pl-core
//!
//! Logical processes for procline.
//!
//! This crate provides:
//! - The connection contract shared by a session and its processes
//! - The execution contract, cooperative cancellation and failure taxonomy
//! - Signal dispatch from signal kinds to handling behavior
//! - [`Process`](state::Process), which runs one execution on its own thread
//! - The process table that starts and tracks processes
//! - A small builtin command set and the configuration loader
//!
//! ## Modules
//!
//! - [`connection`]: Connection trait, handler guard, in-memory connection
//! - [`execution`]: Execution trait, context, interrupt token, errors
//! - [`signal`]: Signal handler strategy and dispatch table
//! - [`state`]: Process and process management
//! - [`commands`]: Builtin commands and registry
//! - [`config`]: Configuration loading

pub mod commands;
pub mod config;
pub mod connection;
pub mod execution;
pub mod signal;
pub mod state;
