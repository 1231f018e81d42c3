//! Motorctl — operator console for the lab motor rig.
//!
//! This library exposes the console's components (route table, session
//! store, navigation guard, confirmation bridge, backend client and journal)
//! for integration testing and programmatic use. The binary entrypoint is in
//! `main.rs`.

pub mod audit;
pub mod cli;
pub mod client;
pub mod confirm;
pub mod guard;
pub mod routes;
pub mod session;
pub mod utils;
