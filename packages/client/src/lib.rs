//! Client session manager for Atelier.
//!
//! [`session::CollabSession`] keeps one learner connected to the room of
//! the exercise they are working on, with automatic reconnection and
//! keepalive. [`runner::run_client`] wraps it in an interactive CLI.

pub mod activity;
pub mod config;
pub mod error;
pub mod formatter;
pub mod reconnect;
pub mod runner;
pub mod session;
pub mod transport;
pub mod ui;
