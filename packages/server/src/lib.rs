//! Session Gateway for Atelier's real-time exercise collaboration.
//!
//! Learners working on the same exercise share a room. The gateway tracks
//! who is present and relays solution updates and comments to the other
//! members of the room over WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
