//! Data Transfer Objects (DTOs) for the gateway.
//!
//! - WebSocket envelopes live in `atelier_shared::protocol` (shared with clients)
//! - `http`: HTTP API response DTOs
//! - `conversion`: domain → DTO conversions

pub mod conversion;
pub mod http;
