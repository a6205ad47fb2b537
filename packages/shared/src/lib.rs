//! Code shared between the Atelier session gateway and its clients.

pub mod logger;
pub mod protocol;
pub mod time;
