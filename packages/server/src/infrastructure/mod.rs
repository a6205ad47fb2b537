//! Infrastructure layer: concrete repository, pusher and DTOs.

pub mod dto;
pub mod message_pusher;
pub mod repository;
