//! Domain layer: rooms, members, and the seams the gateway depends on.

pub mod entity;
pub mod error;
pub mod event;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{Member, Room, RosterMember};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use event::GatewayEvent;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{Membership, RoomRepository};
pub use value_object::{
    ConnectionId, ConnectionIdFactory, ExerciseId, Timestamp, UserId, Username,
};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
