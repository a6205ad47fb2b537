//! UseCase layer: one use case per gateway operation.

pub mod close_connection;
pub mod error;
pub mod evict_stale_members;
pub mod get_room_detail;
pub mod get_rooms;
pub mod join_room;
pub mod keepalive;
pub mod leave_room;
pub mod open_connection;
pub mod presence;
pub mod relay_message;
pub mod sequencer;

#[cfg(test)]
mod test_support;

pub use close_connection::CloseConnectionUseCase;
pub use error::{GetRoomDetailError, JoinError, LeaveError, RelayError};
pub use evict_stale_members::EvictStaleMembersUseCase;
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use join_room::{JoinOutcome, JoinRequest, JoinRoomUseCase};
pub use keepalive::KeepaliveUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use open_connection::OpenConnectionUseCase;
pub use presence::Departure;
pub use relay_message::{RelayMessageUseCase, RelayPayload};
pub use sequencer::RelaySequencer;
