//! Conversion logic between domain types and wire / HTTP DTOs.

use atelier_shared::{
    protocol::{
        Identity, PresenceChange, RelayedComment, RelayedSolution, RoomSnapshot, RosterEntry,
        ServerEnvelope,
    },
    time::timestamp_to_rfc3339,
};

use crate::{
    domain::{
        ExerciseId, GatewayEvent, Member, Room, RosterMember, UserId, Username, ValueObjectError,
    },
    usecase::JoinRequest,
};

use super::http::{MemberDetailDto, RoomDetailDto, RoomSummaryDto};

// ========================================
// Domain → WebSocket DTO
// ========================================

impl From<RosterMember> for RosterEntry {
    fn from(member: RosterMember) -> Self {
        Self {
            user_id: member.user_id.value(),
            username: member.username.into_string(),
        }
    }
}

fn roster_entries(roster: Vec<RosterMember>) -> Vec<RosterEntry> {
    roster.into_iter().map(RosterEntry::from).collect()
}

impl From<GatewayEvent> for ServerEnvelope {
    fn from(event: GatewayEvent) -> Self {
        match event {
            GatewayEvent::Joined {
                exercise_id,
                roster,
            } => ServerEnvelope::Joined(RoomSnapshot {
                exercise_id: exercise_id.value(),
                users: roster_entries(roster),
            }),
            GatewayEvent::UserJoined {
                exercise_id,
                member,
                roster,
            } => ServerEnvelope::UserJoined(PresenceChange {
                user_id: member.user_id.value(),
                username: member.username.into_string(),
                exercise_id: exercise_id.value(),
                users: roster_entries(roster),
            }),
            GatewayEvent::UserLeft {
                exercise_id,
                member,
                roster,
            } => ServerEnvelope::UserLeft(PresenceChange {
                user_id: member.user_id.value(),
                username: member.username.into_string(),
                exercise_id: exercise_id.value(),
                users: roster_entries(roster),
            }),
            GatewayEvent::SolutionUpdated {
                exercise_id,
                author,
                solution,
                timestamp,
            } => ServerEnvelope::SolutionUpdated(RelayedSolution {
                user_id: author.user_id.value(),
                username: author.username.into_string(),
                exercise_id: exercise_id.value(),
                solution,
                timestamp: timestamp.value(),
            }),
            GatewayEvent::NewComment {
                exercise_id,
                author,
                comment,
                timestamp,
            } => ServerEnvelope::NewComment(RelayedComment {
                user_id: author.user_id.value(),
                username: author.username.into_string(),
                exercise_id: exercise_id.value(),
                comment,
                timestamp: timestamp.value(),
            }),
            GatewayEvent::Pong => ServerEnvelope::Pong,
        }
    }
}

// ========================================
// WebSocket DTO → Domain
// ========================================

impl TryFrom<Identity> for JoinRequest {
    type Error = ValueObjectError;

    fn try_from(identity: Identity) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::new(identity.user_id),
            username: Username::new(identity.username)?,
            exercise_id: ExerciseId::new(identity.exercise_id),
        })
    }
}

// ========================================
// Domain → HTTP DTO
// ========================================

impl From<&Member> for MemberDetailDto {
    fn from(member: &Member) -> Self {
        Self {
            connection_id: member.connection_id.to_string(),
            user_id: member.user_id.value(),
            username: member.username.as_str().to_string(),
            joined_at: timestamp_to_rfc3339(member.joined_at.value()),
            last_seen: timestamp_to_rfc3339(member.last_seen.value()),
        }
    }
}

impl From<&Room> for RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            exercise_id: room.exercise_id.value(),
            users: roster_entries(room.roster()),
            member_count: room.members.len(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<&Room> for RoomDetailDto {
    fn from(room: &Room) -> Self {
        Self {
            exercise_id: room.exercise_id.value(),
            members: room.members.iter().map(MemberDetailDto::from).collect(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionIdFactory, Timestamp};

    fn roster_member(user_id: u64, username: &str) -> RosterMember {
        RosterMember {
            user_id: UserId::new(user_id),
            username: Username::new(username.to_string()).unwrap(),
        }
    }

    #[test]
    fn test_identity_to_join_request() {
        // テスト項目: join の送信者情報が前後の空白を除いて検証済みの参加要求に変換される
        // given (前提条件):
        let identity = Identity {
            user_id: 7,
            username: "  alice ".to_string(),
            exercise_id: 42,
        };

        // when (操作):
        let request = JoinRequest::try_from(identity).unwrap();

        // then (期待する結果):
        assert_eq!(request.user_id, UserId::new(7));
        assert_eq!(request.username.as_str(), "alice");
        assert_eq!(request.exercise_id, ExerciseId::new(42));
    }

    #[test]
    fn test_identity_with_blank_username_is_rejected() {
        // テスト項目: 空白だけの username は参加要求に変換できない
        // given (前提条件):
        let identity = Identity {
            user_id: 7,
            username: "   ".to_string(),
            exercise_id: 42,
        };

        // when (操作):
        let result = JoinRequest::try_from(identity);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyUsername));
    }

    #[test]
    fn test_user_left_event_to_envelope() {
        // テスト項目: UserLeft イベントが user-left エンベロープに変換される
        // given (前提条件):
        let event = GatewayEvent::UserLeft {
            exercise_id: ExerciseId::new(42),
            member: roster_member(2, "bob"),
            roster: vec![roster_member(1, "alice")],
        };

        // when (操作):
        let envelope: ServerEnvelope = event.into();

        // then (期待する結果):
        assert_eq!(
            envelope,
            ServerEnvelope::UserLeft(PresenceChange {
                user_id: 2,
                username: "bob".to_string(),
                exercise_id: 42,
                users: vec![RosterEntry {
                    user_id: 1,
                    username: "alice".to_string(),
                }],
            })
        );
    }

    #[test]
    fn test_solution_event_to_envelope() {
        // テスト項目: SolutionUpdated イベントがサーバー時刻付きで変換される
        // given (前提条件):
        let event = GatewayEvent::SolutionUpdated {
            exercise_id: ExerciseId::new(42),
            author: roster_member(1, "alice"),
            solution: "x=1".to_string(),
            timestamp: Timestamp::new(1234),
        };

        // when (操作):
        let envelope: ServerEnvelope = event.into();

        // then (期待する結果):
        assert_eq!(
            envelope,
            ServerEnvelope::SolutionUpdated(RelayedSolution {
                user_id: 1,
                username: "alice".to_string(),
                exercise_id: 42,
                solution: "x=1".to_string(),
                timestamp: 1234,
            })
        );
    }

    #[test]
    fn test_room_to_detail_dto() {
        // テスト項目: Room が詳細 DTO に変換される（時刻は RFC 3339）
        // given (前提条件):
        let connection_id = ConnectionIdFactory::generate();
        let mut room = Room::new(ExerciseId::new(42), Timestamp::new(1672531200000));
        room.add_member(Member::new(
            connection_id,
            UserId::new(1),
            Username::new("alice".to_string()).unwrap(),
            Timestamp::new(1672531200000),
        ));

        // when (操作):
        let dto = RoomDetailDto::from(&room);

        // then (期待する結果):
        assert_eq!(dto.exercise_id, 42);
        assert_eq!(dto.created_at, "2023-01-01T00:00:00.000Z");
        assert_eq!(dto.members.len(), 1);
        assert_eq!(dto.members[0].connection_id, connection_id.to_string());
        assert_eq!(dto.members[0].username, "alice");
    }
}
