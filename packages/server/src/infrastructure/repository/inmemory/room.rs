//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! Room 本体と「接続ハンドル → 所属 Room」の索引を 1 つの Mutex で守り、
//! 2 つのマップが食い違わないようにしています。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ExerciseId, Member, Membership, RepositoryError, Room, RoomRepository,
    Timestamp,
};

#[derive(Debug, Default)]
struct Registry {
    rooms: HashMap<ExerciseId, Room>,
    memberships: HashMap<ConnectionId, ExerciseId>,
}

/// インメモリ Room Repository 実装
#[derive(Debug, Default)]
pub struct InMemoryRoomRepository {
    registry: Mutex<Registry>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn add_member(
        &self,
        exercise_id: ExerciseId,
        member: Member,
    ) -> Result<(), RepositoryError> {
        let mut registry = self.registry.lock().await;

        if registry.memberships.contains_key(&member.connection_id) {
            return Err(RepositoryError::AlreadyMember(
                member.connection_id.to_string(),
            ));
        }

        registry
            .memberships
            .insert(member.connection_id, exercise_id);
        let joined_at = member.joined_at;
        registry
            .rooms
            .entry(exercise_id)
            .or_insert_with(|| {
                tracing::debug!("Room {} created", exercise_id);
                Room::new(exercise_id, joined_at)
            })
            .add_member(member);

        Ok(())
    }

    async fn remove_member(&self, connection_id: &ConnectionId) -> Option<Membership> {
        let mut registry = self.registry.lock().await;

        let exercise_id = registry.memberships.remove(connection_id)?;
        let room = registry.rooms.get_mut(&exercise_id)?;
        let member = room.remove_member(connection_id)?;

        if room.is_empty() {
            registry.rooms.remove(&exercise_id);
            tracing::debug!("Room {} discarded (no members left)", exercise_id);
        }

        Some(Membership {
            exercise_id,
            member,
        })
    }

    async fn find_membership(&self, connection_id: &ConnectionId) -> Option<Membership> {
        let registry = self.registry.lock().await;

        let exercise_id = *registry.memberships.get(connection_id)?;
        let member = registry.rooms.get(&exercise_id)?.member(connection_id)?;

        Some(Membership {
            exercise_id,
            member: member.clone(),
        })
    }

    async fn get_room(&self, exercise_id: ExerciseId) -> Option<Room> {
        let registry = self.registry.lock().await;
        registry.rooms.get(&exercise_id).cloned()
    }

    async fn get_rooms(&self) -> Vec<Room> {
        let registry = self.registry.lock().await;
        let mut rooms: Vec<Room> = registry.rooms.values().cloned().collect();
        rooms.sort_by_key(|room| room.exercise_id);
        rooms
    }

    async fn touch_member(&self, connection_id: &ConnectionId, at: Timestamp) -> bool {
        let mut registry = self.registry.lock().await;

        let Some(exercise_id) = registry.memberships.get(connection_id).copied() else {
            return false;
        };
        match registry
            .rooms
            .get_mut(&exercise_id)
            .and_then(|room| room.member_mut(connection_id))
        {
            Some(member) => {
                if at > member.last_seen {
                    member.last_seen = at;
                }
                true
            }
            None => false,
        }
    }

    async fn find_stale_members(&self, deadline: Timestamp) -> Vec<ConnectionId> {
        let registry = self.registry.lock().await;
        let mut rooms: Vec<&Room> = registry.rooms.values().collect();
        rooms.sort_by_key(|room| room.exercise_id);

        rooms
            .into_iter()
            .flat_map(|room| room.members.iter())
            .filter(|member| member.last_seen < deadline)
            .map(|member| member.connection_id)
            .collect()
    }
}
