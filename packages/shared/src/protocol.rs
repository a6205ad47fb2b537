//! Wire envelopes exchanged over the collaboration channel.
//!
//! Every frame is one JSON object with a kebab-case `type` tag and
//! camelCase fields:
//!
//! ```json
//! {"type":"join","userId":1,"username":"alice","exerciseId":42}
//! {"type":"solution-updated","userId":1,"username":"alice","exerciseId":42,"solution":"x=1","timestamp":1700000000000}
//! ```

use serde::{Deserialize, Serialize};

/// Envelopes sent by clients to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEnvelope {
    Join(Identity),
    Leave(Identity),
    UpdateSolution(SolutionSubmission),
    Comment(CommentSubmission),
    Ping(Heartbeat),
}

impl ClientEnvelope {
    /// Wire name of the envelope type, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join(_) => "join",
            Self::Leave(_) => "leave",
            Self::UpdateSolution(_) => "update-solution",
            Self::Comment(_) => "comment",
            Self::Ping(_) => "ping",
        }
    }
}

/// Envelopes sent by the gateway to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEnvelope {
    Joined(RoomSnapshot),
    UserJoined(PresenceChange),
    UserLeft(PresenceChange),
    SolutionUpdated(RelayedSolution),
    NewComment(RelayedComment),
    Pong,
}

impl ServerEnvelope {
    /// Wire name of the envelope type, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Joined(_) => "joined",
            Self::UserJoined(_) => "user-joined",
            Self::UserLeft(_) => "user-left",
            Self::SolutionUpdated(_) => "solution-updated",
            Self::NewComment(_) => "new-comment",
            Self::Pong => "pong",
        }
    }
}

/// Who is speaking and in which room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(deserialize_with = "numeric_id::deserialize")]
    pub user_id: u64,
    pub username: String,
    #[serde(deserialize_with = "numeric_id::deserialize")]
    pub exercise_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionSubmission {
    #[serde(flatten)]
    pub identity: Identity,
    pub solution: String,
    /// Client-side send time; the gateway replaces it when relaying.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSubmission {
    #[serde(flatten)]
    pub identity: Identity,
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Keepalive payload. Clients may attach a send time; nothing is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heartbeat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// One entry of a room roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub user_id: u64,
    pub username: String,
}

/// Roster handed to a connection right after it joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub exercise_id: u64,
    pub users: Vec<RosterEntry>,
}

/// Membership change broadcast to the rest of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceChange {
    pub user_id: u64,
    pub username: String,
    pub exercise_id: u64,
    pub users: Vec<RosterEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayedSolution {
    pub user_id: u64,
    pub username: String,
    pub exercise_id: u64,
    pub solution: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayedComment {
    pub user_id: u64,
    pub username: String,
    pub exercise_id: u64,
    pub comment: String,
    pub timestamp: i64,
}

/// Accepts ids sent either as JSON numbers or as numeric strings.
pub mod numeric_id {
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawId::deserialize(deserializer)? {
            RawId::Number(id) => Ok(id),
            RawId::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("expected a numeric id, got '{}'", text))),
        }
    }
}
