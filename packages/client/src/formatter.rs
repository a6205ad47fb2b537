//! Message formatting utilities for client display.

use atelier_shared::{
    protocol::{PresenceChange, RelayedComment, RelayedSolution, RosterEntry, ServerEnvelope},
    time::timestamp_to_rfc3339,
};

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the roster of the room
    ///
    /// # Arguments
    ///
    /// * `roster` - Members of the room in join order
    /// * `current_user_id` - The current user's ID (to mark as "me")
    ///
    /// # Returns
    ///
    /// A formatted string with the member list
    pub fn format_roster(roster: &[RosterEntry], current_user_id: u64) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{}\nMembers:\n", RULE));

        if roster.is_empty() {
            output.push_str("(No members)\n");
        } else {
            for entry in roster {
                let me_suffix = if entry.user_id == current_user_id {
                    " (me)"
                } else {
                    ""
                };
                output.push_str(&format!(
                    "{} #{}{}\n",
                    entry.username, entry.user_id, me_suffix
                ));
            }
        }

        output.push_str(RULE);
        output.push('\n');
        output
    }

    /// Format a user-joined notification
    pub fn format_user_joined(change: &PresenceChange) -> String {
        format!(
            "\n+ {} joined ({} in room)\n",
            change.username,
            change.users.len()
        )
    }

    /// Format a user-left notification
    pub fn format_user_left(change: &PresenceChange) -> String {
        format!(
            "\n- {} left ({} in room)\n",
            change.username,
            change.users.len()
        )
    }

    /// Format a relayed solution update
    ///
    /// The solution is printed verbatim between rules so multi-line code
    /// stays readable.
    pub fn format_solution(relayed: &RelayedSolution) -> String {
        format!(
            "\n{rule}\n@{} updated the solution at {}\n{}\n{rule}\n",
            relayed.username,
            timestamp_to_rfc3339(relayed.timestamp),
            relayed.solution,
            rule = THIN_RULE
        )
    }

    /// Format a relayed comment
    pub fn format_comment(relayed: &RelayedComment) -> String {
        format!(
            "\n@{}: {}\nsent at {}\n",
            relayed.username,
            relayed.comment,
            timestamp_to_rfc3339(relayed.timestamp)
        )
    }

    /// Format a notice from the session (connection problems, rejected sends)
    pub fn format_notice(notice: &str) -> String {
        format!("\n! {}\n", notice)
    }

    /// Format one activity log entry
    ///
    /// # Returns
    ///
    /// `None` for envelopes that never appear in the activity log
    pub fn format_activity(envelope: &ServerEnvelope) -> Option<String> {
        match envelope {
            ServerEnvelope::UserJoined(change) => Some(Self::format_user_joined(change)),
            ServerEnvelope::UserLeft(change) => Some(Self::format_user_left(change)),
            ServerEnvelope::SolutionUpdated(relayed) => Some(Self::format_solution(relayed)),
            ServerEnvelope::NewComment(relayed) => Some(Self::format_comment(relayed)),
            ServerEnvelope::Joined(_) | ServerEnvelope::Pong => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user_id: u64, username: &str) -> RosterEntry {
        RosterEntry {
            user_id,
            username: username.to_string(),
        }
    }

    fn change(user_id: u64, username: &str, users: Vec<RosterEntry>) -> PresenceChange {
        PresenceChange {
            user_id,
            username: username.to_string(),
            exercise_id: 42,
            users,
        }
    }

    #[test]
    fn test_format_roster_with_empty_room() {
        // テスト項目: 名簿が空の場合、適切なメッセージが表示される
        // given (前提条件):
        let roster = vec![];

        // when (操作):
        let result = MessageFormatter::format_roster(&roster, 1);

        // then (期待する結果):
        assert!(result.contains("Members:"));
        assert!(result.contains("(No members)"));
        assert!(result.contains(RULE));
    }

    #[test]
    fn test_format_roster_marks_current_user() {
        // テスト項目: 複数メンバーの場合、全員が表示され自分にはマークが付く
        // given (前提条件):
        let roster = vec![entry(1, "alice"), entry(2, "bob")];

        // when (操作):
        let result = MessageFormatter::format_roster(&roster, 1);

        // then (期待する結果):
        assert!(result.contains("alice #1 (me)"));
        assert!(result.contains("bob #2\n"));
        assert!(!result.contains("bob #2 (me)"));
    }

    #[test]
    fn test_format_user_joined_and_left() {
        // テスト項目: 参加・退出の通知に名前と人数が含まれる
        // given (前提条件):
        let joined = change(2, "bob", vec![entry(1, "alice"), entry(2, "bob")]);
        let left = change(2, "bob", vec![entry(1, "alice")]);

        // when (操作):
        let joined_text = MessageFormatter::format_user_joined(&joined);
        let left_text = MessageFormatter::format_user_left(&left);

        // then (期待する結果):
        assert!(joined_text.contains("+ bob joined (2 in room)"));
        assert!(left_text.contains("- bob left (1 in room)"));
    }

    #[test]
    fn test_format_solution_keeps_code_verbatim() {
        // テスト項目: 解答のコードは改行を含めてそのまま表示される
        // given (前提条件):
        let relayed = RelayedSolution {
            user_id: 1,
            username: "alice".to_string(),
            exercise_id: 42,
            solution: "fn main() {\n    println!(\"hi\");\n}".to_string(),
            timestamp: 1672531200123,
        };

        // when (操作):
        let result = MessageFormatter::format_solution(&relayed);

        // then (期待する結果):
        assert!(result.contains("@alice updated the solution at 2023-01-01T00:00:00.123Z"));
        assert!(result.contains("fn main() {\n    println!(\"hi\");\n}"));
        assert!(result.contains(THIN_RULE));
    }

    #[test]
    fn test_format_comment() {
        // テスト項目: コメントが送信者と時刻付きでフォーマットされる
        // given (前提条件):
        let relayed = RelayedComment {
            user_id: 2,
            username: "bob".to_string(),
            exercise_id: 42,
            comment: "looks good".to_string(),
            timestamp: 1672531200123,
        };

        // when (操作):
        let result = MessageFormatter::format_comment(&relayed);

        // then (期待する結果):
        assert!(result.contains("@bob: looks good"));
        assert!(result.contains("sent at 2023-01-01T00:00:00.123Z"));
    }

    #[test]
    fn test_format_notice() {
        // テスト項目: お知らせが目印付きで表示される
        // when (操作):
        let result = MessageFormatter::format_notice("cannot send message, not connected");

        // then (期待する結果):
        assert_eq!(result, "\n! cannot send message, not connected\n");
    }

    #[test]
    fn test_format_activity_skips_non_activity_envelopes() {
        // テスト項目: アクティビティに含まれない種類のエンベロープは整形されない
        // given (前提条件):
        let joined = change(2, "bob", vec![entry(2, "bob")]);

        // when (操作):
        let pong = MessageFormatter::format_activity(&ServerEnvelope::Pong);
        let user_joined = MessageFormatter::format_activity(&ServerEnvelope::UserJoined(joined));

        // then (期待する結果):
        assert_eq!(pong, None);
        assert!(user_joined.is_some_and(|text| text.contains("+ bob joined")));
    }
}
