// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation session state.
//!
//! Each session owns a rolling buffer of the most recent turns, distinct
//! from the persistent memory ledger. The buffer is capped; the oldest
//! turn drops first. Nothing here is shared across sessions.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use understudy_prompt::ConversationTurn;

/// One turn of conversation as the session records it.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub speaker: String,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// A single conversation's rolling history.
#[derive(Debug)]
pub struct DialogueSession {
    id: String,
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl DialogueSession {
    /// Create a session keeping at most `capacity` turns.
    pub fn new(capacity: usize) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            turns: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// The session's unique id, assigned at creation.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Record a turn, evicting the oldest when the buffer is full.
    pub fn push_turn(&mut self, speaker: &str, text: &str) {
        if self.turns.len() == self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(Turn {
            speaker: speaker.to_string(),
            text: text.to_string(),
            at: Utc::now(),
        });
    }

    /// The last `n` turns, oldest first, in prompt form.
    pub fn recent(&self, n: usize) -> Vec<ConversationTurn> {
        let start = self.turns.len().saturating_sub(n);
        self.turns
            .iter()
            .skip(start)
            .map(|turn| ConversationTurn {
                speaker: turn.speaker.clone(),
                text: turn.text.clone(),
            })
            .collect()
    }

    /// Number of buffered turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True when no turn has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop all buffered turns. The session id is kept.
    pub fn reset(&mut self) {
        self.turns.clear();
    }

    /// Full buffered history, oldest first, for display or export.
    pub fn transcript(&self) -> Vec<&Turn> {
        self.turns.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_recent_preserve_order() {
        let mut session = DialogueSession::new(8);
        session.push_turn("User", "hello");
        session.push_turn("Nick", "Evening.");

        let recent = session.recent(4);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].speaker, "User");
        assert_eq!(recent[1].text, "Evening.");
    }

    #[test]
    fn oldest_turn_evicted_at_capacity() {
        let mut session = DialogueSession::new(3);
        for i in 0..5 {
            session.push_turn("User", &format!("turn {i}"));
        }
        assert_eq!(session.len(), 3);
        let transcript = session.transcript();
        assert_eq!(transcript[0].text, "turn 2");
        assert_eq!(transcript[2].text, "turn 4");
    }

    #[test]
    fn recent_caps_at_requested_window() {
        let mut session = DialogueSession::new(8);
        for i in 0..6 {
            session.push_turn("User", &format!("turn {i}"));
        }
        let recent = session.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].text, "turn 4");
        assert_eq!(recent[1].text, "turn 5");
    }

    #[test]
    fn reset_clears_turns_but_keeps_id() {
        let mut session = DialogueSession::new(8);
        session.push_turn("User", "hello");
        let id = session.id().to_string();

        session.reset();
        assert!(session.is_empty());
        assert_eq!(session.id(), id);
    }

    #[test]
    fn zero_capacity_clamps_to_one() {
        let mut session = DialogueSession::new(0);
        session.push_turn("User", "first");
        session.push_turn("User", "second");
        assert_eq!(session.len(), 1);
        assert_eq!(session.transcript()[0].text, "second");
    }

    #[test]
    fn sessions_get_distinct_ids() {
        assert_ne!(DialogueSession::new(8).id(), DialogueSession::new(8).id());
    }

    #[test]
    fn transcript_serializes_for_export() {
        let mut session = DialogueSession::new(8);
        session.push_turn("User", "hello");
        let json = serde_json::to_string(&session.transcript()).unwrap();
        assert!(json.contains("\"speaker\":\"User\""));
        assert!(json.contains("\"text\":\"hello\""));
    }
}
