//! Session-scoped feedback and override ledger
//!
//! Both logs are append-only within a session: feedback events are never
//! deduplicated (voting twice on the same subject appends two events), and
//! override records accumulate one entry per effective tier change. Summary
//! statistics are recomputed from the log on demand, never cached.

use crate::types::{QuestionId, RelevanceTier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a feedback vote is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    /// A ranked factor in the brief
    Factor,

    /// A recommended action in the brief
    Action,
}

/// Thumbs up or down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Up,
    Down,
}

/// One manager feedback event on a brief factor or action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub id: Uuid,
    pub subject: SubjectKind,

    /// Index of the factor/action within the brief
    pub subject_index: usize,

    pub vote: Vote,

    /// Free-text note; only meaningful for down-votes, empty otherwise
    pub note: String,

    pub recorded_at: DateTime<Utc>,
}

/// One effective tier override on an observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideRecord {
    pub observation_index: usize,
    pub question: QuestionId,
    pub previous: RelevanceTier,
    pub new: RelevanceTier,
    pub recorded_at: DateTime<Utc>,
}

/// Feedback totals, recomputed from the event log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedbackSummary {
    pub total: usize,
    pub up_count: usize,
    pub down_count: usize,
}

/// Accumulates session feedback and override events
#[derive(Debug, Clone, Default)]
pub struct SessionLedger {
    feedback: Vec<FeedbackEvent>,
    overrides: Vec<OverrideRecord>,
}

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one feedback event. Up-votes never carry a note; any note
    /// supplied with an up-vote is dropped.
    pub fn record_feedback(
        &mut self,
        subject: SubjectKind,
        subject_index: usize,
        vote: Vote,
        note: Option<String>,
    ) {
        let note = match vote {
            Vote::Down => note.unwrap_or_default(),
            Vote::Up => String::new(),
        };
        self.feedback.push(FeedbackEvent {
            id: Uuid::new_v4(),
            subject,
            subject_index,
            vote,
            note,
            recorded_at: Utc::now(),
        });
    }

    /// Append one override record
    pub fn record_override(
        &mut self,
        observation_index: usize,
        question: QuestionId,
        previous: RelevanceTier,
        new: RelevanceTier,
    ) {
        self.overrides.push(OverrideRecord {
            observation_index,
            question,
            previous,
            new,
            recorded_at: Utc::now(),
        });
    }

    pub fn feedback_events(&self) -> &[FeedbackEvent] {
        &self.feedback
    }

    pub fn override_records(&self) -> &[OverrideRecord] {
        &self.overrides
    }

    /// Feedback totals, recomputed from the log
    pub fn summary(&self) -> FeedbackSummary {
        let up_count = self.feedback.iter().filter(|e| e.vote == Vote::Up).count();
        let down_count = self.feedback.len() - up_count;
        FeedbackSummary {
            total: self.feedback.len(),
            up_count,
            down_count,
        }
    }

    /// Discard all events (account switch or explicit reset)
    pub fn clear(&mut self) {
        self.feedback.clear();
        self.overrides.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_only_no_dedup() {
        let mut ledger = SessionLedger::new();
        ledger.record_feedback(SubjectKind::Action, 2, Vote::Down, Some("too vague".into()));
        ledger.record_feedback(SubjectKind::Action, 2, Vote::Down, Some("still vague".into()));
        let summary = ledger.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.down_count, 2);
        assert_eq!(summary.up_count, 0);
    }

    #[test]
    fn test_summary_totals_add_up() {
        let mut ledger = SessionLedger::new();
        ledger.record_feedback(SubjectKind::Factor, 0, Vote::Up, None);
        ledger.record_feedback(SubjectKind::Factor, 1, Vote::Down, None);
        ledger.record_feedback(SubjectKind::Action, 0, Vote::Up, None);
        let summary = ledger.summary();
        assert_eq!(summary.total, summary.up_count + summary.down_count);
        assert_eq!(summary.up_count, 2);
        assert_eq!(summary.down_count, 1);
    }

    #[test]
    fn test_upvote_note_dropped() {
        let mut ledger = SessionLedger::new();
        ledger.record_feedback(SubjectKind::Factor, 0, Vote::Up, Some("great".into()));
        assert_eq!(ledger.feedback_events()[0].note, "");
        ledger.record_feedback(SubjectKind::Factor, 0, Vote::Down, Some("wrong".into()));
        assert_eq!(ledger.feedback_events()[1].note, "wrong");
    }

    #[test]
    fn test_override_records_accumulate() {
        let mut ledger = SessionLedger::new();
        ledger.record_override(3, QuestionId::Churn, RelevanceTier::High, RelevanceTier::Noise);
        ledger.record_override(3, QuestionId::Churn, RelevanceTier::Noise, RelevanceTier::High);
        assert_eq!(ledger.override_records().len(), 2);
        assert_eq!(ledger.override_records()[0].previous, RelevanceTier::High);
        assert_eq!(ledger.override_records()[1].new, RelevanceTier::High);
    }

    #[test]
    fn test_clear_resets_both_logs() {
        let mut ledger = SessionLedger::new();
        ledger.record_feedback(SubjectKind::Factor, 0, Vote::Up, None);
        ledger.record_override(0, QuestionId::Seats, RelevanceTier::Low, RelevanceTier::High);
        ledger.clear();
        assert_eq!(ledger.summary().total, 0);
        assert!(ledger.override_records().is_empty());
    }
}
