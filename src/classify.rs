//! Relevance classification: static tier resolution and dynamic score
//! application
//!
//! Canned questions resolve against the per-question maps baked into each
//! observation. Custom questions are classified externally; the collaborator
//! echoes one tier/insight pair per observation index, which is applied here.
//! In both paths an absent entry resolves to Noise with an empty insight,
//! a documented default rather than a failure.

use crate::types::{Observation, QuestionId, RelevanceTier, SignalScore};
use tracing::debug;

/// Resolve the relevance tier of an observation under a question.
/// Absent entries default to Noise.
pub fn tier_for(obs: &Observation, question: QuestionId) -> RelevanceTier {
    obs.signals
        .get(&question)
        .copied()
        .unwrap_or(RelevanceTier::Noise)
}

/// Resolve the rationale string for an observation under a question.
/// Absent entries default to the empty string.
pub fn insight_for(obs: &Observation, question: QuestionId) -> &str {
    obs.insights
        .get(&question)
        .map(String::as_str)
        .unwrap_or("")
}

/// Apply collaborator-supplied scores to the observation set under the
/// custom question key. Out-of-range indices are ignored; observations the
/// response omits keep no entry and therefore resolve to Noise / "".
pub fn apply_custom_scores(observations: &mut [Observation], scores: &[SignalScore]) {
    let mut applied = 0usize;
    for score in scores {
        if let Some(obs) = observations.get_mut(score.idx) {
            obs.signals.insert(QuestionId::Custom, score.signal);
            obs.insights
                .insert(QuestionId::Custom, score.insight.clone());
            applied += 1;
        }
    }
    debug!(
        applied,
        supplied = scores.len(),
        total = observations.len(),
        "applied custom signal scores"
    );
}

/// Drop any custom-question classification from the observation set
/// (used when the session resets or a classification fails)
pub fn clear_custom_scores(observations: &mut [Observation]) {
    for obs in observations.iter_mut() {
        obs.signals.remove(&QuestionId::Custom);
        obs.insights.remove(&QuestionId::Custom);
    }
}
