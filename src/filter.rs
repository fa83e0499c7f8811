//! Filter aggregation: tier partitioning and noise-reduction statistics
//!
//! The filtering policy is fixed: High and Medium observations are kept for
//! the agent context, Low and Noise are removed. Partitioning is stable:
//! each bucket preserves original observation insertion order.

use crate::classify::tier_for;
use crate::types::{Observation, QuestionId, RelevanceTier};
use serde::Serialize;

/// Observation indices bucketed by tier, each in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub high: Vec<usize>,
    pub medium: Vec<usize>,
    pub low: Vec<usize>,
    pub noise: Vec<usize>,
}

impl Partition {
    /// Number of observations surviving the filter
    pub fn kept(&self) -> usize {
        self.high.len() + self.medium.len()
    }

    /// Total observation count across all buckets
    pub fn total(&self) -> usize {
        self.kept() + self.low.len() + self.noise.len()
    }

    /// Aggregate filtering statistics for this partition
    pub fn stats(&self) -> FilterStats {
        let total = self.total();
        let kept = self.kept();
        let removed = total - kept;
        let noise_percent_removed = if total == 0 {
            0
        } else {
            // round-half-away-from-zero
            ((removed as f64 / total as f64) * 100.0).round() as u8
        };
        FilterStats {
            total,
            kept,
            removed,
            noise_percent_removed,
        }
    }
}

/// Kept/removed counts and the headline noise-reduction percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub total: usize,
    pub kept: usize,
    pub removed: usize,
    pub noise_percent_removed: u8,
}

/// Partition the observation set by resolved tier under a question.
/// Stable: buckets preserve original observation order.
pub fn partition(observations: &[Observation], question: QuestionId) -> Partition {
    let mut p = Partition::default();
    for (idx, obs) in observations.iter().enumerate() {
        match tier_for(obs, question) {
            RelevanceTier::High => p.high.push(idx),
            RelevanceTier::Medium => p.medium.push(idx),
            RelevanceTier::Low => p.low.push(idx),
            RelevanceTier::Noise => p.noise.push(idx),
        }
    }
    p
}
