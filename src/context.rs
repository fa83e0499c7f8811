//! Context block serialization
//!
//! Renders the filtered observation subset into the deterministic,
//! line-oriented text block handed to the downstream brief generator. The
//! format is a contract: blank lines are structural section separators, and
//! Low/Noise observations never appear.

use crate::classify::insight_for;
use crate::filter::Partition;
use crate::types::{Account, Observation, QuestionId};

/// Fixed instruction trailer appended to every context block
pub const CONTEXT_INSTRUCTION: &str = "INSTRUCTION: Based on these filtered signals, generate an intelligence brief answering the question above with specific, actionable recommendations.";

/// The serialized agent context: an ordered sequence of lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBlock {
    lines: Vec<String>,
}

impl ContextBlock {
    /// Build the context block for an account under a question.
    ///
    /// `question_label` is the catalog label for canned questions or the
    /// literal free text for a custom question. `partition` must have been
    /// computed from `observations` under the same question.
    pub fn build(
        account: &Account,
        question: QuestionId,
        question_label: &str,
        observations: &[Observation],
        partition: &Partition,
    ) -> Self {
        let mut lines = Vec::with_capacity(partition.kept() + 9);
        lines.push(format!(
            "ACCOUNT: {} | {} | ARR: {}",
            account.name, account.industry, account.arr
        ));
        lines.push(format!(
            "RENEWAL DATE: {} ({})",
            account.renewal_date, account.renewal_in
        ));
        lines.push(format!("QUESTION: {}", question_label));
        lines.push(String::new());
        lines.push("HIGH-PRIORITY SIGNALS:".to_string());
        for &idx in &partition.high {
            lines.push(signal_line('⚠', &observations[idx], question));
        }
        lines.push(String::new());
        lines.push("WATCH SIGNALS:".to_string());
        for &idx in &partition.medium {
            lines.push(signal_line('◆', &observations[idx], question));
        }
        lines.push(String::new());
        lines.push(CONTEXT_INSTRUCTION.to_string());
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Flatten into the emitted text form
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl std::fmt::Display for ContextBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

fn signal_line(marker: char, obs: &Observation, question: QuestionId) -> String {
    format!(
        "  {} [{}] {}: {} — {}",
        marker,
        obs.category.upper(),
        obs.metric,
        obs.value,
        insight_for(obs, question)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::partition;
    use crate::types::{RelevanceTier, RiskLevel, SignalCategory};
    use std::collections::BTreeMap;

    fn account() -> Account {
        let tiers = [
            (SignalCategory::Usage, "Platform logins (30d)", "Down 47%", RelevanceTier::High, "Steep disengagement"),
            (SignalCategory::Support, "Open critical tickets", "5 unresolved", RelevanceTier::Medium, "Trust eroding"),
            (SignalCategory::Financial, "Last renewal discount", "15%", RelevanceTier::Low, "Historical context"),
            (SignalCategory::Sentiment, "Email open rate", "8%", RelevanceTier::Noise, "Common across accounts"),
        ];
        let observations = tiers
            .iter()
            .map(|(cat, metric, value, tier, insight)| {
                let mut signals = BTreeMap::new();
                signals.insert(QuestionId::Churn, *tier);
                let mut insights = BTreeMap::new();
                insights.insert(QuestionId::Churn, insight.to_string());
                Observation {
                    category: *cat,
                    metric: metric.to_string(),
                    value: value.to_string(),
                    signals,
                    insights,
                    overridden: false,
                }
            })
            .collect();
        Account {
            id: "summit".to_string(),
            name: "Summit Retail".to_string(),
            industry: "Retail".to_string(),
            arr: "$120K".to_string(),
            renewal_in: "2 months".to_string(),
            renewal_date: "Apr 01, 2025".to_string(),
            risk_level: RiskLevel::High,
            risk_score: 70,
            csm: "Dana Park".to_string(),
            contacts: 12,
            last_activity: "1 week ago".to_string(),
            observations,
            briefs: BTreeMap::new(),
        }
    }

    #[test]
    fn test_exact_block_format() {
        let account = account();
        let p = partition(&account.observations, QuestionId::Churn);
        let block = ContextBlock::build(
            &account,
            QuestionId::Churn,
            QuestionId::Churn.label(),
            &account.observations,
            &p,
        );
        let expected = "\
ACCOUNT: Summit Retail | Retail | ARR: $120K
RENEWAL DATE: Apr 01, 2025 (2 months)
QUESTION: Churn Risk at Renewal

HIGH-PRIORITY SIGNALS:
  ⚠ [USAGE] Platform logins (30d): Down 47% — Steep disengagement

WATCH SIGNALS:
  ◆ [SUPPORT] Open critical tickets: 5 unresolved — Trust eroding

INSTRUCTION: Based on these filtered signals, generate an intelligence brief answering the question above with specific, actionable recommendations.";
        assert_eq!(block.render(), expected);
    }

    #[test]
    fn test_low_and_noise_never_appear() {
        let account = account();
        let p = partition(&account.observations, QuestionId::Churn);
        let block = ContextBlock::build(
            &account,
            QuestionId::Churn,
            QuestionId::Churn.label(),
            &account.observations,
            &p,
        );
        let text = block.render();
        assert!(!text.contains("Last renewal discount"));
        assert!(!text.contains("Email open rate"));
    }

    #[test]
    fn test_custom_question_uses_literal_text() {
        let account = account();
        let p = partition(&account.observations, QuestionId::Custom);
        let block = ContextBlock::build(
            &account,
            QuestionId::Custom,
            "Will they adopt the new billing module?",
            &account.observations,
            &p,
        );
        assert_eq!(
            block.lines()[2],
            "QUESTION: Will they adopt the new billing module?"
        );
    }

    #[test]
    fn test_sections_recoverable_by_blank_lines() {
        let account = account();
        let p = partition(&account.observations, QuestionId::Churn);
        let block = ContextBlock::build(
            &account,
            QuestionId::Churn,
            QuestionId::Churn.label(),
            &account.observations,
            &p,
        );
        let rendered = block.render();
        let sections: Vec<_> = rendered.split("\n\n").collect();
        assert_eq!(sections.len(), 4);
        assert!(sections[1].starts_with("HIGH-PRIORITY SIGNALS:"));
        assert!(sections[2].starts_with("WATCH SIGNALS:"));
        assert!(sections[3].starts_with("INSTRUCTION:"));
    }
}
