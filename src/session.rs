//! Session orchestration
//!
//! A `Session` is the single mutable surface of the crate: it holds the
//! selected account's working observation copy, the active question, the
//! custom-question state, the feedback/override ledger, the autonomy toggle,
//! and the follow-up chat transcript. The catalog itself stays immutable;
//! overrides and custom scores only ever touch the session's working copy.

use crate::catalog::AccountCatalog;
use crate::classify::{apply_custom_scores, clear_custom_scores, tier_for};
use crate::context::ContextBlock;
use crate::error::{KairosError, Result};
use crate::filter::{partition, FilterStats, Partition};
use crate::ledger::{FeedbackSummary, SessionLedger, SubjectKind, Vote};
use crate::services::Collaborator;
use crate::types::{
    Account, AgentMode, Brief, ChatRole, ChatTurn, Observation, QuestionId, RelevanceTier,
};
use tracing::{info, warn};

/// Canned assistant reply appended when a follow-up chat call fails
pub const CHAT_FAILURE_REPLY: &str =
    "Connection error — please check your network and try again.";

/// One manager working session over the account catalog
pub struct Session {
    catalog: AccountCatalog,
    account_id: Option<String>,

    /// Working copy of the selected account's observations. Overrides and
    /// custom scores mutate this copy, never the catalog.
    observations: Vec<Observation>,

    question: Option<QuestionId>,
    custom_question: Option<String>,
    custom_brief: Option<Brief>,

    ledger: SessionLedger,
    autonomy_requested: bool,
    transcript: Vec<ChatTurn>,
}

impl Session {
    pub fn new(catalog: AccountCatalog) -> Self {
        Self {
            catalog,
            account_id: None,
            observations: Vec::new(),
            question: None,
            custom_question: None,
            custom_brief: None,
            ledger: SessionLedger::new(),
            autonomy_requested: false,
            transcript: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &AccountCatalog {
        &self.catalog
    }

    /// Select an account by id, resetting all per-account session state:
    /// question, custom classification, ledger, autonomy toggle, transcript.
    pub fn select_account(&mut self, id: &str) -> Result<()> {
        let account = self.catalog.get(id)?;
        self.observations = account.observations.clone();
        self.account_id = Some(account.id.clone());
        self.question = None;
        self.custom_question = None;
        self.custom_brief = None;
        self.ledger.clear();
        self.autonomy_requested = false;
        self.transcript.clear();
        info!(account = id, "selected account");
        Ok(())
    }

    /// The selected account's immutable catalog record
    pub fn account(&self) -> Result<&Account> {
        let id = self
            .account_id
            .as_deref()
            .ok_or_else(|| KairosError::Validation("no account selected".to_string()))?;
        self.catalog.get(id)
    }

    /// The session's working observation copy (overrides applied)
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn active_question(&self) -> Option<QuestionId> {
        self.question
    }

    /// Activate one of the four canned catalog questions. Clears any custom
    /// classification and the chat transcript; the ledger survives.
    pub fn select_question(&mut self, question: QuestionId) -> Result<()> {
        self.account()?;
        if question.is_custom() {
            return Err(KairosError::Validation(
                "custom questions are asked, not selected".to_string(),
            ));
        }
        self.question = Some(question);
        self.custom_question = None;
        self.custom_brief = None;
        clear_custom_scores(&mut self.observations);
        self.transcript.clear();
        info!(question = %question, "selected question");
        Ok(())
    }

    /// Ask a free-text question: the collaborator classifies every
    /// observation and synthesizes a brief. Any classification failure
    /// degrades gracefully: the question stays active with an error brief
    /// and an all-noise partition rather than surfacing the failure.
    pub async fn ask_custom(
        &mut self,
        collaborator: &Collaborator,
        question_text: &str,
    ) -> Result<()> {
        let account = self.account()?.clone();
        self.question = Some(QuestionId::Custom);
        self.custom_question = Some(question_text.to_string());
        self.transcript.clear();
        clear_custom_scores(&mut self.observations);

        match collaborator.classify(&account, question_text).await {
            Ok(analysis) => {
                apply_custom_scores(&mut self.observations, &analysis.signal_scores);
                self.custom_brief = Some(analysis.brief);
                info!(account = %account.id, "custom classification complete");
            }
            Err(KairosError::Classification(reason)) => {
                warn!(account = %account.id, %reason, "custom classification failed");
                self.custom_brief = Some(Brief::degraded());
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Label for the active question: catalog label for canned questions,
    /// the literal free text for a custom one
    pub fn question_label(&self) -> Result<&str> {
        let question = self.require_question()?;
        if question.is_custom() {
            self.custom_question
                .as_deref()
                .ok_or_else(|| KairosError::Validation("custom question text missing".to_string()))
        } else {
            Ok(question.label())
        }
    }

    /// Manually re-tier one observation under the active question.
    ///
    /// A same-tier override is a complete no-op: no record, no audit flag.
    /// An effective override re-tiers the working copy, marks the
    /// observation as overridden for the rest of the session, and appends
    /// one ledger record.
    pub fn override_tier(&mut self, index: usize, new_tier: RelevanceTier) -> Result<()> {
        let question = self.require_question()?;
        let obs = self.observations.get_mut(index).ok_or_else(|| {
            KairosError::Validation(format!("observation index {} out of range", index))
        })?;
        let previous = tier_for(obs, question);
        if previous == new_tier {
            return Ok(());
        }
        obs.signals.insert(question, new_tier);
        obs.overridden = true;
        self.ledger
            .record_override(index, question, previous, new_tier);
        info!(index, %previous, new = %new_tier, "tier override");
        Ok(())
    }

    /// Partition the working observations under the active question
    pub fn partition(&self) -> Result<Partition> {
        let question = self.require_question()?;
        Ok(partition(&self.observations, question))
    }

    /// Filtering statistics for the active question
    pub fn stats(&self) -> Result<FilterStats> {
        Ok(self.partition()?.stats())
    }

    /// Serialize the filtered context block for the active question
    pub fn context_block(&self) -> Result<ContextBlock> {
        let question = self.require_question()?;
        let label = self.question_label()?.to_string();
        let account = self.account()?;
        let p = partition(&self.observations, question);
        Ok(ContextBlock::build(
            account,
            question,
            &label,
            &self.observations,
            &p,
        ))
    }

    /// The brief displayed for the active question: precomputed for canned
    /// questions, collaborator-produced (or degraded) for custom ones
    pub fn active_brief(&self) -> Result<&Brief> {
        let question = self.require_question()?;
        if question.is_custom() {
            self.custom_brief
                .as_ref()
                .ok_or_else(|| KairosError::Validation("no custom brief available".to_string()))
        } else {
            let account = self.account()?;
            account.briefs.get(&question).ok_or_else(|| {
                KairosError::NotFound(format!("no brief for question '{}'", question))
            })
        }
    }

    /// Record a thumbs up/down on a brief factor or action
    pub fn record_feedback(
        &mut self,
        subject: SubjectKind,
        subject_index: usize,
        vote: Vote,
        note: Option<String>,
    ) -> Result<()> {
        let brief = self.active_brief()?;
        let bound = match subject {
            SubjectKind::Factor => brief.factors.len(),
            SubjectKind::Action => brief.actions.len(),
        };
        if subject_index >= bound {
            return Err(KairosError::Validation(format!(
                "feedback index {} out of range",
                subject_index
            )));
        }
        self.ledger.record_feedback(subject, subject_index, vote, note);
        Ok(())
    }

    pub fn feedback_summary(&self) -> FeedbackSummary {
        self.ledger.summary()
    }

    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    /// Request or withdraw autonomous mode. The request is remembered even
    /// while ineligible; eligibility is evaluated per displayed brief.
    pub fn set_autonomy(&mut self, requested: bool) {
        self.autonomy_requested = requested;
    }

    /// The mode actually in effect: autonomous only when requested AND the
    /// displayed brief clears the confidence floor. With no displayed brief
    /// the session stays in co-pilot.
    pub fn effective_mode(&self) -> AgentMode {
        if self.autonomy_requested
            && self
                .active_brief()
                .map(|b| b.autonomy_eligible())
                .unwrap_or(false)
        {
            AgentMode::Autonomous
        } else {
            AgentMode::CoPilot
        }
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    /// One follow-up chat turn grounded in the current context block and
    /// brief. The user turn is always appended; a transport failure appends
    /// a canned error reply instead of surfacing the error.
    pub async fn chat(&mut self, collaborator: &Collaborator, message: &str) -> Result<String> {
        let account_name = self.account()?.name.clone();
        let context_text = self.context_block()?.render();
        let brief = self.active_brief().ok().cloned();

        let result = collaborator
            .chat(
                &account_name,
                &context_text,
                brief.as_ref(),
                &self.transcript,
                message,
            )
            .await;

        self.transcript.push(ChatTurn {
            role: ChatRole::User,
            text: message.to_string(),
        });
        let reply = match result {
            Ok(text) => text,
            Err(KairosError::Classification(reason)) => {
                warn!(%reason, "chat turn failed");
                CHAT_FAILURE_REPLY.to_string()
            }
            Err(e) => return Err(e),
        };
        self.transcript.push(ChatTurn {
            role: ChatRole::Assistant,
            text: reply.clone(),
        });
        Ok(reply)
    }

    fn require_question(&self) -> Result<QuestionId> {
        self.question
            .ok_or_else(|| KairosError::Validation("no active question".to_string()))
    }
}
