//! Kairos: renewal intelligence core
//!
//! Filters raw account observations down to the signals that matter for a
//! specific renewal question, serializes the survivors into a deterministic
//! agent context block, and pairs the result with an intelligence brief.
//!
//! # Architecture
//!
//! - **Catalog**: embedded demo accounts with per-question relevance maps
//! - **Classification**: static tier resolution plus collaborator-scored
//!   custom questions
//! - **Filtering**: stable High/Medium/Low/Noise partitioning and
//!   noise-reduction statistics
//! - **Context**: the line-oriented context block contract
//! - **Session**: the mutable working surface (overrides, feedback ledger,
//!   autonomy gate, follow-up chat)
//! - **Services**: the Claude-backed classification/chat collaborator

pub mod catalog;
pub mod classify;
pub mod context;
pub mod error;
pub mod filter;
pub mod ledger;
pub mod services;
pub mod session;
pub mod types;

pub use catalog::AccountCatalog;
pub use context::ContextBlock;
pub use error::{KairosError, Result};
pub use filter::{partition, FilterStats, Partition};
pub use ledger::{FeedbackSummary, OverrideRecord, SessionLedger, SubjectKind, Vote};
pub use services::{Collaborator, CollaboratorConfig, CustomAnalysis};
pub use session::Session;
pub use types::{
    Account, AgentMode, Brief, BriefColor, ChatRole, ChatTurn, Observation, QuestionId,
    RelevanceTier, SignalCategory, SignalScore, ANALYSIS_ERROR_RISK, AUTONOMY_CONFIDENCE_FLOOR,
};
