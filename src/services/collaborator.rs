//! External classification/chat collaborator
//!
//! Provides integration with Claude for:
//! - Ad hoc (custom) question classification: one tier/insight per
//!   observation plus a synthesized brief
//! - Free-form follow-up chat grounded in the filtered context block
//!
//! The collaborator is an opaque boundary: responses may arrive wrapped in
//! prose or code fences, and any transport, timeout, or parse failure is
//! surfaced as a `Classification` error for the session to degrade from.

use crate::error::{KairosError, Result};
use crate::types::{Account, Brief, ChatRole, ChatTurn, SignalScore};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::debug;

const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Max tokens for follow-up chat replies (classification uses the
/// configured budget)
const CHAT_MAX_TOKENS: usize = 1000;

/// Configuration for the collaborator service
#[derive(Debug, Clone)]
pub struct CollaboratorConfig {
    /// Anthropic API key
    pub api_key: String,

    /// Model to use
    pub model: String,

    /// Max tokens for classification responses
    pub max_tokens: usize,

    /// Temperature for sampling
    pub temperature: f32,

    /// Bounded per-request timeout; a timeout behaves like a parse failure
    pub timeout: Duration,

    /// Messages API endpoint
    pub endpoint: String,
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            api_key: env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 2000,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// Classification/chat collaborator backed by the Anthropic messages API
pub struct Collaborator {
    config: CollaboratorConfig,
    client: reqwest::Client,
}

/// Anthropic API message format
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: usize,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Anthropic API response format
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    text: String,
}

/// Parsed custom-question classification: a synthesized brief plus one
/// score per observation index
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAnalysis {
    #[serde(flatten)]
    pub brief: Brief,

    #[serde(default)]
    pub signal_scores: Vec<SignalScore>,
}

impl Collaborator {
    /// Create a new collaborator with custom config
    pub fn new(config: CollaboratorConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(KairosError::Config(
                "ANTHROPIC_API_KEY not set".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { config, client })
    }

    /// Create with default config
    pub fn with_default() -> Result<Self> {
        Self::new(CollaboratorConfig::default())
    }

    /// Classify the account's full observation set against a free-text
    /// question. Returns one tier/insight per observation index plus a
    /// synthesized brief; any failure is a `Classification` error.
    pub async fn classify(&self, account: &Account, question: &str) -> Result<CustomAnalysis> {
        debug!(account = %account.id, "requesting custom classification");

        let system = classification_prompt(account);
        let messages = vec![Message {
            role: "user".to_string(),
            content: question.to_string(),
        }];
        let text = self
            .call_api(system, messages, self.config.max_tokens)
            .await?;

        parse_analysis(&text)
    }

    /// One follow-up chat turn. The full prior transcript is replayed; the
    /// reply is grounded in the filtered context block and the active brief.
    pub async fn chat(
        &self,
        account_name: &str,
        context_text: &str,
        brief: Option<&Brief>,
        transcript: &[ChatTurn],
        user_message: &str,
    ) -> Result<String> {
        debug!(account = account_name, turns = transcript.len(), "chat turn");

        let system = chat_prompt(account_name, context_text, brief);
        let mut messages: Vec<Message> = transcript
            .iter()
            .map(|turn| Message {
                role: match turn.role {
                    ChatRole::User => "user".to_string(),
                    ChatRole::Assistant => "assistant".to_string(),
                },
                content: turn.text.clone(),
            })
            .collect();
        messages.push(Message {
            role: "user".to_string(),
            content: user_message.to_string(),
        });

        self.call_api(system, messages, CHAT_MAX_TOKENS).await
    }

    /// Make an API call, returning the concatenated text blocks
    async fn call_api(
        &self,
        system: String,
        messages: Vec<Message>,
        max_tokens: usize,
    ) -> Result<String> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens,
            temperature: self.config.temperature,
            system,
            messages,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| KairosError::Classification(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(KairosError::Classification(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }

        let api_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| KairosError::Classification(format!("failed to parse response: {}", e)))?;

        let text: String = api_response
            .content
            .iter()
            .map(|c| c.text.as_str())
            .collect();
        if text.is_empty() {
            return Err(KairosError::Classification(
                "empty response from API".to_string(),
            ));
        }
        Ok(text)
    }
}

/// System prompt for custom-question classification: account metadata, all
/// observation triples, and the exact JSON contract
fn classification_prompt(account: &Account) -> String {
    let data_lines: Vec<String> = account
        .observations
        .iter()
        .map(|o| format!("[{}] {}: {}", o.category, o.metric, o.value))
        .collect();
    let n = account.observations.len();

    format!(
        r#"You are a customer behavior intelligence agent. You are analyzing data for {name} ({industry}, ARR: {arr}, renewal in {renewal_in}).

Here is the raw customer data:
{data}

The user is asking a specific question about this customer's behavior 6 months into the future. Analyze the data and respond in EXACTLY this JSON format (no markdown, no backticks):
{{"title":"BRIEF TITLE","risk":"Risk/status label","prob":"Key metric or probability","color":"red|green|orange","factors":["factor 1","factor 2","factor 3","factor 4"],"actions":["action 1","action 2","action 3","action 4"],"actionImpacts":[{{"text":"Impact 1","math":"Calculation 1"}},{{"text":"Impact 2","math":"Calculation 2"}},{{"text":"Impact 3","math":"Calculation 3"}},{{"text":"Impact 4","math":"Calculation 4"}}],"confidence":85,"timeline":"Timeline recommendation","signalScores":[{{"idx":0,"signal":"high|medium|low|noise","insight":"Why this signal matters for this question"}},{{"idx":1,"signal":"noise","insight":"Not relevant"}}]}}

Include signalScores for ALL {n} data points (idx 0-{last}). Be specific and quantitative in your analysis."#,
        name = account.name,
        industry = account.industry,
        arr = account.arr,
        renewal_in = account.renewal_in,
        data = data_lines.join("\n"),
        n = n,
        last = n.saturating_sub(1),
    )
}

/// System prompt for follow-up chat: filtered context plus brief summary
fn chat_prompt(account_name: &str, context_text: &str, brief: Option<&Brief>) -> String {
    let (risk, prob, factors, actions, timeline) = match brief {
        Some(b) => (
            b.risk.as_str(),
            b.prob.as_str(),
            b.factors.join("; "),
            b.actions.join("; "),
            b.timeline.as_str(),
        ),
        None => ("N/A", "N/A", "N/A".to_string(), "N/A".to_string(), "N/A"),
    };

    format!(
        "You are a Customer Behavior Intelligence Agent. You have access to the following filtered customer data for {account_name}:\n\n{context_text}\n\nThe intelligence brief produced:\nAssessment: {risk} ({prob})\nKey Factors: {factors}\nRecommended Actions: {actions}\nTimeline: {timeline}\n\nAnswer the user's questions based on this data. Be specific, actionable, and concise. If asked about data you don't have, say so honestly."
    )
}

/// Strip known code-fence markers before JSON parsing. The collaborator
/// sometimes wraps its JSON in ```json fences despite instructions.
pub fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse a raw collaborator classification response. Any JSON failure is a
/// `Classification` error; the caller substitutes a degraded brief.
pub fn parse_analysis(text: &str) -> Result<CustomAnalysis> {
    let clean = strip_fences(text);
    serde_json::from_str(&clean)
        .map_err(|e| KairosError::Classification(format!("unparsable classification: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BriefColor, RelevanceTier};

    const VALID_REPLY: &str = r#"{"title":"SEAT GROWTH OUTLOOK","risk":"LIKELY GROWTH","prob":"74%","color":"green","factors":["f1","f2","f3","f4"],"actions":["a1","a2","a3","a4"],"actionImpacts":[{"text":"t1","math":"m1"}],"confidence":88,"timeline":"This quarter","signalScores":[{"idx":0,"signal":"high","insight":"strong"},{"idx":1,"signal":"noise","insight":"not relevant"}]}"#;

    #[test]
    fn test_parse_plain_json() {
        let analysis = parse_analysis(VALID_REPLY).unwrap();
        assert_eq!(analysis.brief.risk, "LIKELY GROWTH");
        assert_eq!(analysis.brief.confidence, 88);
        assert_eq!(analysis.brief.color, BriefColor::Green);
        assert_eq!(analysis.signal_scores.len(), 2);
        assert_eq!(analysis.signal_scores[0].signal, RelevanceTier::High);
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("Here is the analysis:\n```json\n{}\n```", VALID_REPLY);
        // Leading prose would still break parsing; fences alone must not
        let fenced_only = format!("```json\n{}\n```", VALID_REPLY);
        assert!(parse_analysis(&fenced_only).is_ok());
        assert!(parse_analysis(&fenced).is_err());
    }

    #[test]
    fn test_parse_unknown_color_falls_back_to_neutral() {
        let reply = VALID_REPLY.replace("\"green\"", "\"magenta\"");
        let analysis = parse_analysis(&reply).unwrap();
        assert_eq!(analysis.brief.color, BriefColor::Neutral);
    }

    #[test]
    fn test_parse_missing_signal_scores_defaults_empty() {
        let reply = r#"{"title":"T","risk":"R","prob":"P","color":"red","factors":[],"actions":[],"confidence":10,"timeline":"soon"}"#;
        let analysis = parse_analysis(reply).unwrap();
        assert!(analysis.signal_scores.is_empty());
        assert!(analysis.brief.action_impacts.is_empty());
    }

    #[test]
    fn test_parse_non_json_is_classification_error() {
        let err = parse_analysis("I'm sorry, I can't help with that.").unwrap_err();
        assert!(matches!(err, KairosError::Classification(_)));
    }

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let config = CollaboratorConfig {
            api_key: String::new(),
            ..CollaboratorConfig::default()
        };
        assert!(matches!(
            Collaborator::new(config),
            Err(KairosError::Config(_))
        ));
    }

    #[tokio::test]
    #[ignore] // Requires ANTHROPIC_API_KEY
    async fn test_classify_live() {
        let collaborator = Collaborator::with_default().unwrap();
        let catalog = crate::catalog::AccountCatalog::embedded().unwrap();
        let account = catalog.get("pinnacle").unwrap();

        let analysis = collaborator
            .classify(account, "Will they respond to a pricing concession?")
            .await
            .unwrap();

        assert!(!analysis.brief.risk.is_empty());
        assert_eq!(analysis.signal_scores.len(), account.observations.len());
    }
}
