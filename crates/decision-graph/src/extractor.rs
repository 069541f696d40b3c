use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use chat_model::{ChatMessage, ChatModel};
use decision_core::DecisionToken;
use regex::Regex;

const EXTRACTOR_SYSTEM_PROMPT: &str =
    "Reply with only one word: BUY, SELL, or HOLD. No punctuation, no explanation.";

/// Reduces risk-manager prose to a canonical [`DecisionToken`] (§4.6, C5).
///
/// Two ordered strategies: a temperature-0 LLM call that must answer with a
/// bare `BUY`/`SELL`/`HOLD`, falling back to a deterministic text pass when
/// the model doesn't comply.
pub struct DecisionExtractor {
    model: Arc<dyn ChatModel>,
}

impl DecisionExtractor {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn extract(&self, prose: &str) -> DecisionToken {
        let messages = vec![
            ChatMessage::system(EXTRACTOR_SYSTEM_PROMPT),
            ChatMessage::human(prose.to_string()),
        ];
        if let Ok(reply) = self.model.invoke(&messages).await {
            if let Some(token) = accept_single_word_reply(&reply) {
                return token;
            }
        }
        fallback(prose)
    }
}

/// Accept the LLM's reply iff it is, once trimmed, exactly one of the three
/// canonical uppercase tokens.
fn accept_single_word_reply(reply: &str) -> Option<DecisionToken> {
    match reply.trim() {
        "BUY" => Some(DecisionToken::Buy),
        "SELL" => Some(DecisionToken::Sell),
        "HOLD" => Some(DecisionToken::Hold),
        _ => None,
    }
}

/// Deterministic fallback (§4.6 (a)-(c)): an explicit "Final Recommendation:"
/// style header wins first; otherwise the last whole-word BUY/SELL/HOLD
/// token anywhere in the text; otherwise `NO DECISION`.
pub fn fallback(text: &str) -> DecisionToken {
    header_match(text)
        .or_else(|| last_token_match(text))
        .unwrap_or(DecisionToken::NoDecision)
}

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^\s*#*\s*Final\s+(?:Recommendation|Decision|Verdict)\s*[:-]\s*\**\s*(BUY|SELL|HOLD)\s*\**")
            .expect("header regex is valid")
    })
}

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(BUY|SELL|HOLD)\b").expect("token regex is valid"))
}

fn header_match(text: &str) -> Option<DecisionToken> {
    header_regex()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| DecisionToken::from_str(&m.as_str().to_ascii_uppercase()).ok())
}

fn last_token_match(text: &str) -> Option<DecisionToken> {
    token_regex()
        .find_iter(text)
        .last()
        .and_then(|m| DecisionToken::from_str(&m.as_str().to_ascii_uppercase()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_model::MockChatModel;

    #[tokio::test]
    async fn accepts_a_clean_single_word_llm_reply() {
        let extractor = DecisionExtractor::new(Arc::new(MockChatModel::new("BUY")));
        assert_eq!(extractor.extract("anything").await, DecisionToken::Buy);
    }

    #[tokio::test]
    async fn falls_back_to_header_regex_when_llm_reply_is_not_a_bare_token() {
        let extractor = DecisionExtractor::new(Arc::new(MockChatModel::new("I think it's complicated")));
        let token = extractor.extract("Final Recommendation: BUY").await;
        assert_eq!(token, DecisionToken::Buy);
    }

    // R1
    #[test]
    fn header_match_extracts_final_recommendation() {
        assert_eq!(fallback("Final Recommendation: BUY"), DecisionToken::Buy);
    }

    // R1: last-token-wins when no explicit header is present.
    #[test]
    fn last_token_wins_without_a_header() {
        assert_eq!(
            fallback("We discussed BUY and SELL but recommend HOLD."),
            DecisionToken::Hold
        );
    }

    // B3
    #[test]
    fn no_tokens_present_yields_no_decision() {
        assert_eq!(fallback("We remain cautious and see no clear edge."), DecisionToken::NoDecision);
    }

    #[test]
    fn header_match_is_case_insensitive_and_tolerates_markdown() {
        assert_eq!(fallback("## final decision: **sell**"), DecisionToken::Sell);
    }
}
