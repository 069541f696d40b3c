use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// One of the twelve named personas that can produce a single LLM turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Persona {
    MarketAnalyst,
    NewsAnalyst,
    SocialAnalyst,
    FundamentalsAnalyst,
    Bull,
    Bear,
    ResearchManager,
    Trader,
    Aggressive,
    Conservative,
    Neutral,
    RiskManager,
}

impl Persona {
    pub fn label(&self) -> &'static str {
        match self {
            Persona::MarketAnalyst => "Market Analyst",
            Persona::NewsAnalyst => "News Analyst",
            Persona::SocialAnalyst => "Social Analyst",
            Persona::FundamentalsAnalyst => "Fundamentals Analyst",
            Persona::Bull => "Bull",
            Persona::Bear => "Bear",
            Persona::ResearchManager => "Research Manager",
            Persona::Trader => "Trader",
            Persona::Aggressive => "Aggressive",
            Persona::Conservative => "Conservative",
            Persona::Neutral => "Neutral",
            Persona::RiskManager => "Risk Manager",
        }
    }
}

/// One of the four analyst personas that can be individually enabled/disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Analyst {
    Market,
    Social,
    News,
    Fundamentals,
}

impl Analyst {
    /// Order analysts are *run* in by the analyst sub-graph (§4.3).
    pub const EXECUTION_ORDER: [Analyst; 4] = [
        Analyst::Market,
        Analyst::News,
        Analyst::Social,
        Analyst::Fundamentals,
    ];

    /// Canonical order the *enabled set* is normalized to for output (§6).
    pub const CANONICAL_ORDER: [Analyst; 4] = [
        Analyst::Market,
        Analyst::Social,
        Analyst::News,
        Analyst::Fundamentals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Analyst::Market => "market",
            Analyst::Social => "social",
            Analyst::News => "news",
            Analyst::Fundamentals => "fundamentals",
        }
    }
}

impl FromStr for Analyst {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "market" => Ok(Analyst::Market),
            "social" => Ok(Analyst::Social),
            "news" => Ok(Analyst::News),
            "fundamentals" | "fundamental" => Ok(Analyst::Fundamentals),
            other => Err(CoreError::InvalidAnalyst(other.to_string())),
        }
    }
}

/// Normalize a raw analyst list into the canonical order, case-insensitively,
/// dropping unknown entries. An empty or all-unknown input yields the default
/// (full) set, per §6: "empty -> default set".
pub fn normalize_analysts<S: AsRef<str>>(raw: &[S]) -> Vec<Analyst> {
    let mut parsed: Vec<Analyst> = raw
        .iter()
        .filter_map(|s| Analyst::from_str(s.as_ref()).ok())
        .collect();

    if parsed.is_empty() {
        parsed = Analyst::CANONICAL_ORDER.to_vec();
    }

    Analyst::CANONICAL_ORDER
        .iter()
        .copied()
        .filter(|a| parsed.contains(a))
        .collect()
}

/// Canonical verdict. `NoDecision` is the fallback when no token can be
/// extracted with confidence (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionToken {
    Buy,
    Sell,
    Hold,
    NoDecision,
}

impl fmt::Display for DecisionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecisionToken::Buy => "BUY",
            DecisionToken::Sell => "SELL",
            DecisionToken::Hold => "HOLD",
            DecisionToken::NoDecision => "NO DECISION",
        };
        write!(f, "{s}")
    }
}

impl FromStr for DecisionToken {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(DecisionToken::Buy),
            "SELL" => Ok(DecisionToken::Sell),
            "HOLD" => Ok(DecisionToken::Hold),
            "NO DECISION" | "NO_DECISION" => Ok(DecisionToken::NoDecision),
            other => Err(CoreError::InvalidDecisionToken(other.to_string())),
        }
    }
}

/// Input bundle of pre-fetched reports per channel (§3 "Context").
/// Missing or blank channels mean "not preloaded; fetch via tool".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Context {
    pub market_technical_report: Option<String>,
    pub social_reddit_summary: Option<String>,
    pub news_company: Option<String>,
    pub news_global: Option<String>,
    pub fundamentals_summary: Option<String>,

    // Supplementary channels.
    pub news_reddit: Option<String>,
    pub market_price_history: Option<String>,
    pub fundamentals_balance_sheet: Option<String>,
    pub fundamentals_cashflow: Option<String>,
    pub fundamentals_income_stmt: Option<String>,
    pub fundamentals_insider_transactions: Option<String>,
}

/// A channel is "preloaded" only if present and non-blank.
pub fn is_preloaded(value: &Option<String>) -> bool {
    matches!(value, Some(s) if !s.trim().is_empty())
}

/// Per-analyst produced report text, one slot per analyst persona.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalystReports {
    pub market: Option<String>,
    pub news: Option<String>,
    pub social: Option<String>,
    pub fundamentals: Option<String>,
}

impl AnalystReports {
    pub fn get(&self, analyst: Analyst) -> &Option<String> {
        match analyst {
            Analyst::Market => &self.market,
            Analyst::News => &self.news,
            Analyst::Social => &self.social,
            Analyst::Fundamentals => &self.fundamentals,
        }
    }

    pub fn set(&mut self, analyst: Analyst, value: String) {
        match analyst {
            Analyst::Market => self.market = Some(value),
            Analyst::News => self.news = Some(value),
            Analyst::Social => self.social = Some(value),
            Analyst::Fundamentals => self.fundamentals = Some(value),
        }
    }
}

/// Running debate transcripts and per-persona latest turns (§3 "DebateMap").
/// Modeled as a struct with explicit nullable fields rather than an open
/// dictionary, per the REDESIGN FLAGS guidance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebateMap {
    /// Cumulative investment-debate transcript ("{Role} (Round N):\n{text}" blocks).
    pub investment: Option<String>,
    pub bull: Option<String>,
    pub bear: Option<String>,
    /// Cumulative risk-debate transcript.
    pub risk: Option<String>,
    pub aggressive: Option<String>,
    pub conservative: Option<String>,
    pub neutral: Option<String>,
}

/// One entry in an append-only debate history (§3 "DebateRoundEntry").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateTurn {
    pub persona: Persona,
    pub round: u32,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// One entry in the conversation log (§3 "ConversationLogEntry") — exactly
/// one is emitted per LLM turn (invariant I1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationLogEntry {
    pub role_label: String,
    pub system: String,
    pub user: String,
}

impl ConversationLogEntry {
    pub fn is_well_formed(&self) -> bool {
        !self.role_label.trim().is_empty()
            && !self.system.trim().is_empty()
            && !self.user.trim().is_empty()
    }
}

/// One recorded tool call made by an analyst persona (§4.3, §11.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub persona: Persona,
    pub tool: String,
    pub args: serde_json::Value,
    pub result_summary: String,
    pub timestamp: DateTime<Utc>,
}

/// The original request that started the run, retained in metadata for the
/// persisted decision row's payload blob (§6, §10.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub symbol: String,
    pub trade_date: String,
    pub context: Context,
    pub model_id: Option<String>,
    pub analysts: Option<Vec<String>>,
}

/// Options that can override payload fields at invocation time (§6).
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub run_id: Option<String>,
    pub model_id: Option<String>,
    pub analysts: Option<Vec<String>>,
}

/// Open-ended graph metadata (§3 "GraphMetadata"), typed rather than a
/// dynamic map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub invest_round: u32,
    pub invest_continue: bool,
    pub risk_round: u32,
    pub risk_continue: bool,
    pub manager_memories: String,
    pub trader_memories: String,
    pub risk_manager_memories: String,
    pub progress_run_id: Option<String>,
    pub model_id: String,
    pub enabled_analysts: Vec<Analyst>,
    pub decision_token: Option<String>,
    pub run_started_at_ms: i64,
    pub run_completed_at_ms: Option<i64>,
    pub execution_ms: Option<i64>,
    pub payload: Option<Request>,
}

impl GraphMetadata {
    pub fn new(model_id: String, enabled_analysts: Vec<Analyst>, run_started_at_ms: i64) -> Self {
        Self {
            invest_round: 0,
            invest_continue: true,
            risk_round: 0,
            risk_continue: true,
            manager_memories: String::new(),
            trader_memories: String::new(),
            risk_manager_memories: String::new(),
            progress_run_id: None,
            model_id,
            enabled_analysts,
            decision_token: None,
            run_started_at_ms,
            run_completed_at_ms: None,
            execution_ms: None,
            payload: None,
        }
    }
}

/// Full per-run state threaded through the decision graph (§3 "GraphState").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphState {
    pub context: Context,
    pub symbol: String,
    pub trade_date: String,
    pub reports: AnalystReports,
    pub investment_plan: Option<String>,
    pub trader_plan: Option<String>,
    pub final_decision: Option<String>,
    pub conversation_log: Vec<ConversationLogEntry>,
    pub debate: DebateMap,
    pub debate_history: Vec<DebateTurn>,
    pub risk_debate_history: Vec<DebateTurn>,
    pub tool_calls: Vec<ToolCallRecord>,
    pub metadata: GraphMetadata,
    pub result: Option<Decision>,
}

impl GraphState {
    pub fn new(
        symbol: String,
        trade_date: String,
        context: Context,
        metadata: GraphMetadata,
    ) -> Self {
        Self {
            context,
            symbol,
            trade_date,
            reports: AnalystReports::default(),
            investment_plan: None,
            trader_plan: None,
            final_decision: None,
            conversation_log: Vec::new(),
            debate: DebateMap::default(),
            debate_history: Vec::new(),
            risk_debate_history: Vec::new(),
            tool_calls: Vec::new(),
            metadata,
            result: None,
        }
    }
}

/// Final output of a run (§3 "Decision").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub symbol: String,
    pub trade_date: String,
    pub decision: DecisionToken,
    pub final_trade_decision: DecisionToken,
    pub investment_plan: Option<String>,
    pub trader_plan: Option<String>,
    pub investment_judge: Option<String>,
    pub risk_judge: Option<String>,
    pub model_id: String,
    pub analysts: Vec<Analyst>,
    pub execution_ms: Option<i64>,

    pub market_report: Option<String>,
    pub sentiment_report: Option<String>,
    pub news_report: Option<String>,
    pub fundamentals_report: Option<String>,

    pub investment_debate: Option<String>,
    pub bull_argument: Option<String>,
    pub bear_argument: Option<String>,
    pub aggressive_argument: Option<String>,
    pub conservative_argument: Option<String>,
    pub neutral_argument: Option<String>,
    pub risk_debate: Option<String>,
}

/// Long-term, persona-scoped memory row (§3 "PersonaMemory", external entity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaMemory {
    pub persona: String,
    pub symbol: String,
    pub date: String,
    pub situation: String,
    pub recommendation: String,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

/// Truncate a recommendation string to 240 chars at a char boundary, as
/// required when persisting persona memories (§4.5 PersistMemories).
pub fn truncate_recommendation(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

/// Check that a raw string round-trips through [`DecisionToken`].
pub fn is_canonical_decision(s: &str) -> CoreResult<DecisionToken> {
    DecisionToken::from_str(s)
}
