//! Field-specific reducers for [`crate::types::GraphState`] (§2, §9).
//!
//! Each node returns a partial [`GraphStateUpdate`]; [`merge_state`] applies
//! the declared rule per field: append for logs/debate histories/tool calls,
//! shallow-merge for metadata/debate map/reports, last-write-wins for scalar
//! plans and the final result.

use crate::types::{
    AnalystReports, ConversationLogEntry, DebateMap, DebateTurn, Decision, GraphMetadata,
    GraphState, ToolCallRecord,
};

/// Partial update to [`GraphMetadata`]; every field is optional so a node can
/// touch only what it changed. Merged field-by-field (shallow merge).
#[derive(Debug, Clone, Default)]
pub struct GraphMetadataUpdate {
    pub invest_round: Option<u32>,
    pub invest_continue: Option<bool>,
    pub risk_round: Option<u32>,
    pub risk_continue: Option<bool>,
    pub manager_memories: Option<String>,
    pub trader_memories: Option<String>,
    pub risk_manager_memories: Option<String>,
    pub progress_run_id: Option<String>,
    pub decision_token: Option<String>,
    pub run_completed_at_ms: Option<i64>,
    pub execution_ms: Option<i64>,
}

/// Partial update to [`GraphState`] returned by a single node invocation.
#[derive(Debug, Clone, Default)]
pub struct GraphStateUpdate {
    pub reports: Option<AnalystReports>,
    pub investment_plan: Option<String>,
    pub trader_plan: Option<String>,
    pub final_decision: Option<String>,
    pub conversation_log: Vec<ConversationLogEntry>,
    pub debate: Option<DebateMap>,
    pub debate_history: Vec<DebateTurn>,
    pub risk_debate_history: Vec<DebateTurn>,
    pub tool_calls: Vec<ToolCallRecord>,
    pub metadata: Option<GraphMetadataUpdate>,
    pub result: Option<Decision>,
}

/// Last-write-wins merge of one [`AnalystReports`] into another: a `Some` in
/// `partial` overwrites; `None` leaves the existing value untouched.
pub fn merge_analyst_reports(base: &mut AnalystReports, partial: &AnalystReports) {
    if partial.market.is_some() {
        base.market = partial.market.clone();
    }
    if partial.news.is_some() {
        base.news = partial.news.clone();
    }
    if partial.social.is_some() {
        base.social = partial.social.clone();
    }
    if partial.fundamentals.is_some() {
        base.fundamentals = partial.fundamentals.clone();
    }
}

/// Shallow merge of one [`DebateMap`] into another: unrelated keys preserved,
/// same keys overwritten by the later write.
pub fn merge_debate_map(base: &mut DebateMap, partial: &DebateMap) {
    if partial.investment.is_some() {
        base.investment = partial.investment.clone();
    }
    if partial.bull.is_some() {
        base.bull = partial.bull.clone();
    }
    if partial.bear.is_some() {
        base.bear = partial.bear.clone();
    }
    if partial.risk.is_some() {
        base.risk = partial.risk.clone();
    }
    if partial.aggressive.is_some() {
        base.aggressive = partial.aggressive.clone();
    }
    if partial.conservative.is_some() {
        base.conservative = partial.conservative.clone();
    }
    if partial.neutral.is_some() {
        base.neutral = partial.neutral.clone();
    }
}

/// Shallow merge of a [`GraphMetadataUpdate`] into [`GraphMetadata`].
pub fn merge_metadata(base: &mut GraphMetadata, update: GraphMetadataUpdate) {
    if let Some(v) = update.invest_round {
        base.invest_round = v;
    }
    if let Some(v) = update.invest_continue {
        base.invest_continue = v;
    }
    if let Some(v) = update.risk_round {
        base.risk_round = v;
    }
    if let Some(v) = update.risk_continue {
        base.risk_continue = v;
    }
    if let Some(v) = update.manager_memories {
        base.manager_memories = v;
    }
    if let Some(v) = update.trader_memories {
        base.trader_memories = v;
    }
    if let Some(v) = update.risk_manager_memories {
        base.risk_manager_memories = v;
    }
    if let Some(v) = update.progress_run_id {
        base.progress_run_id = Some(v);
    }
    if let Some(v) = update.decision_token {
        base.decision_token = Some(v);
    }
    if let Some(v) = update.run_completed_at_ms {
        base.run_completed_at_ms = Some(v);
    }
    if let Some(v) = update.execution_ms {
        base.execution_ms = Some(v);
    }
}

/// Apply one node's partial update onto the running [`GraphState`], in place.
///
/// This is the single place the per-field reducer rules from §2/§9 are
/// enforced: callers never hand-merge state themselves.
pub fn merge_state(state: &mut GraphState, update: GraphStateUpdate) {
    if let Some(reports) = update.reports {
        merge_analyst_reports(&mut state.reports, &reports);
    }
    if update.investment_plan.is_some() {
        state.investment_plan = update.investment_plan;
    }
    if update.trader_plan.is_some() {
        state.trader_plan = update.trader_plan;
    }
    if update.final_decision.is_some() {
        state.final_decision = update.final_decision;
    }
    state.conversation_log.extend(update.conversation_log);
    if let Some(debate) = update.debate {
        merge_debate_map(&mut state.debate, &debate);
    }
    state.debate_history.extend(update.debate_history);
    state.risk_debate_history.extend(update.risk_debate_history);
    state.tool_calls.extend(update.tool_calls);
    if let Some(metadata) = update.metadata {
        merge_metadata(&mut state.metadata, metadata);
    }
    if update.result.is_some() {
        state.result = update.result;
    }
}

/// Append `"{label} (Round {round}):\n{text}"` to a running transcript,
/// separated from any prior content by a blank line (§3 "DebateMap").
pub fn append_transcript_block(existing: &Option<String>, label: &str, round: u32, text: &str) -> String {
    let block = format!("{label} (Round {round}):\n{}", text.trim());
    match existing {
        Some(prior) if !prior.is_empty() => format!("{prior}\n\n{block}"),
        _ => block,
    }
}
