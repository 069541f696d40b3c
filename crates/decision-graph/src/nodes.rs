//! Node contracts (§4.5): one function per graph node, each a pure-ish async
//! step over a `&GraphState` returning a [`GraphStateUpdate`] the driver
//! loop in `graph.rs` merges with [`decision_core::merge_state`].

use std::str::FromStr;

use chat_model::ChatModel;
use chrono::Utc;
use decision_core::{
    append_transcript_block, build_situation_summary, truncate_recommendation, Analyst,
    AnalystReports, Context, ConversationLogEntry, Decision, DebateMap, DebateTurn, DecisionToken,
    GraphMetadataUpdate, GraphState, Persona,
};
use memory_store::{PersonaVectorStore, RoleSummaryStore, SituationEmbedder};
use personas::debate::{
    bear_system_prompt, build_bear_user_message, build_bull_user_message, bull_system_prompt,
    run_bear, run_bull,
};
use personas::research_manager::{
    build_user_message as build_research_manager_user_message, run_research_manager,
    system_prompt as research_manager_system_prompt,
};
use personas::risk::{
    aggressive_system_prompt, build_aggressive_user_message, build_conservative_user_message,
    build_neutral_user_message, conservative_system_prompt, neutral_system_prompt,
    run_aggressive, run_conservative, run_neutral,
};
use personas::risk_manager::{
    build_user_message as build_risk_manager_user_message, run_risk_manager,
    system_prompt as risk_manager_system_prompt,
};
use personas::trader::{build_user_message as build_trader_user_message, run_trader};
use personas::{DebateInput, ResearchManagerInput, RiskDebateInput, RiskManagerInput, TraderInput};

use crate::analysts::run_analysts;
use crate::error::GraphResult;
use crate::extractor::DecisionExtractor;

const MANAGER_ROLE: &str = "research_manager";
const TRADER_ROLE: &str = "trader";
const RISK_MANAGER_ROLE: &str = "risk_manager";

/// A view of `Context` where each of the four primary channels is overridden
/// by the corresponding `AnalystReports` entry when non-blank (§4.5 Bear/Bull
/// "debate context").
fn debate_context(context: &Context, reports: &AnalystReports) -> Context {
    let mut ctx = context.clone();
    ctx.market_technical_report =
        personas::support::debate_context_channel(&reports.market, &context.market_technical_report).clone();
    ctx.social_reddit_summary =
        personas::support::debate_context_channel(&reports.social, &context.social_reddit_summary).clone();
    ctx.news_company =
        personas::support::debate_context_channel(&reports.news, &context.news_company).clone();
    ctx.fundamentals_summary = personas::support::debate_context_channel(
        &reports.fundamentals,
        &context.fundamentals_summary,
    )
    .clone();
    ctx
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|t| !t.trim().is_empty())
}

/// Look up a single role's memory text: role-summary store wins when
/// non-empty and `use_db_memories` is set; otherwise the persona-vector
/// store's top-3 recommendations, concatenated. Every failure degrades to an
/// empty string (§4.5 "Missing stores degrade gracefully").
async fn load_role_memory(
    role_summary_store: &dyn RoleSummaryStore,
    persona_vector_store: &dyn PersonaVectorStore,
    use_db_memories: bool,
    role: &str,
    symbol: &str,
    trade_date: &str,
    situation: &str,
) -> String {
    if use_db_memories {
        match role_summary_store.get_summary(role, symbol, trade_date).await {
            Ok(Some(text)) if !text.trim().is_empty() => return text,
            Ok(_) => {}
            Err(err) => tracing::warn!(role, error = %err, "role-summary lookup failed"),
        }
    }

    match persona_vector_store.top_k(role, symbol, situation, 3).await {
        Ok(hits) => hits.join("\n\n"),
        Err(err) => {
            tracing::warn!(role, error = %err, "persona-vector lookup failed");
            String::new()
        }
    }
}

/// LoadMemories (§4.5): two parallel fan-outs per role (role-summary store;
/// persona-vector store), all-settled.
pub async fn node_load_memories(
    state: &GraphState,
    role_summary_store: &dyn RoleSummaryStore,
    persona_vector_store: &dyn PersonaVectorStore,
    use_db_memories: bool,
) -> decision_core::GraphStateUpdate {
    let situation =
        build_situation_summary(&state.symbol, &state.trade_date, &state.context, &state.reports);

    let (manager, trader, risk_manager) = tokio::join!(
        load_role_memory(
            role_summary_store,
            persona_vector_store,
            use_db_memories,
            MANAGER_ROLE,
            &state.symbol,
            &state.trade_date,
            &situation,
        ),
        load_role_memory(
            role_summary_store,
            persona_vector_store,
            use_db_memories,
            TRADER_ROLE,
            &state.symbol,
            &state.trade_date,
            &situation,
        ),
        load_role_memory(
            role_summary_store,
            persona_vector_store,
            use_db_memories,
            RISK_MANAGER_ROLE,
            &state.symbol,
            &state.trade_date,
            &situation,
        ),
    );

    decision_core::GraphStateUpdate {
        metadata: Some(GraphMetadataUpdate {
            manager_memories: Some(manager),
            trader_memories: Some(trader),
            risk_manager_memories: Some(risk_manager),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Analysts (§4.3, §4.5): run the enabled subset, merging its outputs.
pub async fn node_analysts(
    model: &dyn ChatModel,
    state: &GraphState,
    enabled: &[Analyst],
) -> GraphResult<decision_core::GraphStateUpdate> {
    let outcome =
        run_analysts(model, &state.symbol, &state.trade_date, &state.context, enabled).await?;
    Ok(decision_core::GraphStateUpdate {
        reports: Some(outcome.reports),
        conversation_log: outcome.conversation_log,
        tool_calls: outcome.tool_calls,
        ..Default::default()
    })
}

async fn persona_reflections(
    persona_vector_store: &dyn PersonaVectorStore,
    persona: &str,
    symbol: &str,
    situation: &str,
) -> Option<String> {
    match persona_vector_store.top_k(persona, symbol, situation, 2).await {
        Ok(hits) if !hits.is_empty() => Some(hits.join("\n\n")),
        Ok(_) => None,
        Err(err) => {
            tracing::warn!(persona, error = %err, "persona reflection lookup failed");
            None
        }
    }
}

/// Bear (§4.5): argues against the position; does not touch `invest_round`.
pub async fn node_bear(
    model: &dyn ChatModel,
    persona_vector_store: &dyn PersonaVectorStore,
    state: &GraphState,
) -> GraphResult<decision_core::GraphStateUpdate> {
    let round = state.metadata.invest_round + 1;
    let context = debate_context(&state.context, &state.reports);
    let situation =
        build_situation_summary(&state.symbol, &state.trade_date, &state.context, &state.reports);
    let reflections =
        persona_reflections(persona_vector_store, "bear", &state.symbol, &situation).await;

    let input = DebateInput {
        symbol: state.symbol.clone(),
        trade_date: state.trade_date.clone(),
        context,
        history: state.debate.investment.clone(),
        opponent_argument: non_empty(state.debate.bull.clone()),
        reflections,
        round,
    };
    let text = run_bear(model, &input).await?;
    let transcript = append_transcript_block(&state.debate.investment, Persona::Bear.label(), round, &text);

    Ok(decision_core::GraphStateUpdate {
        conversation_log: vec![ConversationLogEntry {
            role_label: Persona::Bear.label().to_string(),
            system: bear_system_prompt().to_string(),
            user: build_bear_user_message(&input),
        }],
        debate: Some(DebateMap {
            investment: Some(transcript),
            bear: Some(text.trim().to_string()),
            ..Default::default()
        }),
        debate_history: vec![DebateTurn {
            persona: Persona::Bear,
            round,
            content: text.trim().to_string(),
            timestamp: Utc::now(),
        }],
        ..Default::default()
    })
}

/// Bull (§4.5): argues for the position and closes out the round by
/// incrementing `invest_round`.
pub async fn node_bull(
    model: &dyn ChatModel,
    persona_vector_store: &dyn PersonaVectorStore,
    state: &GraphState,
) -> GraphResult<decision_core::GraphStateUpdate> {
    let round = state.metadata.invest_round + 1;
    let context = debate_context(&state.context, &state.reports);
    let situation =
        build_situation_summary(&state.symbol, &state.trade_date, &state.context, &state.reports);
    let reflections =
        persona_reflections(persona_vector_store, "bull", &state.symbol, &situation).await;

    let input = DebateInput {
        symbol: state.symbol.clone(),
        trade_date: state.trade_date.clone(),
        context,
        history: state.debate.investment.clone(),
        opponent_argument: non_empty(state.debate.bear.clone()),
        reflections,
        round,
    };
    let text = run_bull(model, &input).await?;
    let transcript = append_transcript_block(&state.debate.investment, Persona::Bull.label(), round, &text);

    Ok(decision_core::GraphStateUpdate {
        conversation_log: vec![ConversationLogEntry {
            role_label: Persona::Bull.label().to_string(),
            system: bull_system_prompt().to_string(),
            user: build_bull_user_message(&input),
        }],
        debate: Some(DebateMap {
            investment: Some(transcript),
            bull: Some(text.trim().to_string()),
            ..Default::default()
        }),
        debate_history: vec![DebateTurn {
            persona: Persona::Bull,
            round,
            content: text.trim().to_string(),
            timestamp: Utc::now(),
        }],
        metadata: Some(GraphMetadataUpdate {
            invest_round: Some(round),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// `investmentShouldContinue` (§4.4): round ceiling and kill-switch.
///
/// When `debug_langgraph` is set (SPEC_FULL §10.3), traces the predicate's
/// inputs and decision at `debug` level.
pub fn investment_should_continue(
    state: &GraphState,
    max_rounds: u32,
    kill_switch_allows: bool,
    debug_langgraph: bool,
) -> bool {
    let max = max_rounds.max(1);
    let decision = state.metadata.invest_continue && kill_switch_allows && state.metadata.invest_round < max;
    if debug_langgraph {
        tracing::debug!(
            invest_round = state.metadata.invest_round,
            max_rounds = max,
            invest_continue = state.metadata.invest_continue,
            kill_switch_allows,
            decision,
            "investmentShouldContinue"
        );
    }
    decision
}

/// ResearchManager (§4.5).
pub async fn node_research_manager(
    model: &dyn ChatModel,
    state: &GraphState,
) -> GraphResult<decision_core::GraphStateUpdate> {
    let input = ResearchManagerInput {
        symbol: state.symbol.clone(),
        trade_date: state.trade_date.clone(),
        debate_history: state.debate.investment.clone(),
        reports: state.reports.clone(),
        past_memories: non_empty(Some(state.metadata.manager_memories.clone())),
    };
    let text = run_research_manager(model, &input).await?;

    Ok(decision_core::GraphStateUpdate {
        investment_plan: Some(text.clone()),
        conversation_log: vec![ConversationLogEntry {
            role_label: Persona::ResearchManager.label().to_string(),
            system: research_manager_system_prompt().to_string(),
            user: build_research_manager_user_message(&input),
        }],
        ..Default::default()
    })
}

/// Trader (§4.5).
pub async fn node_trader(
    model: &dyn ChatModel,
    state: &GraphState,
) -> GraphResult<decision_core::GraphStateUpdate> {
    let input = TraderInput {
        company: state.symbol.clone(),
        trade_date: state.trade_date.clone(),
        plan: state.investment_plan.clone(),
        reports: state.reports.clone(),
        past_memories: non_empty(Some(state.metadata.trader_memories.clone())),
    };
    let text = run_trader(model, &input).await?;

    Ok(decision_core::GraphStateUpdate {
        trader_plan: Some(text.clone()),
        conversation_log: vec![ConversationLogEntry {
            role_label: Persona::Trader.label().to_string(),
            system: personas::trader::system_prompt().to_string(),
            user: build_trader_user_message(&input),
        }],
        ..Default::default()
    })
}

fn risk_debate_input(state: &GraphState, round: u32) -> RiskDebateInput {
    RiskDebateInput {
        symbol: state.symbol.clone(),
        trade_date: state.trade_date.clone(),
        trader_plan: state.trader_plan.clone(),
        history: state.debate.risk.clone(),
        round,
        last_aggressive: non_empty(state.debate.aggressive.clone()),
        last_conservative: non_empty(state.debate.conservative.clone()),
        last_neutral: non_empty(state.debate.neutral.clone()),
    }
}

/// Aggressive (§4.5): first turn of a risk-debate round.
pub async fn node_aggressive(
    model: &dyn ChatModel,
    state: &GraphState,
) -> GraphResult<decision_core::GraphStateUpdate> {
    let round = state.metadata.risk_round + 1;
    let input = risk_debate_input(state, round);
    let text = run_aggressive(model, &input).await?;
    let transcript = append_transcript_block(&state.debate.risk, Persona::Aggressive.label(), round, &text);

    Ok(decision_core::GraphStateUpdate {
        conversation_log: vec![ConversationLogEntry {
            role_label: Persona::Aggressive.label().to_string(),
            system: aggressive_system_prompt().to_string(),
            user: build_aggressive_user_message(&input),
        }],
        debate: Some(DebateMap {
            risk: Some(transcript),
            aggressive: Some(text.trim().to_string()),
            ..Default::default()
        }),
        risk_debate_history: vec![DebateTurn {
            persona: Persona::Aggressive,
            round,
            content: text.trim().to_string(),
            timestamp: Utc::now(),
        }],
        ..Default::default()
    })
}

/// Conservative (§4.5): second turn of a risk-debate round.
pub async fn node_conservative(
    model: &dyn ChatModel,
    state: &GraphState,
) -> GraphResult<decision_core::GraphStateUpdate> {
    let round = state.metadata.risk_round + 1;
    let input = risk_debate_input(state, round);
    let text = run_conservative(model, &input).await?;
    let transcript = append_transcript_block(&state.debate.risk, Persona::Conservative.label(), round, &text);

    Ok(decision_core::GraphStateUpdate {
        conversation_log: vec![ConversationLogEntry {
            role_label: Persona::Conservative.label().to_string(),
            system: conservative_system_prompt().to_string(),
            user: build_conservative_user_message(&input),
        }],
        debate: Some(DebateMap {
            risk: Some(transcript),
            conservative: Some(text.trim().to_string()),
            ..Default::default()
        }),
        risk_debate_history: vec![DebateTurn {
            persona: Persona::Conservative,
            round,
            content: text.trim().to_string(),
            timestamp: Utc::now(),
        }],
        ..Default::default()
    })
}

/// Neutral (§4.5): closes out the risk-debate round by incrementing `risk_round`.
pub async fn node_neutral(
    model: &dyn ChatModel,
    state: &GraphState,
) -> GraphResult<decision_core::GraphStateUpdate> {
    let round = state.metadata.risk_round + 1;
    let input = risk_debate_input(state, round);
    let text = run_neutral(model, &input).await?;
    let transcript = append_transcript_block(&state.debate.risk, Persona::Neutral.label(), round, &text);

    Ok(decision_core::GraphStateUpdate {
        conversation_log: vec![ConversationLogEntry {
            role_label: Persona::Neutral.label().to_string(),
            system: neutral_system_prompt().to_string(),
            user: build_neutral_user_message(&input),
        }],
        debate: Some(DebateMap {
            risk: Some(transcript),
            neutral: Some(text.trim().to_string()),
            ..Default::default()
        }),
        risk_debate_history: vec![DebateTurn {
            persona: Persona::Neutral,
            round,
            content: text.trim().to_string(),
            timestamp: Utc::now(),
        }],
        metadata: Some(GraphMetadataUpdate {
            risk_round: Some(round),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// `riskShouldContinue` (§4.4): symmetric to [`investment_should_continue`].
pub fn risk_should_continue(
    state: &GraphState,
    max_rounds: u32,
    kill_switch_allows: bool,
    debug_langgraph: bool,
) -> bool {
    let max = max_rounds.max(1);
    let decision = state.metadata.risk_continue && kill_switch_allows && state.metadata.risk_round < max;
    if debug_langgraph {
        tracing::debug!(
            risk_round = state.metadata.risk_round,
            max_rounds = max,
            risk_continue = state.metadata.risk_continue,
            kill_switch_allows,
            decision,
            "riskShouldContinue"
        );
    }
    decision
}

/// RiskManager (§4.5, §4.6): renders the final verdict prose, then reduces
/// it to a canonical decision token.
pub async fn node_risk_manager(
    model: &dyn ChatModel,
    extractor: &DecisionExtractor,
    state: &GraphState,
) -> GraphResult<decision_core::GraphStateUpdate> {
    let input = RiskManagerInput {
        symbol: state.symbol.clone(),
        trade_date: state.trade_date.clone(),
        trader_plan: state.trader_plan.clone(),
        risk_debate: state.debate.risk.clone(),
        reports: state.reports.clone(),
        past_memories: non_empty(Some(state.metadata.risk_manager_memories.clone())),
    };
    let text = run_risk_manager(model, &input).await?;
    let token = extractor.extract(&text).await;

    Ok(decision_core::GraphStateUpdate {
        final_decision: Some(text.clone()),
        conversation_log: vec![ConversationLogEntry {
            role_label: Persona::RiskManager.label().to_string(),
            system: risk_manager_system_prompt().to_string(),
            user: build_risk_manager_user_message(&input),
        }],
        metadata: Some(GraphMetadataUpdate {
            decision_token: Some(token.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// PersistMemories (§4.5): best-effort, all-settled writes for the three
/// persona-vector-scoped memories. Failures never fail the run.
pub async fn node_persist_memories(
    persona_vector_store: &dyn PersonaVectorStore,
    situation_embedder: &dyn SituationEmbedder,
    state: &GraphState,
) {
    let situation =
        build_situation_summary(&state.symbol, &state.trade_date, &state.context, &state.reports);
    let embedding = situation_embedder.embed(&situation);

    let writes: Vec<(&str, Option<String>)> = vec![
        (MANAGER_ROLE, state.investment_plan.clone()),
        (TRADER_ROLE, state.trader_plan.clone()),
        (
            RISK_MANAGER_ROLE,
            state.final_decision.clone().map(|prose| {
                let token = state
                    .metadata
                    .decision_token
                    .clone()
                    .unwrap_or_else(|| DecisionToken::NoDecision.to_string());
                format!("[{token}] {prose}")
            }),
        ),
    ];

    let futures = writes.into_iter().filter_map(|(persona, prose)| {
        let prose = prose?;
        let recommendation = truncate_recommendation(&prose, 240);
        let memory = memory_store::new_persona_memory(
            persona,
            state.symbol.clone(),
            state.trade_date.clone(),
            situation.clone(),
            recommendation,
            embedding.clone(),
        );
        Some(async move {
            if let Err(err) = persona_vector_store.insert(memory).await {
                tracing::warn!(persona, error = %err, "persona memory write failed");
            }
        })
    });

    futures::future::join_all(futures).await;
}

fn synthesize_transcript(running: &Option<String>, parts: &[(&str, &Option<String>)]) -> Option<String> {
    if let Some(text) = running {
        if !text.trim().is_empty() {
            return Some(text.clone());
        }
    }
    let blocks: Vec<String> = parts
        .iter()
        .filter_map(|(label, value)| {
            value
                .as_ref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| format!("{label}:\n{}", v.trim()))
        })
        .collect();
    if blocks.is_empty() {
        None
    } else {
        Some(blocks.join("\n\n"))
    }
}

/// Finalize (§4.5): assemble the `Decision`, then best-effort persist the
/// prompt log, eval summary, and decision row.
pub async fn finalize_decision(state: &GraphState, now_ms: i64) -> Decision {
    let enabled = &state.metadata.enabled_analysts;
    let has = |a: Analyst| enabled.contains(&a);

    let decision_token = state
        .metadata
        .decision_token
        .as_deref()
        .and_then(|s| DecisionToken::from_str(s).ok())
        .unwrap_or(DecisionToken::NoDecision);

    let investment_debate = synthesize_transcript(
        &state.debate.investment,
        &[("Bear", &state.debate.bear), ("Bull", &state.debate.bull)],
    );
    let risk_debate = synthesize_transcript(
        &state.debate.risk,
        &[
            ("Aggressive", &state.debate.aggressive),
            ("Conservative", &state.debate.conservative),
            ("Neutral", &state.debate.neutral),
        ],
    );

    Decision {
        symbol: state.symbol.clone(),
        trade_date: state.trade_date.clone(),
        decision: decision_token,
        final_trade_decision: decision_token,
        investment_plan: state.investment_plan.clone(),
        trader_plan: state.trader_plan.clone(),
        investment_judge: state.investment_plan.clone(),
        risk_judge: state.final_decision.clone(),
        model_id: state.metadata.model_id.clone(),
        analysts: enabled.clone(),
        execution_ms: Some(now_ms - state.metadata.run_started_at_ms),

        market_report: has(Analyst::Market).then(|| state.reports.market.clone()).flatten(),
        sentiment_report: has(Analyst::Social).then(|| state.reports.social.clone()).flatten(),
        news_report: has(Analyst::News).then(|| state.reports.news.clone()).flatten(),
        fundamentals_report: has(Analyst::Fundamentals)
            .then(|| state.reports.fundamentals.clone())
            .flatten(),

        investment_debate,
        bull_argument: non_empty(state.debate.bull.clone()),
        bear_argument: non_empty(state.debate.bear.clone()),
        aggressive_argument: non_empty(state.debate.aggressive.clone()),
        conservative_argument: non_empty(state.debate.conservative.clone()),
        neutral_argument: non_empty(state.debate.neutral.clone()),
        risk_debate,
    }
}
