//! C7: the compiled decision graph. `run_decision_graph` is the crate's
//! single public entry point; everything else here is the hand-built
//! adjacency the spec's redesign notes call for — a fixed node order plus
//! two predicate-gated loops, not a runtime-interpreted graph.

use std::sync::Arc;

use chat_model::{ChatModel, ChatModelFactory};
use chrono::Utc;
use decision_core::{merge_state, normalize_analysts, Decision, GraphMetadata, GraphState, Request, RunOptions};
use memory_store::{PersonaVectorStore, RoleSummaryStore, SituationEmbedder};
use persistence::{DecisionRepository, DecisionRow, EvalSummary, EvalSummarySink, PromptLogEntry, PromptLogSink};
use progress::{ProgressEvent, ProgressPublisher, Stage};

use crate::analysts::ToolCallSink;
use crate::config::EngineConfig;
use crate::control::RunControl;
use crate::error::{GraphError, GraphResult};
use crate::extractor::DecisionExtractor;
use crate::nodes::{
    finalize_decision, investment_should_continue, node_aggressive, node_analysts, node_bear,
    node_bull, node_conservative, node_load_memories, node_neutral, node_persist_memories,
    node_research_manager, node_risk_manager, node_trader, risk_should_continue,
};

/// Resolves a model id (plus a temperature) to a concrete [`ChatModel`].
/// Production callers wrap [`ChatModelFactory`]; tests wrap a fixed
/// [`chat_model::MockChatModel`] so the graph never has to know it's under
/// test.
pub trait ChatModelSource: Send + Sync {
    fn create_chat_model(&self, model_id: &str, temperature: f32) -> GraphResult<Arc<dyn ChatModel>>;
}

impl ChatModelSource for ChatModelFactory {
    fn create_chat_model(&self, model_id: &str, temperature: f32) -> GraphResult<Arc<dyn ChatModel>> {
        Ok(ChatModelFactory::create_chat_model(self, model_id, temperature)?)
    }
}

/// Every collaborator the graph needs, injected by the caller (§9: "the
/// engine is oblivious to transport"). Production callers supply real
/// implementations; tests supply in-memory ones.
pub struct GraphDependencies {
    pub chat_model_source: Arc<dyn ChatModelSource>,
    pub role_summary_store: Arc<dyn RoleSummaryStore>,
    pub persona_vector_store: Arc<dyn PersonaVectorStore>,
    /// Turns a situation summary into the vector stored alongside each
    /// persona memory (§3 `PersonaMemory.embedding`, §9 "Embedding model is a
    /// collaborator, not part of the core").
    pub situation_embedder: Arc<dyn SituationEmbedder>,
    pub progress_publisher: Arc<dyn ProgressPublisher>,
    pub prompt_log_sink: Arc<dyn PromptLogSink>,
    pub eval_summary_sink: Arc<dyn EvalSummarySink>,
    pub decision_repository: Arc<dyn DecisionRepository>,
    /// Sink for the analyst sub-graph's tool-call log (§4.3); flushed once
    /// at the end of the analysts stage.
    pub tool_call_sink: Arc<dyn ToolCallSink>,
    /// Out-of-band kill switch (§5 "Cancellation", §8 P8); `None` means the
    /// loops are only ever bounded by round count and recursion limit.
    pub run_control: Option<Arc<RunControl>>,
}

/// Bounds total node visits per run (§4.4). Exceeding it is fatal (§7 "Limits").
struct RecursionGuard {
    visits: usize,
    limit: usize,
}

impl RecursionGuard {
    fn new(limit: usize) -> Self {
        Self { visits: 0, limit }
    }

    fn tick(&mut self) -> GraphResult<()> {
        self.visits += 1;
        if self.visits > self.limit {
            return Err(GraphError::RecursionLimitExceeded(self.limit));
        }
        Ok(())
    }
}

async fn publish_stage(deps: &GraphDependencies, state: &GraphState, stage: Stage, iteration: Option<u32>) {
    let Some(run_id) = state.metadata.progress_run_id.clone() else {
        return;
    };
    let mut event = ProgressEvent::for_stage(
        run_id,
        stage,
        state.metadata.model_id.clone(),
        state.metadata.enabled_analysts.clone(),
    );
    if let Some(iteration) = iteration {
        event = event.with_iteration(iteration);
    }
    deps.progress_publisher.publish(event).await;
}

async fn publish_error(
    deps: &GraphDependencies,
    run_id: Option<&str>,
    model_id: &str,
    analysts: &[decision_core::Analyst],
    err: &GraphError,
) {
    let Some(run_id) = run_id else {
        return;
    };
    let event = ProgressEvent::error(run_id, model_id, analysts.to_vec(), err.to_string());
    deps.progress_publisher.publish(event).await;
}

/// The single public entry point (§6): resolves the effective model id and
/// analyst set, seeds a fresh `GraphState`, and drives it through the graph.
pub async fn run_decision_graph(
    payload: Request,
    options: RunOptions,
    config: &EngineConfig,
    deps: &GraphDependencies,
) -> GraphResult<Decision> {
    let model_id = options
        .model_id
        .clone()
        .or_else(|| payload.model_id.clone())
        .unwrap_or_else(|| config.default_trading_model.clone());

    let raw_analysts = options
        .analysts
        .clone()
        .or_else(|| payload.analysts.clone())
        .unwrap_or_default();
    let analysts = normalize_analysts(&raw_analysts);

    let chat_model = deps.chat_model_source.create_chat_model(&model_id, 1.0)?;
    let decision_model = deps.chat_model_source.create_chat_model(&model_id, 0.0)?;
    let extractor = DecisionExtractor::new(decision_model);

    let run_started_at_ms = Utc::now().timestamp_millis();
    let mut metadata = GraphMetadata::new(model_id.clone(), analysts.clone(), run_started_at_ms);
    metadata.progress_run_id = options.run_id.clone();
    metadata.payload = Some(payload.clone());

    let state = GraphState::new(
        payload.symbol.clone(),
        payload.trade_date.clone(),
        payload.context.clone(),
        metadata,
    );

    match run_inner(state, chat_model, extractor, config, deps).await {
        Ok(decision) => Ok(decision),
        Err(err) => {
            publish_error(deps, options.run_id.as_deref(), &model_id, &analysts, &err).await;
            Err(err)
        }
    }
}

async fn run_inner(
    mut state: GraphState,
    chat_model: Arc<dyn ChatModel>,
    extractor: DecisionExtractor,
    config: &EngineConfig,
    deps: &GraphDependencies,
) -> GraphResult<Decision> {
    let mut guard = RecursionGuard::new(config.max_recursion_limit);

    publish_stage(deps, &state, Stage::Queued, None).await;

    guard.tick()?;
    let update = node_load_memories(
        &state,
        deps.role_summary_store.as_ref(),
        deps.persona_vector_store.as_ref(),
        config.use_db_memories,
    )
    .await;
    merge_state(&mut state, update);

    publish_stage(deps, &state, Stage::Analysts, None).await;
    guard.tick()?;
    let enabled = state.metadata.enabled_analysts.clone();
    let update = node_analysts(chat_model.as_ref(), &state, &enabled).await?;
    deps.tool_call_sink.record(update.tool_calls.clone()).await;
    merge_state(&mut state, update);

    publish_stage(deps, &state, Stage::InvestmentDebate, None).await;
    loop {
        guard.tick()?;
        let update = node_bear(chat_model.as_ref(), deps.persona_vector_store.as_ref(), &state).await?;
        merge_state(&mut state, update);

        guard.tick()?;
        let update = node_bull(chat_model.as_ref(), deps.persona_vector_store.as_ref(), &state).await?;
        merge_state(&mut state, update);

        let kill_switch_allows = deps
            .run_control
            .as_ref()
            .map(|c| c.investment_allowed())
            .unwrap_or(true);
        if !investment_should_continue(
            &state,
            config.invest_debate_rounds,
            kill_switch_allows,
            config.debug_langgraph,
        ) {
            break;
        }
        publish_stage(deps, &state, Stage::InvestmentDebate, Some(state.metadata.invest_round)).await;
    }

    publish_stage(deps, &state, Stage::ResearchManager, None).await;
    guard.tick()?;
    let update = node_research_manager(chat_model.as_ref(), &state).await?;
    merge_state(&mut state, update);

    publish_stage(deps, &state, Stage::Trader, None).await;
    guard.tick()?;
    let update = node_trader(chat_model.as_ref(), &state).await?;
    merge_state(&mut state, update);

    publish_stage(deps, &state, Stage::RiskDebate, None).await;
    loop {
        guard.tick()?;
        let update = node_aggressive(chat_model.as_ref(), &state).await?;
        merge_state(&mut state, update);

        guard.tick()?;
        let update = node_conservative(chat_model.as_ref(), &state).await?;
        merge_state(&mut state, update);

        guard.tick()?;
        let update = node_neutral(chat_model.as_ref(), &state).await?;
        merge_state(&mut state, update);

        let kill_switch_allows = deps.run_control.as_ref().map(|c| c.risk_allowed()).unwrap_or(true);
        if !risk_should_continue(
            &state,
            config.risk_debate_rounds,
            kill_switch_allows,
            config.debug_langgraph,
        ) {
            break;
        }
        publish_stage(deps, &state, Stage::RiskDebate, Some(state.metadata.risk_round)).await;
    }

    publish_stage(deps, &state, Stage::RiskManager, None).await;
    guard.tick()?;
    let update = node_risk_manager(chat_model.as_ref(), &extractor, &state).await?;
    merge_state(&mut state, update);

    guard.tick()?;
    node_persist_memories(
        deps.persona_vector_store.as_ref(),
        deps.situation_embedder.as_ref(),
        &state,
    )
    .await;

    publish_stage(deps, &state, Stage::Finalizing, None).await;
    guard.tick()?;
    let now_ms = Utc::now().timestamp_millis();
    let decision = finalize_decision(&state, now_ms).await;

    persist_artifacts(deps, &state, &decision, now_ms).await;

    Ok(decision)
}

/// Finalize's persistence half (§4.5): prompt log, eval summary, decision
/// row. All best-effort — every failure is caught and warned, never
/// propagated (§7 "Persistence... always swallowed and warned").
async fn persist_artifacts(deps: &GraphDependencies, state: &GraphState, decision: &Decision, now_ms: i64) {
    let run_id = state
        .metadata
        .progress_run_id
        .clone()
        .unwrap_or_else(|| format!("{}-{}", state.symbol, state.trade_date));

    for entry in &state.conversation_log {
        let log_entry = PromptLogEntry {
            role_label: entry.role_label.clone(),
            system: entry.system.clone(),
            user: entry.user.clone(),
            timestamp: Utc::now(),
        };
        if let Err(err) = deps.prompt_log_sink.append(&run_id, log_entry).await {
            tracing::warn!(run_id = %run_id, error = %err, "prompt log append failed");
        }
    }

    let summary = EvalSummary {
        run_id: run_id.clone(),
        symbol: state.symbol.clone(),
        trade_date: state.trade_date.clone(),
        decision_token: decision.decision.to_string(),
        reports: state.reports.clone(),
        investment_debate: decision.investment_debate.clone(),
        risk_debate: decision.risk_debate.clone(),
        debate_history: state.debate_history.clone(),
        risk_debate_history: state.risk_debate_history.clone(),
    };
    if let Err(err) = deps.eval_summary_sink.write(summary).await {
        tracing::warn!(run_id = %run_id, error = %err, "eval summary write failed");
    }

    let row = DecisionRow {
        run_id: run_id.clone(),
        symbol: state.symbol.clone(),
        trade_date: state.trade_date.clone(),
        decision_token: decision.decision.to_string(),
        investment_plan: state.investment_plan.clone(),
        trader_plan: state.trader_plan.clone(),
        risk_judge: decision.risk_judge.clone(),
        model_id: state.metadata.model_id.clone(),
        analysts: state.metadata.enabled_analysts.clone(),
        orchestrator_version: env!("CARGO_PKG_VERSION").to_string(),
        prompt_hash: None,
        logs_path: None,
        execution_ms: Some(now_ms - state.metadata.run_started_at_ms),
        payload_blob: serde_json::to_value(&state.metadata.payload).unwrap_or(serde_json::Value::Null),
        debate_extras_blob: serde_json::json!({
            "bull": state.debate.bull,
            "bear": state.debate.bear,
            "aggressive": state.debate.aggressive,
            "conservative": state.debate.conservative,
            "neutral": state.debate.neutral,
        }),
    };
    if let Err(err) = deps.decision_repository.insert(row).await {
        tracing::warn!(run_id = %run_id, error = %err, "decision row insert failed");
    }
}
