use chat_model::MockChatModel;
use decision_core::{AnalystReports, Context};

use crate::analysts::{run_market_analyst, AnalystInput};
use crate::debate::{run_bear, run_bull, DebateInput};
use crate::research_manager::{run_research_manager, ResearchManagerInput};
use crate::risk::{run_aggressive, RiskDebateInput};
use crate::risk_manager::{run_risk_manager, RiskManagerInput};
use crate::trader::{run_trader, TraderInput};

#[tokio::test]
async fn market_analyst_inlines_preloaded_channel() {
    let model = MockChatModel::new("uptrend confirmed");
    let input = AnalystInput {
        symbol: "AAPL".into(),
        trade_date: "2025-10-26".into(),
        context: Context {
            market_technical_report: Some("50dma above 200dma".into()),
            ..Default::default()
        },
    };

    let report = run_market_analyst(&model, &input).await.unwrap();
    assert_eq!(report, "uptrend confirmed");

    let transcript = model.transcripts();
    let user_message = transcript[0][1].content();
    assert!(user_message.contains("50dma above 200dma"));
    assert!(!user_message.contains("Call `get_market_technicals`"));
}

#[tokio::test]
async fn market_analyst_instructs_tool_call_when_channel_blank() {
    let model = MockChatModel::new("no data available");
    let input = AnalystInput {
        symbol: "AAPL".into(),
        trade_date: "2025-10-26".into(),
        context: Context::default(),
    };

    run_market_analyst(&model, &input).await.unwrap();
    let transcript = model.transcripts();
    let user_message = transcript[0][1].content();
    assert!(user_message.contains("Call `get_market_technicals` for AAPL"));
}

#[tokio::test]
async fn bull_and_bear_reference_opponent_argument_and_history() {
    let model = MockChatModel::new("rebuttal text");
    let input = DebateInput {
        symbol: "AAPL".into(),
        trade_date: "2025-10-26".into(),
        context: Context::default(),
        history: Some("Bear (Round 1):\nrisks ahead".into()),
        opponent_argument: Some("risks ahead".into()),
        reflections: None,
        round: 1,
    };

    run_bull(&model, &input).await.unwrap();
    let transcript = model.transcripts();
    let user_message = transcript[0][1].content();
    assert!(user_message.contains("risks ahead"));
    assert!(user_message.contains("Round: 1"));

    run_bear(&model, &input).await.unwrap();
}

#[tokio::test]
async fn research_manager_includes_all_analyst_reports() {
    let model = MockChatModel::new("Buy the stock.");
    let input = ResearchManagerInput {
        symbol: "AAPL".into(),
        trade_date: "2025-10-26".into(),
        debate_history: Some("Bull (Round 1):\nstrong case".into()),
        reports: AnalystReports {
            market: Some("market ok".into()),
            news: Some("news ok".into()),
            social: Some("social ok".into()),
            fundamentals: Some("fundamentals ok".into()),
        },
        past_memories: None,
    };

    let plan = run_research_manager(&model, &input).await.unwrap();
    assert_eq!(plan, "Buy the stock.");

    let user_message = model.transcripts()[0][1].content().to_string();
    for expected in ["market ok", "news ok", "social ok", "fundamentals ok", "strong case"] {
        assert!(user_message.contains(expected));
    }
}

#[tokio::test]
async fn trader_carries_investment_plan_forward() {
    let model = MockChatModel::new("trading plan text");
    let input = TraderInput {
        company: "AAPL".into(),
        trade_date: "2025-10-26".into(),
        plan: Some("accumulate on dips".into()),
        reports: AnalystReports::default(),
        past_memories: None,
    };

    run_trader(&model, &input).await.unwrap();
    let user_message = model.transcripts()[0][1].content().to_string();
    assert!(user_message.contains("accumulate on dips"));
}

#[tokio::test]
async fn risk_debater_sees_sibling_turns() {
    let model = MockChatModel::new("go big");
    let input = RiskDebateInput {
        symbol: "AAPL".into(),
        trade_date: "2025-10-26".into(),
        trader_plan: Some("accumulate".into()),
        history: None,
        round: 1,
        last_aggressive: None,
        last_conservative: Some("be careful".into()),
        last_neutral: None,
    };

    run_aggressive(&model, &input).await.unwrap();
    let user_message = model.transcripts()[0][1].content().to_string();
    assert!(user_message.contains("be careful"));
}

#[tokio::test]
async fn risk_manager_closes_with_final_recommendation_prompt() {
    let model = MockChatModel::new("Final Recommendation: BUY");
    let input = RiskManagerInput {
        symbol: "AAPL".into(),
        trade_date: "2025-10-26".into(),
        trader_plan: Some("accumulate".into()),
        risk_debate: Some("Aggressive (Round 1):\ngo big".into()),
        reports: AnalystReports::default(),
        past_memories: None,
    };

    let prose = run_risk_manager(&model, &input).await.unwrap();
    assert_eq!(prose, "Final Recommendation: BUY");

    let system_message = model.transcripts()[0][0].content().to_string();
    assert!(system_message.to_lowercase().contains("risk manager"));
}
