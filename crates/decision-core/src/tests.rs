use crate::reducers::*;
use crate::situation::build_situation_summary;
use crate::types::*;

fn base_state() -> GraphState {
    let metadata = GraphMetadata::new(
        "gpt-4o".to_string(),
        Analyst::CANONICAL_ORDER.to_vec(),
        1_000,
    );
    GraphState::new(
        "AAPL".to_string(),
        "2025-10-26".to_string(),
        Context::default(),
        metadata,
    )
}

#[test]
fn normalize_analysts_orders_canonically_and_dedupes_case() {
    let raw = vec!["FUNDAMENTALS", "market", "Market", "social"];
    let out = normalize_analysts(&raw);
    assert_eq!(out, vec![Analyst::Market, Analyst::Social, Analyst::Fundamentals]);
}

#[test]
fn normalize_analysts_empty_input_yields_default_set() {
    let raw: Vec<&str> = vec![];
    let out = normalize_analysts(&raw);
    assert_eq!(out, Analyst::CANONICAL_ORDER.to_vec());
}

#[test]
fn normalize_analysts_drops_unknown_entries() {
    let raw = vec!["market", "crypto"];
    let out = normalize_analysts(&raw);
    assert_eq!(out, vec![Analyst::Market]);
}

#[test]
fn decision_token_parses_canonical_forms_case_insensitively() {
    assert_eq!("buy".parse::<DecisionToken>().unwrap(), DecisionToken::Buy);
    assert_eq!("SELL".parse::<DecisionToken>().unwrap(), DecisionToken::Sell);
    assert_eq!("Hold".parse::<DecisionToken>().unwrap(), DecisionToken::Hold);
    assert_eq!(
        "no decision".parse::<DecisionToken>().unwrap(),
        DecisionToken::NoDecision
    );
    assert!("MAYBE".parse::<DecisionToken>().is_err());
}

#[test]
fn decision_token_display_round_trips() {
    for token in [
        DecisionToken::Buy,
        DecisionToken::Sell,
        DecisionToken::Hold,
        DecisionToken::NoDecision,
    ] {
        let s = token.to_string();
        assert_eq!(s.parse::<DecisionToken>().unwrap(), token);
    }
}

#[test]
fn truncate_recommendation_respects_char_boundary() {
    let short = "short text";
    assert_eq!(truncate_recommendation(short, 240), short);

    let long = "a".repeat(300);
    let truncated = truncate_recommendation(&long, 240);
    assert_eq!(truncated.chars().count(), 240);
}

// P1: debate_history length == invest_round * 2 after appending Bear+Bull turns.
#[test]
fn debate_history_append_matches_invest_round_pairs() {
    let mut state = base_state();

    for round in 1..=3u32 {
        let bear_update = GraphStateUpdate {
            debate_history: vec![DebateTurn {
                persona: Persona::Bear,
                round,
                content: format!("bear round {round}"),
                timestamp: chrono::Utc::now(),
            }],
            ..Default::default()
        };
        merge_state(&mut state, bear_update);

        let bull_update = GraphStateUpdate {
            debate_history: vec![DebateTurn {
                persona: Persona::Bull,
                round,
                content: format!("bull round {round}"),
                timestamp: chrono::Utc::now(),
            }],
            metadata: Some(GraphMetadataUpdate {
                invest_round: Some(round),
                ..Default::default()
            }),
            ..Default::default()
        };
        merge_state(&mut state, bull_update);
    }

    assert_eq!(state.debate_history.len(), (state.metadata.invest_round as usize) * 2);
}

// I3: a revisited node (loop back-edge) never shrinks an append-only list.
#[test]
fn revisiting_a_node_never_shrinks_history() {
    let mut state = base_state();
    let turn = |round: u32| DebateTurn {
        persona: Persona::Bear,
        round,
        content: "x".into(),
        timestamp: chrono::Utc::now(),
    };

    merge_state(
        &mut state,
        GraphStateUpdate {
            debate_history: vec![turn(1)],
            ..Default::default()
        },
    );
    let len_before = state.debate_history.len();

    merge_state(
        &mut state,
        GraphStateUpdate {
            debate_history: vec![turn(2)],
            ..Default::default()
        },
    );

    assert!(state.debate_history.len() >= len_before);
    assert_eq!(state.debate_history.len(), 2);
}

#[test]
fn merge_analyst_reports_is_last_write_wins_per_key() {
    let mut reports = AnalystReports::default();
    merge_analyst_reports(
        &mut reports,
        &AnalystReports {
            market: Some("first".into()),
            ..Default::default()
        },
    );
    merge_analyst_reports(
        &mut reports,
        &AnalystReports {
            news: Some("news report".into()),
            ..Default::default()
        },
    );

    assert_eq!(reports.market.as_deref(), Some("first"));
    assert_eq!(reports.news.as_deref(), Some("news report"));
    assert!(reports.social.is_none());
}

#[test]
fn merge_debate_map_preserves_unrelated_keys() {
    let mut debate = DebateMap {
        bull: Some("bull turn".into()),
        ..Default::default()
    };
    merge_debate_map(
        &mut debate,
        &DebateMap {
            bear: Some("bear turn".into()),
            ..Default::default()
        },
    );

    assert_eq!(debate.bull.as_deref(), Some("bull turn"));
    assert_eq!(debate.bear.as_deref(), Some("bear turn"));
}

#[test]
fn append_transcript_block_separates_rounds_with_blank_line() {
    let round_one = append_transcript_block(&None, "Bear", 1, "first take");
    assert_eq!(round_one, "Bear (Round 1):\nfirst take");

    let round_two = append_transcript_block(&Some(round_one.clone()), "Bull", 1, "rebuttal");
    assert_eq!(
        round_two,
        "Bear (Round 1):\nfirst take\n\nBull (Round 1):\nrebuttal"
    );
}

#[test]
fn conversation_log_entries_require_all_fields_non_empty() {
    let entry = ConversationLogEntry {
        role_label: "Market Analyst".into(),
        system: "You are a market analyst.".into(),
        user: "Analyze AAPL.".into(),
    };
    assert!(entry.is_well_formed());

    let blank = ConversationLogEntry {
        role_label: String::new(),
        system: "x".into(),
        user: "y".into(),
    };
    assert!(!blank.is_well_formed());
}

// R2: situation summaries are deterministic given identical inputs, with
// stable section ordering.
#[test]
fn situation_summary_is_deterministic_and_orders_sections_stably() {
    let context = Context {
        market_technical_report: Some("uptrend".into()),
        news_company: Some("earnings beat".into()),
        ..Default::default()
    };
    let reports = AnalystReports::default();

    let first = build_situation_summary("AAPL", "2025-10-26", &context, &reports);
    let second = build_situation_summary("AAPL", "2025-10-26", &context, &reports);
    assert_eq!(first, second);

    let market_pos = first.find("## Market").unwrap();
    let social_pos = first.find("## Social").unwrap();
    let news_pos = first.find("## News").unwrap();
    let fundamentals_pos = first.find("## Fundamentals").unwrap();
    assert!(market_pos < social_pos);
    assert!(social_pos < news_pos);
    assert!(news_pos < fundamentals_pos);
}

#[test]
fn situation_summary_prefers_analyst_report_over_raw_context() {
    let context = Context {
        market_technical_report: Some("raw context text".into()),
        ..Default::default()
    };
    let reports = AnalystReports {
        market: Some("analyst-produced report".into()),
        ..Default::default()
    };

    let summary = build_situation_summary("AAPL", "2025-10-26", &context, &reports);
    assert!(summary.contains("analyst-produced report"));
    assert!(!summary.contains("raw context text"));
}

#[test]
fn situation_summary_marks_missing_sections_explicitly() {
    let summary = build_situation_summary(
        "AAPL",
        "2025-10-26",
        &Context::default(),
        &AnalystReports::default(),
    );
    assert!(summary.contains("(no data)"));
}
