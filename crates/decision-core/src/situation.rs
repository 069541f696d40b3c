//! Deterministic situation-summary builder (§9 "Situation-embedding vector
//! search", SPEC_FULL §11.3). One canonical implementation shared by
//! `memory-store` (embedding input) and `decision-graph` (PersistMemories),
//! so persona-vector lookups never drift between writer and reader.

use crate::types::{AnalystReports, Context};

const NO_DATA: &str = "(no data)";

/// Build a stable, named-section summary of the current situation for a
/// symbol/trade-date pair. Section order is fixed (market, social, news,
/// fundamentals) regardless of which channels are populated, satisfying R2's
/// "stable ordering of named sections" requirement.
///
/// Each analyst's own report (if present) takes precedence over the raw
/// preloaded `Context` channel, since the report reflects whatever the
/// analyst actually used (possibly fetched via tool).
pub fn build_situation_summary(
    symbol: &str,
    trade_date: &str,
    context: &Context,
    reports: &AnalystReports,
) -> String {
    let market = section_text(&reports.market, &context.market_technical_report);
    let social = section_text(&reports.social, &context.social_reddit_summary);
    let news = section_text(&reports.news, &context.news_company);
    let fundamentals = section_text(&reports.fundamentals, &context.fundamentals_summary);

    format!(
        "Symbol: {symbol}\nTrade Date: {trade_date}\n\n## Market\n{market}\n\n## Social\n{social}\n\n## News\n{news}\n\n## Fundamentals\n{fundamentals}"
    )
}

fn section_text(report: &Option<String>, fallback: &Option<String>) -> String {
    for candidate in [report, fallback] {
        if let Some(text) = candidate {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    NO_DATA.to_string()
}
