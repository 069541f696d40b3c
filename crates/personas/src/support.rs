/// Render one context channel as a user-message line: inline the preloaded
/// value if present and non-blank, otherwise instruct the model to invoke
/// the named tool (§4.3).
pub fn channel_line(label: &str, value: &Option<String>, tool: &str, symbol: &str) -> String {
    match value {
        Some(text) if !text.trim().is_empty() => format!("{label}:\n{}", text.trim()),
        _ => format!("{label}: not preloaded. Call `{tool}` for {symbol} to obtain it."),
    }
}

pub fn collaboration_header(role_label: &str) -> String {
    format!(
        "You are collaborating with a team of trading analysts and decision makers. \
         You are the {role_label}. Produce a focused, evidence-based report in your \
         area of expertise; do not speculate about areas outside it."
    )
}

/// A read-only view of [`Context`] in which any channel that has a
/// corresponding non-blank `AnalystReports` entry is overridden by that
/// report (§4.5 Bear/Bull "debate context").
pub fn debate_context_channel<'a>(
    report: &'a Option<String>,
    raw_context_channel: &'a Option<String>,
) -> &'a Option<String> {
    match report {
        Some(text) if !text.trim().is_empty() => report,
        _ => raw_context_channel,
    }
}
