use serde::{Deserialize, Serialize};

/// The closed set of stages a run passes through (§4.7, §6). Each carries a
/// canonical percent emitted the first time the stage is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Queued,
    Analysts,
    InvestmentDebate,
    ResearchManager,
    Trader,
    RiskDebate,
    RiskManager,
    Finalizing,
}

impl Stage {
    pub fn canonical_percent(&self) -> u8 {
        match self {
            Stage::Queued => 0,
            Stage::Analysts => 15,
            Stage::InvestmentDebate => 45,
            Stage::ResearchManager => 60,
            Stage::Trader => 70,
            Stage::RiskDebate => 85,
            Stage::RiskManager => 95,
            Stage::Finalizing => 100,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Queued => "Queued",
            Stage::Analysts => "Running analysts",
            Stage::InvestmentDebate => "Investment debate",
            Stage::ResearchManager => "Research manager synthesizing",
            Stage::Trader => "Trader drafting plan",
            Stage::RiskDebate => "Risk debate",
            Stage::RiskManager => "Risk manager deciding",
            Stage::Finalizing => "Finalizing",
        }
    }
}
