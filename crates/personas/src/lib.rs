pub mod analysts;
pub mod debate;
pub mod research_manager;
pub mod risk;
pub mod risk_manager;
pub mod support;
pub mod trader;

pub use analysts::AnalystInput;
pub use debate::DebateInput;
pub use research_manager::ResearchManagerInput;
pub use risk::RiskDebateInput;
pub use risk_manager::RiskManagerInput;
pub use trader::TraderInput;

#[cfg(test)]
mod tests;
