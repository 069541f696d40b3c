pub mod analysts;
pub mod config;
pub mod control;
pub mod error;
pub mod extractor;
pub mod graph;
pub mod nodes;

pub use analysts::{AnalystsOutcome, NoopToolCallSink, ToolCallSink};
pub use config::{default_recursion_limit, EngineConfig};
pub use control::RunControl;
pub use error::{GraphError, GraphResult};
pub use extractor::DecisionExtractor;
pub use graph::{run_decision_graph, ChatModelSource, GraphDependencies};

#[cfg(test)]
mod tests;
