pub mod evaluation_flow;
pub mod report;

pub use evaluation_flow::EvaluationFlow;
pub use report::format_report;
