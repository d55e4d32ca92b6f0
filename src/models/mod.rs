pub mod evaluation;
pub mod message;
pub mod session;

pub use evaluation::{EvaluationOutput, Rubric};
pub use message::{Message, Role};
pub use session::{RubricResult, SessionRecord};
