pub mod conversion;
pub mod definition;
pub mod expression;
pub mod kind;
pub mod walk;

pub use conversion::*;
pub use definition::*;
pub use expression::*;
pub use kind::{KindOracle, KindRegistry};
pub use walk::{for_each_expression, for_each_expression_mut, for_each_node_variable};
