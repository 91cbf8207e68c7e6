pub mod evaluator;
pub mod values;

pub use evaluator::{render, Evaluator, VarValues};
pub use values::{placeholders, preview_values};
