//! Tree-walking evaluator for pylite programs.

pub mod builtins;
pub mod console;
pub mod environment;
pub mod evaluator;
pub mod files;
pub mod template;
pub mod value;

pub use console::{Console, IoConsole};
pub use environment::Environment;
pub use evaluator::{Evaluator, Interpreter};
pub use value::{EvaluationError, FileHandle, Value};
