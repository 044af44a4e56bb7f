//! Special-operator machinery: registry, form patterns, handler pairs

mod destructure;
mod handler;
mod registry;

pub use destructure::{destructure, Bindings, FormPattern};
pub use handler::{
    compile_handler, Compiler, DeferredFn, Evaluator, Executable, HandlerPair, HandlerSpec,
    ImmediateBody, ImmediateFn,
};
pub use registry::{global_registry, OperatorRegistry};
