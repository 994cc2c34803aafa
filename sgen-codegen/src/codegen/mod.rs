//! Code generation module

mod code_generator;
mod naming;
mod storage_generator;
mod type_resolver;

pub use code_generator::*;
pub use naming::*;
pub use storage_generator::*;
pub use type_resolver::*;
