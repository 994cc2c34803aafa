//! Configuration for sgen-codegen

pub mod defaults;
mod settings;

pub use settings::*;
