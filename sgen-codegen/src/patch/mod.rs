//! Line-oriented code injection

mod line_patcher;

pub use line_patcher::*;
