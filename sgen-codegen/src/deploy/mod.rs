//! Deployment of generated files

mod copier;
mod deployer;

pub use copier::*;
pub use deployer::*;
