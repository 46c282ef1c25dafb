pub mod assistant;
pub mod error;
pub mod explain;
pub mod quiz;
pub mod rules;
pub mod session;
pub mod wire;
