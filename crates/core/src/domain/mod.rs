pub mod contract;
pub mod quote;
pub mod recommendation;
pub mod symbol;
