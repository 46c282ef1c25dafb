pub mod chart;
pub mod generator;
pub mod news;
pub mod portfolio;
pub mod summary;
