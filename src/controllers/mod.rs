pub mod engine;
pub mod region;
