pub mod ordering;
pub mod plan_chunks;
