pub mod cancellation;
pub mod compute_chunk;
pub mod plan_chunks;
