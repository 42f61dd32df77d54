pub mod compute_chunk_rayon;
pub mod errors;
pub mod ports;
