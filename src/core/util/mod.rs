pub mod calculate_chunks_in_resolution;
