pub mod analysis_result;
pub mod chunk;
pub mod complex;
pub mod complex_rect;
pub mod coordinate_key;
pub mod resolution;
