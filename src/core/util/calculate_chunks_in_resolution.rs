use crate::core::data::resolution::Resolution;

/// Columns and rows of chunks needed to cover `resolution` with at most
/// `capacity` samples per chunk on each axis.
pub fn calculate_chunks_in_resolution(resolution: Resolution, capacity: Resolution) -> (u32, u32) {
    (
        resolution.x().div_ceil(capacity.x()),
        resolution.y().div_ceil(capacity.y()),
    )
}

/// Number of samples along one axis in the chunk at `index`; the last chunk takes the remainder.
pub fn samples_in_chunk(index: u32, total: u32, capacity: u32) -> u32 {
    let first = index * capacity;
    capacity.min(total - first)
}
