//! Chunk planning for append requests
//!
//! A pending batch of `N` points is cut into `ceil(N / M)` consecutive
//! chunks of at most `M` points. An empty batch has no chunks, and a batch
//! whose length is a multiple of `M` does not get a trailing empty chunk.

use std::ops::Range;

/// Number of requests needed for `len` points.
pub fn chunk_count(len: usize, max_per_chunk: usize) -> usize {
    len.div_ceil(max_per_chunk.max(1))
}

/// Index ranges of each chunk, in submission order.
pub fn chunk_ranges(len: usize, max_per_chunk: usize) -> impl Iterator<Item = Range<usize>> {
    let max = max_per_chunk.max(1);
    (0..chunk_count(len, max)).map(move |i| {
        let start = i * max;
        start..(start + max).min(len)
    })
}
