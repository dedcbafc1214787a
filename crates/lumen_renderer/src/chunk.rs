//! Chunk-based parallel frame rendering.
//!
//! Divides the image into disjoint chunks that are shaded independently and
//! in parallel using rayon. Each chunk carries its own random state, so no
//! chunk worker touches another's data.

use lumen_core::{ChunkStrategy, Color};
use rayon::prelude::*;

use crate::frame::Frame;
use crate::sampling::{CacheCursor, RandomCache, SeedRng};
use crate::stats::RayCounters;

/// Chunks queued per worker thread, so fast chunks can rebalance slow ones.
pub const CHUNKS_PER_THREAD: usize = 32;

/// Spacing between the cache start offsets of consecutive chunks.
const CURSOR_STRIDE: usize = 7_919;

/// A rectangular region of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub id: usize,
    /// Left column
    pub x: u32,
    /// Bottom row
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Chunk {
    /// Get the total number of pixels in this chunk.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Number of chunks to split a frame into on this machine.
pub fn default_chunk_count() -> usize {
    rayon::current_num_threads().max(1) * CHUNKS_PER_THREAD
}

/// Split a `width` x `height` image into about `count` chunks.
///
/// Chunks never overlap, cover every pixel, and are at least one pixel in
/// each direction, so fewer than `count` are produced for tiny images.
pub fn generate_chunks(strategy: ChunkStrategy, count: usize, width: u32, height: u32) -> Vec<Chunk> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let count = count.max(1);

    let (columns, rows) = match strategy {
        ChunkStrategy::VerticalStripes => ((count as u32).min(width), 1),
        ChunkStrategy::Rectangles => {
            // Near-square tiles: columns / rows follows the image aspect
            let aspect = width as f32 / height as f32;
            let columns = ((count as f32 * aspect).sqrt().ceil() as u32).clamp(1, width);
            let rows = (count as u32).div_ceil(columns).clamp(1, height);
            (columns, rows)
        }
    };

    let mut chunks = Vec::with_capacity((columns * rows) as usize);
    for row in 0..rows {
        let y0 = split(height, rows, row);
        let y1 = split(height, rows, row + 1);
        for column in 0..columns {
            let x0 = split(width, columns, column);
            let x1 = split(width, columns, column + 1);
            chunks.push(Chunk {
                id: chunks.len(),
                x: x0,
                y: y0,
                width: x1 - x0,
                height: y1 - y0,
            });
        }
    }
    chunks
}

/// Start of part `index` when `length` is cut into `parts` near-equal parts.
fn split(length: u32, parts: u32, index: u32) -> u32 {
    (length as u64 * index as u64 / parts as u64) as u32
}

/// Per-chunk shading state handed to the pixel closure.
pub struct PixelContext<'a> {
    pub chunk: Chunk,
    pub rng: SeedRng,
    pub cursor: CacheCursor<'a>,
    pub counters: RayCounters,
}

impl<'a> PixelContext<'a> {
    pub fn new(chunk: Chunk, cache: &'a RandomCache) -> Self {
        Self {
            chunk,
            rng: SeedRng::new(),
            cursor: cache.cursor(chunk.id.wrapping_mul(CURSOR_STRIDE)),
            counters: RayCounters::default(),
        }
    }
}

/// Shade every pixel of `frame` in parallel and return the summed counters.
///
/// `shade` receives pixel coordinates with `y = 0` at the bottom and returns
/// a tone-mapped color.
pub fn render_chunks<F>(frame: &mut Frame, strategy: ChunkStrategy, shade: F) -> RayCounters
where
    F: Fn(&mut PixelContext<'_>, u32, u32) -> Color + Sync,
{
    let (width, height) = frame.resolution();
    let chunks = generate_chunks(strategy, default_chunk_count(), width, height);
    let cache = RandomCache::global();

    let results: Vec<(Chunk, Vec<Color>, RayCounters)> = chunks
        .par_iter()
        .map(|chunk| {
            let mut ctx = PixelContext::new(*chunk, cache);
            let mut pixels = Vec::with_capacity(chunk.pixel_count());
            for y in chunk.y..chunk.y + chunk.height {
                for x in chunk.x..chunk.x + chunk.width {
                    pixels.push(shade(&mut ctx, x, y));
                }
            }
            (*chunk, pixels, ctx.counters)
        })
        .collect();

    let mut total = RayCounters::default();
    for (chunk, pixels, counters) in results {
        let mut pixels = pixels.into_iter();
        for y in chunk.y..chunk.y + chunk.height {
            for x in chunk.x..chunk.x + chunk.width {
                if let Some(color) = pixels.next() {
                    frame.put_pixel(x, y, color);
                }
            }
        }
        total += counters;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(chunks: &[Chunk], width: u32, height: u32) {
        let mut covered = vec![0u8; (width * height) as usize];
        for chunk in chunks {
            assert!(chunk.width > 0 && chunk.height > 0);
            for y in chunk.y..chunk.y + chunk.height {
                for x in chunk.x..chunk.x + chunk.width {
                    covered[(y * width + x) as usize] += 1;
                }
            }
        }
        assert!(covered.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_rectangles_cover_image() {
        for &(w, h, n) in &[(128, 128, 4), (100, 37, 64), (640, 360, 256), (3, 2, 512)] {
            let chunks = generate_chunks(ChunkStrategy::Rectangles, n, w, h);
            assert!(!chunks.is_empty());
            assert_exact_cover(&chunks, w, h);
        }
    }

    #[test]
    fn test_vertical_stripes() {
        let chunks = generate_chunks(ChunkStrategy::VerticalStripes, 8, 100, 50);
        assert_eq!(chunks.len(), 8);
        assert!(chunks.iter().all(|c| c.height == 50 && c.y == 0));
        assert_exact_cover(&chunks, 100, 50);

        // Never narrower than one pixel
        let chunks = generate_chunks(ChunkStrategy::VerticalStripes, 64, 10, 5);
        assert_eq!(chunks.len(), 10);
        assert_exact_cover(&chunks, 10, 5);
    }

    #[test]
    fn test_ids_are_sequential() {
        let chunks = generate_chunks(ChunkStrategy::Rectangles, 16, 64, 64);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.id, i);
        }
    }

    #[test]
    fn test_empty_image() {
        assert!(generate_chunks(ChunkStrategy::Rectangles, 8, 0, 10).is_empty());
    }

    #[test]
    fn test_render_chunks_writes_every_pixel() {
        let mut frame = Frame::new(17, 9);
        let counters = render_chunks(&mut frame, ChunkStrategy::Rectangles, |ctx, x, y| {
            ctx.counters.rays += 1;
            Color::new(x as f32 / 16.0, y as f32 / 8.0, 1.0)
        });

        assert_eq!(counters.rays, 17 * 9);
        assert_eq!(frame.pixel(16, 0), Some([255, 0, 255, 255]));
        assert_eq!(frame.pixel(0, 8), Some([0, 255, 255, 255]));
    }
}
