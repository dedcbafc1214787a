//! Frame buffers.
//!
//! A frame keeps two 8-bit copies of the image:
//!
//! - `display`: RGBA, rows top to bottom, ready for texture upload.
//! - `file`: BGRA, rows bottom to top, the pixel layout of a 32-bit BMP.
//!
//! Pixel coordinates passed to [`Frame::put_pixel`] have `y = 0` at the
//! bottom row, matching the camera's `v` axis.

use lumen_core::Color;

/// Convert a [0, 1] channel to a byte. Out-of-range values are clamped.
#[inline]
pub fn to_byte(channel: f32) -> u8 {
    (255.0 * channel.clamp(0.0, 1.0)) as u8
}

/// Two parallel 8-bit image buffers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    display: Vec<[u8; 4]>,
    file: Vec<[u8; 4]>,
}

impl Frame {
    /// Create a black, opaque frame.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            display: vec![[0, 0, 0, 255]; len],
            file: vec![[0, 0, 0, 255]; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.display.is_empty()
    }

    /// Write a tone-mapped color at `(x, y)`, `y` counted from the bottom.
    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        let r = to_byte(color.x);
        let g = to_byte(color.y);
        let b = to_byte(color.z);

        let w = self.width as usize;
        let (x, y) = (x as usize, y as usize);
        let top_down_row = self.height as usize - 1 - y;
        self.display[top_down_row * w + x] = [r, g, b, 255];
        self.file[y * w + x] = [b, g, r, 255];
    }

    /// RGBA bytes of `(x, y)`, `y` counted from the bottom.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let top_down_row = (self.height - 1 - y) as usize;
        self.display
            .get(top_down_row * self.width as usize + x as usize)
            .copied()
    }

    /// RGBA, top row first.
    pub fn display_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.display)
    }

    /// BGRA, bottom row first.
    pub fn file_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.file)
    }
}
