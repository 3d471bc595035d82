//! Decoded raster model shared by the still-image and animation decoders.

pub mod palette;

/// Row-major, top-to-bottom RGB raster.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterImage {
    pub width: u16,
    pub height: u16,
    /// `width * height * 3` bytes.
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// Allocate a raster pre-filled with black.
    pub fn filled_black(width: u16, height: u16) -> Self {
        RasterImage {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * 3],
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn set_pixel(&mut self, x: u16, y: u16, rgb: [u8; 3]) {
        let index = (y as usize * self.width as usize + x as usize) * 3;
        self.pixels[index..index + 3].copy_from_slice(&rgb);
    }

    /// Expand to RGBA, keying pure black to fully transparent. A chroma-key
    /// heuristic, not stored alpha: genuinely black source pixels are
    /// clipped as well.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.pixel_count() * 4);
        for rgb in self.pixels.chunks_exact(3) {
            let alpha = if rgb == [0, 0, 0] { 0 } else { 255 };
            rgba.extend_from_slice(rgb);
            rgba.push(alpha);
        }
        rgba
    }
}
