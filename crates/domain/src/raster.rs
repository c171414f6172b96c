use crate::DomainError;

/// Tightly packed RGB8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterFrame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DomainError> {
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(DomainError::RasterSize {
                width,
                height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn filled(width: u32, height: u32, rgb: u32) -> Self {
        let [_, r, g, b] = rgb.to_be_bytes();
        let pixels = [r, g, b].repeat(width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y as usize * self.width as usize + x as usize) * 3;
        let [_, r, g, b] = rgb.to_be_bytes();
        self.pixels[index..index + 3].copy_from_slice(&[r, g, b]);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y as usize * self.width as usize + x as usize) * 3;
        let [r, g, b] = [self.pixels[index], self.pixels[index + 1], self.pixels[index + 2]];
        Some((u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
    }

    /// Copies `height` rows starting at `top`, clamped to the frame.
    pub fn crop_rows(&self, top: u32, height: u32) -> Self {
        let top = top.min(self.height);
        let height = height.min(self.height - top);
        let row_bytes = self.width as usize * 3;
        let start = top as usize * row_bytes;
        let end = start + height as usize * row_bytes;
        Self {
            width: self.width,
            height,
            pixels: self.pixels[start..end].to_vec(),
        }
    }
}
