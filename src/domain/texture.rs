//! Decoded texture with its RGBA pixel buffer.

use super::error::DomainError;

const KIND: &str = "texture";
const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub id: String,
    pub url: Option<String>,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    disposed: bool,
}

impl Texture {
    pub fn new(
        id: impl Into<String>,
        url: Option<String>,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Self {
        Self {
            id: id.into(),
            url,
            width,
            height,
            pixels,
            disposed: false,
        }
    }

    /// Texture filled with one RGBA colour.
    pub fn solid(id: impl Into<String>, width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * BYTES_PER_PIXEL)
            .collect();
        Self::new(id, None, width, height, pixels)
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
        self.pixels = Vec::new();
    }

    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }

    /// Deep copy of the texture, including its pixel buffer.
    pub fn try_clone(&self) -> Result<Self, DomainError> {
        if self.disposed {
            return Err(DomainError::disposed(KIND, &self.id));
        }
        if self.pixels.len() != self.expected_len() {
            return Err(DomainError::invalid(
                KIND,
                &self.id,
                format!(
                    "pixel buffer holds {} bytes, expected {} for {}x{}",
                    self.pixels.len(),
                    self.expected_len(),
                    self.width,
                    self.height
                ),
            ));
        }
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_fills_every_pixel() {
        let texture = Texture::solid("tex", 2, 3, [1, 2, 3, 4]);
        assert_eq!(texture.pixels.len(), texture.expected_len());
        assert_eq!(&texture.pixels[20..24], &[1, 2, 3, 4]);
    }

    #[test]
    fn truncated_buffer_cannot_be_cloned() {
        let texture = Texture::new("tex", None, 4, 4, vec![0; 10]);
        assert!(matches!(
            texture.try_clone(),
            Err(DomainError::Invalid { .. })
        ));
    }

    #[test]
    fn disposed_texture_cannot_be_cloned() {
        let mut texture = Texture::solid("tex", 1, 1, [0; 4]);
        texture.dispose();
        assert_eq!(
            texture.try_clone(),
            Err(DomainError::disposed("texture", "tex"))
        );
    }
}
