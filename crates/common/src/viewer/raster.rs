use std::io::Cursor;

use base64::Engine;
use image::{DynamicImage, ImageFormat, RgbaImage};

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("no page could be rasterized")]
    EmptyComposite,
    #[error("failed to encode composite image: {0}")]
    Encode(#[from] image::ImageError),
}

/// All successfully exported pages stacked top to bottom in one PNG.
#[derive(Debug, Clone)]
pub struct CompositeImage {
    pub width: u32,
    pub height: u32,
    /// 1-based page numbers that made it into the image, in order
    pub pages: Vec<u32>,
    png: Vec<u8>,
}

impl CompositeImage {
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn into_png(self) -> Vec<u8> {
        self.png
    }

    pub fn to_data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png)
        )
    }
}

/// Accumulates decoded pages, in the order pushed.
#[derive(Debug, Default)]
pub(crate) struct CompositeBuilder {
    pages: Vec<(u32, RgbaImage)>,
}

impl CompositeBuilder {
    pub fn push_png(&mut self, page: u32, bytes: &[u8]) -> Result<(), image::ImageError> {
        let decoded = image::load_from_memory(bytes)?.to_rgba8();
        self.pages.push((page, decoded));
        Ok(())
    }

    /// Canvas width is the first page's; wider pages are clipped.
    pub fn finish(self) -> Result<CompositeImage, RasterError> {
        let width = match self.pages.first() {
            Some((_, first)) => first.width(),
            None => return Err(RasterError::EmptyComposite),
        };
        let height: u32 = self.pages.iter().map(|(_, page)| page.height()).sum();

        let mut canvas = RgbaImage::new(width, height);
        let mut offset: i64 = 0;
        for (_, page) in &self.pages {
            image::imageops::replace(&mut canvas, page, 0, offset);
            offset += i64::from(page.height());
        }

        let mut png = Vec::new();
        DynamicImage::ImageRgba8(canvas).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        Ok(CompositeImage {
            width,
            height,
            pages: self.pages.iter().map(|(page, _)| *page).collect(),
            png,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::solid_png;

    #[test]
    fn test_stacks_pages_vertically() {
        let mut builder = CompositeBuilder::default();
        builder.push_png(1, &solid_png(8, 4, [255, 0, 0, 255])).unwrap();
        builder.push_png(2, &solid_png(8, 6, [0, 0, 255, 255])).unwrap();
        let composite = builder.finish().unwrap();

        assert_eq!((composite.width, composite.height), (8, 10));
        assert_eq!(composite.pages, vec![1, 2]);

        let decoded = image::load_from_memory(composite.png()).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(decoded.get_pixel(7, 9).0, [0, 0, 255, 255]);
        assert!(composite.to_data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_rejects_garbage_and_empty() {
        let mut builder = CompositeBuilder::default();
        assert!(builder.push_png(1, b"definitely not a png").is_err());
        assert!(matches!(builder.finish(), Err(RasterError::EmptyComposite)));
    }
}
