/// Helpers for exercising the catalog and viewer without real storage
/// or a real editor widget.
///
/// [`GatedVersionStore`] lets a test decide exactly when each revision
/// fetch resolves, which is what the stale-response tests need.
///
/// # Example
///
/// ```rust,ignore
/// use common::testkit::{GatedVersionStore, solid_png};
///
/// #[tokio::test]
/// async fn test_slow_fetch() {
///     let store = GatedVersionStore::new();
///     let id = store.memory().put("document.json", "{}");
///     store.hold(&id);
///
///     // ... spawn a viewer.select(&id) and it will park until:
///     store.release(&id);
/// }
/// ```
mod gated;

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

pub use gated::GatedVersionStore;

/// Encode a single-colour PNG of the given size.
pub fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(rgba));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encoding an in-memory png");
    bytes
}
