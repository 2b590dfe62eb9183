//! Integration tests for stacking preview pages into one image

mod common;

use std::sync::Arc;
use std::time::Duration;

use ::common::prelude::*;
use ::common::surface::PageRender;
use ::common::testkit::solid_png;
use ::common::viewer::RasterError;

use crate::common::{at, viewer_with, KEY};

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

async fn previewing(secondary: MemorySurface) -> (MemoryVersionStore, crate::common::Viewer) {
    let store = MemoryVersionStore::new();
    let id = store.put_at(KEY, r#"{"sections":[]}"#, at(9));
    let viewer = viewer_with(Arc::new(store.clone()), secondary);
    viewer.open_catalog().await.unwrap();
    viewer.select(&id).await.unwrap();
    (store, viewer)
}

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory(png).unwrap().to_rgba8()
}

#[tokio::test]
async fn test_failed_page_is_skipped() {
    let secondary = MemorySurface::ready().with_pages(vec![
        PageRender::Png(solid_png(40, 30, RED)),
        PageRender::Fail("renderer crashed".into()),
        PageRender::Png(solid_png(40, 20, BLUE)),
    ]);
    let (_store, viewer) = previewing(secondary).await;

    let composite = viewer.rasterize().await.unwrap();
    assert_eq!(composite.width, 40);
    assert_eq!(composite.height, 50);
    assert_eq!(composite.pages, vec![1, 3]);

    let image = decode(composite.png());
    assert_eq!(image.dimensions(), (40, 50));
    assert_eq!(image.get_pixel(0, 29).0, RED);
    assert_eq!(image.get_pixel(0, 30).0, BLUE);
    assert!(composite.to_data_url().starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_canvas_width_follows_first_page() {
    let secondary = MemorySurface::ready().with_pages(vec![
        PageRender::Png(b"not a png".to_vec()),
        PageRender::Png(solid_png(30, 10, RED)),
        PageRender::Png(solid_png(50, 10, BLUE)),
    ]);
    let (_store, viewer) = previewing(secondary).await;

    let composite = viewer.rasterize().await.unwrap();
    assert_eq!(composite.width, 30);
    assert_eq!(composite.height, 20);
    assert_eq!(composite.pages, vec![2, 3]);
}

#[tokio::test]
async fn test_no_usable_pages() {
    let secondary = MemorySurface::ready().with_pages(vec![PageRender::Fail("blank".into())]);
    let (_store, viewer) = previewing(secondary).await;

    assert!(matches!(
        viewer.rasterize().await,
        Err(ViewerError::Raster(RasterError::EmptyComposite))
    ));
}

#[tokio::test]
async fn test_rejected_until_surface_ready() {
    let secondary = MemorySurface::initializing()
        .with_pages(vec![PageRender::Png(solid_png(8, 8, RED))]);
    let (_store, viewer) = previewing(secondary).await;

    assert!(matches!(
        viewer.rasterize().await,
        Err(ViewerError::SurfaceNotReady)
    ));

    viewer.with_secondary(|s| s.mark_ready());
    let composite = viewer.rasterize().await.unwrap();
    assert_eq!((composite.width, composite.height), (8, 8));
}

#[tokio::test]
async fn test_requires_preview() {
    let store = MemoryVersionStore::new();
    store.put_at(KEY, "{}", at(9));
    let viewer = viewer_with(Arc::new(store), MemorySurface::ready());
    viewer.open_catalog().await.unwrap();

    assert!(matches!(
        viewer.rasterize().await,
        Err(ViewerError::NotPreviewing)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_pages_are_staggered() {
    let store = MemoryVersionStore::new();
    let id = store.put_at(KEY, "{}", at(9));
    let secondary = MemorySurface::ready().with_pages(vec![
        PageRender::Png(solid_png(10, 10, RED)),
        PageRender::Png(solid_png(10, 10, BLUE)),
        PageRender::Png(solid_png(10, 10, RED)),
    ]);
    let viewer = VersionViewer::new(Arc::new(store), KEY, MemorySurface::ready(), secondary)
        .with_page_stagger(Duration::from_millis(500));
    viewer.open_catalog().await.unwrap();
    viewer.select(&id).await.unwrap();

    let started = tokio::time::Instant::now();
    let composite = viewer.rasterize().await.unwrap();
    // 500ms * (1 + 2 + 3)
    assert!(started.elapsed() >= Duration::from_millis(3000));
    assert_eq!(composite.height, 30);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_aborts_rasterization() {
    let store = MemoryVersionStore::new();
    let id = store.put_at(KEY, "{}", at(9));
    let secondary = MemorySurface::ready().with_pages(vec![
        PageRender::Png(solid_png(10, 10, RED)),
        PageRender::Png(solid_png(10, 10, BLUE)),
    ]);
    let viewer = VersionViewer::new(Arc::new(store), KEY, MemorySurface::ready(), secondary);
    viewer.open_catalog().await.unwrap();
    viewer.select(&id).await.unwrap();

    let task = tokio::spawn({
        let viewer = viewer.clone();
        async move { viewer.rasterize().await }
    });
    tokio::time::sleep(Duration::from_millis(700)).await;
    viewer.cancel();

    assert!(matches!(
        task.await.unwrap(),
        Err(ViewerError::NotPreviewing)
    ));
}
