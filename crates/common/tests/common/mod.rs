//! Shared test utilities for viewer integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use ::common::prelude::*;
use ::common::testkit::GatedVersionStore;
use serde_json::Value;

pub const KEY: &str = "document.json";

pub type Viewer = VersionViewer<MemorySurface, MemorySurface>;

pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
}

pub fn body(tree: &Value) -> Vec<u8> {
    serde_json::to_vec(tree).unwrap()
}

/// A viewer over a gated store with both surfaces ready and no page delay.
pub fn gated_viewer(store: &GatedVersionStore) -> Viewer {
    viewer_with(Arc::new(store.clone()), MemorySurface::ready())
}

pub fn viewer_with(store: Arc<dyn VersionStore>, secondary: MemorySurface) -> Viewer {
    VersionViewer::new(store, KEY, MemorySurface::ready(), secondary)
        .with_page_stagger(Duration::ZERO)
}

/// Yield to the runtime until `cond` holds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if cond() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}
