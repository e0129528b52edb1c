pub mod fixtures;
pub use fixtures::*;

use chrono::{DateTime, TimeZone, Utc};
use photo_culler_core::gallery::MemoryGallery;
use photo_culler_core::PhotoAsset;

/// Timestamp `secs` seconds after a fixed epoch
#[allow(dead_code)]
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// In-memory gallery of `count` distinct noisy photos named `photo_NN.png`
#[allow(dead_code)]
pub fn distinct_gallery(count: usize) -> MemoryGallery {
    let gallery = MemoryGallery::new();
    for i in 0..count {
        gallery.add(
            PhotoAsset::new(format!("photo_{:02}.png", i), at(i as i64)),
            FIXTURES.textured(i).to_vec(),
        );
    }
    gallery
}
