use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use iced::widget::image::Handle;
use tracing::debug;

use crate::media::data_url;

/// Decoded image handles keyed by data URL.
/// Decoding base64 on every frame is too slow, so handles are built once
/// when the set of images changes.
#[derive(Debug, Default)]
pub struct ImageCache {
    handles: HashMap<u64, Handle>,
}

fn key(url: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    hasher.finish()
}

impl ImageCache {
    /// Make the cache hold exactly the handles for `urls`
    pub fn sync<'a>(&mut self, urls: impl IntoIterator<Item = &'a str>) {
        let mut wanted = HashSet::new();
        for url in urls {
            let k = key(url);
            wanted.insert(k);
            if self.handles.contains_key(&k) {
                continue;
            }
            match data_url::decode_bytes(url) {
                Ok(bytes) => {
                    self.handles.insert(k, Handle::from_bytes(bytes));
                }
                Err(e) => debug!("Skipping undecodable image: {}", e),
            }
        }
        self.handles.retain(|k, _| wanted.contains(k));
        debug!("{} image handles cached", self.len());
    }

    pub fn get(&self, url: &str) -> Option<Handle> {
        self.handles.get(&key(url)).cloned()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }
}
