//! Required asset set resolution.

use crate::model::Schedule;
use std::collections::HashSet;

/// Deduplicated, ordered list of asset paths a schedule needs offline.
///
/// Order is first-seen across every link's media (video, image, audio, in
/// link order) followed by every window's offline image (in window order).
/// Empty paths never appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredAssetSet {
    paths: Vec<String>,
}

impl RequiredAssetSet {
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.paths.iter()
    }

    pub fn into_paths(self) -> Vec<String> {
        self.paths
    }
}

impl<'a> IntoIterator for &'a RequiredAssetSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// Walk a schedule and collect the assets it references. Never fails.
pub fn resolve_required_assets(schedule: &Schedule) -> RequiredAssetSet {
    let link_assets = schedule
        .links
        .iter()
        .flat_map(|link| link.media.asset_paths());
    let offline_images = schedule
        .screen
        .windows
        .iter()
        .map(|window| window.offline_image.as_str())
        .filter(|path| !path.is_empty());

    let mut seen = HashSet::new();
    let paths = link_assets
        .chain(offline_images)
        .filter(|path| seen.insert(*path))
        .map(str::to_string)
        .collect();

    RequiredAssetSet { paths }
}
