use std::collections::HashMap;

use crate::config::SizingConfig;
use crate::ir::Diagram;

/// Estimated box height for a node showing `tile_count` event tiles.
pub fn estimate_node_height(tile_count: usize, config: &SizingConfig) -> f32 {
    let chrome = config.header_height + config.padding;
    if tile_count == 0 {
        return chrome + config.empty_padding;
    }
    let count = tile_count as f32;
    chrome + count * config.tile_height + (count - 1.0) * config.tile_gap
}

/// Rendered heights reported back by the drawing surface, keyed by node id.
///
/// Writes are filtered: a value is stored only when it is a positive finite
/// number that differs from what is already cached. `record` returning `false`
/// is what stops the measure -> relayout -> re-measure cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasuredHeights {
    heights: HashMap<String, f32>,
}

impl MeasuredHeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the cache changed and a new layout pass is due.
    pub fn record(&mut self, id: &str, height: f32) -> bool {
        if !height.is_finite() || height <= 0.0 {
            log::trace!(node = id, height; "Ignoring unusable measured height");
            return false;
        }
        match self.heights.get(id) {
            Some(prev) if *prev == height => {
                log::trace!(node = id, height; "Measured height unchanged");
                false
            }
            _ => {
                self.heights.insert(id.to_string(), height);
                true
            }
        }
    }

    /// Merges a batch of measurements; `true` if any entry changed.
    pub fn merge<I, S>(&mut self, entries: I) -> bool
    where
        I: IntoIterator<Item = (S, f32)>,
        S: AsRef<str>,
    {
        let mut changed = false;
        for (id, height) in entries {
            changed |= self.record(id.as_ref(), height);
        }
        changed
    }

    pub fn get(&self, id: &str) -> Option<f32> {
        self.heights.get(id).copied()
    }

    /// Drops entries for nodes the predicate rejects.
    pub fn retain_nodes<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.heights.retain(|id, _| keep(id));
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }
}

/// Height each placed node is laid out with: measured if known, else estimated.
pub fn effective_heights(
    diagram: &Diagram,
    measured: &MeasuredHeights,
    config: &SizingConfig,
) -> HashMap<String, f32> {
    diagram
        .nodes
        .keys()
        .map(|id| {
            let height = measured
                .get(id)
                .unwrap_or_else(|| estimate_node_height(diagram.tile_count(id), config));
            (id.clone(), height)
        })
        .collect()
}
