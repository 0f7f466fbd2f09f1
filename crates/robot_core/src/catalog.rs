use ahash::AHashMap;

use crate::{Level, LevelId};

/// Ordered, immutable set of predefined levels.
///
/// List order defines "next level" traversal.
#[derive(Debug, Clone, Default)]
pub struct LevelCatalog {
    levels: Vec<Level>,
    index: AHashMap<LevelId, usize>,
}

impl LevelCatalog {
    /// Builds the catalog. On duplicate ids the first occurrence wins lookup;
    /// content validation rejects duplicates before this point.
    pub fn new(levels: Vec<Level>) -> Self {
        let mut index = AHashMap::with_capacity(levels.len());
        for (position, level) in levels.iter().enumerate() {
            index.entry(level.id.clone()).or_insert(position);
        }
        Self { levels, index }
    }

    pub fn get(&self, id: &LevelId) -> Option<&Level> {
        self.index.get(id).map(|&i| &self.levels[i])
    }

    pub fn first(&self) -> Option<&Level> {
        self.levels.first()
    }

    /// The level listed after `id`, or `None` when `id` is last or unknown.
    pub fn next_after(&self, id: &LevelId) -> Option<&Level> {
        let position = *self.index.get(id)?;
        self.levels.get(position + 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
