//! Palettes: ordered biome sets and interval-keyed lookups

use std::collections::HashMap;

use crate::core::{Error, Result};

use super::types::{Biome, BiomeCategory};

/// Ordered set of biomes, indexed by category
///
/// Insertion order is significant: weighted selection walks candidates in
/// this order, so ties favour earlier entries.
#[derive(Clone, Debug, Default)]
pub struct BiomePalette {
    biomes: Vec<Biome>,
    by_category: HashMap<BiomeCategory, Vec<usize>>,
}

impl BiomePalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a palette from biomes in order
    pub fn from_biomes(biomes: impl IntoIterator<Item = Biome>) -> Self {
        let mut palette = Self::new();
        for biome in biomes {
            palette.push(biome);
        }
        palette
    }

    /// Append a biome; returns its index
    pub fn push(&mut self, biome: Biome) -> usize {
        let index = self.biomes.len();
        self.by_category.entry(biome.category()).or_default().push(index);
        self.biomes.push(biome);
        index
    }

    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Biome> {
        self.biomes.get(index)
    }

    pub fn as_slice(&self) -> &[Biome] {
        &self.biomes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Biome> {
        self.biomes.iter()
    }

    /// Find a biome by `namespace:name` key or bare name
    pub fn find(&self, key: &str) -> Option<&Biome> {
        self.biomes
            .iter()
            .find(|b| b.key() == key || b.name() == key)
    }

    /// Indices of biomes in `category`, in insertion order
    pub fn indices_of(&self, category: BiomeCategory) -> &[usize] {
        self.by_category.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_category(&self, category: BiomeCategory) -> bool {
        !self.indices_of(category).is_empty()
    }

    /// Indices of biomes whose category is in `categories`, in insertion order
    pub fn indices_matching(&self, categories: &[BiomeCategory]) -> Vec<usize> {
        self.biomes
            .iter()
            .enumerate()
            .filter(|(_, b)| categories.contains(&b.category()))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Half-open numeric interval `[min, max)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v < self.max
    }
}

/// Maps numeric intervals to values
///
/// Intervals are searched in insertion order. Overlapping or degenerate
/// intervals are the caller's responsibility and are not validated.
#[derive(Clone, Debug)]
pub struct IntervalPalette<T> {
    entries: Vec<(Interval, T)>,
}

impl<T> Default for IntervalPalette<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> IntervalPalette<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry for `[min, max)`
    pub fn with(mut self, min: f64, max: f64, value: T) -> Self {
        self.insert(min, max, value);
        self
    }

    pub fn insert(&mut self, min: f64, max: f64, value: T) {
        self.entries.push((Interval::new(min, max), value));
    }

    /// First entry whose interval contains `v`
    pub fn find(&self, v: f64) -> Option<&T> {
        self.entries
            .iter()
            .find(|(interval, _)| interval.contains(v))
            .map(|(_, value)| value)
    }

    /// Like [`find`](Self::find), but a miss is an error
    pub fn get(&self, v: f64) -> Result<&T> {
        self.find(v).ok_or(Error::NoPaletteMatch(v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
