use serde::{Deserialize, Serialize};

/// Surface heights keyed by `(x, z)`, iterated in insertion order.
///
/// City layout is greedy and order dependent, so the iteration order is
/// part of the output contract.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(i32, i32, i32)>", into = "Vec<(i32, i32, i32)>")]
pub struct HeightMap {
    entries: Vec<(i32, i32, i32)>,
    index: std::collections::HashMap<(i32, i32), usize>,
}

impl HeightMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Square of side `2 * half + 1` at constant height, rows of increasing z
    pub fn flat(center_x: i32, center_z: i32, half: i32, y: i32) -> Self {
        let mut map = Self::new();
        for z in center_z - half..=center_z + half {
            for x in center_x - half..=center_x + half {
                map.insert(x, z, y);
            }
        }
        map
    }

    /// Set the height; an existing key keeps its position
    pub fn insert(&mut self, x: i32, z: i32, y: i32) {
        match self.index.get(&(x, z)) {
            Some(&i) => self.entries[i].2 = y,
            None => {
                self.index.insert((x, z), self.entries.len());
                self.entries.push((x, z, y));
            }
        }
    }

    pub fn get(&self, x: i32, z: i32) -> Option<i32> {
        self.index.get(&(x, z)).map(|&i| self.entries[i].2)
    }

    pub fn contains(&self, x: i32, z: i32) -> bool {
        self.index.contains_key(&(x, z))
    }

    /// `(x, z, y)` in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<(i32, i32, i32)>> for HeightMap {
    fn from(entries: Vec<(i32, i32, i32)>) -> Self {
        let mut map = Self::new();
        for (x, z, y) in entries {
            map.insert(x, z, y);
        }
        map
    }
}

impl From<HeightMap> for Vec<(i32, i32, i32)> {
    fn from(map: HeightMap) -> Self {
        map.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let mut map = HeightMap::new();
        map.insert(5, 5, 1);
        map.insert(-3, 2, 2);
        map.insert(0, 0, 3);
        map.insert(5, 5, 9);
        let keys: Vec<_> = map.iter().map(|(x, z, _)| (x, z)).collect();
        assert_eq!(keys, vec![(5, 5), (-3, 2), (0, 0)]);
        assert_eq!(map.get(5, 5), Some(9));
        assert_eq!(map.get(1, 1), None);
    }

    #[test]
    fn test_flat() {
        let map = HeightMap::flat(0, 0, 20, 64);
        assert_eq!(map.len(), 41 * 41);
        assert_eq!(map.iter().next(), Some((-20, -20, 64)));
        assert!(map.contains(20, 20));
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let map: HeightMap = vec![(2, 0, 5), (1, 0, 6)].into();
        let json = serde_json::to_string(&map).unwrap();
        let back: HeightMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
        assert_eq!(back.iter().next(), Some((2, 0, 5)));
    }
}
