//! City layout configuration

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Road topology strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrangementType {
    /// Lanes every `block_length + road_thickness` tiles on both axes
    #[default]
    Grid,
    /// Only the two axis lines through the centre
    Centralized,
    /// One Archimedean spiral arm
    Spiral,
    /// Concentric rings joined by axis spokes
    Circular,
    /// No main lanes; buildings only
    Scattered,
}

impl ArrangementType {
    /// Whether `(dx, dz)` relative to the centre lies on a main lane
    pub fn is_lane(self, dx: i64, dz: i64, thickness: i32, length: i32) -> bool {
        let thickness = i64::from(thickness.max(1));
        let period = (i64::from(length) + thickness).max(1);
        match self {
            ArrangementType::Grid => dx.rem_euclid(period) < thickness || dz.rem_euclid(period) < thickness,
            ArrangementType::Centralized => dx == 0 || dz == 0,
            ArrangementType::Spiral => {
                let r = (dx as f64).hypot(dz as f64);
                let angle = (dz as f64).atan2(dx as f64).rem_euclid(std::f64::consts::TAU);
                let unwound = r - period as f64 * angle / std::f64::consts::TAU;
                unwound.rem_euclid(period as f64) < thickness as f64
            }
            ArrangementType::Circular => {
                let r = (dx as f64).hypot(dz as f64).round() as i64;
                r.rem_euclid(period) < thickness || dx == 0 || dz == 0
            }
            ArrangementType::Scattered => false,
        }
    }
}

/// Outline of the city around its centre
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CityShape {
    #[default]
    Square,
    Circle,
    Diamond,
}

impl CityShape {
    /// Whether the offset `(dx, dz)` from the centre lies inside `radius`.
    ///
    /// Offsets are `i64` so that any pair of `i32` coordinates fits.
    pub fn contains(self, dx: i64, dz: i64, radius: i32) -> bool {
        let radius = i64::from(radius);
        match self {
            CityShape::Square => dx.abs().max(dz.abs()) <= radius,
            CityShape::Circle => i128::from(dx).pow(2) + i128::from(dz).pow(2) <= i128::from(radius).pow(2),
            CityShape::Diamond => dx.abs() + dz.abs() <= radius,
        }
    }
}

/// How a decorator is positioned relative to road tiles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoratorKind {
    /// Beside straight roads, offset perpendicular to the road
    ByRoad,
    /// On crossings, with a 30% chance
    Cross,
    /// Anywhere on the road, with a 5% chance
    Random,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoratorSpec {
    pub id: String,
    pub kind: DecoratorKind,
}

impl DecoratorSpec {
    pub fn new(id: impl Into<String>, kind: DecoratorKind) -> Self {
        Self { id: id.into(), kind }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    pub arrangement: ArrangementType,
    pub shape: CityShape,
    pub radius: i32,
    pub road_thickness: i32,
    pub block_length: i32,
    /// Town hall template id; `None` disables the ring and plaza
    pub town_hall: Option<String>,
    pub town_hall_spacing: i32,
    pub road_padding: i32,
    pub building_padding: i32,
    pub building_min_spacing: i32,
    pub building_max_spacing: i32,
    /// Template ids for ordinary houses
    pub houses: Vec<String>,
    /// Unique buildings placed once each, preferably at dead ends
    pub special_buildings: Vec<String>,
    pub decorators: Vec<DecoratorSpec>,
    /// Chance for the generic bench on every road tile
    pub side_bench_chance: f64,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            arrangement: ArrangementType::Grid,
            shape: CityShape::Square,
            radius: 20,
            road_thickness: 2,
            block_length: 6,
            town_hall: Some("town_hall".to_string()),
            town_hall_spacing: 10,
            road_padding: 1,
            building_padding: 1,
            building_min_spacing: 3,
            building_max_spacing: 5,
            houses: vec!["house".to_string()],
            special_buildings: vec!["well".to_string(), "market".to_string()],
            decorators: vec![
                DecoratorSpec::new("lamp_post", DecoratorKind::ByRoad),
                DecoratorSpec::new("fountain", DecoratorKind::Cross),
                DecoratorSpec::new("barrel", DecoratorKind::Random),
            ],
            side_bench_chance: 0.8,
        }
    }
}

impl CityConfig {
    pub fn validate(&self) -> Result<()> {
        if self.radius < 0 {
            return Err(Error::config("city.radius must not be negative"));
        }
        if self.road_thickness < 1 || self.block_length < 0 {
            return Err(Error::config("city.road_thickness must be at least 1 and block_length not negative"));
        }
        if self.building_min_spacing > self.building_max_spacing {
            return Err(Error::config(format!(
                "city.building_min_spacing ({}) exceeds building_max_spacing ({})",
                self.building_min_spacing, self.building_max_spacing
            )));
        }
        if self.road_padding < 0 || self.building_padding < 0 || self.town_hall_spacing < 0 {
            return Err(Error::config("city paddings and spacings must not be negative"));
        }
        if !(0.0..=1.0).contains(&self.side_bench_chance) {
            return Err(Error::config("city.side_bench_chance must be in [0, 1]"));
        }
        Ok(())
    }

    /// Chebyshev radius of the town hall road ring, if any
    pub fn ring_distance(&self) -> Option<i32> {
        self.town_hall.as_ref().map(|_| self.town_hall_spacing.saturating_add(1))
    }

    /// Whether `(dx, dz)` is inside the reserved plaza around the town hall
    pub fn is_plaza(&self, dx: i64, dz: i64) -> bool {
        self.town_hall.is_some() && dx.abs().max(dz.abs()) <= i64::from(self.town_hall_spacing)
    }
}
