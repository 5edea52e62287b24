use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tribe {
    Roman,
    Gaul,
    Teuton,
    Natar,
    Nature,
}

impl Tribe {
    /// The kind of wall this tribe builds.
    pub fn wall_kind(&self) -> WallKind {
        match self {
            Tribe::Roman => WallKind::CityWall,
            Tribe::Gaul => WallKind::Palisade,
            Tribe::Teuton | Tribe::Natar | Tribe::Nature => WallKind::EarthWall,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallKind {
    CityWall,
    EarthWall,
    Palisade,
}

impl WallKind {
    /// Per-level defense multiplier of the wall.
    pub fn defense_factor(&self) -> f64 {
        match self {
            WallKind::CityWall => 1.030,
            WallKind::EarthWall => 1.020,
            WallKind::Palisade => 1.025,
        }
    }

    pub fn defense_bonus(&self, level: u8) -> f64 {
        self.defense_factor().powi(level as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_bonus_by_tribe() {
        assert_eq!(Tribe::Roman.wall_kind(), WallKind::CityWall);
        assert_eq!(WallKind::EarthWall.defense_bonus(0), 1.0);
        assert!((WallKind::CityWall.defense_bonus(2) - 1.0609).abs() < 1e-9);
    }
}
