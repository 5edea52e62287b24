use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RallyPoint {
    pub village_id: u32,
    pub level: u8,
    /// Landing precision granted to synchronized waves, in milliseconds.
    pub wave_window_ms: u32,
    pub options: Value,
}

impl RallyPoint {
    pub const DEFAULT_WAVE_WINDOW_MS: u32 = 1000;

    pub fn new(village_id: u32, level: u8) -> Self {
        Self {
            village_id,
            level,
            wave_window_ms: Self::DEFAULT_WAVE_WINDOW_MS,
            options: Value::Object(Default::default()),
        }
    }

    pub fn with_wave_window(mut self, wave_window_ms: u32) -> Self {
        self.wave_window_ms = wave_window_ms;
        self
    }

    pub fn allows_catapult_targeting(&self, unlock_level: u8) -> bool {
        self.level >= unlock_level
    }

    /// Reads a free-form option, if set.
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catapult_targeting_unlock() {
        assert!(!RallyPoint::new(1, 9).allows_catapult_targeting(10));
        assert!(RallyPoint::new(1, 10).allows_catapult_targeting(10));
    }

    #[test]
    fn test_options_roundtrip_through_json() {
        let mut rp = RallyPoint::new(1, 1).with_wave_window(50);
        rp.options = json!({ "default_mission": "raid" });

        let restored: RallyPoint = serde_json::from_value(serde_json::to_value(&rp).unwrap()).unwrap();
        assert_eq!(restored.wave_window_ms, 50);
        assert_eq!(restored.option("default_mission"), Some(&json!("raid")));
    }
}
