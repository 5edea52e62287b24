use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub world_size: i16,
    pub speed: i8,
    /// Seconds after creation during which a movement may be cancelled.
    pub cancel_grace_secs: i64,
    pub catapult_targeting_level: u8,
    pub max_catapult_targets: usize,
    pub tick_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world_size: 100,
            speed: 1,
            cancel_grace_secs: 90,
            catapult_targeting_level: 10,
            max_catapult_targets: 2,
            tick_interval_ms: 1000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();
        let defaults = Self::default();

        let world_size = match env::var("RALLYPOINT_WORLD_SIZE") {
            Ok(val) => val.parse::<i16>().unwrap_or(defaults.world_size),
            Err(_) => defaults.world_size,
        };

        let speed = match env::var("RALLYPOINT_SERVER_SPEED") {
            Ok(val) => val.parse::<i8>().unwrap_or(1).clamp(1, 10),
            Err(_) => defaults.speed,
        };

        let cancel_grace_secs = match env::var("RALLYPOINT_CANCEL_GRACE_SECS") {
            Ok(val) => val.parse::<i64>().unwrap_or(defaults.cancel_grace_secs),
            Err(_) => defaults.cancel_grace_secs,
        };

        let catapult_targeting_level = match env::var("RALLYPOINT_CATAPULT_TARGETING_LEVEL") {
            Ok(val) => val
                .parse::<u8>()
                .unwrap_or(defaults.catapult_targeting_level),
            Err(_) => defaults.catapult_targeting_level,
        };

        let max_catapult_targets = match env::var("RALLYPOINT_MAX_CATAPULT_TARGETS") {
            Ok(val) => val.parse::<usize>().unwrap_or(defaults.max_catapult_targets),
            Err(_) => defaults.max_catapult_targets,
        };

        let tick_interval_ms = match env::var("RALLYPOINT_TICK_INTERVAL_MS") {
            Ok(val) => val.parse::<u64>().unwrap_or(defaults.tick_interval_ms).max(1),
            Err(_) => defaults.tick_interval_ms,
        };

        Self {
            world_size,
            speed,
            cancel_grace_secs,
            catapult_targeting_level,
            max_catapult_targets,
            tick_interval_ms,
        }
    }
}
