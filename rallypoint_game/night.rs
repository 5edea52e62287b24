use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NightMode {
    Off,
    DefenseBonus,
}

/// What the night policy says about a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NightPolicyState {
    pub active: bool,
    pub mode: NightMode,
    pub defense_multiplier: f64,
}

impl NightPolicyState {
    pub fn inactive() -> Self {
        Self {
            active: false,
            mode: NightMode::Off,
            defense_multiplier: 1.0,
        }
    }

    /// Multiplier to apply to defense points, 1.0 when the policy is off.
    pub fn effective_multiplier(&self) -> f64 {
        if self.active {
            self.defense_multiplier
        } else {
            1.0
        }
    }
}

pub trait NightPolicy: Send + Sync {
    fn evaluate(&self, at: DateTime<Utc>) -> NightPolicyState;
}

/// Never active.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNightPolicy;

impl NightPolicy for DisabledNightPolicy {
    fn evaluate(&self, _at: DateTime<Utc>) -> NightPolicyState {
        NightPolicyState::inactive()
    }
}

/// Active between two UTC hours every day. The window may wrap past midnight.
#[derive(Debug, Clone, Copy)]
pub struct FixedNightPolicy {
    start_hour: u32,
    end_hour: u32,
    defense_multiplier: f64,
}

impl FixedNightPolicy {
    pub fn new(start_hour: u32, end_hour: u32, defense_multiplier: f64) -> Self {
        Self {
            start_hour: start_hour % 24,
            end_hour: end_hour % 24,
            defense_multiplier,
        }
    }

    fn is_night(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

impl NightPolicy for FixedNightPolicy {
    fn evaluate(&self, at: DateTime<Utc>) -> NightPolicyState {
        if self.is_night(at.hour()) {
            NightPolicyState {
                active: true,
                mode: NightMode::DefenseBonus,
                defense_multiplier: self.defense_multiplier,
            }
        } else {
            NightPolicyState::inactive()
        }
    }
}
