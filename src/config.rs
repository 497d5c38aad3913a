// src/config.rs
use chrono::Weekday;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

// --- Defaults ---

pub const DEFAULT_REST_DAY: Weekday = Weekday::Mon;
pub const DEFAULT_ULTRASOUND_TIERS: [u32; 2] = [90, 200];
pub const DEFAULT_ROOM_CAPACITY: u32 = 90;
pub const ENV_PREFIX: &str = "CHECKUP_";

/// Capacity tiers used to turn a day's case volume into rooms/staff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomTierConfig {
    /// Upper bounds (inclusive) of each ultrasound tier. A volume above the
    /// last bound maps to `tiers.len() + 1` rooms, which is the hard cap.
    pub ultrasound_tiers: Vec<u32>,
    /// Cases one room handles per day for the uncapped categories.
    pub room_capacity: u32,
}

impl Default for RoomTierConfig {
    fn default() -> Self {
        Self {
            ultrasound_tiers: DEFAULT_ULTRASOUND_TIERS.to_vec(),
            room_capacity: DEFAULT_ROOM_CAPACITY,
        }
    }
}

impl RoomTierConfig {
    pub fn ultrasound_room_cap(&self) -> u32 {
        self.ultrasound_tiers.len() as u32 + 1
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.ultrasound_tiers.is_empty() {
            return Err(EngineError::Config(
                "ultrasound tiers must contain at least one bound".to_string(),
            ));
        }
        if self.ultrasound_tiers[0] == 0 {
            return Err(EngineError::Config(
                "ultrasound tier bounds must be positive".to_string(),
            ));
        }
        if self.ultrasound_tiers.windows(2).any(|w| w[0] >= w[1]) {
            return Err(EngineError::Config(format!(
                "ultrasound tier bounds must be strictly ascending, got {:?}",
                self.ultrasound_tiers
            )));
        }
        if self.room_capacity == 0 {
            return Err(EngineError::Config(
                "room capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings the engine is constructed with. Nothing in the engine reads
/// ambient state; everything it needs to know lives here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// The one weekday the facility does not operate.
    pub rest_day: Weekday,
    pub room_tiers: RoomTierConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rest_day: DEFAULT_REST_DAY,
            room_tiers: RoomTierConfig::default(),
        }
    }
}

// Raw shape of the CHECKUP_* environment variables
#[derive(Debug, Deserialize, Default)]
struct EnvConfig {
    rest_day: Option<String>,
    ultrasound_tiers: Option<String>,
    room_capacity: Option<u32>,
}

impl EngineConfig {
    /// Loads `.env` (if present) and reads `CHECKUP_REST_DAY`,
    /// `CHECKUP_ULTRASOUND_TIERS` and `CHECKUP_ROOM_CAPACITY`. Unset
    /// variables keep their defaults.
    pub fn from_env() -> EngineResult<Self> {
        dotenv::dotenv().ok();
        let raw = envy::prefixed(ENV_PREFIX).from_env::<EnvConfig>()?;
        let config = Self::from_raw(raw)?;
        info!(
            "Engine configuration loaded: rest day {}, ultrasound tiers {:?}, room capacity {}",
            config.rest_day, config.room_tiers.ultrasound_tiers, config.room_tiers.room_capacity
        );
        Ok(config)
    }

    fn from_raw(raw: EnvConfig) -> EngineResult<Self> {
        let mut config = Self::default();

        if let Some(rest_day) = raw.rest_day.as_deref() {
            config.rest_day = parse_weekday(rest_day)?;
        }
        if let Some(tiers) = raw.ultrasound_tiers.as_deref() {
            config.room_tiers.ultrasound_tiers = parse_tiers(tiers)?;
        }
        if let Some(capacity) = raw.room_capacity {
            config.room_tiers.room_capacity = capacity;
        }

        config.validate()?;
        debug!("Resolved engine configuration: {:?}", config);
        Ok(config)
    }

    pub fn with_rest_day(mut self, rest_day: Weekday) -> Self {
        self.rest_day = rest_day;
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.room_tiers.validate()
    }
}

/// Accepts chrono's weekday spellings ("sun", "Sunday", ...).
pub fn parse_weekday(value: &str) -> EngineResult<Weekday> {
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| EngineError::Config(format!("unrecognised weekday '{}'", value)))
}

fn parse_tiers(value: &str) -> EngineResult<Vec<u32>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>().map_err(|_| {
                EngineError::Config(format!("ultrasound tier '{}' is not a whole number", part))
            })
        })
        .collect()
}
