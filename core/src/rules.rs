use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::HostileKind;

/// Health the player starts each round with unless configured otherwise.
pub const DEFAULT_MAX_HEALTH: i32 = 10;

/// Health lost per step onto a hazard cell unless configured otherwise.
pub const DEFAULT_HAZARD_DAMAGE: i32 = 2;

/// Tunable game rules handed to the world at construction.
///
/// Every field has a default, so a rules file only needs to list the values
/// it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Rules {
    /// Health restored at the start of every round.
    pub max_health: i32,
    /// Health lost per step onto a hazard cell.
    pub hazard_damage: i32,
    /// Profile applied to every spider.
    pub spider: HostileProfile,
    /// Profile applied to every fly.
    pub fly: HostileProfile,
}

impl Rules {
    /// Profile used for hostiles of the given kind.
    #[must_use]
    pub const fn profile(&self, kind: HostileKind) -> HostileProfile {
        match kind {
            HostileKind::Spider => self.spider,
            HostileKind::Fly => self.fly,
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            max_health: DEFAULT_MAX_HEALTH,
            hazard_damage: DEFAULT_HAZARD_DAMAGE,
            spider: HostileProfile::new(5, Duration::from_millis(200)),
            fly: HostileProfile::new(3, Duration::from_millis(300)),
        }
    }
}

/// Contact damage and movement cadence of one hostile kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostileProfile {
    /// Health removed from the player on contact.
    pub damage: i32,
    /// Delay between two ticks of the hostile.
    #[serde(rename = "period_ms", with = "millis")]
    pub period: Duration,
}

impl HostileProfile {
    /// Creates a profile from explicit values.
    #[must_use]
    pub const fn new(damage: i32, period: Duration) -> Self {
        Self { damage, period }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(period: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(period.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
