//! Named movement capabilities that degradation can switch off.

use std::fmt;
use std::str::FromStr;

use crate::ParseFeatureError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum MovementFeature {
    ComplexPathfinding,
    ZoneAwareness,
    Pathfinding,
    RandomMovement,
    All,
}

impl MovementFeature {
    /// Shedding order, least essential first.
    pub const ALL: [MovementFeature; 5] = [
        Self::ComplexPathfinding,
        Self::ZoneAwareness,
        Self::Pathfinding,
        Self::RandomMovement,
        Self::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ComplexPathfinding => "complex-pathfinding",
            Self::ZoneAwareness      => "zone-awareness",
            Self::Pathfinding        => "pathfinding",
            Self::RandomMovement     => "random-movement",
            Self::All                => "all",
        }
    }

    /// Lowest degradation level at which this feature is off.
    pub fn shed_at(self) -> u8 {
        match self {
            Self::ComplexPathfinding => 1,
            Self::ZoneAwareness      => 2,
            Self::Pathfinding        => 3,
            Self::RandomMovement     => 4,
            Self::All                => 5,
        }
    }

    pub fn enabled_at(self, level: u8) -> bool {
        level < self.shed_at()
    }
}

impl fmt::Display for MovementFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementFeature {
    type Err = ParseFeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ParseFeatureError(s.to_owned()))
    }
}
