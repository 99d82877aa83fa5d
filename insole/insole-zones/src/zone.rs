//! Zone names and families.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ZoneError;

/// Which of the two independent partitions a zone belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ZoneFamily {
    /// Toe-side partition: flat, mid, original.
    Front,
    /// Heel-side partition: heel, heel_mid, non_heel.
    Heel,
}

impl ZoneFamily {
    /// The zones of this family, in toe-to-heel order for the front family
    /// and heel-to-toe order for the heel family.
    #[must_use]
    pub const fn zones(self) -> [Zone; 3] {
        match self {
            Self::Front => [Zone::Flat, Zone::Mid, Zone::Original],
            Self::Heel => [Zone::Heel, Zone::HeelMid, Zone::NonHeel],
        }
    }
}

/// A named longitudinal zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Zone {
    /// Toe region that gets flattened.
    Flat,
    /// Blend band behind the flat region.
    Mid,
    /// Everything behind the front blend band.
    Original,
    /// Heel region.
    Heel,
    /// Blend band in front of the heel.
    HeelMid,
    /// Everything in front of the heel blend band.
    NonHeel,
}

impl Zone {
    /// Every zone.
    pub const ALL: [Self; 6] = [
        Self::Flat,
        Self::Mid,
        Self::Original,
        Self::Heel,
        Self::HeelMid,
        Self::NonHeel,
    ];

    /// Family this zone partitions.
    #[must_use]
    pub const fn family(self) -> ZoneFamily {
        match self {
            Self::Flat | Self::Mid | Self::Original => ZoneFamily::Front,
            Self::Heel | Self::HeelMid | Self::NonHeel => ZoneFamily::Heel,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Mid => "mid",
            Self::Original => "original",
            Self::Heel => "heel",
            Self::HeelMid => "heel_mid",
            Self::NonHeel => "non_heel",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Zone {
    type Err = ZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|z| z.name() == s)
            .ok_or_else(|| ZoneError::UnknownZone(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip() {
        for zone in Zone::ALL {
            assert_eq!(zone.name().parse::<Zone>().unwrap(), zone);
        }
        assert!("toe".parse::<Zone>().is_err());
    }

    #[test]
    fn families_cover_all_zones() {
        let mut covered: Vec<Zone> = ZoneFamily::Front.zones().to_vec();
        covered.extend(ZoneFamily::Heel.zones());
        assert_eq!(covered.len(), Zone::ALL.len());
        for zone in Zone::ALL {
            assert!(zone.family().zones().contains(&zone));
        }
    }
}
