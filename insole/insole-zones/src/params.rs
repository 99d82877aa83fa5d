//! Zone threshold parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ZoneError, ZoneResult};

/// Fractional zone thresholds, each relative to the longitudinal extent.
///
/// Falloffs large enough to overlap the opposite zone are allowed; they only
/// leave some zones empty.
///
/// # Example
///
/// ```
/// use insole_zones::ZoneParams;
///
/// let params = ZoneParams::default().with_flat_area(0.3).with_falloff(0.1);
/// assert!(params.validate().is_ok());
/// assert!(ZoneParams::default().with_heel_area(1.5).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZoneParams {
    /// Fraction of the length, measured from the toe, that is flattened.
    pub flat_area: f64,
    /// Falloff fraction blending the flat zone into the rest.
    pub falloff: f64,
    /// Fraction of the length, measured from the heel, forming the heel zone.
    pub heel_area: f64,
    /// Falloff fraction blending the heel zone into the rest.
    pub heel_falloff: f64,
}

impl Default for ZoneParams {
    fn default() -> Self {
        Self {
            flat_area: 0.25,
            falloff: 0.25,
            heel_area: 0.25,
            heel_falloff: 0.25,
        }
    }
}

impl ZoneParams {
    /// Set the flat area fraction.
    #[must_use]
    pub const fn with_flat_area(mut self, flat_area: f64) -> Self {
        self.flat_area = flat_area;
        self
    }

    /// Set the front falloff fraction.
    #[must_use]
    pub const fn with_falloff(mut self, falloff: f64) -> Self {
        self.falloff = falloff;
        self
    }

    /// Set the heel area fraction.
    #[must_use]
    pub const fn with_heel_area(mut self, heel_area: f64) -> Self {
        self.heel_area = heel_area;
        self
    }

    /// Set the heel falloff fraction.
    #[must_use]
    pub const fn with_heel_falloff(mut self, heel_falloff: f64) -> Self {
        self.heel_falloff = heel_falloff;
        self
    }

    /// Check that every fraction lies in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> ZoneResult<()> {
        for (name, value) in [
            ("flat_area", self.flat_area),
            ("falloff", self.falloff),
            ("heel_area", self.heel_area),
            ("heel_falloff", self.heel_falloff),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ZoneError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}
