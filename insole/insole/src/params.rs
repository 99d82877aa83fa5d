//! Session-wide settings.

use insole_morph::{SmoothParams, TwistAxis};
use insole_repair::{DEFAULT_BASE_THICKNESS, TraceParams};
use insole_zones::ZoneParams;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{InsoleError, InsoleResult};

/// Every tunable of the insole pipeline in one place.
///
/// # Example
///
/// ```
/// use insole::InsoleParams;
/// use insole::morph::TwistAxis;
///
/// let params = InsoleParams::default()
///     .with_thickness(6.0)
///     .with_twist_axis(TwistAxis::Longitudinal);
/// assert!(params.validate().is_ok());
/// assert_eq!(params.smooth_params().iterations, 15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InsoleParams {
    /// Zone cut fractions.
    pub zones: ZoneParams,
    /// Base thickness below the lowest surface point, in millimetres.
    pub thickness: f64,
    /// Laplacian smoothing passes.
    pub smoothing_iterations: u32,
    /// Axis the twist step rotates about.
    pub twist_axis: TwistAxis,
    /// Cap on the number of vertices in one traced boundary loop.
    pub max_loop_vertices: usize,
}

impl Default for InsoleParams {
    fn default() -> Self {
        Self {
            zones: ZoneParams::default(),
            thickness: DEFAULT_BASE_THICKNESS,
            smoothing_iterations: SmoothParams::default().iterations,
            twist_axis: TwistAxis::default(),
            max_loop_vertices: TraceParams::default().max_loop_vertices,
        }
    }
}

impl InsoleParams {
    /// Set the zone parameters.
    #[must_use]
    pub const fn with_zones(mut self, zones: ZoneParams) -> Self {
        self.zones = zones;
        self
    }

    /// Set the base thickness.
    #[must_use]
    pub const fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    /// Set the number of smoothing passes.
    #[must_use]
    pub const fn with_smoothing_iterations(mut self, iterations: u32) -> Self {
        self.smoothing_iterations = iterations;
        self
    }

    /// Set the twist axis.
    #[must_use]
    pub const fn with_twist_axis(mut self, axis: TwistAxis) -> Self {
        self.twist_axis = axis;
        self
    }

    /// Set the boundary loop cap.
    #[must_use]
    pub const fn with_max_loop_vertices(mut self, max: usize) -> Self {
        self.max_loop_vertices = max;
        self
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// [`InsoleError::Zone`] for bad zone fractions, otherwise
    /// [`InsoleError::InvalidParameter`] for a negative or non-finite
    /// thickness or a zero loop cap.
    #[allow(clippy::cast_precision_loss)]
    pub fn validate(&self) -> InsoleResult<()> {
        self.zones.validate()?;
        if !self.thickness.is_finite() || self.thickness < 0.0 {
            return Err(InsoleError::InvalidParameter {
                name: "thickness",
                value: self.thickness,
            });
        }
        if self.max_loop_vertices == 0 {
            return Err(InsoleError::InvalidParameter {
                name: "max_loop_vertices",
                value: self.max_loop_vertices as f64,
            });
        }
        Ok(())
    }

    /// Smoothing parameters for [`InsoleSession::smooth`](crate::InsoleSession::smooth).
    #[must_use]
    pub fn smooth_params(&self) -> SmoothParams {
        SmoothParams::default().with_iterations(self.smoothing_iterations)
    }

    /// Tracing parameters for boundary walks.
    #[must_use]
    pub fn trace_params(&self) -> TraceParams {
        TraceParams::default().with_max_loop_vertices(self.max_loop_vertices)
    }
}
