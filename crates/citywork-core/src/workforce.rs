//! Staffing and the efficiency curve derived from it.

use crate::config::ConfigError;

/// Constants of the linear efficiency curve.
///
/// `efficiency = base_floor + (assigned / max) * scale_per_worker`, clamped
/// to `[0, 1]`, and exactly zero when nobody is assigned.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EfficiencyCurve {
    pub base_floor: f64,
    pub scale_per_worker: f64,
}

impl EfficiencyCurve {
    pub fn new(base_floor: f64, scale_per_worker: f64) -> Self {
        Self {
            base_floor,
            scale_per_worker,
        }
    }

    /// Both constants must be finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_floor.is_finite() {
            return Err(ConfigError::InvalidCurve {
                field: "base_floor",
                value: self.base_floor,
            });
        }
        if !self.scale_per_worker.is_finite() {
            return Err(ConfigError::InvalidCurve {
                field: "scale_per_worker",
                value: self.scale_per_worker,
            });
        }
        Ok(())
    }
}

impl Default for EfficiencyCurve {
    /// A fully staffed facility runs at 100%; a single worker still gets 40%.
    fn default() -> Self {
        Self::new(0.4, 0.6)
    }
}

/// Workers assigned to a facility, bounded by its configured maximum.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Workforce {
    assigned: u32,
    max: u32,
    curve: EfficiencyCurve,
}

impl Workforce {
    /// Fails if `max` is zero or the curve is not finite. Starts unstaffed.
    pub fn new(max: u32, curve: EfficiencyCurve) -> Result<Self, ConfigError> {
        if max == 0 {
            return Err(ConfigError::ZeroWorkforce);
        }
        curve.validate()?;
        Ok(Self {
            assigned: 0,
            max,
            curve,
        })
    }

    /// Assign workers, clamped to `max`.
    pub fn set_assigned(&mut self, count: u32) {
        self.assigned = count.min(self.max);
    }

    pub fn assigned(&self) -> u32 {
        self.assigned
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn curve(&self) -> EfficiencyCurve {
        self.curve
    }

    /// Current efficiency in `[0, 1]`.
    pub fn efficiency(&self) -> f64 {
        if self.assigned == 0 {
            return 0.0;
        }
        let staffed = f64::from(self.assigned) / f64::from(self.max);
        (self.curve.base_floor + staffed * self.curve.scale_per_worker).clamp(0.0, 1.0)
    }
}
