//! Control-chain configuration
//!
//! All gains are plain construction-time numbers supplied by the
//! integrator (board or mission profile); there is no in-flight
//! reconfiguration. Validation happens once, before the chain is built —
//! the control core itself assumes sane gains and never re-checks them
//! per tick.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::control::{AltHoldConfig, AltitudeHoldPid, ControlChain, RateConfig, RateController};

/// Configuration errors, raised at chain construction time
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("non-finite gain in {0}")]
    NonFiniteGain(&'static str),
    #[error("stick deadband must be in (0, 1), got {0}")]
    InvalidDeadband(f64),
    #[error("pilot climb-rate limit must be positive and finite, got {0}")]
    InvalidClimbRateLimit(f64),
    #[error("throttle output limit must be positive and finite, got {0}")]
    InvalidOutputLimit(f64),
    #[error("demands-to-rate scale must be positive and finite, got {0}")]
    InvalidRateScale(f64),
}

/// Full control-chain configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Gyro-rate stage
    pub rate: RateConfig,
    /// Altitude-hold stage
    pub alt_hold: AltHoldConfig,
}

impl ControlConfig {
    /// Check every gain and threshold once, before flight.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rate.cyclic.is_finite() {
            return Err(ConfigError::NonFiniteGain("rate.cyclic"));
        }
        if !(self.rate.yaw_p.is_finite() && self.rate.yaw_i.is_finite()) {
            return Err(ConfigError::NonFiniteGain("rate.yaw"));
        }
        if !(self.rate.demands_to_rate.is_finite() && self.rate.demands_to_rate > 0.0) {
            return Err(ConfigError::InvalidRateScale(self.rate.demands_to_rate));
        }

        let ah = &self.alt_hold;
        if ![ah.kp_pos, ah.kp_vel, ah.ki_vel, ah.kd_vel]
            .iter()
            .all(|g| g.is_finite())
        {
            return Err(ConfigError::NonFiniteGain("alt_hold"));
        }
        if !(ah.stick_deadband > 0.0 && ah.stick_deadband < 1.0) {
            return Err(ConfigError::InvalidDeadband(ah.stick_deadband));
        }
        if !(ah.pilot_velz_max.is_finite() && ah.pilot_velz_max > 0.0) {
            return Err(ConfigError::InvalidClimbRateLimit(ah.pilot_velz_max));
        }
        if !(ah.output_limit.is_finite() && ah.output_limit > 0.0) {
            return Err(ConfigError::InvalidOutputLimit(ah.output_limit));
        }

        Ok(())
    }

    /// Validate, then assemble the chain in its fixed stage order:
    /// the rate stage first, the altitude hold second. The hold thus reads
    /// the receiver's throttle untouched (the rate stage owns only the
    /// rotational axes), while any later stage would see fully corrected
    /// demands.
    pub fn build_chain(&self) -> Result<ControlChain, ConfigError> {
        self.validate()?;

        let mut chain = ControlChain::new();
        chain.push(Box::new(RateController::new(&self.rate)));
        chain.push(Box::new(AltitudeHoldPid::new(&self.alt_hold)));
        Ok(chain)
    }
}
