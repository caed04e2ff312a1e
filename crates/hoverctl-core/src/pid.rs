//! Scalar PID accumulator
//!
//! The primitive every control stage composes: given a setpoint and a
//! measured value it produces a correction, accumulating error for the
//! integral term and tracking the previous error for the derivative term.
//! The primitive imposes no output bounds; saturation belongs to the
//! stage composing it.

use serde::{Deserialize, Serialize};

/// PID gains
///
/// Gains are fixed once a [`Pid`] is constructed; only the accumulator
/// state is mutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain
    pub kp: f64,
    /// Integral gain
    pub ki: f64,
    /// Derivative gain
    pub kd: f64,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
        }
    }
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    /// Pure-proportional gain set (I and D zero), as used by the outer
    /// position loop of the altitude hold.
    pub fn p(kp: f64) -> Self {
        Self::new(kp, 0.0, 0.0)
    }

    /// Proportional-integral gain set (D zero), as used by the yaw axis.
    pub fn pi(kp: f64, ki: f64) -> Self {
        Self::new(kp, ki, 0.0)
    }

    /// All three gains are finite numbers
    pub fn is_finite(&self) -> bool {
        self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite()
    }
}

/// Scalar PID controller with internal accumulator state
#[derive(Debug, Clone)]
pub struct Pid {
    gains: PidGains,
    integral: f64,
    prev_error: f64,
}

impl Pid {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral: 0.0,
            prev_error: 0.0,
        }
    }

    /// Compute the correction for one tick
    ///
    /// u = kp·e + ki·Σe + kd·(e - e_prev), with e = setpoint - measured.
    ///
    /// The integral accumulates per tick (the loop rate is fixed, so the
    /// time step is folded into `ki`).
    pub fn compute(&mut self, setpoint: f64, measured: f64) -> f64 {
        let error = setpoint - measured;

        self.integral += error;
        let derivative = error - self.prev_error;
        self.prev_error = error;

        self.gains.kp * error + self.gains.ki * self.integral + self.gains.kd * derivative
    }

    /// Clear the integral accumulator and previous error; gains are kept.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }

    pub fn gains(&self) -> &PidGains {
        &self.gains
    }
}
