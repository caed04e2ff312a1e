//! Gyro-rate stage
//!
//! Maps pilot stick deflection to an angular-rate setpoint per axis and
//! runs a rate PID against the measured gyro rate, replacing the roll,
//! pitch, and yaw demands with the corrections. Roll and pitch share one
//! cyclic gain set (separate accumulators); yaw runs PI only. Always
//! active, no deadband.

use serde::{Deserialize, Serialize};

use super::PidController;
use crate::pid::{Pid, PidGains};
use crate::state::{Demands, VehicleState};

/// Rate-stage gains
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateConfig {
    /// Shared roll/pitch gain set
    pub cyclic: PidGains,
    /// Yaw proportional gain
    pub yaw_p: f64,
    /// Yaw integral gain
    pub yaw_i: f64,
    /// Stick deflection to angular-rate setpoint scale [rad/s]
    pub demands_to_rate: f64,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            cyclic: PidGains::p(0.05),
            yaw_p: 0.10,
            yaw_i: 0.01,
            demands_to_rate: 8.58,
        }
    }
}

/// Angular-rate controller for the three rotational axes
#[derive(Debug, Clone)]
pub struct RateController {
    roll_pid: Pid,
    pitch_pid: Pid,
    yaw_pid: Pid,
    demands_to_rate: f64,
}

impl RateController {
    pub fn new(config: &RateConfig) -> Self {
        Self {
            roll_pid: Pid::new(config.cyclic),
            pitch_pid: Pid::new(config.cyclic),
            yaw_pid: Pid::new(PidGains::pi(config.yaw_p, config.yaw_i)),
            demands_to_rate: config.demands_to_rate,
        }
    }
}

impl PidController for RateController {
    fn modify_demands(&mut self, state: &VehicleState, demands: &mut Demands) {
        let gyro = state.angular_vel;
        let scale = self.demands_to_rate;

        demands.roll = self.roll_pid.compute(scale * demands.roll, gyro.x);
        demands.pitch = self.pitch_pid.compute(scale * demands.pitch, gyro.y);
        demands.yaw = self.yaw_pid.compute(scale * demands.yaw, gyro.z);
    }

    fn reset(&mut self) {
        self.roll_pid.reset();
        self.pitch_pid.reset();
        self.yaw_pid.reset();
    }
}
