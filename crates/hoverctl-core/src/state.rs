//! Vehicle state snapshot and demand vector
//!
//! [`VehicleState`] arrives from the sensor-fusion subsystem once per tick
//! and is read-only to the control stages. [`Demands`] starts the tick as
//! the receiver's normalized stick values and is refined in place by each
//! stage before the mixer consumes it.

use crate::{Quat, Vec3};

/// Estimated vehicle kinematics for the current tick
///
/// Axes are world-frame with z up: `location.z` is altitude and
/// `inertial_vel.z` is climb rate. `angular_vel` is the body-frame gyro
/// rate (x = roll, y = pitch, z = yaw).
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState {
    /// Position [m] (world frame)
    pub location: Vec3,
    /// Inertial velocity [m/s] (world frame)
    pub inertial_vel: Vec3,
    /// Orientation (body to world)
    pub orientation: Quat,
    /// Angular velocity [rad/s] (body frame)
    pub angular_vel: Vec3,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            location: Vec3::zeros(),
            inertial_vel: Vec3::zeros(),
            orientation: Quat::identity(),
            angular_vel: Vec3::zeros(),
        }
    }
}

impl VehicleState {
    /// Altitude [m]
    pub fn altitude(&self) -> f64 {
        self.location.z
    }

    /// Vertical velocity [m/s], positive up
    pub fn climb_rate(&self) -> f64 {
        self.inertial_vel.z
    }
}

/// Normalized control demands for one tick
///
/// Each field is a dimensionless stick-range value; stages overwrite the
/// fields they own. Single writer at a time, in chain order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Demands {
    pub throttle: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Demands {
    pub fn new(throttle: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self {
            throttle,
            roll,
            pitch,
            yaw,
        }
    }
}
