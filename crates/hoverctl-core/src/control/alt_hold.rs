//! Altitude-hold stage
//!
//! Replaces direct throttle-stick control with a velocity-regulated hold
//! whenever the pilot's throttle stick sits inside a deadband around
//! center. Two PID loops run in cascade: a pure-P outer position loop
//! whose output is the climb-rate setpoint for the inner velocity loop.
//! Outside the deadband the pilot commands climb rate directly, scaled by
//! a maximum rate.
//!
//! On every transition *into* the deadband the velocity integrator is
//! cleared and the current altitude is captured as the new hold target, so
//! no integral error carries over from manual-rate flight. Rapid stick
//! oscillation across the boundary therefore re-captures the target on
//! every entry; the hold only settles once the stick stays centered.

use serde::{Deserialize, Serialize};

use super::PidController;
use crate::pid::{Pid, PidGains};
use crate::state::{Demands, VehicleState};

/// Altitude-hold gains and thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AltHoldConfig {
    /// Outer position-loop proportional gain [1/s]
    /// (its output is a climb-rate setpoint)
    pub kp_pos: f64,
    /// Inner velocity-loop proportional gain
    pub kp_vel: f64,
    /// Inner velocity-loop integral gain
    pub ki_vel: f64,
    /// Inner velocity-loop derivative gain
    pub kd_vel: f64,
    /// Throttle-stick magnitude below which the hold engages
    pub stick_deadband: f64,
    /// Climb rate commanded at full stick deflection [m/s]
    pub pilot_velz_max: f64,
    /// Magnitude limit on the corrected throttle demand
    pub output_limit: f64,
}

impl Default for AltHoldConfig {
    fn default() -> Self {
        Self {
            kp_pos: 1.0,
            kp_vel: 0.5,
            ki_vel: 1.5,
            kd_vel: 0.4,
            stick_deadband: 0.10,
            pilot_velz_max: 2.5,
            output_limit: 1.0,
        }
    }
}

/// Cascaded altitude-hold controller
///
/// Owns the outer position [`Pid`] (pure P) and the inner velocity
/// [`Pid`], plus the deadband-membership flag and the captured altitude
/// target. The target holds the altitude recorded at the most recent
/// deadband entry (0 until the first entry).
#[derive(Debug, Clone)]
pub struct AltitudeHoldPid {
    pos_pid: Pid,
    vel_pid: Pid,
    in_band_prev: bool,
    altitude_target: f64,
    stick_deadband: f64,
    pilot_velz_max: f64,
    output_limit: f64,
}

impl AltitudeHoldPid {
    pub fn new(config: &AltHoldConfig) -> Self {
        Self {
            pos_pid: Pid::new(PidGains::p(config.kp_pos)),
            vel_pid: Pid::new(PidGains::new(config.kp_vel, config.ki_vel, config.kd_vel)),
            in_band_prev: false,
            altitude_target: 0.0,
            stick_deadband: config.stick_deadband,
            pilot_velz_max: config.pilot_velz_max,
            output_limit: config.output_limit,
        }
    }

    /// Altitude captured at the last deadband entry [m]
    pub fn altitude_target(&self) -> f64 {
        self.altitude_target
    }
}

impl PidController for AltitudeHoldPid {
    fn modify_demands(&mut self, state: &VehicleState, demands: &mut Demands) {
        let altitude = state.altitude();
        let stick = demands.throttle;

        let in_band = stick.abs() < self.stick_deadband;

        // Entering the deadband clears the velocity integrator so manual
        // flight leaves no windup behind. The latch lives for this tick
        // only: it defers the target capture until after the velocity
        // computation below, which must still use the previous target.
        let mut did_reset = false;
        if in_band && !self.in_band_prev {
            self.vel_pid.reset();
            did_reset = true;
            log::debug!("altitude hold engaged at {altitude:.2} m");
        }
        self.in_band_prev = in_band;

        // Climb-rate setpoint: outer position loop inside the band, stick
        // proportion scaled to the maximum pilot rate outside.
        let target_velocity = if in_band {
            self.pos_pid.compute(self.altitude_target, altitude)
        } else {
            self.pilot_velz_max * stick
        };

        // The velocity-loop correction supersedes the stick value.
        let correction = self.vel_pid.compute(target_velocity, state.climb_rate());
        demands.throttle = correction.clamp(-self.output_limit, self.output_limit);

        if did_reset {
            self.altitude_target = altitude;
        }
    }

    fn should_flash_led(&self) -> bool {
        // Visual "altitude hold engaged" indicator
        true
    }

    fn reset(&mut self) {
        self.pos_pid.reset();
        self.vel_pid.reset();
        self.in_band_prev = false;
        self.altitude_target = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::Vec3;

    fn state_at(altitude: f64, climb_rate: f64) -> VehicleState {
        VehicleState {
            location: Vec3::new(0.0, 0.0, altitude),
            inertial_vel: Vec3::new(0.0, 0.0, climb_rate),
            ..VehicleState::default()
        }
    }

    fn p_only_hold(kp_pos: f64, kp_vel: f64) -> AltitudeHoldPid {
        AltitudeHoldPid::new(&AltHoldConfig {
            kp_pos,
            kp_vel,
            ki_vel: 0.0,
            kd_vel: 0.0,
            output_limit: f64::INFINITY,
            ..AltHoldConfig::default()
        })
    }

    #[test]
    fn test_target_captured_on_deadband_entry() {
        let mut hold = p_only_hold(0.1, 1.0);

        // Stick crosses into the band on the third tick; the target must
        // be the altitude reported on precisely that tick.
        let sticks = [0.5, 0.5, 0.05];
        let altitudes = [10.0, 12.0, 15.0];
        for (stick, altitude) in sticks.iter().zip(altitudes) {
            let mut demands = Demands::new(*stick, 0.0, 0.0, 0.0);
            hold.modify_demands(&state_at(altitude, 0.0), &mut demands);
        }

        assert_relative_eq!(hold.altitude_target(), 15.0);
    }

    #[test]
    fn test_target_unchanged_while_outside_band() {
        let mut hold = p_only_hold(0.1, 1.0);

        for altitude in [5.0, 9.0, 20.0, 3.0] {
            let mut demands = Demands::new(0.8, 0.0, 0.0, 0.0);
            hold.modify_demands(&state_at(altitude, 0.0), &mut demands);
        }

        assert_relative_eq!(hold.altitude_target(), 0.0);
    }

    #[test]
    fn test_target_unchanged_while_inside_band() {
        let mut hold = p_only_hold(0.1, 1.0);

        // Entry tick captures 7.0; staying in the band must not re-capture.
        let mut demands = Demands::new(0.0, 0.0, 0.0, 0.0);
        hold.modify_demands(&state_at(7.0, 0.0), &mut demands);
        for altitude in [7.5, 8.0, 6.5] {
            let mut demands = Demands::new(0.02, 0.0, 0.0, 0.0);
            hold.modify_demands(&state_at(altitude, 0.0), &mut demands);
        }

        assert_relative_eq!(hold.altitude_target(), 7.0);
    }

    #[test]
    fn test_integrator_cleared_once_per_entry() {
        let mut hold = AltitudeHoldPid::new(&AltHoldConfig {
            kp_pos: 0.0,
            kp_vel: 0.0,
            ki_vel: 1.0,
            kd_vel: 0.0,
            output_limit: f64::INFINITY,
            ..AltHoldConfig::default()
        });

        // Build up integral error outside the band (target 2.5*0.5 = 1.25
        // vs measured 0, error 1.25 per tick).
        for _ in 0..4 {
            let mut demands = Demands::new(0.5, 0.0, 0.0, 0.0);
            hold.modify_demands(&state_at(0.0, 0.0), &mut demands);
        }

        // Entry tick: integrator starts from zero again. With kp_pos = 0
        // the velocity setpoint is 0, measured climb 1.0, so the first
        // in-band correction is exactly -1.0 (one error sample).
        let mut demands = Demands::new(0.0, 0.0, 0.0, 0.0);
        hold.modify_demands(&state_at(0.0, 1.0), &mut demands);
        assert_relative_eq!(demands.throttle, -1.0);

        // Remaining in the band keeps accumulating, no further clears.
        let mut demands = Demands::new(0.0, 0.0, 0.0, 0.0);
        hold.modify_demands(&state_at(0.0, 1.0), &mut demands);
        assert_relative_eq!(demands.throttle, -2.0);
    }

    #[test]
    fn test_out_of_band_target_is_linear_in_stick() {
        // Full deflection maps to exactly pilot_velz_max; no extra clamp.
        for stick in [1.0, -1.0, 0.5, -0.2] {
            let mut hold = p_only_hold(0.1, 1.0);
            let mut demands = Demands::new(stick, 0.0, 0.0, 0.0);
            hold.modify_demands(&state_at(0.0, 0.0), &mut demands);

            // kp_vel = 1.0 against zero measured climb exposes the target
            assert_relative_eq!(demands.throttle, 2.5 * stick, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_entry_tick_uses_previous_target() {
        let mut hold = p_only_hold(0.1, 1.0);

        // Enter the band at altitude 15 with the stale target still 0: the
        // outer loop must see 0.1 * (0 - 15) on this tick, and only then
        // capture 15.
        let mut demands = Demands::new(0.05, 0.0, 0.0, 0.0);
        hold.modify_demands(&state_at(15.0, 0.0), &mut demands);

        assert_relative_eq!(demands.throttle, 0.1 * (0.0 - 15.0), epsilon = 1e-12);
        assert_relative_eq!(hold.altitude_target(), 15.0);
    }

    #[test]
    fn test_two_tick_engage_scenario() {
        let mut hold = p_only_hold(0.1, 1.0);

        // Tick 1: stick out of band, direct rate command
        let mut demands = Demands::new(0.5, 0.0, 0.0, 0.0);
        hold.modify_demands(&state_at(20.0, 1.25), &mut demands);
        // target velocity 2.5 * 0.5 = 1.25 equals measured climb
        assert_relative_eq!(demands.throttle, 0.0, epsilon = 1e-12);

        // Tick 2: stick centered, target captured at 20; next tick the
        // outer loop output is 0.1 * (20 - 20) = 0
        let mut demands = Demands::new(0.0, 0.0, 0.0, 0.0);
        hold.modify_demands(&state_at(20.0, 0.0), &mut demands);
        assert_relative_eq!(hold.altitude_target(), 20.0);

        let mut demands = Demands::new(0.0, 0.0, 0.0, 0.0);
        hold.modify_demands(&state_at(20.0, 0.0), &mut demands);
        assert_relative_eq!(demands.throttle, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_correction_replaces_stick_value() {
        let mut hold = p_only_hold(0.1, 1.0);

        // Out of band with measured climb already matching the command:
        // correction is 0, not the original 0.5 stick input.
        let mut demands = Demands::new(0.5, 0.0, 0.0, 0.0);
        hold.modify_demands(&state_at(0.0, 1.25), &mut demands);
        assert_relative_eq!(demands.throttle, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_output_clamped_to_limit() {
        let mut hold = AltitudeHoldPid::new(&AltHoldConfig {
            kp_pos: 1.0,
            kp_vel: 10.0,
            ki_vel: 0.0,
            kd_vel: 0.0,
            output_limit: 1.0,
            ..AltHoldConfig::default()
        });

        let mut demands = Demands::new(1.0, 0.0, 0.0, 0.0);
        hold.modify_demands(&state_at(0.0, -5.0), &mut demands);
        assert_relative_eq!(demands.throttle, 1.0);

        let mut demands = Demands::new(-1.0, 0.0, 0.0, 0.0);
        hold.modify_demands(&state_at(0.0, 5.0), &mut demands);
        assert_relative_eq!(demands.throttle, -1.0);
    }

    #[test]
    fn test_reset_restores_construction_state() {
        let mut hold = p_only_hold(0.1, 1.0);

        let mut demands = Demands::new(0.05, 0.0, 0.0, 0.0);
        hold.modify_demands(&state_at(30.0, 0.0), &mut demands);
        assert_relative_eq!(hold.altitude_target(), 30.0);

        hold.reset();
        assert_relative_eq!(hold.altitude_target(), 0.0);

        // After reset, an in-band tick is an entry again (membership flag
        // cleared) and captures the current altitude.
        let mut demands = Demands::new(0.05, 0.0, 0.0, 0.0);
        hold.modify_demands(&state_at(12.0, 0.0), &mut demands);
        assert_relative_eq!(hold.altitude_target(), 12.0);
    }

    #[test]
    fn test_led_flashes_while_active() {
        let hold = p_only_hold(0.1, 1.0);
        assert!(hold.should_flash_led());
    }

    #[test]
    fn test_oscillation_recaptures_on_every_entry() {
        let mut hold = p_only_hold(0.1, 1.0);

        // in, out, in: each entry re-captures
        let ticks = [(0.0, 10.0), (0.5, 11.0), (0.0, 13.0)];
        for (stick, altitude) in ticks {
            let mut demands = Demands::new(stick, 0.0, 0.0, 0.0);
            hold.modify_demands(&state_at(altitude, 0.0), &mut demands);
        }

        assert_relative_eq!(hold.altitude_target(), 13.0);
    }
}
