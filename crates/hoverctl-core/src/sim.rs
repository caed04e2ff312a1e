//! Single-axis closed-loop harness
//!
//! A deliberately small vertical plant for exercising the altitude hold
//! end to end: each step runs the control chain over the current state,
//! interprets the corrected throttle as a climb-rate command with a
//! first-order response, and integrates altitude. The real scheduler and
//! mixer stay outside the crate; this exists so integration tests can
//! watch the hold converge over many ticks.

use crate::control::ControlChain;
use crate::state::{Demands, VehicleState};

/// Harness configuration
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Tick period [s]
    pub dt: f64,
    /// Climb rate commanded at unit throttle correction [m/s]
    pub climb_rate_gain: f64,
    /// First-order response time of the vertical axis [s]
    pub response_time: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.01, // 100 Hz control loop
            climb_rate_gain: 2.5,
            response_time: 0.3,
        }
    }
}

/// One recorded tick
#[derive(Debug, Clone)]
pub struct SimStep {
    /// Time [s]
    pub time: f64,
    /// State after the tick's dynamics update
    pub state: VehicleState,
    /// Demands after the chain ran
    pub demands: Demands,
}

/// Recorded trajectory of a run
#[derive(Debug, Clone, Default)]
pub struct SimHistory {
    /// Time stamps [s]
    pub times: Vec<f64>,
    /// Altitudes [m]
    pub altitudes: Vec<f64>,
    /// Climb rates [m/s]
    pub climb_rates: Vec<f64>,
    /// Corrected throttle demands
    pub throttles: Vec<f64>,
}

impl SimHistory {
    pub fn record(&mut self, step: &SimStep) {
        self.times.push(step.time);
        self.altitudes.push(step.state.altitude());
        self.climb_rates.push(step.state.climb_rate());
        self.throttles.push(step.demands.throttle);
    }

    pub fn final_altitude(&self) -> Option<f64> {
        self.altitudes.last().copied()
    }
}

/// Vertical-axis plant driven by a control chain
#[derive(Debug, Clone)]
pub struct VerticalSim {
    config: SimConfig,
    state: VehicleState,
    time: f64,
}

impl VerticalSim {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            state: VehicleState::default(),
            time: 0.0,
        }
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    /// Run one tick: chain first, then the plant update.
    pub fn step(&mut self, chain: &mut ControlChain, stick: Demands) -> SimStep {
        let mut demands = stick;
        chain.tick(&self.state, &mut demands);

        // Corrected throttle commands a climb rate; the vertical axis
        // follows it with a first-order lag.
        let commanded = demands.throttle * self.config.climb_rate_gain;
        let alpha = (self.config.dt / self.config.response_time).min(1.0);
        let climb = self.state.climb_rate() + (commanded - self.state.climb_rate()) * alpha;

        self.state.inertial_vel.z = climb;
        self.state.location.z += climb * self.config.dt;
        self.time += self.config.dt;

        SimStep {
            time: self.time,
            state: self.state.clone(),
            demands,
        }
    }

    /// Run for `duration` seconds, sampling the stick program each tick.
    pub fn run<F>(&mut self, chain: &mut ControlChain, duration: f64, mut stick: F) -> SimHistory
    where
        F: FnMut(f64) -> Demands,
    {
        let steps = (duration / self.config.dt).round() as usize;
        let mut history = SimHistory::default();
        for _ in 0..steps {
            let step = self.step(chain, stick(self.time));
            history.record(&step);
        }
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::PidController;

    /// Passes the stick through untouched.
    struct PassThrough;

    impl PidController for PassThrough {
        fn modify_demands(&mut self, _state: &VehicleState, _demands: &mut Demands) {}
    }

    #[test]
    fn test_full_throttle_climbs() {
        let mut chain = ControlChain::new();
        chain.push(Box::new(PassThrough));

        let mut sim = VerticalSim::new(SimConfig::default());
        let history = sim.run(&mut chain, 2.0, |_| Demands::new(1.0, 0.0, 0.0, 0.0));

        assert!(history.final_altitude().unwrap() > 1.0);
        // Climb rate approaches the commanded 2.5 m/s
        assert!(history.climb_rates.last().unwrap() > &2.0);
    }

    #[test]
    fn test_centered_stick_coasts() {
        let mut chain = ControlChain::new();
        chain.push(Box::new(PassThrough));

        let mut sim = VerticalSim::new(SimConfig::default());
        let history = sim.run(&mut chain, 1.0, |_| Demands::default());

        assert_eq!(history.final_altitude().unwrap(), 0.0);
    }
}
