//! Control stages
//!
//! The [`PidController`] contract every feedback stage implements, the
//! fixed-order [`ControlChain`] that runs them each tick, and the concrete
//! stages:
//! - Gyro-rate stage ([`rate::RateController`])
//! - Altitude hold ([`alt_hold::AltitudeHoldPid`])

pub mod alt_hold;
pub mod rate;

pub use alt_hold::*;
pub use rate::*;

use crate::state::{Demands, VehicleState};

/// One feedback stage in the control chain
///
/// Invoked once per tick in a fixed, configuration-defined order. A stage
/// reads the state snapshot and rewrites the demand fields it owns;
/// demands already corrected by earlier stages are its effective input.
pub trait PidController {
    /// Read the state and refine the demand vector in place.
    fn modify_demands(&mut self, state: &VehicleState, demands: &mut Demands);

    /// Whether the external indicator should flash while this stage is
    /// active. Pure query, polled once per tick.
    fn should_flash_led(&self) -> bool {
        false
    }

    /// Clear accumulator state on a flight-mode or arming transition.
    ///
    /// The external arming manager must call this (via
    /// [`ControlChain::reset_all`]) on disarm and mode switches so no stage
    /// carries stale integrator state across a mode boundary.
    fn reset(&mut self) {}
}

/// Fixed-order chain of active control stages
///
/// Stage order is decided at configuration time and never changes
/// afterwards; later stages observe the demand mutations of earlier ones
/// within the same tick. The tick runs to completion on a single thread,
/// so no stage state needs synchronization.
#[derive(Default)]
pub struct ControlChain {
    stages: Vec<Box<dyn PidController>>,
}

impl ControlChain {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage; it runs after every stage already in the chain.
    pub fn push(&mut self, stage: Box<dyn PidController>) {
        self.stages.push(stage);
    }

    /// Run every stage, in order, over this tick's state and demands.
    pub fn tick(&mut self, state: &VehicleState, demands: &mut Demands) {
        for stage in &mut self.stages {
            stage.modify_demands(state, demands);
        }
    }

    /// True if any active stage wants the indicator flashing.
    pub fn should_flash_led(&self) -> bool {
        self.stages.iter().any(|s| s.should_flash_led())
    }

    /// Mode/arming-transition hook: clear every stage's accumulator state.
    pub fn reset_all(&mut self) {
        log::debug!("control chain reset ({} stages)", self.stages.len());
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
