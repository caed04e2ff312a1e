//! # hoverctl Core
//!
//! Flight-control core for small multi-rotor aircraft.
//!
//! Each control-loop tick, the flight scheduler hands the chain of active
//! PID stages the current estimated vehicle state and the pilot's demand
//! vector; every stage reads the state and refines the demands in place,
//! and the final demands go to the motor mixer. Board access, radio
//! decoding, mixing, and scheduling live outside this crate.
//!
//! ## Modules
//!
//! - [`pid`]: Scalar PID accumulator primitive
//! - [`state`]: Vehicle state snapshot and demand vector
//! - [`control`]: The [`control::PidController`] stage contract, the stage
//!   chain, and the concrete rate and altitude-hold stages
//! - [`config`]: Construction-time gain configuration and validation
//! - [`sim`]: Single-axis closed-loop harness for testing the hold

pub mod pid;
pub mod state;
pub mod control;
pub mod config;
pub mod sim;

// Common type aliases
use nalgebra::{UnitQuaternion, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f64>;

/// Unit quaternion type for orientations
pub type Quat = UnitQuaternion<f64>;
