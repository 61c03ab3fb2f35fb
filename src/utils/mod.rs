//! # Utilities Module
//!
//! Random primitives and hitbox math shared by every game system.

pub mod math;
pub mod random;

pub use math::*;
pub use random::*;
