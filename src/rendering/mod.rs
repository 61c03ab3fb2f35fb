//! # Rendering Module
//!
//! Text rendering for the command-line driver: an ASCII map view and the
//! panels drawn beneath it. Rendering only reads [`GameSnapshot`]s.
//!
//! [`GameSnapshot`]: crate::GameSnapshot

pub mod display;
pub mod ui;

pub use display::*;
pub use ui::*;
