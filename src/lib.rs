//! Broadside engine library.
//!
//! Exposes the galaxy snapshot types, battle orders, battle assembly and
//! round resolution, and phase orchestration for use by integration
//! tests and the binary entry point.

pub mod combat;
pub mod economy;
pub mod error;
pub mod galaxy;
pub mod orders;
pub mod phase;
pub mod report;
pub mod rng;
pub mod sweep;
