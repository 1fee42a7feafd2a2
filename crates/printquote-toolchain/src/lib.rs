//! # printquote-toolchain
//!
//! Adapter around the external geometry toolchain used to quote a print:
//!
//! - [`supervisor`]: bounded-time execution of external tools with
//!   process-group termination on timeout
//! - [`mesh`]: native STL parsing and integrity checks
//! - [`gcode`]: extraction of print time and filament use from sliced output
//! - [`orientation`]: complexity classification from orientation reports
//! - [`pricing`]: the cost model and price rounding
//! - [`external`]: the [`Toolchain`] implementation that drives PrusaSlicer
//!   and Tweaker3

pub mod error;
pub mod external;
pub mod gcode;
pub mod input;
pub mod mesh;
pub mod orientation;
pub mod pricing;
pub mod profile;
pub mod supervisor;
pub mod toolchain;

pub use error::ToolchainError;
pub use external::ExternalToolchain;
pub use toolchain::{Orientation, SliceReport, SliceSettings, Toolchain};
