//! The bacgen BACnet load generation tool.
//!
//! This library supports the bacgen binary found elsewhere in this project.
//! The bits and pieces here are not intended to be used outside of supporting
//! bacgen, although if they are helpful in other domains that's a nice
//! surprise.

#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::pedantic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![deny(missing_copy_implementations)]
#![deny(missing_debug_implementations)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::multiple_crate_versions)]

pub mod client;
pub mod generator;
pub(crate) mod proto;
pub mod signals;
