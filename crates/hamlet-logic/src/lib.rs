//! Pure simulation logic for Hamlet.
//!
//! This crate contains all world logic that is independent of the ECS,
//! the renderer, or any input layer. Functions take plain data and return
//! results, making them unit-testable and usable from the engine crate,
//! the headless harness, or any future front-end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Tuning constants for needs, steering, resources, foraging |
//! | [`forage`] | Organism step choice over the 8-neighborhood (weighted, with memory) |
//! | [`steering`] | Seek/arrive, wander, boundary avoidance, velocity integration |
//! | [`terrain`] | Multi-octave noise terrain, resource density, coastline smoothing |
//! | [`utility`] | Motivation scoring and hysteresis-based behavior selection |
//! | [`vector`] | 2D vector math shared by every mobile agent |

pub mod constants;
pub mod forage;
pub mod steering;
pub mod terrain;
pub mod utility;
pub mod vector;
