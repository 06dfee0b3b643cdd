//! # loom-solver
//!
//! The boundary between the cloth data layer and a constraint solver.
//!
//! ## Key Types
//!
//! - [`ClothSolver`] — Solver backend trait (fabrics, instances, stepping)
//! - [`SimulationBridge`] — Marshals one cloth's particles through a shared solver
//! - [`ClothHandle`] — RAII ownership of a fabric/instance pair
//! - [`ClothSettings`] — Per-instance tunables, loadable from TOML
//! - [`BallisticSolver`] — Constraint-free reference backend

pub mod ballistic;
pub mod bridge;
pub mod config;
pub mod solver;

pub use ballistic::BallisticSolver;
pub use bridge::{ClothHandle, SimulationBridge, StepReport};
pub use config::{ClothSettings, PhaseConfig, PhaseKind, TetherConfig, WindConfig};
pub use solver::{shared, ClothSolver, FabricId, InstanceId, SharedSolver};
