//! Percept Core - Foundational types for the Percept scene model
//!
//! This crate provides the core types that all other Percept crates depend on:
//! - `ItemId`, `DataSetId` - Stable identifiers for scene items and datasets
//! - `Transform` - Rigid 3D transform with post-multiply concatenation
//! - `Color` - RGBA color used by item properties
//! - Error types and Result alias

mod error;
mod id;
mod transform;
mod types;

pub use error::{PerceptError, Result};
pub use id::{DataSetId, ItemId};
pub use transform::{compute_a_to_b, Transform};
pub use types::Color;

pub use glam::{DMat4, DQuat, DVec3};
