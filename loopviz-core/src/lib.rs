//! Core data structures and traits for loopviz
//!
//! This crate provides the geometry a geological model hands to a viewer
//! (isosurfaces, structured grids, observation points, glyphs), colour
//! handling for stratigraphic metadata, and the traits a modelling backend
//! implements.

pub mod point;
pub mod geometry;
pub mod mesh;
pub mod grid;
pub mod data;
pub mod bounding_box;
pub mod colour;
pub mod model;
pub mod synthetic;
pub mod error;

pub use point::*;
pub use geometry::*;
pub use mesh::*;
pub use grid::*;
pub use data::*;
pub use bounding_box::*;
pub use colour::*;
pub use model::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};

/// Common result type for loopviz operations
pub type Result<T> = std::result::Result<T, Error>;
