//! # sigproj-ssp
//!
//! Signal-space projection (SSP) numerics.
//!
//! This crate provides:
//! - **Projector construction**: `make_projector` turns the active projection
//!   items into an orthogonal-complement projector matrix via normalized
//!   vector accumulation and SVD rank truncation
//! - **Spatial vector estimation**: `compute_spatial_vectors` derives new
//!   projection items from epoch data, one per retained singular vector
//!
//! Both are pure, synchronous functions over immutable inputs and are safe to
//! call concurrently on independent inputs.

mod estimator;
mod projector;

pub use estimator::{compute_spatial_vectors, ChannelGroup};
pub use projector::{
    make_projector, make_projector_for, ChannelSet, Projector, ProjectorConfig, ProjectorError,
};
