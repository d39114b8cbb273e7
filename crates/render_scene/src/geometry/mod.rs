//! Geometric primitives used by the update core

mod aabb;

pub use aabb::Aabb;
