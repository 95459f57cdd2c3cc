//! Geometry value types for decoded pupil measurements.
//!
//! All types are plain copyable structs with structural equality and
//! zero-value defaults. Fields not written by a given record keep their
//! defaults; see [`crate::frame::PupilFrame`].

use serde::{Deserialize, Serialize};

/// A point in two-dimensional space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2d {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point2d {
    /// Create a new point from its coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in three-dimensional space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3d {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// Depth coordinate.
    pub z: f64,
}

impl Point3d {
    /// Create a new point from its coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A two-dimensional ellipse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    /// The coordinates of the center of the ellipse.
    pub center: Point2d,
    /// The rotation angle of the ellipse, in degrees.
    pub angle: f64,
    /// The size of the ellipse major and minor axes.
    pub axes: Point2d,
}

impl Ellipse {
    /// Create a new ellipse with the specified center, angle and axes.
    pub fn new(center: Point2d, angle: f64, axes: Point2d) -> Self {
        Self {
            center,
            angle,
            axes,
        }
    }
}

/// A three-dimensional sphere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// The coordinates of the center of the sphere.
    pub center: Point3d,
    /// The radius of the sphere.
    pub radius: f64,
}

impl Sphere {
    /// Create a new sphere with the specified center and radius.
    pub fn new(center: Point3d, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// A three-dimensional oriented circle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Circle3d {
    /// The coordinates of the center of the circle.
    pub center: Point3d,
    /// The radius of the circle.
    pub radius: f64,
    /// The vector normal to the surface of the circle. Intended to be a
    /// unit vector; not normalized or validated here.
    pub normal: Point3d,
}

impl Circle3d {
    /// Create a new circle with the specified center, radius and normal.
    pub fn new(center: Point3d, radius: f64, normal: Point3d) -> Self {
        Self {
            center,
            radius,
            normal,
        }
    }
}
