//! Point and vector types
//!
//! Geological models live in projected real-world coordinates, so every
//! coordinate is double precision.

use nalgebra::{Point3, Vector3};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// Axis aligned extent of a set of points as `(min, max)`.
///
/// Returns `None` for an empty set.
pub fn extent<'a, I>(points: I) -> Option<(Point3d, Point3d)>
where
    I: IntoIterator<Item = &'a Point3d>,
{
    let mut iter = points.into_iter();
    let first = *iter.next()?;
    let mut min = first;
    let mut max = first;

    for p in iter {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        min.z = min.z.min(p.z);

        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        max.z = max.z.max(p.z);
    }

    Some((min, max))
}

/// Range of the finite values of a slice as `(min, max)`.
///
/// NaN entries are skipped; `None` when nothing finite remains.
pub fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
