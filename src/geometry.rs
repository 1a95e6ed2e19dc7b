use crate::error::GeometryError;
use glam::DVec3;

/// Geometry queries the evaluator needs from the host's domain model.
pub trait DepthProvider: Send + Sync {
    fn maximal_depth(&self) -> f64;

    /// Depth below the model surface of a point given in model coordinates.
    fn depth(&self, position: &DVec3) -> f64;
}

/// Axis-aligned box; the last model axis points up.
///
/// Two-dimensional boxes use `x`/`y` and ignore `z`. Extents are finite and
/// positive, so the depth range `[0, maximal_depth]` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxGeometry {
    origin: DVec3,
    extents: DVec3,
    vertical_axis: usize,
}

impl BoxGeometry {
    pub fn new_2d(width: f64, height: f64) -> Result<Self, GeometryError> {
        Self::checked(DVec3::new(width, height, 0.0), 2)
    }

    pub fn new_3d(extents: DVec3) -> Result<Self, GeometryError> {
        Self::checked(extents, 3)
    }

    fn checked(extents: DVec3, dim: usize) -> Result<Self, GeometryError> {
        let valid = (0..dim).all(|axis| extents[axis].is_finite() && extents[axis] > 0.0);
        if !valid {
            return Err(GeometryError::InvalidExtents(extents.to_array()));
        }
        Ok(BoxGeometry {
            origin: DVec3::ZERO,
            extents,
            vertical_axis: dim - 1,
        })
    }

    pub fn with_origin(mut self, origin: DVec3) -> Result<Self, GeometryError> {
        if !origin.is_finite() {
            return Err(GeometryError::InvalidOrigin(origin.to_array()));
        }
        self.origin = origin;
        Ok(self)
    }

    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    pub fn extents(&self) -> DVec3 {
        self.extents
    }

    pub fn dim(&self) -> usize {
        self.vertical_axis + 1
    }
}

impl DepthProvider for BoxGeometry {
    fn maximal_depth(&self) -> f64 {
        self.extents[self.vertical_axis]
    }

    fn depth(&self, position: &DVec3) -> f64 {
        let axis = self.vertical_axis;
        let d = self.maximal_depth() - (position[axis] - self.origin[axis]);
        d.clamp(0.0, self.maximal_depth())
    }
}

/// Shell between two concentric spheres centred on the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct SphericalShell {
    inner_radius: f64,
    outer_radius: f64,
}

impl SphericalShell {
    pub fn new(inner_radius: f64, outer_radius: f64) -> Result<Self, GeometryError> {
        let valid = inner_radius.is_finite()
            && outer_radius.is_finite()
            && inner_radius >= 0.0
            && inner_radius < outer_radius;
        if !valid {
            return Err(GeometryError::InvalidRadii {
                inner: inner_radius,
                outer: outer_radius,
            });
        }
        Ok(SphericalShell {
            inner_radius,
            outer_radius,
        })
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }
}

impl DepthProvider for SphericalShell {
    fn maximal_depth(&self) -> f64 {
        self.outer_radius - self.inner_radius
    }

    fn depth(&self, position: &DVec3) -> f64 {
        (self.outer_radius - position.length()).clamp(0.0, self.maximal_depth())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_box_2d_depth_uses_y() {
        let geometry = BoxGeometry::new_2d(4.0, 1.0).unwrap();
        assert_eq!(geometry.dim(), 2);
        assert_eq!(geometry.maximal_depth(), 1.0);
        assert_abs_diff_eq!(geometry.depth(&DVec3::new(2.0, 1.0, 0.0)), 0.0);
        assert_abs_diff_eq!(geometry.depth(&DVec3::new(3.5, 0.25, 0.0)), 0.75);
        assert_abs_diff_eq!(geometry.depth(&DVec3::new(0.0, 0.0, 0.0)), 1.0);
    }

    #[test]
    fn test_box_3d_depth_uses_z_and_origin() {
        let geometry = BoxGeometry::new_3d(DVec3::new(1.0, 1.0, 2.0))
            .unwrap()
            .with_origin(DVec3::new(0.0, 0.0, -2.0))
            .unwrap();
        assert_eq!(geometry.dim(), 3);
        assert_eq!(geometry.maximal_depth(), 2.0);
        assert_abs_diff_eq!(geometry.depth(&DVec3::new(0.5, 0.5, 0.0)), 0.0);
        assert_abs_diff_eq!(geometry.depth(&DVec3::new(0.5, 0.5, -0.5)), 0.5);
    }

    #[test]
    fn test_box_depth_is_clamped() {
        let geometry = BoxGeometry::new_2d(1.0, 1.0).unwrap();
        assert_eq!(geometry.depth(&DVec3::new(0.5, 1.5, 0.0)), 0.0);
        assert_eq!(geometry.depth(&DVec3::new(0.5, -3.0, 0.0)), 1.0);
    }

    #[test]
    fn test_box_rejects_bad_extents() {
        assert_eq!(
            BoxGeometry::new_2d(1.0, -0.5),
            Err(GeometryError::InvalidExtents([1.0, -0.5, 0.0]))
        );
        assert!(BoxGeometry::new_2d(0.0, 1.0).is_err());
        assert!(BoxGeometry::new_2d(1.0, f64::NAN).is_err());
        assert!(BoxGeometry::new_3d(DVec3::new(1.0, 1.0, f64::INFINITY)).is_err());
        assert!(BoxGeometry::new_3d(DVec3::new(1.0, 1.0, 0.0)).is_err());
    }

    #[test]
    fn test_box_rejects_non_finite_origin() {
        let geometry = BoxGeometry::new_2d(1.0, 1.0).unwrap();
        assert!(matches!(
            geometry.with_origin(DVec3::new(0.0, f64::NAN, 0.0)),
            Err(GeometryError::InvalidOrigin(_))
        ));
    }

    #[test]
    fn test_spherical_shell_depth() {
        let shell = SphericalShell::new(3481.0, 6371.0).unwrap();
        assert_eq!(shell.maximal_depth(), 2890.0);
        assert_abs_diff_eq!(shell.depth(&DVec3::new(0.0, 0.0, 6371.0)), 0.0);
        assert_abs_diff_eq!(shell.depth(&DVec3::new(6071.0, 0.0, 0.0)), 300.0, epsilon = 1e-9);
        assert_eq!(shell.depth(&DVec3::new(10.0, 0.0, 0.0)), 2890.0);
    }

    #[test]
    fn test_spherical_shell_rejects_bad_radii() {
        assert_eq!(
            SphericalShell::new(2.0, 1.0),
            Err(GeometryError::InvalidRadii { inner: 2.0, outer: 1.0 })
        );
        assert!(SphericalShell::new(1.0, 1.0).is_err());
        assert!(SphericalShell::new(-1.0, 1.0).is_err());
        assert!(SphericalShell::new(0.5, f64::NAN).is_err());
        assert!(SphericalShell::new(0.0, 1.0).is_ok());
    }
}
