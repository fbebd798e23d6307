//! Ray and sphere primitives for the mirror and dome

use glam::DVec3;

/// A sphere in dome space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: DVec3,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Ray parameters `t` where `origin + t * direction` lies on the sphere.
    ///
    /// Solves `|origin + t * direction - center|^2 = radius^2`. Returns the two
    /// roots in ascending order, or `None` when the ray misses.
    pub fn intersect(&self, origin: DVec3, direction: DVec3) -> Option<(f64, f64)> {
        let offset = origin - self.center;
        let a = direction.length_squared();
        let b = 2.0 * offset.dot(direction);
        let c = offset.length_squared() - self.radius * self.radius;

        if a == 0.0 {
            return None;
        }

        let discriminant = b * b - 4.0 * a * c;
        if discriminant.is_nan() || discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let t0 = (-b - root) / (2.0 * a);
        let t1 = (-b + root) / (2.0 * a);
        Some((t0.min(t1), t0.max(t1)))
    }

    /// Outward unit normal at a point on the surface.
    pub fn normal_at(&self, point: DVec3) -> DVec3 {
        (point - self.center) / self.radius
    }
}

/// Reflect `incident` about the unit `normal`: `d - 2 (d . n) n`.
pub fn reflect(incident: DVec3, normal: DVec3) -> DVec3 {
    incident - 2.0 * incident.dot(normal) * normal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_through_center() {
        let sphere = Sphere::new(DVec3::ZERO, 2.0);
        let (near, far) = sphere.intersect(DVec3::new(0.0, 5.0, 0.0), -DVec3::Y).unwrap();
        assert!((near - 3.0).abs() < 1e-12);
        assert!((far - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_ray_misses() {
        let sphere = Sphere::new(DVec3::ZERO, 1.0);
        assert!(sphere.intersect(DVec3::new(2.0, 5.0, 0.0), -DVec3::Y).is_none());
        assert!(sphere.intersect(DVec3::new(0.0, 5.0, 0.0), DVec3::ZERO).is_none());
    }

    #[test]
    fn test_origin_inside_has_one_forward_root() {
        let sphere = Sphere::new(DVec3::new(0.0, 0.138, 0.309), 0.603);
        let (near, far) = sphere.intersect(DVec3::ZERO, DVec3::Z).unwrap();
        assert!(near < 0.0);
        assert!(far > 0.0);
        let hit = DVec3::Z * far;
        assert!(((hit - sphere.center).length() - sphere.radius).abs() < 1e-12);
    }

    #[test]
    fn test_reflection_preserves_angle() {
        let normal = DVec3::new(1.0, 1.0, 0.0).normalize();
        let incident = DVec3::new(-1.0, 0.2, 0.3).normalize();
        let reflected = reflect(incident, normal);
        assert!((reflected.length() - 1.0).abs() < 1e-12);
        assert!((incident.dot(normal) + reflected.dot(normal)).abs() < 1e-12);
        // The tangential component is unchanged
        let tangential = |v: DVec3| v - v.dot(normal) * normal;
        assert!((tangential(incident) - tangential(reflected)).length() < 1e-12);
    }
}
