use serde::{Deserialize, Serialize};

/// Common math type re-exported for convenience.
pub use glam::Vec2;

/// Axis-aligned rectangle described by its min and max corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::point(Vec2::ZERO)
    }
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Rectangle whose top-left (min) corner sits at `position`.
    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position, position + size)
    }

    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Zero-size box at `position`.
    pub fn point(position: Vec2) -> Self {
        Self {
            min: position,
            max: position,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn half_extents(&self) -> Vec2 {
        self.size() * 0.5
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    pub fn union(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Signed overlap along each axis; a component ≤ 0 means the boxes are apart on that axis.
    pub fn overlap(&self, other: &Aabb) -> Vec2 {
        self.max.min(other.max) - self.min.max(other.min)
    }

    /// Strict intersection test: boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        let overlap = self.overlap(other);
        overlap.x > 0.0 && overlap.y > 0.0
    }

    /// Intersection rectangle, or `None` when the boxes do not strictly overlap.
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        if !self.intersects(other) {
            return None;
        }
        Some(Aabb {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        })
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

/// How a body takes part in resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never moves; infinite mass.
    Static,
    /// Moved by game code through its velocity; never pushed by contacts.
    Kinematic,
    /// Integrated and pushed by contacts.
    #[default]
    Dynamic,
}

impl BodyKind {
    pub fn is_dynamic(self) -> bool {
        matches!(self, BodyKind::Dynamic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Aabb::from_position_size(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::from_position_size(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        assert!(!a.intersects(&b));
        assert!(a.intersection(&b).is_none());
        assert_eq!(a.overlap(&b), Vec2::new(0.0, 10.0));
    }

    #[test]
    fn intersection_is_the_shared_region() {
        let a = Aabb::from_position_size(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::from_position_size(Vec2::new(6.0, 8.0), Vec2::splat(10.0));
        let shared = a.intersection(&b).expect("overlapping");
        assert_eq!(shared.min, Vec2::new(6.0, 8.0));
        assert_eq!(shared.max, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn new_normalizes_corners() {
        let aabb = Aabb::new(Vec2::new(4.0, -1.0), Vec2::new(-2.0, 3.0));
        assert_eq!(aabb.min, Vec2::new(-2.0, -1.0));
        assert_eq!(aabb.max, Vec2::new(4.0, 3.0));
        assert_eq!(aabb.center(), Vec2::new(1.0, 1.0));
    }
}
