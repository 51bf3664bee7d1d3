use glam::Vec2;

use super::{
    contact::ContactManifold,
    provider::{ContactProvider, Operand},
};
use crate::{
    core::{collider::ColliderView, types::Aabb},
    dynamics::{impulse::resolve_velocity, policy::ResolutionPolicy},
};

/// Minimum-translation contact between two axis-aligned rectangles.
///
/// The depth on each axis is the distance the rectangles must move apart to separate
/// along it, so a rectangle partly inside the other is pushed all the way out. The
/// resolution axis is the shallower one (X on ties). The normal points from `a`
/// toward `b`; coincident centres fall back to the positive axis. `overlap` is the
/// intersection rectangle.
pub fn rect_contact(a: &Aabb, b: &Aabb) -> Option<ContactManifold> {
    let separation = b.center() - a.center();
    let depth = (a.half_extents() + b.half_extents()) - separation.abs();
    if depth.x <= 0.0 || depth.y <= 0.0 {
        return None;
    }

    let (axis, penetration, along) = if depth.x <= depth.y {
        (Vec2::X, depth.x, separation.x)
    } else {
        (Vec2::Y, depth.y, separation.y)
    };
    let sign = if along < 0.0 { -1.0 } else { 1.0 };

    Some(ContactManifold {
        normal: axis * sign,
        penetration,
        overlap: Aabb {
            min: a.min.max(b.min),
            max: a.max.min(b.max),
        },
    })
}

/// Extension points for rect-based providers.
pub trait RectHooks: Send + Sync {
    /// Veto before any correction. Returning false leaves both bodies untouched and
    /// suppresses contact events (one-way gates, conditional passes).
    fn allow(&self, _a: &Operand<'_>, _b: &Operand<'_>, _manifold: &ContactManifold) -> bool {
        true
    }

    /// Called after positional and velocity correction.
    fn resolved(&self, _a: &mut Operand<'_>, _b: &mut Operand<'_>, _manifold: &ContactManifold) {}
}

/// Hooks of the built-in provider: every contact is solid.
#[derive(Debug, Default, Clone, Copy)]
pub struct SolidHooks;

impl RectHooks for SolidHooks {}

/// Rect/rect narrow phase with positional correction and impulse response.
#[derive(Debug, Default, Clone)]
pub struct RectProvider<H = SolidHooks> {
    hooks: H,
}

impl<H: RectHooks> RectProvider<H> {
    pub fn with_hooks(hooks: H) -> Self {
        Self { hooks }
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }
}

impl<H: RectHooks> ContactProvider for RectProvider<H> {
    fn test(&self, a: &ColliderView, b: &ColliderView) -> Option<ContactManifold> {
        rect_contact(&a.rect, &b.rect)
    }

    fn solve(
        &self,
        mut a: Operand<'_>,
        mut b: Operand<'_>,
        manifold: &ContactManifold,
        policy: &dyn ResolutionPolicy,
    ) -> bool {
        if !self.hooks.allow(&a, &b, manifold) {
            return false;
        }

        let (push_a, push_b) = policy.split(a.body, b.body);
        let correction = manifold.normal * manifold.penetration;
        if push_a > 0.0 && a.body.is_movable() {
            a.body.translate(-correction * push_a);
        }
        if push_b > 0.0 && b.body.is_movable() {
            b.body.translate(correction * push_b);
        }

        resolve_velocity(a.body, b.body, manifold.normal);

        self.hooks.resolved(&mut a, &mut b, manifold);
        true
    }
}
