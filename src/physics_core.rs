use bevy::math::Vec2;

use crate::components::{Body, Sides};

/// Extra penetration tolerated on top of the per-tick movement before a
/// contact is ignored on that axis.
pub const OVERLAP_BIAS: f32 = 4.0;

/// Strict AABB intersection; bodies that only share an edge do not intersect.
pub fn intersects(a: &Body, b: &Body) -> bool {
    a.right() > b.left() && a.left() < b.right() && a.bottom() > b.top() && a.top() < b.bottom()
}

/// Non-blocking overlap test used for trigger-style reactions.
pub fn overlaps(a: &Body, b: &Body) -> bool {
    a.enabled && b.enabled && intersects(a, b)
}

/// Clears the per-tick contact flags and remembers where the body started.
pub fn begin_tick(body: &mut Body) {
    body.touching = Sides::default();
    body.blocked = Sides::default();
    body.prev = body.position;
}

pub fn integrate(body: &mut Body, gravity: Vec2, dt: f32) {
    if body.allow_gravity {
        body.velocity += gravity * dt;
    }
    body.position += body.velocity * dt;
}

/// Keeps the body inside `[0, bounds]`, zeroing velocity into the edge it hit.
pub fn clamp_to_bounds(body: &mut Body, bounds: Vec2) {
    if body.left() < 0.0 {
        body.position.x = 0.0;
        body.velocity.x = 0.0;
        body.blocked.left = true;
    } else if body.right() > bounds.x {
        body.position.x = bounds.x - body.size.x;
        body.velocity.x = 0.0;
        body.blocked.right = true;
    }

    if body.top() < 0.0 {
        body.position.y = 0.0;
        body.velocity.y = 0.0;
        body.blocked.up = true;
    } else if body.bottom() > bounds.y {
        body.position.y = bounds.y - body.size.y;
        body.velocity.y = 0.0;
        body.blocked.down = true;
    }
}

/// Pushes `body` out of the immovable `fixed` body. Gravity acts on y, so the
/// vertical axis is resolved first; the horizontal axis is only resolved if
/// the bodies still intersect afterwards.
pub fn separate(body: &mut Body, fixed: &Body) -> bool {
    if !body.enabled || !fixed.enabled || !intersects(body, fixed) {
        return false;
    }
    let hit_y = separate_y(body, fixed);
    let hit_x = intersects(body, fixed) && separate_x(body, fixed);
    hit_y || hit_x
}

fn separate_y(body: &mut Body, fixed: &Body) -> bool {
    let dy = body.delta().y;
    let other = fixed.delta().y;
    let max_overlap = dy.abs() + other.abs() + OVERLAP_BIAS;

    let overlap = if dy > other {
        let overlap = body.bottom() - fixed.top();
        if overlap > max_overlap {
            return false;
        }
        body.touching.down = true;
        overlap
    } else if dy < other {
        let overlap = body.top() - fixed.bottom();
        if -overlap > max_overlap {
            return false;
        }
        body.touching.up = true;
        overlap
    } else {
        return false;
    };

    body.position.y -= overlap;
    body.velocity.y = 0.0;
    true
}

fn separate_x(body: &mut Body, fixed: &Body) -> bool {
    let dx = body.delta().x;
    let other = fixed.delta().x;
    let max_overlap = dx.abs() + other.abs() + OVERLAP_BIAS;

    let overlap = if dx > other {
        let overlap = body.right() - fixed.left();
        if overlap > max_overlap {
            return false;
        }
        body.touching.right = true;
        overlap
    } else if dx < other {
        let overlap = body.left() - fixed.right();
        if -overlap > max_overlap {
            return false;
        }
        body.touching.left = true;
        overlap
    } else {
        return false;
    };

    body.position.x -= overlap;
    body.velocity.x = 0.0;
    true
}
