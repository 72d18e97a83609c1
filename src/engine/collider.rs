//! Collision shapes attached to game objects
//!
//! Every collider keeps a bounding rect that is refreshed on each `set_position`, so the
//! broad-phase rect test never sees stale geometry once `prepare_collision` has run.
//!
//! `collides` is symmetric for every pair of variants: mixed pairs are always answered by
//! the shaped side.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geom::{Rect, Shape};

/// Axis-aligned box collider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxCollider {
    rect: Rect,
    /// Registers a hit when fully engulfed by the other collider
    pub collides_inside: bool,
}

impl BoxCollider {
    pub fn new(half_extents: Vec2) -> Self {
        Self {
            rect: Rect::from_center(Vec2::ZERO, half_extents),
            collides_inside: false,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The box as a polygon, for tests against arbitrary shapes
    pub fn as_shape(&self) -> Shape {
        Shape::rectangle(self.rect.center(), self.rect.half_extents())
    }

    /// Rect overlap, except that full containment only counts for the engulfed side's flag
    fn collides_box(&self, other: &BoxCollider) -> bool {
        self.rect.overlaps(&other.rect)
            && (self.collides_inside || !other.rect.contains_rect(&self.rect))
            && (other.collides_inside || !self.rect.contains_rect(&other.rect))
    }
}

/// Collider backed by an arbitrary shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapedCollider {
    shape: Shape,
    rect: Rect,
    /// Registers a hit when its center is inside the other collider
    pub collides_inside: bool,
}

impl ShapedCollider {
    pub fn new(shape: Shape) -> Self {
        let rect = shape.rect();
        Self {
            shape,
            rect,
            collides_inside: false,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    fn refresh_rect(&mut self) {
        self.rect = self.shape.rect();
    }

    /// Broad phase, then swallowed-center checks, then outline crossing
    fn collides_with(&self, other_rect: &Rect, other_shape: &Shape, other_inside: bool) -> bool {
        if !self.rect.overlaps(other_rect) {
            return false;
        }
        (self.collides_inside && other_shape.contains(self.shape.center()))
            || (other_inside && self.shape.contains(other_shape.center()))
            || self.shape.intersects(other_shape)
    }
}

/// Collision capability of a game object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Collider {
    Aabb(BoxCollider),
    Shaped(ShapedCollider),
}

impl Collider {
    /// Axis-aligned box centered on the owner
    pub fn aabb(half_extents: Vec2) -> Self {
        Collider::Aabb(BoxCollider::new(half_extents))
    }

    pub fn shaped(shape: Shape) -> Self {
        Collider::Shaped(ShapedCollider::new(shape))
    }

    pub fn circle(radius: f32) -> Self {
        Collider::shaped(Shape::circle(Vec2::ZERO, radius))
    }

    /// Shaped collider that still hits when a discrete step lands it inside its target
    pub fn bullet(shape: Shape) -> Self {
        Collider::shaped(shape).with_collides_inside(true)
    }

    pub fn with_collides_inside(mut self, collides_inside: bool) -> Self {
        match &mut self {
            Collider::Aabb(c) => c.collides_inside = collides_inside,
            Collider::Shaped(c) => c.collides_inside = collides_inside,
        }
        self
    }

    pub fn set_position(&mut self, position: Vec2) {
        match self {
            Collider::Aabb(c) => c.rect.set_center(position),
            Collider::Shaped(c) => {
                c.shape.set_center(position);
                c.refresh_rect();
            }
        }
    }

    /// Boxes stay axis-aligned; only shapes turn
    pub fn rotate(&mut self, radians: f32) {
        if let Collider::Shaped(c) = self {
            c.shape.rotate(radians);
            c.refresh_rect();
        }
    }

    pub fn scale(&mut self, factor: f32) {
        match self {
            Collider::Aabb(c) => {
                let center = c.rect.center();
                c.rect = Rect::from_center(center, c.rect.half_extents() * factor.abs());
            }
            Collider::Shaped(c) => {
                c.shape.scale(factor);
                c.refresh_rect();
            }
        }
    }

    pub fn rect(&self) -> Rect {
        match self {
            Collider::Aabb(c) => c.rect,
            Collider::Shaped(c) => c.rect,
        }
    }

    pub fn radius(&self) -> f32 {
        match self {
            Collider::Aabb(c) => c.rect.half_extents().length(),
            Collider::Shaped(c) => c.shape.radius(),
        }
    }

    pub fn center(&self) -> Vec2 {
        match self {
            Collider::Aabb(c) => c.rect.center(),
            Collider::Shaped(c) => c.shape.center(),
        }
    }

    /// Whether being fully inside another collider counts as a hit.
    ///
    /// The flag belongs to this collider alone; `_other` never changes the answer.
    pub fn collides_inside(&self, _other: &Collider) -> bool {
        match self {
            Collider::Aabb(c) => c.collides_inside,
            Collider::Shaped(c) => c.collides_inside,
        }
    }

    /// Called once per tick before any pair is tested
    pub fn prepare_collision(&mut self, position: Vec2) {
        self.set_position(position);
    }

    pub fn collides(&self, other: &Collider) -> bool {
        match (self, other) {
            (Collider::Aabb(a), Collider::Aabb(b)) => a.collides_box(b),
            (Collider::Shaped(a), Collider::Shaped(b)) => {
                a.collides_with(&b.rect, &b.shape, b.collides_inside)
            }
            (Collider::Shaped(a), Collider::Aabb(b)) => {
                a.collides_with(&b.rect, &b.as_shape(), b.collides_inside)
            }
            (Collider::Aabb(_), Collider::Shaped(_)) => other.collides(self),
        }
    }

    /// Circle center and radius, if this is a circular shaped collider
    pub fn as_circle(&self) -> Option<(Vec2, f32)> {
        match self {
            Collider::Shaped(ShapedCollider {
                shape: Shape::Circle { center, radius },
                ..
            }) => Some((*center, *radius)),
            _ => None,
        }
    }

    pub fn as_box(&self) -> Option<&BoxCollider> {
        match self {
            Collider::Aabb(c) => Some(c),
            Collider::Shaped(_) => None,
        }
    }
}
