//! Rectangles and shapes for colliders and renderers
//!
//! A `Shape` is positioned by its center; polygon points are stored relative to it so that
//! moving a shape never touches its outline.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Zero-sized rect at a point
    pub fn from_point(point: Vec2) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    pub fn set_center(&mut self, center: Vec2) {
        let half = self.half_extents();
        self.min = center - half;
        self.max = center + half;
    }

    /// Overlap test, touching edges count
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// True if `other` lies entirely inside (or on the border of) this rect
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }

    /// Grow by the given margins on each side (negative margins shrink).
    ///
    /// Shrinking past the center collapses to the center instead of inverting.
    pub fn expand(&self, margin_x: f32, margin_y: f32) -> Rect {
        let margin = Vec2::new(margin_x, margin_y);
        let center = self.center();
        let half = (self.half_extents() + margin).max(Vec2::ZERO);
        Rect::from_center(center, half)
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Rect {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        })
    }

    /// Closest point of the rect (border or interior) to `point`
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }

    /// Corners in counter-clockwise order starting at `min`
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }
}

/// A closed 2D shape positioned by its center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { center: Vec2, radius: f32 },
    /// Points are relative to `center`
    Polygon { center: Vec2, points: Vec<Vec2> },
}

impl Shape {
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Shape::Circle {
            center,
            radius: radius.abs(),
        }
    }

    /// Polygon from points relative to `center`
    pub fn polygon(center: Vec2, points: Vec<Vec2>) -> Self {
        Shape::Polygon { center, points }
    }

    /// Axis-aligned rectangle polygon
    pub fn rectangle(center: Vec2, half_extents: Vec2) -> Self {
        let h = half_extents.abs();
        Shape::Polygon {
            center,
            points: vec![
                Vec2::new(-h.x, -h.y),
                Vec2::new(h.x, -h.y),
                Vec2::new(h.x, h.y),
                Vec2::new(-h.x, h.y),
            ],
        }
    }

    /// Regular-ish polygon with one radius per vertex (a single radius gives a regular polygon)
    pub fn regular(center: Vec2, radii: &[f32], vertex_count: usize, start_angle: f32) -> Self {
        if vertex_count == 0 || radii.is_empty() {
            return Shape::polygon(center, Vec::new());
        }
        let step = std::f32::consts::TAU / vertex_count as f32;
        let points = (0..vertex_count)
            .map(|i| {
                let radius = radii[i.min(radii.len() - 1)];
                Vec2::from_angle(start_angle + step * i as f32) * radius
            })
            .collect();
        Shape::polygon(center, points)
    }

    pub fn center(&self) -> Vec2 {
        match self {
            Shape::Circle { center, .. } | Shape::Polygon { center, .. } => *center,
        }
    }

    pub fn set_center(&mut self, new_center: Vec2) {
        match self {
            Shape::Circle { center, .. } | Shape::Polygon { center, .. } => *center = new_center,
        }
    }

    /// Rotate around the center
    pub fn rotate(&mut self, radians: f32) {
        if let Shape::Polygon { points, .. } = self {
            let rotation = Vec2::from_angle(radians);
            for p in points.iter_mut() {
                *p = rotation.rotate(*p);
            }
        }
    }

    /// Scale around the center
    pub fn scale(&mut self, factor: f32) {
        match self {
            Shape::Circle { radius, .. } => *radius *= factor.abs(),
            Shape::Polygon { points, .. } => {
                for p in points.iter_mut() {
                    *p *= factor;
                }
            }
        }
    }

    /// Absolute vertex positions (empty for circles)
    pub fn vertices(&self) -> Vec<Vec2> {
        match self {
            Shape::Circle { .. } => Vec::new(),
            Shape::Polygon { center, points } => points.iter().map(|p| *center + *p).collect(),
        }
    }

    pub fn rect(&self) -> Rect {
        match self {
            Shape::Circle { center, radius } => Rect::from_center(*center, Vec2::splat(*radius)),
            Shape::Polygon { center, points } => {
                let mut rect = Rect::from_point(*center + points.first().copied().unwrap_or(Vec2::ZERO));
                for p in points.iter().skip(1) {
                    rect = rect.union(&Rect::from_point(*center + *p));
                }
                rect
            }
        }
    }

    /// Distance from the center to the farthest point of the outline
    pub fn radius(&self) -> f32 {
        match self {
            Shape::Circle { radius, .. } => *radius,
            Shape::Polygon { points, .. } => points.iter().map(|p| p.length()).fold(0.0, f32::max),
        }
    }

    /// Point-in-shape test (border included for circles)
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Shape::Circle { center, radius } => center.distance_squared(point) <= radius * radius,
            Shape::Polygon { .. } => {
                let vertices = self.vertices();
                if vertices.len() < 3 {
                    return false;
                }
                // Even-odd ray cast along +X
                let mut inside = false;
                let mut j = vertices.len() - 1;
                for i in 0..vertices.len() {
                    let (a, b) = (vertices[i], vertices[j]);
                    if (a.y > point.y) != (b.y > point.y) {
                        let x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
                        if point.x < x {
                            inside = !inside;
                        }
                    }
                    j = i;
                }
                inside
            }
        }
    }

    /// True if the outlines of the two shapes cross or touch.
    ///
    /// A shape lying entirely inside the other does NOT intersect it.
    pub fn intersects(&self, other: &Shape) -> bool {
        match (self, other) {
            (
                Shape::Circle {
                    center: c1,
                    radius: r1,
                },
                Shape::Circle {
                    center: c2,
                    radius: r2,
                },
            ) => {
                let d = c1.distance(*c2);
                d <= r1 + r2 && d >= (r1 - r2).abs()
            }
            (Shape::Circle { center, radius }, Shape::Polygon { .. }) => {
                circle_crosses_edges(*center, *radius, &other.vertices())
            }
            (Shape::Polygon { .. }, Shape::Circle { center, radius }) => {
                circle_crosses_edges(*center, *radius, &self.vertices())
            }
            (Shape::Polygon { .. }, Shape::Polygon { .. }) => {
                let a = self.vertices();
                let b = other.vertices();
                edges(&a).any(|(p1, p2)| edges(&b).any(|(q1, q2)| segments_intersect(p1, p2, q1, q2)))
            }
        }
    }
}

/// Closed edge loop over a vertex list
fn edges(vertices: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    let n = vertices.len();
    (0..n)
        .filter(move |_| n >= 2)
        .map(move |i| (vertices[i], vertices[(i + 1) % n]))
}

fn circle_crosses_edges(center: Vec2, radius: f32, vertices: &[Vec2]) -> bool {
    edges(vertices).any(|(a, b)| {
        let nearest = closest_point_on_segment(center, a, b).distance(center);
        let farthest = a.distance(center).max(b.distance(center));
        nearest <= radius && farthest >= radius
    })
}

/// Closest point to `p` on segment `a`-`b`
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < f32::EPSILON {
        return a; // Degenerate segment
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Segment intersection test, collinear overlaps included
pub fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let d1 = (q2 - q1).perp_dot(p1 - q1);
    let d2 = (q2 - q1).perp_dot(p2 - q1);
    let d3 = (p2 - p1).perp_dot(q1 - p1);
    let d4 = (p2 - p1).perp_dot(q2 - p1);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0)) && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0)) {
        return true;
    }

    let on_segment = |a: Vec2, b: Vec2, p: Vec2| {
        p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
    };

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}
