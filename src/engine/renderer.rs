//! Renderer capability and viewer
//!
//! Drawing happens outside the engine. The engine only keeps a renderer's transform in
//! sync with its object and asks it for bounds.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geom::{Rect, Shape};

/// Visual representation attached to a [`GameObject`](super::GameObject)
pub trait Renderer: fmt::Debug {
    fn set_position(&mut self, position: Vec2);
    fn rotate(&mut self, radians: f32);
    fn scale(&mut self, factor: f32);
    /// Bounding rect at the current position
    fn rect(&self) -> Rect;
    fn radius(&self) -> f32;
}

/// Renders a single shape with a flat color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRenderer {
    pub shape: Shape,
    /// 0xRRGGBBAA
    pub color: u32,
    pub fill: bool,
    pub stroke: bool,
}

impl ShapeRenderer {
    pub fn new(shape: Shape, color: u32) -> Self {
        Self {
            shape,
            color,
            fill: true,
            stroke: false,
        }
    }

    /// Outline-only variant
    pub fn outlined(shape: Shape, color: u32) -> Self {
        Self {
            fill: false,
            stroke: true,
            ..Self::new(shape, color)
        }
    }
}

impl Renderer for ShapeRenderer {
    fn set_position(&mut self, position: Vec2) {
        self.shape.set_center(position);
    }

    fn rotate(&mut self, radians: f32) {
        self.shape.rotate(radians);
    }

    fn scale(&mut self, factor: f32) {
        self.shape.scale(factor);
    }

    fn rect(&self) -> Rect {
        self.shape.rect()
    }

    fn radius(&self) -> f32 {
        self.shape.radius()
    }
}

/// The part of the world currently shown to the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewer {
    pub visible_rect: Rect,
}

impl Viewer {
    pub fn new(visible_rect: Rect) -> Self {
        Self { visible_rect }
    }
}
