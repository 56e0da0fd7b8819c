#![forbid(unsafe_code)]

//! Graph data model and topology utilities for the siren layout engine.
//!
//! Nodes and edges arrive as caller-owned snapshots (typically produced by a
//! CSV import pipeline); this crate never mutates them. All derived structures
//! (adjacency, degrees, components) are rebuilt per topology snapshot.

pub mod topology;

use serde::{Deserialize, Serialize};

/// An attribute value attached to a node. Opaque to the layout core except
/// where an algorithm explicitly coerces one (the timeline swimlane attribute).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Scalar(String),
    Number(f64),
    List(Vec<AttrValue>),
}

impl AttrValue {
    /// Coerce to a grouping label: strings pass through, numbers format with
    /// `Display`, lists take their first element.
    pub fn as_group_label(&self) -> Option<String> {
        match self {
            Self::Scalar(s) => Some(s.clone()),
            Self::Number(n) => Some(n.to_string()),
            Self::List(items) => items.first().and_then(AttrValue::as_group_label),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub attrs: std::collections::BTreeMap<String, AttrValue>,
    /// Numeric timestamp, consumed only by the timeline algorithm.
    #[serde(default)]
    pub timestamp: Option<f64>,
    /// Optional caller-supplied starting position.
    #[serde(default)]
    pub preset: Option<Point>,
    /// Auto-created placeholder referenced by a link but never defined by
    /// imported data. Passed through; only timeline placement consults it.
    #[serde(default)]
    pub stub: bool,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attrs: std::collections::BTreeMap::new(),
            timestamp: None,
            preset: None,
            stub: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A point plus velocity, used by the iterative simulator for momentum.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl Position {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<Point> for Position {
    fn from(p: Point) -> Self {
        Self::at(p.x, p.y)
    }
}

/// Canvas extents used for scaling and centering deterministic layouts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}
