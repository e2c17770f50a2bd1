//! Mesh data structures and writers.
//!
//! Only what the grid generator needs is modelled here: 2D points, element
//! connectivity tagged with VTK element kinds, and named boundary markers.

pub mod square;
pub mod su2;

use nalgebra::Point2;
use thiserror::Error;

/// VTK identifier of a two-node line element.
pub const VTK_LINE: u8 = 3;
/// VTK identifier of a four-node quadrilateral.
pub const VTK_QUADRILATERAL: u8 = 9;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum MeshError {
    #[error("Grid needs at least 2 nodes per direction, got {n_node} x {m_node}")]
    TooFewNodes { n_node: usize, m_node: usize },
    #[error("Grid length must be finite and positive, got {0}")]
    InvalidLength(f64),
    #[error("Offset must be finite, got {0}")]
    InvalidOffset(f64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: u8,
    pub nodes: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub tag: String,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub dimension: usize,
    pub elements: Vec<Element>,
    pub points: Vec<Point2<f64>>,
    pub markers: Vec<Marker>,
}

impl Mesh {
    pub fn marker(&self, tag: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.tag == tag)
    }
}
