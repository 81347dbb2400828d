//! Diagram interchange (DI) objects.
//!
//! The DI tree runs parallel to the semantic tree and is rooted at a single
//! `bpmndi:BPMNPlane`. Shapes carry `bounds`, edges carry `waypoint`, and
//! both may carry an external `label` with its own bounds.

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Point};
use crate::id::ElementId;
use crate::moddle::ObjectIndex;

/// Arena handle of a DI object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiIndex(u32);

impl DiIndex {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiKind {
    /// `bpmndi:BPMNPlane`
    Plane,
    /// `bpmndi:BPMNShape`
    Shape,
    /// `bpmndi:BPMNEdge`
    Edge,
}

/// `bpmndi:BPMNLabel`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiLabel {
    pub bounds: Option<Bounds>,
    pub color: Option<String>,
}

/// Colors set via `element.setColor`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiColor {
    pub fill: Option<String>,
    pub stroke: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiObject {
    pub id: ElementId,
    pub kind: DiKind,
    pub bpmn_element: Option<ObjectIndex>,
    /// `$parent` within the DI tree.
    pub parent: Option<DiIndex>,
    /// `planeElement`, only populated on planes.
    pub plane_elements: Vec<DiIndex>,
    pub bounds: Option<Bounds>,
    pub waypoints: Vec<Point>,
    pub label: Option<DiLabel>,
    pub is_expanded: Option<bool>,
    pub is_horizontal: Option<bool>,
    pub color: DiColor,
}

impl DiObject {
    pub fn new(id: ElementId, kind: DiKind, bpmn_element: Option<ObjectIndex>) -> Self {
        Self {
            id,
            kind,
            bpmn_element,
            parent: None,
            plane_elements: Vec::new(),
            bounds: None,
            waypoints: Vec::new(),
            label: None,
            is_expanded: None,
            is_horizontal: None,
            color: DiColor::default(),
        }
    }

    pub fn is_plane(&self) -> bool {
        self.kind == DiKind::Plane
    }
}
