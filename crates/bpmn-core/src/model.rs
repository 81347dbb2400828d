//! Graphical diagram elements.
//!
//! Four element kinds share one struct: roots, shapes, labels and
//! connections. Elements live in the [`Canvas`](crate::canvas::Canvas)
//! arena and reference each other by [`ElementIndex`], so ids can change
//! without rewriting references.
//!
//! Relations are bidirectional: parent ↔ children, label ↔ label target,
//! source ↔ outgoing, target ↔ incoming and host ↔ attachers. Only the
//! canvas mutates them, keeping both sides in sync.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::geometry::{Bounds, Delta, Point};
use crate::id::ElementId;
use crate::moddle::ObjectIndex;

/// Arena handle of a graphical element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementIndex(u32);

impl ElementIndex {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Root,
    Shape,
    Label,
    Connection,
}

/// A connection waypoint. `original` is the pre-docking point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    pub original: Option<Point>,
}

impl Waypoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            original: None,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Translate the docked point, and the original anchor when `anchors` is set.
    pub fn translate(&mut self, delta: Delta, anchors: bool) {
        self.x += delta.x;
        self.y += delta.y;
        if anchors && let Some(original) = self.original.as_mut() {
            *original = original.translate(delta);
        }
    }
}

impl From<Point> for Waypoint {
    fn from(p: Point) -> Self {
        Waypoint::new(p.x, p.y)
    }
}

pub type Waypoints = SmallVec<[Waypoint; 4]>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub business_object: Option<ObjectIndex>,

    /// Shapes, labels and roots.
    pub bounds: Bounds,
    /// Connections only.
    pub waypoints: Waypoints,

    pub parent: Option<ElementIndex>,
    pub children: Vec<ElementIndex>,

    pub label: Option<ElementIndex>,
    pub label_target: Option<ElementIndex>,

    pub incoming: Vec<ElementIndex>,
    pub outgoing: Vec<ElementIndex>,
    pub source: Option<ElementIndex>,
    pub target: Option<ElementIndex>,

    pub host: Option<ElementIndex>,
    pub attachers: SmallVec<[ElementIndex; 2]>,

    pub hidden: bool,
    pub collapsed: bool,
    /// Expanded sub-processes and participants render as containers.
    pub is_frame: bool,
}

impl Element {
    pub fn new(id: ElementId, kind: ElementKind) -> Self {
        Self {
            id,
            kind,
            business_object: None,
            bounds: Bounds::default(),
            waypoints: SmallVec::new(),
            parent: None,
            children: Vec::new(),
            label: None,
            label_target: None,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            source: None,
            target: None,
            host: None,
            attachers: SmallVec::new(),
            hidden: false,
            collapsed: false,
            is_frame: false,
        }
    }

    pub fn shape(id: ElementId, bounds: Bounds) -> Self {
        Self {
            bounds,
            ..Self::new(id, ElementKind::Shape)
        }
    }

    pub fn label(id: ElementId, bounds: Bounds) -> Self {
        Self {
            bounds,
            ..Self::new(id, ElementKind::Label)
        }
    }

    pub fn connection(id: ElementId, waypoints: impl IntoIterator<Item = Point>) -> Self {
        Self {
            waypoints: waypoints.into_iter().map(Waypoint::from).collect(),
            ..Self::new(id, ElementKind::Connection)
        }
    }

    pub fn root(id: ElementId) -> Self {
        Self::new(id, ElementKind::Root)
    }

    pub fn is_connection(&self) -> bool {
        self.kind == ElementKind::Connection
    }

    pub fn is_label(&self) -> bool {
        self.kind == ElementKind::Label
    }

    pub fn is_root(&self) -> bool {
        self.kind == ElementKind::Root
    }

    /// Shapes, labels and roots.
    pub fn is_shape_like(&self) -> bool {
        !self.is_connection()
    }

    pub fn mid(&self) -> Point {
        if self.is_connection() {
            connection_mid(&self.waypoints)
        } else {
            self.bounds.mid()
        }
    }
}

/// The midpoint along a polyline (by length).
pub fn connection_mid(waypoints: &[Waypoint]) -> Point {
    if waypoints.is_empty() {
        return Point::default();
    }
    let lengths: Vec<f64> = waypoints
        .windows(2)
        .map(|w| ((w[1].x - w[0].x).powi(2) + (w[1].y - w[0].y).powi(2)).sqrt())
        .collect();
    let total: f64 = lengths.iter().sum();
    if total == 0.0 {
        return waypoints[0].point();
    }
    let mut remaining = total / 2.0;
    for (i, len) in lengths.iter().enumerate() {
        if remaining <= *len && *len > 0.0 {
            let t = remaining / len;
            let (a, b) = (waypoints[i], waypoints[i + 1]);
            return Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
        }
        remaining -= len;
    }
    waypoints[waypoints.len() - 1].point()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_mid_walks_polyline() {
        let wps = [
            Waypoint::new(0.0, 0.0),
            Waypoint::new(100.0, 0.0),
            Waypoint::new(100.0, 100.0),
        ];
        assert_eq!(connection_mid(&wps), Point::new(100.0, 0.0));
    }

    #[test]
    fn waypoint_translation_respects_anchor_flag() {
        let mut wp = Waypoint {
            x: 10.0,
            y: 10.0,
            original: Some(Point::new(0.0, 0.0)),
        };
        wp.translate(Delta::new(5.0, 5.0), false);
        assert_eq!(wp.original, Some(Point::new(0.0, 0.0)));
        wp.translate(Delta::new(5.0, 5.0), true);
        assert_eq!(wp.point(), Point::new(20.0, 20.0));
        assert_eq!(wp.original, Some(Point::new(5.0, 5.0)));
    }
}
