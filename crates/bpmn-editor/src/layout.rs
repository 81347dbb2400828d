//! Connection layout: a straight line between the two anchors, docked at
//! the borders of source and target.

use bpmn_core::{Bounds, Delta, ElementIndex, Point, Waypoint, Waypoints};
use smallvec::smallvec;

use crate::command::LayoutHints;
use crate::modeler::Modeler;

/// Waypoints for `connection` between its current source and target.
/// Connections without both ends keep their waypoints.
pub fn layout_connection(modeler: &Modeler, connection: ElementIndex, hints: &LayoutHints) -> Waypoints {
    let element = modeler.element(connection);
    let (Some(source), Some(target)) = (element.source, element.target) else {
        return element.waypoints.clone();
    };
    let (source, target) = (modeler.element(source), modeler.element(target));
    let start = hints.connection_start.unwrap_or_else(|| source.mid());
    let end = hints.connection_end.unwrap_or_else(|| target.mid());

    let docked_start = dock(start, end, (!source.is_connection()).then_some(source.bounds));
    let docked_end = dock(end, start, (!target.is_connection()).then_some(target.bounds));

    smallvec![
        Waypoint {
            x: docked_start.x,
            y: docked_start.y,
            original: Some(start),
        },
        Waypoint {
            x: docked_end.x,
            y: docked_end.y,
            original: Some(end),
        },
    ]
}

/// The start anchor of `connection` after its source moved by `delta`.
pub fn moved_source_anchor(modeler: &Modeler, connection: ElementIndex, delta: Delta) -> Option<Point> {
    modeler
        .element(connection)
        .waypoints
        .first()
        .map(|w| w.original.unwrap_or(w.point()).translate(delta))
}

/// The end anchor of `connection` after its target moved by `delta`.
pub fn moved_target_anchor(modeler: &Modeler, connection: ElementIndex, delta: Delta) -> Option<Point> {
    modeler
        .element(connection)
        .waypoints
        .last()
        .map(|w| w.original.unwrap_or(w.point()).translate(delta))
}

/// Where the ray from `anchor` towards `towards` leaves `bounds`.
fn dock(anchor: Point, towards: Point, bounds: Option<Bounds>) -> Point {
    let Some(b) = bounds else {
        return anchor;
    };
    if !b.contains(anchor) {
        return anchor;
    }
    let (dx, dy) = (towards.x - anchor.x, towards.y - anchor.y);
    let exit = |d: f64, pos: f64, low: f64, high: f64| {
        if d > 0.0 {
            (high - pos) / d
        } else if d < 0.0 {
            (low - pos) / d
        } else {
            f64::INFINITY
        }
    };
    let t = exit(dx, anchor.x, b.x, b.right()).min(exit(dy, anchor.y, b.y, b.bottom()));
    if !t.is_finite() || t >= 1.0 {
        return anchor;
    }
    Point::new(anchor.x + dx * t, anchor.y + dy * t)
}
