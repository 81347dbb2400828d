//! Moves external labels out of the way of connections.
//!
//! After a connection is created or re-laid out, the labels of its ends are
//! checked: a label sitting on a side that a connection leaves from (or,
//! for attachers, that faces the host) moves to the first free side.

use bpmn_core::{Bounds, Delta, ElementIndex, Orientation, Point, geometry};

use crate::command::{CommandContext, CommandKind, ShapeMoveContext};
use crate::error::ModelingError;
use crate::interceptor::{CommandInterceptor, Hook};
use crate::modeler::Modeler;

const ALIGNMENTS: [Orientation; 4] = [
    Orientation::Top,
    Orientation::Bottom,
    Orientation::Left,
    Orientation::Right,
];

/// Tolerance when classifying a point relative to another.
const ORIENTATION_PADDING: f64 = 5.0;

pub(super) fn install(interceptor: &mut CommandInterceptor) -> Result<(), ModelingError> {
    interceptor.on_context(
        [
            CommandKind::ConnectionCreate,
            CommandKind::ConnectionLayout,
            CommandKind::ConnectionUpdateWaypoints,
        ],
        Hook::PostExecute,
        None,
        |modeler, context, _| {
            let Some(connection) = context.element() else {
                return Ok(());
            };
            let el = modeler.element(connection);
            let ends = [el.source, el.target];
            for end in ends.into_iter().flatten() {
                check_label_adjustment(modeler, end)?;
            }
            Ok(())
        },
    )?;

    interceptor.on_context(
        CommandKind::LabelCreate,
        Hook::PostExecute,
        None,
        |modeler, context, _| match context {
            CommandContext::LabelCreate(ctx) => check_label_adjustment(modeler, ctx.label_target),
            _ => Ok(()),
        },
    )?;

    interceptor.on_context(
        CommandKind::ElementsCreate,
        Hook::PostExecute,
        None,
        |modeler, context, _| {
            let CommandContext::ElementsCreate(ctx) = context else {
                return Ok(());
            };
            for &element in &ctx.created {
                if modeler.canvas.contains(element) {
                    check_label_adjustment(modeler, element)?;
                }
            }
            Ok(())
        },
    )?;
    Ok(())
}

fn check_label_adjustment(modeler: &mut Modeler, element: ElementIndex) -> Result<(), ModelingError> {
    let Some(label) = modeler.element(element).label else {
        return Ok(());
    };
    if modeler.element(label).parent.is_none() {
        return Ok(());
    }
    let Some(orientation) = optimal_position(modeler, element, label) else {
        return Ok(());
    };

    let distance = modeler.config.label_distance;
    let target = modeler.element(element).bounds;
    let label_bounds = modeler.element(label).bounds;
    let new_mid = aligned_mid(target, label_bounds, orientation, distance);
    let mid = label_bounds.mid();
    let delta = Delta::new(new_mid.x - mid.x, new_mid.y - mid.y);
    log::trace!("moving label of {} to {orientation:?}", modeler.element(element).id);
    modeler.execute(ShapeMoveContext::new(label, delta))?;
    Ok(())
}

/// Where the label mid goes when aligned to `orientation` of `target`.
fn aligned_mid(target: Bounds, label: Bounds, orientation: Orientation, distance: f64) -> Point {
    let mid = target.mid();
    match orientation {
        Orientation::Top => Point::new(mid.x, target.y - distance - label.height / 2.0),
        Orientation::Left => Point::new(target.x - distance - label.width / 2.0, mid.y),
        Orientation::Bottom => Point::new(mid.x, target.bottom() + distance + label.height / 2.0),
        _ => Point::new(target.right() + distance + label.width / 2.0, mid.y),
    }
}

fn approximate_orientation(from: Point, to: Point) -> Orientation {
    geometry::get_orientation(
        &Bounds::new(to.x, to.y, 0.0, 0.0),
        &Bounds::new(from.x, from.y, 0.0, 0.0),
        ORIENTATION_PADDING,
    )
}

/// The first free side, if the label currently sits on a taken one.
fn optimal_position(modeler: &Modeler, element: ElementIndex, label: ElementIndex) -> Option<Orientation> {
    let el = modeler.element(element);
    let element_mid = el.mid();
    let label_orientation = approximate_orientation(element_mid, modeler.element(label).mid());
    if !ALIGNMENTS.contains(&label_orientation) {
        return None;
    }

    let mut taken: Vec<Orientation> = Vec::new();
    for &connection in &el.incoming {
        let waypoints = &modeler.element(connection).waypoints;
        if waypoints.len() >= 2 {
            let docking = waypoints[waypoints.len() - 2].point();
            taken.push(approximate_orientation(element_mid, docking));
        }
    }
    for &connection in &el.outgoing {
        if let Some(docking) = modeler.element(connection).waypoints.get(1) {
            taken.push(approximate_orientation(element_mid, docking.point()));
        }
    }
    if let Some(host) = el.host {
        taken.extend(taken_host_alignments(element_mid, modeler.element(host).bounds));
    }

    let free: Vec<Orientation> = ALIGNMENTS
        .into_iter()
        .filter(|a| !taken.contains(a))
        .collect();
    if free.contains(&label_orientation) {
        return None;
    }
    free.first().copied()
}

/// An attacher's label must not cover the host: only the sides facing away
/// from it stay free.
fn taken_host_alignments(element_mid: Point, host: Bounds) -> Vec<Orientation> {
    let orientation = geometry::get_point_orientation(element_mid, &host);
    let free = orientation.cardinals();
    ALIGNMENTS
        .into_iter()
        .filter(|a| !free.contains(a))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn aligned_label_positions() {
        let target = Bounds::new(100.0, 100.0, 36.0, 36.0);
        let label = Bounds::new(0.0, 0.0, 40.0, 20.0);
        assert_eq!(
            aligned_mid(target, label, Orientation::Top, 10.0),
            Point::new(118.0, 80.0)
        );
        assert_eq!(
            aligned_mid(target, label, Orientation::Right, 10.0),
            Point::new(166.0, 118.0)
        );
    }

    #[test]
    fn attacher_on_host_bottom_keeps_bottom_free() {
        let host = Bounds::new(0.0, 0.0, 100.0, 80.0);
        let taken = taken_host_alignments(Point::new(50.0, 90.0), host);
        assert_eq!(
            taken,
            vec![Orientation::Top, Orientation::Left, Orientation::Right]
        );
    }

    #[test]
    fn points_to_the_side_are_classified() {
        let from = Point::new(100.0, 100.0);
        assert_eq!(
            approximate_orientation(from, Point::new(100.0, 40.0)),
            Orientation::Top
        );
        assert_eq!(
            approximate_orientation(from, Point::new(102.0, 101.0)),
            Orientation::Intersect
        );
    }
}
