//! `shape.resize`

use bpmn_core::{Bounds, Point};

use crate::command::{ConnectionLayoutContext, LayoutHints, ShapeResizeContext};
use crate::error::ModelingError;
use crate::modeler::Modeler;

pub fn execute(modeler: &mut Modeler, ctx: &mut ShapeResizeContext) -> Result<(), ModelingError> {
    let shape = modeler.canvas.get_mut(ctx.shape);
    ctx.old_bounds = Some(std::mem::replace(&mut shape.bounds, ctx.new_bounds));
    Ok(())
}

/// Lay out attached connections, keeping their anchors at the same relative
/// position inside the resized shape.
pub fn post_execute(modeler: &mut Modeler, ctx: &mut ShapeResizeContext) -> Result<(), ModelingError> {
    let Some(old_bounds) = ctx.old_bounds else {
        return Ok(());
    };
    if !ctx.hints.layout {
        return Ok(());
    }
    let new_bounds = ctx.new_bounds;
    let shape = modeler.element(ctx.shape);
    let incoming = shape.incoming.clone();
    let outgoing = shape.outgoing.clone();

    for connection in incoming {
        let end = modeler
            .element(connection)
            .waypoints
            .last()
            .map(|w| resized_anchor(w.original.unwrap_or(w.point()), old_bounds, new_bounds));
        let hints = LayoutHints {
            connection_end: end,
            ..LayoutHints::default()
        };
        modeler.execute(ConnectionLayoutContext::new(connection, hints))?;
    }
    for connection in outgoing {
        let start = modeler
            .element(connection)
            .waypoints
            .first()
            .map(|w| resized_anchor(w.original.unwrap_or(w.point()), old_bounds, new_bounds));
        let hints = LayoutHints {
            connection_start: start,
            ..LayoutHints::default()
        };
        modeler.execute(ConnectionLayoutContext::new(connection, hints))?;
    }
    Ok(())
}

pub fn revert(modeler: &mut Modeler, ctx: &mut ShapeResizeContext) -> Result<(), ModelingError> {
    if let Some(old) = ctx.old_bounds {
        modeler.canvas.get_mut(ctx.shape).bounds = old;
    }
    Ok(())
}

/// Map `point` from `old` into `new`, preserving its relative position.
pub(crate) fn resized_anchor(point: Point, old: Bounds, new: Bounds) -> Point {
    let scale = |p: f64, old_start: f64, old_size: f64, new_start: f64, new_size: f64| {
        if old_size == 0.0 {
            new_start
        } else {
            (new_start + (p - old_start) * new_size / old_size).round()
        }
    };
    Point::new(
        scale(point.x, old.x, old.width, new.x, new.width),
        scale(point.y, old.y, old.height, new.y, new.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn anchors_keep_their_relative_position() {
        let old = Bounds::new(0.0, 0.0, 100.0, 100.0);
        let new = Bounds::new(0.0, 0.0, 200.0, 50.0);
        assert_eq!(
            resized_anchor(Point::new(50.0, 50.0), old, new),
            Point::new(100.0, 25.0)
        );
    }
}
