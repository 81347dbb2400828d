//! `shape.create`: add a prepared shape to the canvas, optionally attached
//! to a host.

use bpmn_core::Bounds;

use crate::command::{Placement, ShapeCreateContext};
use crate::error::ModelingError;
use crate::modeler::Modeler;

/// Bounds of an element of `size` placed at `placement`.
pub(crate) fn placed_bounds(size: Bounds, placement: Placement) -> Bounds {
    match placement {
        Placement::Center(p) => Bounds::new(
            (p.x - size.width / 2.0).round(),
            (p.y - size.height / 2.0).round(),
            size.width,
            size.height,
        ),
        Placement::Bounds(b) => b,
    }
}

pub fn execute(modeler: &mut Modeler, ctx: &mut ShapeCreateContext) -> Result<(), ModelingError> {
    let bounds = placed_bounds(modeler.element(ctx.shape).bounds, ctx.placement);
    modeler.canvas.get_mut(ctx.shape).bounds = bounds;
    modeler
        .canvas
        .add_shape(ctx.shape, ctx.parent, ctx.parent_index)?;
    if let Some(host) = ctx.host {
        modeler.canvas.set_host(ctx.shape, Some(host), None);
    }
    Ok(())
}

pub fn revert(modeler: &mut Modeler, ctx: &mut ShapeCreateContext) -> Result<(), ModelingError> {
    if ctx.host.is_some() {
        modeler.canvas.set_host(ctx.shape, None, None);
    }
    modeler.canvas.remove(ctx.shape);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpmn_core::Point;
    use pretty_assertions::assert_eq;

    #[test]
    fn centers_on_the_given_point() {
        let size = Bounds::new(0.0, 0.0, 100.0, 80.0);
        assert_eq!(
            placed_bounds(size, Placement::Center(Point::new(300.0, 100.0))),
            Bounds::new(250.0, 60.0, 100.0, 80.0)
        );
    }

    #[test]
    fn explicit_bounds_win() {
        let size = Bounds::new(0.0, 0.0, 100.0, 80.0);
        let explicit = Bounds::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(placed_bounds(size, Placement::Bounds(explicit)), explicit);
    }
}
