//! `lane.split`: divide a lane (or participant) into `count` child lanes of
//! equal height (width, for vertical pools). The last lane absorbs the
//! rounding remainder.

use bpmn_core::Bounds;

use crate::command::{LaneSplitContext, ShapeResizeContext};
use crate::error::ModelingError;
use crate::lane_util::{child_lanes, indented, is_horizontal};
use crate::modeler::Modeler;

use super::add_lane::create_lane;

pub fn pre_execute(modeler: &mut Modeler, ctx: &mut LaneSplitContext) -> Result<(), ModelingError> {
    let count = ctx.count;
    if count == 0 {
        return Err(ModelingError::InvalidArgument(
            "cannot split into zero lanes".into(),
        ));
    }
    let existing = child_lanes(modeler, ctx.shape);
    if existing.len() > count {
        return Err(ModelingError::InvalidOperation(format!(
            "more than {count} child lanes already"
        )));
    }

    let shape = modeler.element(ctx.shape).bounds;
    let indentation = modeler.config.lane_indentation;
    let horizontal = is_horizontal(modeler, ctx.shape);
    let lanes = split_bounds(shape, count, indentation, horizontal);
    for (i, bounds) in lanes.into_iter().enumerate() {
        match existing.get(i) {
            Some(&lane) => {
                modeler.execute(ShapeResizeContext::new(lane, bounds))?;
            }
            None => {
                create_lane(modeler, ctx.shape, bounds)?;
            }
        }
    }
    Ok(())
}

/// Bounds of `count` stacked lanes filling `shape` beside the indentation.
pub fn split_bounds(shape: Bounds, count: usize, indentation: f64, horizontal: bool) -> Vec<Bounds> {
    let area = indented(shape, indentation, horizontal);
    // lay out top to bottom, transposed for vertical pools
    let area = if horizontal { area } else { area.transpose() };
    let size = (area.height / count as f64).round();
    (0..count)
        .map(|i| {
            let offset = size * i as f64;
            let lane_size = if i == count - 1 {
                area.height - offset
            } else {
                size
            };
            let lane = Bounds::new(area.x, area.y + offset, area.width, lane_size);
            if horizontal { lane } else { lane.transpose() }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn last_lane_takes_the_remainder() {
        let lanes = split_bounds(Bounds::new(0.0, 0.0, 600.0, 250.0), 3, 30.0, true);
        let heights: Vec<f64> = lanes.iter().map(|b| b.height).collect();
        assert_eq!(heights, vec![83.0, 83.0, 84.0]);
        assert_eq!(lanes[2].y, 166.0);
        assert_eq!(lanes[0].x, 30.0);
        assert_eq!(lanes[0].width, 570.0);
    }

    #[test]
    fn vertical_lanes_split_the_width() {
        let lanes = split_bounds(Bounds::new(0.0, 0.0, 250.0, 600.0), 3, 30.0, false);
        assert_eq!(
            lanes,
            vec![
                Bounds::new(0.0, 30.0, 83.0, 570.0),
                Bounds::new(83.0, 30.0, 83.0, 570.0),
                Bounds::new(166.0, 30.0, 84.0, 570.0),
            ]
        );
    }
}
