//! `elements.create`: add a prepared group of elements (e.g. a pasted
//! fragment), centered on a position.
//!
//! Prepared elements carry relative geometry and their relations to each
//! other: nested parents, connection ends and label targets. Each is
//! created with its own command, parents before children.

use bpmn_core::{Bounds, Delta, ElementIndex};

use crate::command::{
    ConnectionCreateContext, CreateHints, ElementsCreateContext, LabelCreateContext, LayoutHints,
    Placement, ShapeCreateContext,
};
use crate::error::ModelingError;
use crate::modeler::Modeler;

pub fn pre_execute(modeler: &mut Modeler, ctx: &mut ElementsCreateContext) -> Result<(), ModelingError> {
    let Some(bbox) = bounding_box(modeler, &ctx.elements) else {
        return Ok(());
    };
    let delta = Delta::new(
        ctx.position.x - bbox.x - bbox.width / 2.0,
        ctx.position.y - bbox.y - bbox.height / 2.0,
    );
    for &element in &ctx.elements {
        let prepared = modeler.canvas.get_mut(element);
        if prepared.is_connection() {
            for waypoint in &mut prepared.waypoints {
                waypoint.x = (waypoint.x + delta.x).round();
                waypoint.y = (waypoint.y + delta.y).round();
            }
        } else {
            let b = prepared.bounds;
            prepared.bounds = Bounds::new(
                (b.x + delta.x).round(),
                (b.y + delta.y).round(),
                b.width,
                b.height,
            );
        }
    }

    ctx.created.clear();
    for element in ctx.elements.clone() {
        create_one(modeler, ctx, element)?;
        ctx.created.push(element);
    }
    Ok(())
}

fn create_one(
    modeler: &mut Modeler,
    ctx: &ElementsCreateContext,
    element: ElementIndex,
) -> Result<(), ModelingError> {
    let prepared = modeler.element(element);
    let parent = prepared
        .parent
        .filter(|p| ctx.elements.contains(p))
        .unwrap_or(ctx.parent);
    let (source, target, label_target) =
        (prepared.source, prepared.target, prepared.label_target);

    // Detach from the prepared structure; the commands rebuild it.
    modeler.canvas.set_parent(element, None, None);

    if modeler.element(element).is_connection() {
        let (Some(source), Some(target)) = (source, target) else {
            return Err(ModelingError::InvalidArgument(format!(
                "connection <{}> needs a source and a target",
                modeler.element(element).id
            )));
        };
        modeler.canvas.set_source(element, None);
        modeler.canvas.set_target(element, None);
        modeler.execute(ConnectionCreateContext {
            connection: element,
            source,
            target,
            parent,
            parent_index: None,
            hints: LayoutHints::default(),
        })?;
    } else if let Some(label_target) = label_target {
        modeler.canvas.set_label(label_target, None);
        let bounds = modeler.element(element).bounds;
        modeler.execute(LabelCreateContext {
            label: element,
            label_target,
            placement: Placement::Bounds(bounds),
            parent: Some(parent),
            parent_index: None,
        })?;
    } else {
        let bounds = modeler.element(element).bounds;
        let host = modeler.element(element).host;
        if host.is_some() {
            modeler.canvas.set_host(element, None, None);
        }
        modeler.execute(ShapeCreateContext {
            shape: element,
            placement: Placement::Bounds(bounds),
            parent,
            parent_index: None,
            host,
            hints: CreateHints::default(),
        })?;
    }
    Ok(())
}

/// Bounding box of the visible elements: shape bounds and waypoints.
fn bounding_box(modeler: &Modeler, elements: &[ElementIndex]) -> Option<Bounds> {
    let mut points = Vec::new();
    for &idx in elements {
        let element = modeler.element(idx);
        if element.hidden {
            continue;
        }
        if element.is_connection() {
            points.extend(element.waypoints.iter().map(|w| (w.x, w.y, w.x, w.y)));
        } else {
            let b = element.bounds;
            points.push((b.x, b.y, b.right(), b.bottom()));
        }
    }
    let first = *points.first()?;
    let (left, top, right, bottom) = points.iter().fold(first, |acc, p| {
        (acc.0.min(p.0), acc.1.min(p.1), acc.2.max(p.2), acc.3.max(p.3))
    });
    Some(Bounds::new(left, top, right - left, bottom - top))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element_factory::ShapeAttrs;
    use bpmn_core::{BpmnType, Point};
    use pretty_assertions::assert_eq;

    #[test]
    fn centers_the_group_on_the_position() {
        let mut modeler = Modeler::new();
        let a = modeler
            .element_factory()
            .create_shape(&ShapeAttrs::new(BpmnType::Task))
            .unwrap();
        let b = modeler
            .element_factory()
            .create_shape(&ShapeAttrs::new(BpmnType::Task))
            .unwrap();
        modeler.canvas.get_mut(b).bounds = Bounds::new(200.0, 0.0, 100.0, 80.0);

        let root = modeler.root();
        modeler
            .execute(ElementsCreateContext {
                elements: vec![a, b],
                position: Point::new(500.0, 300.0),
                parent: root,
                created: Vec::new(),
            })
            .unwrap();

        // group spans 300 x 80, so it starts at (350, 260)
        assert_eq!(modeler.element(a).bounds, Bounds::new(350.0, 260.0, 100.0, 80.0));
        assert_eq!(modeler.element(b).bounds, Bounds::new(550.0, 260.0, 100.0, 80.0));
        assert_eq!(modeler.element(a).parent, Some(root));
    }
}
