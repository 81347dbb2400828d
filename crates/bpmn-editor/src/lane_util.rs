//! Lane geometry: finding the lanes of a participant and computing how
//! neighbouring lanes follow a resized lane.

use bpmn_core::{Bounds, BpmnType, ElementIndex, Trbl};

use crate::modeler::Modeler;

/// Adjacent lane borders closer than this are treated as shared.
const ADJACENT_TOLERANCE: f64 = 10.0;
/// Aligned lane borders closer than this move together.
const ALIGNED_TOLERANCE: f64 = 5.0;

/// The participant or process whose lanes contain `element` (may be itself).
pub fn lanes_root(modeler: &Modeler, element: ElementIndex) -> Option<ElementIndex> {
    modeler.canvas.find_parent(element, |e| {
        e.business_object.is_some_and(|bo| {
            matches!(
                modeler.moddle.type_of(bo),
                BpmnType::Participant | BpmnType::Process
            )
        })
    })
}

/// Whether the lanes of `element` stack top to bottom. Read from the DI;
/// horizontal when unset.
pub fn is_horizontal(modeler: &Modeler, element: ElementIndex) -> bool {
    let root = lanes_root(modeler, element).unwrap_or(element);
    modeler
        .bo(root)
        .and_then(|bo| modeler.moddle.di_of(bo))
        .and_then(|di| modeler.moddle.di(di).is_horizontal)
        .unwrap_or(true)
}

/// The area of `bounds` right of (or, for vertical pools, below) the
/// participant header.
pub fn indented(bounds: Bounds, indentation: f64, horizontal: bool) -> Bounds {
    if horizontal {
        Bounds::new(
            bounds.x + indentation,
            bounds.y,
            bounds.width - indentation,
            bounds.height,
        )
    } else {
        Bounds::new(
            bounds.x,
            bounds.y + indentation,
            bounds.width,
            bounds.height - indentation,
        )
    }
}

/// Direct child lanes, in children order.
pub fn child_lanes(modeler: &Modeler, element: ElementIndex) -> Vec<ElementIndex> {
    modeler
        .element(element)
        .children
        .iter()
        .copied()
        .filter(|c| modeler.is_type(*c, BpmnType::Lane))
        .collect()
}

/// All lanes below `element`, depth first.
pub fn collect_lanes(modeler: &Modeler, element: ElementIndex) -> Vec<ElementIndex> {
    let mut collected = Vec::new();
    collect_into(modeler, element, &mut collected);
    collected
}

fn collect_into(modeler: &Modeler, element: ElementIndex, collected: &mut Vec<ElementIndex>) {
    for lane in child_lanes(modeler, element) {
        collected.push(lane);
        collect_into(modeler, lane, collected);
    }
}

/// Grow or shrink `bounds` by a TRBL delta.
pub fn resize_trbl(bounds: Bounds, delta: Trbl) -> Bounds {
    Bounds::from_trbl(bounds.trbl().add(&delta))
}

/// The resizes other lanes (and the participant) need when `shape` gets
/// `new_bounds`: lanes sharing the moved border follow it. Vertical lanes
/// are computed transposed.
pub fn compute_lanes_resize(
    modeler: &Modeler,
    shape: ElementIndex,
    new_bounds: Bounds,
) -> Vec<(ElementIndex, Bounds)> {
    let Some(root) = lanes_root(modeler, shape) else {
        return Vec::new();
    };
    let mut all = if modeler.is_type(root, BpmnType::Process) {
        Vec::new()
    } else {
        vec![root]
    };
    all.extend(collect_lanes(modeler, root));

    let horizontal = is_horizontal(modeler, root);
    let along = |b: Bounds| if horizontal { b } else { b.transpose() };

    let old = along(modeler.element(shape).bounds).trbl();
    let new = along(new_bounds).trbl();
    let change = new.sub(&old);

    let mut needed = Vec::new();
    for other in all {
        if other == shape {
            continue;
        }
        let other_bounds = along(modeler.element(other).bounds);
        let trbl = other_bounds.trbl();
        let mut delta = Trbl {
            top: 0.0,
            right: change.right,
            bottom: 0.0,
            left: change.left,
        };

        if change.top != 0.0 {
            if (trbl.bottom - old.top).abs() < ADJACENT_TOLERANCE {
                delta.bottom = new.top - trbl.bottom;
            }
            if (trbl.top - old.top).abs() < ALIGNED_TOLERANCE {
                delta.top = new.top - trbl.top;
            }
        }
        if change.bottom != 0.0 {
            if (trbl.top - old.bottom).abs() < ADJACENT_TOLERANCE {
                delta.top = new.bottom - trbl.top;
            }
            if (trbl.bottom - old.bottom).abs() < ALIGNED_TOLERANCE {
                delta.bottom = new.bottom - trbl.bottom;
            }
        }

        if delta != Trbl::default() {
            needed.push((other, along(resize_trbl(other_bounds, delta))));
        }
    }
    needed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn resize_by_trbl() {
        let b = Bounds::new(10.0, 10.0, 100.0, 50.0);
        let grown = resize_trbl(
            b,
            Trbl {
                top: -10.0,
                right: 0.0,
                bottom: 20.0,
                left: 0.0,
            },
        );
        assert_eq!(grown, Bounds::new(10.0, 0.0, 100.0, 80.0));
    }
}
