//! `elements.move`: move a set of shapes together with everything they
//! carry along.
//!
//! The closure of a move holds every shape that travels (the selection plus
//! all descendants) and every connection touching one of them. Connections
//! with both ends inside the closure are translated; the others are laid
//! out again against their moved end.

use bpmn_core::{Delta, ElementIndex};

use crate::command::{
    ConnectionLayoutContext, ConnectionMoveContext, ElementsMoveContext, LayoutHints, MoveHints,
    ShapeMoveContext,
};
use crate::error::ModelingError;
use crate::layout::{moved_source_anchor, moved_target_anchor};
use crate::modeler::Modeler;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveClosure {
    pub all_shapes: Vec<ElementIndex>,
    pub all_connections: Vec<ElementIndex>,
    /// Connections whose source and target both travel.
    pub enclosed_connections: Vec<ElementIndex>,
    /// Elements not nested in another member; only these get reparented.
    pub top_level: Vec<ElementIndex>,
}

impl MoveClosure {
    pub fn compute(modeler: &Modeler, elements: &[ElementIndex]) -> Self {
        let mut closure = Self::default();
        closure.add(modeler, elements);
        closure
    }

    /// Add `elements` and their descendants.
    pub fn add(&mut self, modeler: &Modeler, elements: &[ElementIndex]) {
        for &element in elements {
            if self.contains(element) {
                continue;
            }
            let nested = elements
                .iter()
                .chain(&self.top_level)
                .any(|other| *other != element && modeler.canvas.is_ancestor(*other, element));
            if !nested {
                self.top_level.push(element);
            }
            self.insert(modeler, element);
            for descendant in modeler.canvas.descendants(&[element]) {
                self.insert(modeler, descendant);
            }
        }
        self.collect_connections(modeler);
    }

    pub fn contains(&self, element: ElementIndex) -> bool {
        self.all_shapes.contains(&element) || self.all_connections.contains(&element)
    }

    fn insert(&mut self, modeler: &Modeler, element: ElementIndex) {
        let list = if modeler.element(element).is_connection() {
            &mut self.all_connections
        } else {
            &mut self.all_shapes
        };
        if !list.contains(&element) {
            list.push(element);
        }
    }

    fn collect_connections(&mut self, modeler: &Modeler) {
        for i in 0..self.all_shapes.len() {
            let shape = modeler.element(self.all_shapes[i]);
            for connection in shape.incoming.iter().chain(&shape.outgoing) {
                if !self.all_connections.contains(connection) {
                    self.all_connections.push(*connection);
                }
            }
        }
        let moved = |end: Option<ElementIndex>| end.is_some_and(|e| self.all_shapes.contains(&e));
        self.enclosed_connections = self
            .all_connections
            .iter()
            .copied()
            .filter(|c| {
                let connection = modeler.element(*c);
                moved(connection.source) && moved(connection.target)
            })
            .collect();
    }
}

pub fn pre_execute(modeler: &mut Modeler, ctx: &mut ElementsMoveContext) -> Result<(), ModelingError> {
    ctx.closure = MoveClosure::compute(modeler, &ctx.shapes);
    Ok(())
}

pub fn post_execute(modeler: &mut Modeler, ctx: &mut ElementsMoveContext) -> Result<(), ModelingError> {
    move_closure(
        modeler,
        &ctx.closure,
        ctx.delta,
        ctx.new_parent,
        ctx.primary_shape,
    )
}

/// Move every member of `closure` by `delta`. Top-level members go to
/// `new_parent`, unless the primary shape already lives there.
pub(crate) fn move_closure(
    modeler: &mut Modeler,
    closure: &MoveClosure,
    delta: Delta,
    new_parent: Option<ElementIndex>,
    primary_shape: Option<ElementIndex>,
) -> Result<(), ModelingError> {
    let keep_parent =
        primary_shape.is_some_and(|p| new_parent.is_some() && modeler.element(p).parent == new_parent);
    let reparent = |element: ElementIndex| {
        if closure.top_level.contains(&element) && !keep_parent {
            new_parent
        } else {
            None
        }
    };

    for &shape in &closure.all_shapes {
        if !modeler.canvas.contains(shape) {
            continue;
        }
        let ctx = ShapeMoveContext {
            new_parent: reparent(shape),
            hints: MoveHints {
                layout: false,
                recurse: false,
            },
            ..ShapeMoveContext::new(shape, delta)
        };
        modeler.execute(ctx)?;
    }

    for &connection in &closure.all_connections {
        if !modeler.canvas.contains(connection) {
            continue;
        }
        let element = modeler.element(connection);
        let source_moved = element
            .source
            .is_some_and(|s| closure.all_shapes.contains(&s));
        let target_moved = element
            .target
            .is_some_and(|t| closure.all_shapes.contains(&t));

        if closure.enclosed_connections.contains(&connection) && source_moved && target_moved {
            let ctx = ConnectionMoveContext {
                new_parent: reparent(connection),
                ..ConnectionMoveContext::new(connection, delta)
            };
            modeler.execute(ctx)?;
        } else {
            let hints = LayoutHints {
                connection_start: source_moved
                    .then(|| moved_source_anchor(modeler, connection, delta))
                    .flatten(),
                connection_end: target_moved
                    .then(|| moved_target_anchor(modeler, connection, delta))
                    .flatten(),
            };
            modeler.execute(ConnectionLayoutContext::new(connection, hints))?;
        }
    }
    Ok(())
}
