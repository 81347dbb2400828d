//! The modeling facade: one method per editing intent, each issuing one
//! command.
//!
//! Creation methods return the created element. A `canExecute` veto is not
//! an error: the element is simply never added to the canvas, and methods
//! that return a context or an optional element give `None`.

use std::collections::BTreeMap;

use bpmn_core::{
    Bounds, BpmnType, Delta, DiColor, ElementId, ElementIndex, ObjectIndex, Point, Value,
    Waypoints,
};

use crate::command::{
    CanvasUpdateRootContext, CommandContext, ConnectionCreateContext, ConnectionDeleteContext,
    ConnectionLayoutContext, ConnectionReconnectContext, ConnectionUpdateWaypointsContext,
    CreateHints, ElementsCreateContext, ElementsDeleteContext, ElementsMoveContext,
    LabelCreateContext, LaneAddContext, LaneLocation, LaneResizeContext, LaneSplitContext,
    LaneUpdateRefsContext, LayoutHints, Placement, ReplaceHints, SetColorContext,
    ShapeCreateContext, ShapeDeleteContext, ShapeMoveContext, ShapeReplaceContext,
    ShapeResizeContext, UpdateLabelContext, UpdateModdlePropertiesContext,
    UpdatePropertiesContext,
};
use crate::element_factory::{ConnectionAttrs, ShapeAttrs};
use crate::error::ModelingError;
use crate::modeler::Modeler;

type Result<T> = std::result::Result<T, ModelingError>;

pub struct Modeling<'a> {
    modeler: &'a mut Modeler,
}

impl<'a> Modeling<'a> {
    pub fn new(modeler: &'a mut Modeler) -> Self {
        Self { modeler }
    }

    // ─── Shapes ──────────────────────────────────────────────────────────

    /// Create a shape from `attrs` inside `target`. With `hints.attach` the
    /// target becomes the host and its parent the parent.
    pub fn create_shape_with(
        &mut self,
        attrs: &ShapeAttrs,
        placement: impl Into<Placement>,
        target: ElementIndex,
        hints: CreateHints,
    ) -> Result<ElementIndex> {
        let shape = self.modeler.element_factory().create_shape(attrs)?;
        let (parent, host) = if hints.attach {
            let parent = self
                .modeler
                .element(target)
                .parent
                .unwrap_or_else(|| self.modeler.root());
            (parent, Some(target))
        } else {
            (target, None)
        };
        self.modeler.execute(ShapeCreateContext {
            shape,
            placement: placement.into(),
            parent,
            parent_index: None,
            host,
            hints,
        })?;
        Ok(shape)
    }

    pub fn create_shape(
        &mut self,
        attrs: &ShapeAttrs,
        placement: impl Into<Placement>,
        target: ElementIndex,
    ) -> Result<ElementIndex> {
        self.create_shape_with(attrs, placement, target, CreateHints::default())
    }

    /// Move a single shape, and its children, by `delta`.
    pub fn move_shape(
        &mut self,
        shape: ElementIndex,
        delta: Delta,
        new_parent: Option<ElementIndex>,
    ) -> Result<Option<CommandContext>> {
        self.modeler.execute(ShapeMoveContext {
            new_parent,
            ..ShapeMoveContext::new(shape, delta)
        })
    }

    /// Move a selection together with everything it carries. With `attach`
    /// the target becomes the new host of the (single) moved shape.
    pub fn move_elements(
        &mut self,
        shapes: &[ElementIndex],
        delta: Delta,
        target: Option<ElementIndex>,
        attach: bool,
    ) -> Result<Option<CommandContext>> {
        let (new_parent, new_host) = match target {
            Some(target) if attach => (self.modeler.element(target).parent, Some(target)),
            _ => (target, None),
        };
        self.modeler.execute(ElementsMoveContext {
            new_parent,
            new_host,
            ..ElementsMoveContext::new(shapes.to_vec(), delta)
        })
    }

    pub fn resize_shape(&mut self, shape: ElementIndex, new_bounds: Bounds) -> Result<Option<CommandContext>> {
        self.modeler
            .execute(ShapeResizeContext::new(shape, new_bounds))
    }

    /// Replace a shape by a new one built from `attrs`. Returns the new
    /// shape.
    pub fn replace_shape(
        &mut self,
        old_shape: ElementIndex,
        attrs: &ShapeAttrs,
        hints: ReplaceHints,
    ) -> Result<Option<ElementIndex>> {
        let context = self.modeler.execute(ShapeReplaceContext {
            old_shape,
            new_data: attrs.clone(),
            hints,
            new_shape: None,
        })?;
        Ok(match context {
            Some(CommandContext::ShapeReplace(ctx)) => ctx.new_shape,
            _ => None,
        })
    }

    pub fn remove_shape(&mut self, shape: ElementIndex) -> Result<Option<CommandContext>> {
        self.modeler.execute(ShapeDeleteContext::new(shape))
    }

    /// Add prepared elements, centered on `position`, to `parent`.
    pub fn create_elements(
        &mut self,
        elements: Vec<ElementIndex>,
        position: Point,
        parent: ElementIndex,
    ) -> Result<Vec<ElementIndex>> {
        let context = self.modeler.execute(ElementsCreateContext {
            elements,
            position,
            parent,
            created: Vec::new(),
        })?;
        Ok(match context {
            Some(CommandContext::ElementsCreate(ctx)) => ctx.created,
            _ => Vec::new(),
        })
    }

    pub fn remove_elements(&mut self, elements: &[ElementIndex]) -> Result<Option<CommandContext>> {
        self.modeler.execute(ElementsDeleteContext {
            elements: elements.to_vec(),
        })
    }

    // ─── Connections ─────────────────────────────────────────────────────

    /// Create a connection from `attrs` between `source` and `target`.
    /// Waypoints are laid out unless `attrs` carries them.
    pub fn create_connection(
        &mut self,
        source: ElementIndex,
        target: ElementIndex,
        attrs: &ConnectionAttrs,
        parent: ElementIndex,
    ) -> Result<ElementIndex> {
        let connection = self.modeler.element_factory().create_connection(attrs)?;
        self.modeler.execute(ConnectionCreateContext {
            connection,
            source,
            target,
            parent,
            parent_index: None,
            hints: LayoutHints::default(),
        })?;
        Ok(connection)
    }

    /// Connect two shapes with whatever connection the rules allow.
    /// Returns `None` when they may not be connected.
    pub fn connect(&mut self, source: ElementIndex, target: ElementIndex) -> Result<Option<ElementIndex>> {
        let rules = self.modeler.rules();
        let Some(bpmn_type) = rules.can_connect(self.modeler, source, target) else {
            log::debug!(
                "cannot connect {} to {}",
                self.modeler.element(source).id,
                self.modeler.element(target).id
            );
            return Ok(None);
        };
        // message flows cross participants and live on the root
        let parent = if bpmn_type == BpmnType::MessageFlow {
            self.modeler.root()
        } else {
            self.modeler
                .element(source)
                .parent
                .unwrap_or_else(|| self.modeler.root())
        };
        self.create_connection(source, target, &ConnectionAttrs::new(bpmn_type), parent)
            .map(Some)
    }

    pub fn remove_connection(&mut self, connection: ElementIndex) -> Result<Option<CommandContext>> {
        self.modeler
            .execute(ConnectionDeleteContext::new(connection))
    }

    /// Reconnect both ends. Explicit `waypoints` skip the layout.
    pub fn reconnect(
        &mut self,
        connection: ElementIndex,
        new_source: ElementIndex,
        new_target: ElementIndex,
        waypoints: Option<Waypoints>,
    ) -> Result<Option<CommandContext>> {
        self.modeler.execute(ConnectionReconnectContext {
            waypoints,
            ..ConnectionReconnectContext::new(connection, new_source, new_target)
        })
    }

    /// Give `connection` a new source, docked at `docking` if given.
    pub fn reconnect_start(
        &mut self,
        connection: ElementIndex,
        new_source: ElementIndex,
        docking: Option<Point>,
    ) -> Result<Option<CommandContext>> {
        let target = self.connection_end(connection, false)?;
        self.modeler.execute(ConnectionReconnectContext {
            hints: LayoutHints {
                connection_start: docking,
                connection_end: None,
            },
            ..ConnectionReconnectContext::new(connection, new_source, target)
        })
    }

    /// Give `connection` a new target, docked at `docking` if given.
    pub fn reconnect_end(
        &mut self,
        connection: ElementIndex,
        new_target: ElementIndex,
        docking: Option<Point>,
    ) -> Result<Option<CommandContext>> {
        let source = self.connection_end(connection, true)?;
        self.modeler.execute(ConnectionReconnectContext {
            hints: LayoutHints {
                connection_start: None,
                connection_end: docking,
            },
            ..ConnectionReconnectContext::new(connection, source, new_target)
        })
    }

    fn connection_end(&self, connection: ElementIndex, source: bool) -> Result<ElementIndex> {
        let element = self.modeler.element(connection);
        let end = if source { element.source } else { element.target };
        end.ok_or_else(|| {
            ModelingError::InvalidArgument(format!("{} is not connected", element.id))
        })
    }

    pub fn update_waypoints(
        &mut self,
        connection: ElementIndex,
        new_waypoints: Waypoints,
    ) -> Result<Option<CommandContext>> {
        self.modeler.execute(ConnectionUpdateWaypointsContext {
            connection,
            new_waypoints,
            old_waypoints: None,
        })
    }

    pub fn layout_connection(
        &mut self,
        connection: ElementIndex,
        hints: LayoutHints,
    ) -> Result<Option<CommandContext>> {
        self.modeler
            .execute(ConnectionLayoutContext::new(connection, hints))
    }

    // ─── Labels and properties ───────────────────────────────────────────

    /// Create the external label of `target` at `placement`.
    pub fn create_label(
        &mut self,
        target: ElementIndex,
        placement: impl Into<Placement>,
        parent: Option<ElementIndex>,
    ) -> Result<ElementIndex> {
        let label = self.modeler.element_factory().create_label(target);
        self.modeler.execute(LabelCreateContext {
            label,
            label_target: target,
            placement: placement.into(),
            parent,
            parent_index: None,
        })?;
        Ok(label)
    }

    /// Set the text an element shows; `None` or an empty text clears it.
    pub fn update_label(
        &mut self,
        element: ElementIndex,
        new_label: Option<&str>,
        new_bounds: Option<Bounds>,
    ) -> Result<Option<CommandContext>> {
        self.modeler.execute(UpdateLabelContext {
            element,
            new_label: new_label.map(str::to_string),
            new_bounds,
            old_label: None,
        })
    }

    pub fn update_properties(
        &mut self,
        element: ElementIndex,
        properties: BTreeMap<String, Value>,
    ) -> Result<Option<CommandContext>> {
        self.modeler
            .execute(UpdatePropertiesContext::new(element, properties))
    }

    /// Update properties of `moddle_element`, some object reachable from
    /// `element` (e.g. an event definition).
    pub fn update_moddle_properties(
        &mut self,
        element: ElementIndex,
        moddle_element: ObjectIndex,
        properties: BTreeMap<String, Value>,
    ) -> Result<Option<CommandContext>> {
        self.modeler.execute(UpdateModdlePropertiesContext {
            element,
            moddle_element,
            properties,
            old_properties: BTreeMap::new(),
        })
    }

    pub fn set_color(&mut self, elements: &[ElementIndex], colors: DiColor) -> Result<Option<CommandContext>> {
        self.modeler.execute(SetColorContext {
            elements: elements.to_vec(),
            colors,
            old_colors: Vec::new(),
        })
    }

    // ─── Lanes ───────────────────────────────────────────────────────────

    /// Add a lane above or below `shape`. Returns the new lane.
    pub fn add_lane(&mut self, shape: ElementIndex, location: LaneLocation) -> Result<Option<ElementIndex>> {
        let context = self.modeler.execute(LaneAddContext {
            shape,
            location,
            new_lane: None,
        })?;
        Ok(match context {
            Some(CommandContext::LaneAdd(ctx)) => ctx.new_lane,
            _ => None,
        })
    }

    /// # Errors
    /// Returns [`ModelingError::InvalidOperation`] when `shape` already has
    /// more than `count` child lanes.
    pub fn split_lane(&mut self, shape: ElementIndex, count: usize) -> Result<Option<CommandContext>> {
        self.modeler.execute(LaneSplitContext { shape, count })
    }

    /// Resize a lane. Balanced resizing keeps the outer bounds of the
    /// participant and shrinks or grows the neighbours instead.
    pub fn resize_lane(
        &mut self,
        shape: ElementIndex,
        new_bounds: Bounds,
        balanced: bool,
    ) -> Result<Option<CommandContext>> {
        self.modeler.execute(LaneResizeContext {
            shape,
            new_bounds,
            balanced,
        })
    }

    pub fn update_lane_refs(
        &mut self,
        flow_nodes: &[ElementIndex],
        lanes: &[ElementIndex],
    ) -> Result<Option<CommandContext>> {
        self.modeler.execute(LaneUpdateRefsContext {
            flow_nodes: flow_nodes.to_vec(),
            lanes: lanes.to_vec(),
            updates: Vec::new(),
        })
    }

    // ─── Roots and ids ───────────────────────────────────────────────────

    /// Make a fresh collaboration the canvas root. Returns it.
    pub fn make_collaboration(&mut self) -> Result<ElementIndex> {
        self.update_root(BpmnType::Collaboration)
    }

    /// Make a fresh process the canvas root. Returns it.
    pub fn make_process(&mut self) -> Result<ElementIndex> {
        self.update_root(BpmnType::Process)
    }

    fn update_root(&mut self, bpmn_type: BpmnType) -> Result<ElementIndex> {
        let new_root = self.modeler.element_factory().create_root(bpmn_type)?;
        self.modeler.execute(CanvasUpdateRootContext {
            new_root,
            old_root: None,
        })?;
        Ok(new_root)
    }

    /// # Errors
    /// Returns [`ModelingError::IdConflict`] when `id` is taken.
    pub fn claim_id(&mut self, id: &str, element: ObjectIndex) -> Result<Option<CommandContext>> {
        self.modeler
            .execute(CommandContext::claim_id(ElementId::intern(id), element))
    }

    pub fn unclaim_id(&mut self, id: &str, element: ObjectIndex) -> Result<Option<CommandContext>> {
        self.modeler
            .execute(CommandContext::unclaim_id(ElementId::intern(id), element))
    }
}
