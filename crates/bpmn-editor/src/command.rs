//! Typed commands.
//!
//! Every structural change is a [`CommandContext`]: one variant per named
//! command, each carrying its own payload. Handlers mutate the payload in
//! place while executing, capturing whatever revert needs, and the command
//! stack keeps the final payload in its log.

use bpmn_core::{
    Bounds, DiColor, DiIndex, ElementId, ElementIndex, ObjectIndex, Point, Value, Waypoints,
};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::element_factory::ShapeAttrs;
use crate::error::ModelingError;
use crate::handlers::move_elements::MoveClosure;
use crate::handlers::update_flow_node_refs::FlowNodeRefUpdate;

// ─── Names ───────────────────────────────────────────────────────────────

macro_rules! command_kinds {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// The name of a command, e.g. `shape.create`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum CommandKind {
            $($variant),*
        }

        impl CommandKind {
            pub const ALL: &'static [CommandKind] = &[$(CommandKind::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(CommandKind::$variant => $name),*
                }
            }
        }

        impl FromStr for CommandKind {
            type Err = ModelingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(CommandKind::$variant),)*
                    other => Err(ModelingError::InvalidArgument(format!("unknown command <{other}>"))),
                }
            }
        }
    };
}

command_kinds! {
    ShapeCreate => "shape.create",
    ShapeDelete => "shape.delete",
    ShapeMove => "shape.move",
    ShapeResize => "shape.resize",
    ShapeReplace => "shape.replace",
    LabelCreate => "label.create",
    ConnectionCreate => "connection.create",
    ConnectionDelete => "connection.delete",
    ConnectionMove => "connection.move",
    ConnectionLayout => "connection.layout",
    ConnectionUpdateWaypoints => "connection.updateWaypoints",
    ConnectionReconnect => "connection.reconnect",
    ElementsMove => "elements.move",
    ElementsCreate => "elements.create",
    ElementsDelete => "elements.delete",
    ElementUpdateAttachment => "element.updateAttachment",
    ElementUpdateParent => "element.updateParent",
    ElementUpdateLabel => "element.updateLabel",
    ElementUpdateProperties => "element.updateProperties",
    ElementUpdateModdleProperties => "element.updateModdleProperties",
    ElementUpdateSemanticParent => "element.updateSemanticParent",
    ElementSetColor => "element.setColor",
    LaneAdd => "lane.add",
    LaneSplit => "lane.split",
    LaneResize => "lane.resize",
    LaneUpdateRefs => "lane.updateRefs",
    IdClaim => "id.updateClaim.claim",
    IdUnclaim => "id.updateClaim.unclaim",
    CanvasUpdateRoot => "canvas.updateRoot",
    SpaceTool => "spaceTool",
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Hints ───────────────────────────────────────────────────────────────

/// Where a new shape goes: centered on a point, or at explicit bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Center(Point),
    Bounds(Bounds),
}

impl From<Point> for Placement {
    fn from(p: Point) -> Self {
        Placement::Center(p)
    }
}

impl From<Bounds> for Placement {
    fn from(b: Bounds) -> Self {
        Placement::Bounds(b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CreateHints {
    /// Treat the target as host and attach the new shape to it.
    pub attach: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveHints {
    /// Re-layout connections attached to moved shapes.
    pub layout: bool,
    /// Move children along with the shape.
    pub recurse: bool,
}

impl Default for MoveHints {
    fn default() -> Self {
        Self {
            layout: true,
            recurse: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeHints {
    pub layout: bool,
    /// Move attachers along with the resized host.
    pub attach_support: bool,
}

impl Default for ResizeHints {
    fn default() -> Self {
        Self {
            layout: true,
            attach_support: true,
        }
    }
}

/// Explicit anchors for the connection layouter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutHints {
    pub connection_start: Option<Point>,
    pub connection_end: Option<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionMoveHints {
    /// Translate the `original` anchors together with the docked points.
    pub update_anchors: bool,
}

impl Default for ConnectionMoveHints {
    fn default() -> Self {
        Self {
            update_anchors: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceHints {
    pub move_children: bool,
}

impl Default for ReplaceHints {
    fn default() -> Self {
        Self {
            move_children: true,
        }
    }
}

/// Where `lane.add` puts the new lane. Horizontal pools take `Top` and
/// `Bottom`, vertical pools `Left` and `Right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneLocation {
    Top,
    Bottom,
    Left,
    Right,
}

/// Space tool direction: the side of the opened gap that moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

// ─── Contexts ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ShapeCreateContext {
    pub shape: ElementIndex,
    pub placement: Placement,
    pub parent: ElementIndex,
    pub parent_index: Option<usize>,
    pub host: Option<ElementIndex>,
    pub hints: CreateHints,
}

#[derive(Debug, Clone)]
pub struct LabelCreateContext {
    pub label: ElementIndex,
    pub label_target: ElementIndex,
    pub placement: Placement,
    pub parent: Option<ElementIndex>,
    pub parent_index: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ShapeDeleteContext {
    pub shape: ElementIndex,
    /// Deleted together with its parent.
    pub nested: bool,
    pub old_parent: Option<ElementIndex>,
    pub old_parent_index: Option<usize>,
    pub old_host: Option<ElementIndex>,
    pub old_host_index: Option<usize>,
    pub old_label_target: Option<ElementIndex>,
}

#[derive(Debug, Clone)]
pub struct ShapeMoveContext {
    pub shape: ElementIndex,
    pub delta: bpmn_core::Delta,
    pub new_parent: Option<ElementIndex>,
    pub new_parent_index: Option<usize>,
    pub hints: MoveHints,
    pub old_parent: Option<ElementIndex>,
    pub old_parent_index: Option<usize>,
    pub old_bounds: Option<Bounds>,
}

#[derive(Debug, Clone)]
pub struct ShapeResizeContext {
    pub shape: ElementIndex,
    pub new_bounds: Bounds,
    pub hints: ResizeHints,
    pub old_bounds: Option<Bounds>,
}

#[derive(Debug, Clone)]
pub struct ShapeReplaceContext {
    pub old_shape: ElementIndex,
    pub new_data: ShapeAttrs,
    pub hints: ReplaceHints,
    pub new_shape: Option<ElementIndex>,
}

#[derive(Debug, Clone)]
pub struct ConnectionCreateContext {
    pub connection: ElementIndex,
    pub source: ElementIndex,
    pub target: ElementIndex,
    pub parent: ElementIndex,
    pub parent_index: Option<usize>,
    pub hints: LayoutHints,
}

#[derive(Debug, Clone)]
pub struct ConnectionDeleteContext {
    pub connection: ElementIndex,
    pub old_parent: Option<ElementIndex>,
    pub old_parent_index: Option<usize>,
    pub old_source: Option<ElementIndex>,
    pub old_target: Option<ElementIndex>,
    /// Positions in the old source's `outgoing` and old target's `incoming`.
    pub old_source_index: Option<usize>,
    pub old_target_index: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ConnectionMoveContext {
    pub connection: ElementIndex,
    pub delta: bpmn_core::Delta,
    pub new_parent: Option<ElementIndex>,
    pub new_parent_index: Option<usize>,
    pub hints: ConnectionMoveHints,
    pub old_parent: Option<ElementIndex>,
    pub old_parent_index: Option<usize>,
    pub old_waypoints: Option<Waypoints>,
}

#[derive(Debug, Clone)]
pub struct ConnectionLayoutContext {
    pub connection: ElementIndex,
    pub hints: LayoutHints,
    pub old_waypoints: Option<Waypoints>,
}

#[derive(Debug, Clone)]
pub struct ConnectionUpdateWaypointsContext {
    pub connection: ElementIndex,
    pub new_waypoints: Waypoints,
    pub old_waypoints: Option<Waypoints>,
}

#[derive(Debug, Clone)]
pub struct ConnectionReconnectContext {
    pub connection: ElementIndex,
    pub new_source: ElementIndex,
    pub new_target: ElementIndex,
    /// Explicit waypoints; laid out when `None`.
    pub waypoints: Option<Waypoints>,
    pub hints: LayoutHints,
    pub old_source: Option<ElementIndex>,
    pub old_target: Option<ElementIndex>,
    pub old_source_index: Option<usize>,
    pub old_target_index: Option<usize>,
    pub old_waypoints: Option<Waypoints>,
    /// Condition removed because the new source cannot carry one.
    pub old_condition_expression: Value,
    /// Business object whose `default` pointed at this flow before reconnecting.
    pub old_default_owner: Option<ObjectIndex>,
}

#[derive(Debug, Clone)]
pub struct ElementsMoveContext {
    pub shapes: Vec<ElementIndex>,
    pub delta: bpmn_core::Delta,
    pub new_parent: Option<ElementIndex>,
    pub new_host: Option<ElementIndex>,
    pub primary_shape: Option<ElementIndex>,
    pub closure: MoveClosure,
}

#[derive(Debug, Clone)]
pub struct ElementsCreateContext {
    pub elements: Vec<ElementIndex>,
    pub position: Point,
    pub parent: ElementIndex,
    pub created: Vec<ElementIndex>,
}

#[derive(Debug, Clone)]
pub struct ElementsDeleteContext {
    pub elements: Vec<ElementIndex>,
}

#[derive(Debug, Clone)]
pub struct UpdateAttachmentContext {
    pub shape: ElementIndex,
    pub new_host: Option<ElementIndex>,
    pub old_host: Option<ElementIndex>,
    pub old_attacher_index: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct UpdateParentContext {
    pub element: ElementIndex,
    pub new_parent: ElementIndex,
    pub new_parent_index: Option<usize>,
    pub old_parent: Option<ElementIndex>,
    pub old_parent_index: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct UpdateLabelContext {
    pub element: ElementIndex,
    pub new_label: Option<String>,
    pub new_bounds: Option<Bounds>,
    pub old_label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdatePropertiesContext {
    pub element: ElementIndex,
    pub properties: BTreeMap<String, Value>,
    pub old_properties: BTreeMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct UpdateModdlePropertiesContext {
    pub element: ElementIndex,
    pub moddle_element: ObjectIndex,
    pub properties: BTreeMap<String, Value>,
    pub old_properties: BTreeMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct UpdateSemanticParentContext {
    pub element: ElementIndex,
    pub new_semantic_parent: ObjectIndex,
    pub new_di_parent: Option<DiIndex>,
    pub old_semantic_parent: Option<ObjectIndex>,
    pub old_di_parent: Option<DiIndex>,
}

#[derive(Debug, Clone)]
pub struct SetColorContext {
    pub elements: Vec<ElementIndex>,
    pub colors: DiColor,
    pub old_colors: Vec<DiColor>,
}

#[derive(Debug, Clone)]
pub struct LaneAddContext {
    pub shape: ElementIndex,
    pub location: LaneLocation,
    pub new_lane: Option<ElementIndex>,
}

#[derive(Debug, Clone)]
pub struct LaneSplitContext {
    pub shape: ElementIndex,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct LaneResizeContext {
    pub shape: ElementIndex,
    pub new_bounds: Bounds,
    pub balanced: bool,
}

#[derive(Debug, Clone)]
pub struct LaneUpdateRefsContext {
    pub flow_nodes: Vec<ElementIndex>,
    pub lanes: Vec<ElementIndex>,
    pub updates: Vec<FlowNodeRefUpdate>,
}

#[derive(Debug, Clone)]
pub struct IdClaimContext {
    pub id: ElementId,
    pub element: ObjectIndex,
}

#[derive(Debug, Clone)]
pub struct CanvasUpdateRootContext {
    pub new_root: ElementIndex,
    pub old_root: Option<ElementIndex>,
}

#[derive(Debug, Clone)]
pub struct SpaceToolContext {
    pub moving_shapes: Vec<ElementIndex>,
    pub resizing_shapes: Vec<ElementIndex>,
    pub delta: bpmn_core::Delta,
    pub direction: Direction,
    pub start: f64,
}

// ─── Constructors ────────────────────────────────────────────────────────

impl ShapeDeleteContext {
    pub fn new(shape: ElementIndex) -> Self {
        Self {
            shape,
            nested: false,
            old_parent: None,
            old_parent_index: None,
            old_host: None,
            old_host_index: None,
            old_label_target: None,
        }
    }
}

impl ShapeMoveContext {
    pub fn new(shape: ElementIndex, delta: bpmn_core::Delta) -> Self {
        Self {
            shape,
            delta,
            new_parent: None,
            new_parent_index: None,
            hints: MoveHints::default(),
            old_parent: None,
            old_parent_index: None,
            old_bounds: None,
        }
    }
}

impl ShapeResizeContext {
    pub fn new(shape: ElementIndex, new_bounds: Bounds) -> Self {
        Self {
            shape,
            new_bounds,
            hints: ResizeHints::default(),
            old_bounds: None,
        }
    }
}

impl ConnectionDeleteContext {
    pub fn new(connection: ElementIndex) -> Self {
        Self {
            connection,
            old_parent: None,
            old_parent_index: None,
            old_source: None,
            old_target: None,
            old_source_index: None,
            old_target_index: None,
        }
    }
}

impl ConnectionMoveContext {
    pub fn new(connection: ElementIndex, delta: bpmn_core::Delta) -> Self {
        Self {
            connection,
            delta,
            new_parent: None,
            new_parent_index: None,
            hints: ConnectionMoveHints::default(),
            old_parent: None,
            old_parent_index: None,
            old_waypoints: None,
        }
    }
}

impl ConnectionLayoutContext {
    pub fn new(connection: ElementIndex, hints: LayoutHints) -> Self {
        Self {
            connection,
            hints,
            old_waypoints: None,
        }
    }
}

impl ConnectionReconnectContext {
    pub fn new(connection: ElementIndex, new_source: ElementIndex, new_target: ElementIndex) -> Self {
        Self {
            connection,
            new_source,
            new_target,
            waypoints: None,
            hints: LayoutHints::default(),
            old_source: None,
            old_target: None,
            old_source_index: None,
            old_target_index: None,
            old_waypoints: None,
            old_condition_expression: Value::Null,
            old_default_owner: None,
        }
    }
}

impl ElementsMoveContext {
    pub fn new(shapes: Vec<ElementIndex>, delta: bpmn_core::Delta) -> Self {
        Self {
            shapes,
            delta,
            new_parent: None,
            new_host: None,
            primary_shape: None,
            closure: MoveClosure::default(),
        }
    }
}

impl UpdateAttachmentContext {
    pub fn new(shape: ElementIndex, new_host: Option<ElementIndex>) -> Self {
        Self {
            shape,
            new_host,
            old_host: None,
            old_attacher_index: None,
        }
    }
}

impl UpdateParentContext {
    pub fn new(element: ElementIndex, new_parent: ElementIndex) -> Self {
        Self {
            element,
            new_parent,
            new_parent_index: None,
            old_parent: None,
            old_parent_index: None,
        }
    }
}

impl UpdatePropertiesContext {
    pub fn new(element: ElementIndex, properties: BTreeMap<String, Value>) -> Self {
        Self {
            element,
            properties,
            old_properties: BTreeMap::new(),
        }
    }
}

macro_rules! command_contexts {
    (
        $($variant:ident($ty:ty)),* $(,)?;
        shared { $($shared:ident($shared_ty:ty)),* $(,)? }
    ) => {
        /// A command together with its payload.
        #[derive(Debug, Clone)]
        pub enum CommandContext {
            $($variant($ty),)*
            $($shared($shared_ty),)*
        }

        impl CommandContext {
            pub fn kind(&self) -> CommandKind {
                match self {
                    $(CommandContext::$variant(_) => CommandKind::$variant,)*
                    $(CommandContext::$shared(_) => CommandKind::$shared,)*
                }
            }
        }

        $(
            impl From<$ty> for CommandContext {
                fn from(ctx: $ty) -> Self {
                    CommandContext::$variant(ctx)
                }
            }
        )*
    };
}

command_contexts! {
    ShapeCreate(ShapeCreateContext),
    ShapeDelete(ShapeDeleteContext),
    ShapeMove(ShapeMoveContext),
    ShapeResize(ShapeResizeContext),
    ShapeReplace(ShapeReplaceContext),
    LabelCreate(LabelCreateContext),
    ConnectionCreate(ConnectionCreateContext),
    ConnectionDelete(ConnectionDeleteContext),
    ConnectionMove(ConnectionMoveContext),
    ConnectionLayout(ConnectionLayoutContext),
    ConnectionUpdateWaypoints(ConnectionUpdateWaypointsContext),
    ConnectionReconnect(ConnectionReconnectContext),
    ElementsMove(ElementsMoveContext),
    ElementsCreate(ElementsCreateContext),
    ElementsDelete(ElementsDeleteContext),
    ElementUpdateAttachment(UpdateAttachmentContext),
    ElementUpdateParent(UpdateParentContext),
    ElementUpdateLabel(UpdateLabelContext),
    ElementUpdateProperties(UpdatePropertiesContext),
    ElementUpdateModdleProperties(UpdateModdlePropertiesContext),
    ElementUpdateSemanticParent(UpdateSemanticParentContext),
    ElementSetColor(SetColorContext),
    LaneAdd(LaneAddContext),
    LaneSplit(LaneSplitContext),
    LaneResize(LaneResizeContext),
    LaneUpdateRefs(LaneUpdateRefsContext),
    CanvasUpdateRoot(CanvasUpdateRootContext),
    SpaceTool(SpaceToolContext);
    // claim and unclaim share a payload, so they get no `From` impl
    shared {
        IdClaim(IdClaimContext),
        IdUnclaim(IdClaimContext),
    }
}

impl CommandContext {
    pub fn claim_id(id: ElementId, element: ObjectIndex) -> Self {
        CommandContext::IdClaim(IdClaimContext { id, element })
    }

    pub fn unclaim_id(id: ElementId, element: ObjectIndex) -> Self {
        CommandContext::IdUnclaim(IdClaimContext { id, element })
    }

    /// The primary graphical element a command operates on, if any.
    pub fn element(&self) -> Option<ElementIndex> {
        match self {
            CommandContext::ShapeCreate(c) => Some(c.shape),
            CommandContext::ShapeDelete(c) => Some(c.shape),
            CommandContext::ShapeMove(c) => Some(c.shape),
            CommandContext::ShapeResize(c) => Some(c.shape),
            CommandContext::ShapeReplace(c) => Some(c.old_shape),
            CommandContext::LabelCreate(c) => Some(c.label),
            CommandContext::ConnectionCreate(c) => Some(c.connection),
            CommandContext::ConnectionDelete(c) => Some(c.connection),
            CommandContext::ConnectionMove(c) => Some(c.connection),
            CommandContext::ConnectionLayout(c) => Some(c.connection),
            CommandContext::ConnectionUpdateWaypoints(c) => Some(c.connection),
            CommandContext::ConnectionReconnect(c) => Some(c.connection),
            CommandContext::ElementUpdateAttachment(c) => Some(c.shape),
            CommandContext::ElementUpdateParent(c) => Some(c.element),
            CommandContext::ElementUpdateLabel(c) => Some(c.element),
            CommandContext::ElementUpdateProperties(c) => Some(c.element),
            CommandContext::ElementUpdateModdleProperties(c) => Some(c.element),
            CommandContext::ElementUpdateSemanticParent(c) => Some(c.element),
            CommandContext::LaneAdd(c) => Some(c.shape),
            CommandContext::LaneSplit(c) => Some(c.shape),
            CommandContext::LaneResize(c) => Some(c.shape),
            CommandContext::CanvasUpdateRoot(c) => Some(c.new_root),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_roundtrip() {
        for kind in CommandKind::ALL {
            assert_eq!(kind.name().parse::<CommandKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn unknown_command_name_is_invalid_argument() {
        assert!(matches!(
            "shape.explode".parse::<CommandKind>(),
            Err(ModelingError::InvalidArgument(_))
        ));
    }
}
