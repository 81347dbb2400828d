pub mod canvas;
pub mod di;
pub mod error;
pub mod geometry;
pub mod id;
pub mod model;
pub mod moddle;

pub use canvas::{Canvas, DiagramSnapshot, ElementSnapshot};
pub use di::{DiColor, DiIndex, DiKind, DiLabel, DiObject};
pub use error::CoreError;
pub use geometry::{Bounds, Delta, Orientation, Point, Trbl};
pub use id::{ElementId, IdRegistry};
pub use model::{Element, ElementIndex, ElementKind, Waypoint, Waypoints};
pub use moddle::{BpmnType, BusinessObject, Moddle, ObjectIndex, Value, props};
