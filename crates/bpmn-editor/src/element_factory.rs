//! Creates graphical elements together with their business and DI objects.
//!
//! Created elements are allocated but not yet on the canvas; adding them is
//! the job of the create commands.

use bpmn_core::{
    Bounds, BpmnType, DiIndex, DiKind, DiObject, Element, ElementId, ElementIndex, ObjectIndex,
    Point, props,
};

use crate::error::ModelingError;
use crate::modeler::Modeler;

/// Attributes of a shape to create.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeAttrs {
    pub bpmn_type: BpmnType,
    /// Explicit id; generated from the type when absent.
    pub id: Option<String>,
    /// Reuse an existing business object instead of creating one.
    pub business_object: Option<ObjectIndex>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Sub-processes and participants. Defaults to expanded participants
    /// and collapsed sub-processes.
    pub is_expanded: Option<bool>,
    /// Participants and lanes. Defaults to horizontal.
    pub is_horizontal: Option<bool>,
    pub name: Option<String>,
}

impl ShapeAttrs {
    pub fn new(bpmn_type: BpmnType) -> Self {
        Self {
            bpmn_type,
            id: None,
            business_object: None,
            width: None,
            height: None,
            is_expanded: None,
            is_horizontal: None,
            name: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        self.is_expanded = Some(expanded);
        self
    }

    pub fn horizontal(mut self, horizontal: bool) -> Self {
        self.is_horizontal = Some(horizontal);
        self
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    fn is_expanded(&self) -> bool {
        match self.bpmn_type {
            BpmnType::Participant => self.is_expanded.unwrap_or(true),
            t if t.is_sub_process() => self.is_expanded.unwrap_or(false),
            _ => false,
        }
    }
}

impl From<BpmnType> for ShapeAttrs {
    fn from(bpmn_type: BpmnType) -> Self {
        Self::new(bpmn_type)
    }
}

/// Attributes of a connection to create.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionAttrs {
    pub bpmn_type: BpmnType,
    pub id: Option<String>,
    pub business_object: Option<ObjectIndex>,
    /// Laid out on creation when absent.
    pub waypoints: Option<Vec<Point>>,
}

impl ConnectionAttrs {
    pub fn new(bpmn_type: BpmnType) -> Self {
        Self {
            bpmn_type,
            id: None,
            business_object: None,
            waypoints: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_waypoints(mut self, waypoints: impl IntoIterator<Item = Point>) -> Self {
        self.waypoints = Some(waypoints.into_iter().collect());
        self
    }
}

impl From<BpmnType> for ConnectionAttrs {
    fn from(bpmn_type: BpmnType) -> Self {
        Self::new(bpmn_type)
    }
}

/// Default size of a shape of the given type.
pub fn default_size(bpmn_type: BpmnType, expanded: bool) -> (f64, f64) {
    match bpmn_type {
        t if t.is_sub_process() && expanded => (350.0, 200.0),
        t if t.is_activity() => (100.0, 80.0),
        t if t.is_gateway() => (50.0, 50.0),
        t if t.is_event() => (36.0, 36.0),
        BpmnType::Participant if expanded => (600.0, 250.0),
        BpmnType::Participant => (400.0, 60.0),
        BpmnType::Lane => (400.0, 100.0),
        BpmnType::DataObjectReference => (36.0, 50.0),
        BpmnType::DataStoreReference => (50.0, 50.0),
        BpmnType::TextAnnotation => (100.0, 30.0),
        BpmnType::Group => (300.0, 300.0),
        _ => (100.0, 80.0),
    }
}

pub struct ElementFactory<'a> {
    modeler: &'a mut Modeler,
}

impl<'a> ElementFactory<'a> {
    pub fn new(modeler: &'a mut Modeler) -> Self {
        Self { modeler }
    }

    /// Create a shape, its business object and its DI shape.
    ///
    /// # Errors
    /// Returns [`ModelingError::IdConflict`] if an explicit id is taken.
    pub fn create_shape(&mut self, attrs: &ShapeAttrs) -> Result<ElementIndex, ModelingError> {
        let expanded = attrs.is_expanded();
        let bo = match attrs.business_object {
            Some(bo) => bo,
            None => self.create_business_object(attrs.bpmn_type, attrs.id.as_deref())?,
        };
        let bpmn_type = self.modeler.moddle.type_of(bo);

        if let Some(name) = &attrs.name {
            self.modeler
                .moddle
                .get_mut(bo)
                .set(props::NAME, name.as_str().into());
        }
        self.ensure_companions(bo, bpmn_type)?;

        let horizontal = attrs.is_horizontal.unwrap_or(true);
        let lane_like = matches!(bpmn_type, BpmnType::Participant | BpmnType::Lane);
        let (default_width, default_height) = match default_size(bpmn_type, expanded) {
            (w, h) if lane_like && !horizontal => (h, w),
            size => size,
        };
        let bounds = Bounds::new(
            0.0,
            0.0,
            attrs.width.unwrap_or(default_width),
            attrs.height.unwrap_or(default_height),
        );

        let di = self.ensure_di(bo, DiKind::Shape);
        let di_object = self.modeler.moddle.di_mut(di);
        di_object.bounds = Some(bounds);
        if bpmn_type.is_sub_process() || bpmn_type == BpmnType::Participant {
            di_object.is_expanded = Some(expanded);
        }
        if lane_like {
            di_object.is_horizontal = Some(horizontal);
        }

        let id = self.modeler.moddle.get(bo).id;
        let element = Element {
            business_object: Some(bo),
            collapsed: bpmn_type.is_sub_process() && !expanded,
            is_frame: expanded,
            ..Element::shape(id, bounds)
        };
        Ok(self.modeler.canvas.create(element))
    }

    /// Create a connection, its business object and its DI edge.
    ///
    /// # Errors
    /// Returns [`ModelingError::IdConflict`] if an explicit id is taken.
    pub fn create_connection(
        &mut self,
        attrs: &ConnectionAttrs,
    ) -> Result<ElementIndex, ModelingError> {
        let bo = match attrs.business_object {
            Some(bo) => bo,
            None => self.create_business_object(attrs.bpmn_type, attrs.id.as_deref())?,
        };
        self.ensure_di(bo, DiKind::Edge);

        let id = self.modeler.moddle.get(bo).id;
        let waypoints = attrs.waypoints.clone().unwrap_or_default();
        let element = Element {
            business_object: Some(bo),
            ..Element::connection(id, waypoints)
        };
        Ok(self.modeler.canvas.create(element))
    }

    /// Create the external label element of `target`. The label shares the
    /// target's business object.
    pub fn create_label(&mut self, target: ElementIndex) -> ElementIndex {
        let target_element = self.modeler.canvas.get(target);
        let id = target_element.id.label_id();
        let bo = target_element.business_object;
        let size = Bounds::new(
            0.0,
            0.0,
            self.modeler.config.external_label_width,
            self.modeler.config.external_label_height,
        );
        self.modeler.canvas.create(Element {
            business_object: bo,
            ..Element::label(id, size)
        })
    }

    /// Create a root element (process or collaboration) with a fresh
    /// business object. The root is not drawn until it becomes the canvas root.
    ///
    /// # Errors
    /// Returns [`ModelingError::InvalidArgument`] for non-root types.
    pub fn create_root(&mut self, bpmn_type: BpmnType) -> Result<ElementIndex, ModelingError> {
        if !matches!(bpmn_type, BpmnType::Process | BpmnType::Collaboration) {
            return Err(ModelingError::InvalidArgument(format!(
                "{} cannot be a root element",
                bpmn_type.name()
            )));
        }
        let bo = self.create_business_object(bpmn_type, None)?;
        let id = self.modeler.moddle.get(bo).id;
        Ok(self.modeler.canvas.create(Element {
            business_object: Some(bo),
            ..Element::root(id)
        }))
    }

    /// Create a business object, claiming its id.
    ///
    /// # Errors
    /// Returns [`ModelingError::IdConflict`] if `id` is taken.
    pub fn create_business_object(
        &mut self,
        bpmn_type: BpmnType,
        id: Option<&str>,
    ) -> Result<ObjectIndex, ModelingError> {
        let moddle = &mut self.modeler.moddle;
        let id = match id {
            Some(id) => {
                let id = ElementId::intern(id);
                moddle.ids.claim(id, id)?;
                id
            }
            None => moddle.ids.next_prefixed(bpmn_type.id_prefix(), None),
        };
        Ok(moddle.create(bpmn_type, id))
    }

    /// Participants own a process; data object references point to a data object.
    fn ensure_companions(&mut self, bo: ObjectIndex, bpmn_type: BpmnType) -> Result<(), ModelingError> {
        let companion = match bpmn_type {
            BpmnType::Participant => (props::PROCESS_REF, BpmnType::Process),
            BpmnType::DataObjectReference => (props::DATA_OBJECT_REF, BpmnType::DataObject),
            _ => return Ok(()),
        };
        if self.modeler.moddle.get(bo).get_ref(companion.0).is_some() {
            return Ok(());
        }
        let created = self.create_business_object(companion.1, None)?;
        self.modeler
            .moddle
            .get_mut(bo)
            .set(companion.0, created.into());
        Ok(())
    }

    fn ensure_di(&mut self, bo: ObjectIndex, kind: DiKind) -> DiIndex {
        if let Some(di) = self.modeler.moddle.di_of(bo) {
            return di;
        }
        let id = self.modeler.moddle.get(bo).id.di_id();
        let di = self.modeler.moddle.create_di(DiObject::new(id, kind, Some(bo)));
        self.modeler.moddle.link_di(bo, di);
        di
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelerConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn shapes_get_default_sizes_and_di() {
        let mut modeler = Modeler::bare(ModelerConfig::default());
        let task = modeler
            .element_factory()
            .create_shape(&ShapeAttrs::new(BpmnType::Task))
            .unwrap();
        let element = modeler.canvas.get(task);
        assert_eq!(element.bounds, Bounds::new(0.0, 0.0, 100.0, 80.0));
        assert!(element.id.as_str().starts_with("Activity_"));

        let bo = element.business_object.unwrap();
        let di = modeler.moddle.di_of(bo).unwrap();
        assert_eq!(modeler.moddle.di(di).bounds, Some(element.bounds));
        // not yet on the canvas
        assert!(!modeler.canvas.contains(task));
    }

    #[test]
    fn participants_own_a_process() {
        let mut modeler = Modeler::bare(ModelerConfig::default());
        let participant = modeler
            .element_factory()
            .create_shape(&ShapeAttrs::new(BpmnType::Participant))
            .unwrap();
        let bo = modeler.bo(participant).unwrap();
        let process = modeler.moddle.get(bo).get_ref(props::PROCESS_REF).unwrap();
        assert_eq!(modeler.moddle.type_of(process), BpmnType::Process);
        assert_eq!(modeler.canvas.get(participant).bounds.width, 600.0);
    }

    #[test]
    fn vertical_participants_swap_their_default_size() {
        let mut modeler = Modeler::bare(ModelerConfig::default());
        let participant = modeler
            .element_factory()
            .create_shape(&ShapeAttrs::new(BpmnType::Participant).horizontal(false))
            .unwrap();
        let element = modeler.canvas.get(participant);
        assert_eq!(element.bounds, Bounds::new(0.0, 0.0, 250.0, 600.0));
        let di = modeler.moddle.di_of(element.business_object.unwrap()).unwrap();
        assert_eq!(modeler.moddle.di(di).is_horizontal, Some(false));
    }

    #[test]
    fn explicit_ids_are_claimed() {
        let mut modeler = Modeler::bare(ModelerConfig::default());
        let attrs = ShapeAttrs::new(BpmnType::Task).with_id("Task_explicit");
        modeler.element_factory().create_shape(&attrs).unwrap();
        assert!(matches!(
            modeler.element_factory().create_shape(&attrs),
            Err(ModelingError::IdConflict(_))
        ));
    }
}
