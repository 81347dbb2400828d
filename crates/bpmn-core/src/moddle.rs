//! BPMN business objects.
//!
//! Business objects form the semantic tree of a BPMN document. They are
//! stored in an arena and addressed by [`ObjectIndex`]; ids are plain
//! properties so that renaming an object never invalidates references.
//! Containment is expressed by list-valued properties (`flowElements`,
//! `lanes`, `artifacts`, …) plus the `$parent` back-pointer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::di::{DiIndex, DiKind, DiObject};
use crate::id::{ElementId, IdRegistry};

/// Well-known property names.
pub mod props {
    pub const NAME: &str = "name";
    pub const DEFAULT: &str = "default";
    pub const CONDITION_EXPRESSION: &str = "conditionExpression";
    pub const SOURCE_REF: &str = "sourceRef";
    pub const TARGET_REF: &str = "targetRef";
    pub const INCOMING: &str = "incoming";
    pub const OUTGOING: &str = "outgoing";
    pub const FLOW_ELEMENTS: &str = "flowElements";
    pub const ARTIFACTS: &str = "artifacts";
    pub const LANE_SETS: &str = "laneSets";
    pub const LANES: &str = "lanes";
    pub const CHILD_LANE_SET: &str = "childLaneSet";
    pub const FLOW_NODE_REF: &str = "flowNodeRef";
    pub const PARTICIPANTS: &str = "participants";
    pub const MESSAGE_FLOWS: &str = "messageFlows";
    pub const ROOT_ELEMENTS: &str = "rootElements";
    pub const PROCESS_REF: &str = "processRef";
    pub const DATA_OBJECT_REF: &str = "dataObjectRef";
    pub const DATA_STORE_REF: &str = "dataStoreRef";
    pub const ATTACHED_TO_REF: &str = "attachedToRef";
    pub const CATEGORY_VALUE_REF: &str = "categoryValueRef";
    pub const CATEGORY_VALUE: &str = "categoryValue";
    pub const VALUE: &str = "value";
    pub const DATA_INPUT_ASSOCIATIONS: &str = "dataInputAssociations";
    pub const DATA_OUTPUT_ASSOCIATIONS: &str = "dataOutputAssociations";
    pub const TRIGGERED_BY_EVENT: &str = "triggeredByEvent";
    pub const CANCEL_ACTIVITY: &str = "cancelActivity";
    pub const TEXT: &str = "text";
}

/// Arena handle of a business object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectIndex(u32);

impl ObjectIndex {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The `$type` of a business object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BpmnType {
    Definitions,
    Process,
    Collaboration,
    Participant,
    LaneSet,
    Lane,
    SubProcess,
    Transaction,
    AdHocSubProcess,
    Task,
    UserTask,
    ServiceTask,
    ScriptTask,
    ManualTask,
    SendTask,
    ReceiveTask,
    BusinessRuleTask,
    CallActivity,
    StartEvent,
    EndEvent,
    IntermediateThrowEvent,
    IntermediateCatchEvent,
    BoundaryEvent,
    ExclusiveGateway,
    InclusiveGateway,
    ParallelGateway,
    ComplexGateway,
    EventBasedGateway,
    SequenceFlow,
    MessageFlow,
    Association,
    DataInputAssociation,
    DataOutputAssociation,
    DataObject,
    DataObjectReference,
    DataStoreReference,
    DataInput,
    DataOutput,
    TextAnnotation,
    Group,
    Category,
    CategoryValue,
    FormalExpression,
}

impl BpmnType {
    /// The qualified type name, e.g. `bpmn:Task`.
    pub fn name(self) -> &'static str {
        match self {
            BpmnType::Definitions => "bpmn:Definitions",
            BpmnType::Process => "bpmn:Process",
            BpmnType::Collaboration => "bpmn:Collaboration",
            BpmnType::Participant => "bpmn:Participant",
            BpmnType::LaneSet => "bpmn:LaneSet",
            BpmnType::Lane => "bpmn:Lane",
            BpmnType::SubProcess => "bpmn:SubProcess",
            BpmnType::Transaction => "bpmn:Transaction",
            BpmnType::AdHocSubProcess => "bpmn:AdHocSubProcess",
            BpmnType::Task => "bpmn:Task",
            BpmnType::UserTask => "bpmn:UserTask",
            BpmnType::ServiceTask => "bpmn:ServiceTask",
            BpmnType::ScriptTask => "bpmn:ScriptTask",
            BpmnType::ManualTask => "bpmn:ManualTask",
            BpmnType::SendTask => "bpmn:SendTask",
            BpmnType::ReceiveTask => "bpmn:ReceiveTask",
            BpmnType::BusinessRuleTask => "bpmn:BusinessRuleTask",
            BpmnType::CallActivity => "bpmn:CallActivity",
            BpmnType::StartEvent => "bpmn:StartEvent",
            BpmnType::EndEvent => "bpmn:EndEvent",
            BpmnType::IntermediateThrowEvent => "bpmn:IntermediateThrowEvent",
            BpmnType::IntermediateCatchEvent => "bpmn:IntermediateCatchEvent",
            BpmnType::BoundaryEvent => "bpmn:BoundaryEvent",
            BpmnType::ExclusiveGateway => "bpmn:ExclusiveGateway",
            BpmnType::InclusiveGateway => "bpmn:InclusiveGateway",
            BpmnType::ParallelGateway => "bpmn:ParallelGateway",
            BpmnType::ComplexGateway => "bpmn:ComplexGateway",
            BpmnType::EventBasedGateway => "bpmn:EventBasedGateway",
            BpmnType::SequenceFlow => "bpmn:SequenceFlow",
            BpmnType::MessageFlow => "bpmn:MessageFlow",
            BpmnType::Association => "bpmn:Association",
            BpmnType::DataInputAssociation => "bpmn:DataInputAssociation",
            BpmnType::DataOutputAssociation => "bpmn:DataOutputAssociation",
            BpmnType::DataObject => "bpmn:DataObject",
            BpmnType::DataObjectReference => "bpmn:DataObjectReference",
            BpmnType::DataStoreReference => "bpmn:DataStoreReference",
            BpmnType::DataInput => "bpmn:DataInput",
            BpmnType::DataOutput => "bpmn:DataOutput",
            BpmnType::TextAnnotation => "bpmn:TextAnnotation",
            BpmnType::Group => "bpmn:Group",
            BpmnType::Category => "bpmn:Category",
            BpmnType::CategoryValue => "bpmn:CategoryValue",
            BpmnType::FormalExpression => "bpmn:FormalExpression",
        }
    }

    /// Prefix used when generating ids for new objects of this type.
    pub fn id_prefix(self) -> &'static str {
        if self.is_activity() {
            "Activity"
        } else if self.is_event() {
            "Event"
        } else if self.is_gateway() {
            "Gateway"
        } else if self.is_connection() {
            "Flow"
        } else {
            match self {
                BpmnType::Definitions => "Definitions",
                BpmnType::Process => "Process",
                BpmnType::Collaboration => "Collaboration",
                BpmnType::Participant => "Participant",
                BpmnType::LaneSet => "LaneSet",
                BpmnType::Lane => "Lane",
                BpmnType::DataObject => "DataObject",
                BpmnType::DataObjectReference => "DataObjectReference",
                BpmnType::DataStoreReference => "DataStoreReference",
                BpmnType::TextAnnotation => "TextAnnotation",
                BpmnType::Group => "Group",
                BpmnType::Category => "Category",
                BpmnType::CategoryValue => "CategoryValue",
                _ => "Element",
            }
        }
    }

    pub fn is_sub_process(self) -> bool {
        matches!(
            self,
            BpmnType::SubProcess | BpmnType::Transaction | BpmnType::AdHocSubProcess
        )
    }

    pub fn is_task(self) -> bool {
        matches!(
            self,
            BpmnType::Task
                | BpmnType::UserTask
                | BpmnType::ServiceTask
                | BpmnType::ScriptTask
                | BpmnType::ManualTask
                | BpmnType::SendTask
                | BpmnType::ReceiveTask
                | BpmnType::BusinessRuleTask
        )
    }

    pub fn is_activity(self) -> bool {
        self.is_task() || self.is_sub_process() || self == BpmnType::CallActivity
    }

    pub fn is_event(self) -> bool {
        matches!(
            self,
            BpmnType::StartEvent
                | BpmnType::EndEvent
                | BpmnType::IntermediateThrowEvent
                | BpmnType::IntermediateCatchEvent
                | BpmnType::BoundaryEvent
        )
    }

    pub fn is_gateway(self) -> bool {
        matches!(
            self,
            BpmnType::ExclusiveGateway
                | BpmnType::InclusiveGateway
                | BpmnType::ParallelGateway
                | BpmnType::ComplexGateway
                | BpmnType::EventBasedGateway
        )
    }

    pub fn is_flow_node(self) -> bool {
        self.is_activity() || self.is_event() || self.is_gateway()
    }

    /// Everything that lives in a `flowElements` collection.
    pub fn is_flow_element(self) -> bool {
        self.is_flow_node()
            || matches!(
                self,
                BpmnType::SequenceFlow
                    | BpmnType::DataObject
                    | BpmnType::DataObjectReference
                    | BpmnType::DataStoreReference
            )
    }

    pub fn is_artifact(self) -> bool {
        matches!(
            self,
            BpmnType::TextAnnotation | BpmnType::Group | BpmnType::Association
        )
    }

    pub fn is_connection(self) -> bool {
        matches!(
            self,
            BpmnType::SequenceFlow
                | BpmnType::MessageFlow
                | BpmnType::Association
                | BpmnType::DataInputAssociation
                | BpmnType::DataOutputAssociation
        )
    }

    /// Activities that may carry a condition on outgoing sequence flows.
    pub fn supports_conditional_outgoing(self) -> bool {
        self.is_activity()
            || matches!(
                self,
                BpmnType::ExclusiveGateway
                    | BpmnType::InclusiveGateway
                    | BpmnType::ComplexGateway
            )
    }

    /// Activities and gateways may declare a default flow.
    pub fn supports_default_flow(self) -> bool {
        self.supports_conditional_outgoing()
    }
}

/// A property value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Ref(ObjectIndex),
    List(Vec<ObjectIndex>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_ref(&self) -> Option<ObjectIndex> {
        match self {
            Value::Ref(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<ObjectIndex> for Value {
    fn from(r: ObjectIndex) -> Self {
        Value::Ref(r)
    }
}

impl From<Option<ObjectIndex>> for Value {
    fn from(r: Option<ObjectIndex>) -> Self {
        r.map_or(Value::Null, Value::Ref)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// A semantic BPMN element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessObject {
    pub id: ElementId,
    pub bpmn_type: BpmnType,
    /// `$parent`: the containing business object.
    pub parent: Option<ObjectIndex>,
    /// The DI object rendering this element, if it is drawn.
    pub di: Option<DiIndex>,
    properties: BTreeMap<String, Value>,
}

impl BusinessObject {
    pub fn new(id: ElementId, bpmn_type: BpmnType) -> Self {
        Self {
            id,
            bpmn_type,
            parent: None,
            di: None,
            properties: BTreeMap::new(),
        }
    }

    /// Read a property; missing properties read as [`Value::Null`].
    pub fn get(&self, name: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.properties.get(name).unwrap_or(&NULL)
    }

    /// Write a property, returning the previous value.
    pub fn set(&mut self, name: &str, value: Value) -> Value {
        if value.is_null() {
            self.properties.remove(name).unwrap_or_default()
        } else {
            self.properties
                .insert(name.to_string(), value)
                .unwrap_or_default()
        }
    }

    pub fn get_ref(&self, name: &str) -> Option<ObjectIndex> {
        self.get(name).as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.get(props::NAME).as_str()
    }

    /// A list-valued property; missing lists read as empty.
    pub fn list(&self, name: &str) -> &[ObjectIndex] {
        match self.properties.get(name) {
            Some(Value::List(items)) => items,
            _ => &[],
        }
    }

    fn list_mut(&mut self, name: &str) -> &mut Vec<ObjectIndex> {
        let slot = self
            .properties
            .entry(name.to_string())
            .or_insert_with(|| Value::List(Vec::new()));
        if !matches!(slot, Value::List(_)) {
            *slot = Value::List(Vec::new());
        }
        match slot {
            Value::List(items) => items,
            _ => unreachable!("slot normalized to a list above"),
        }
    }

    pub fn is(&self, bpmn_type: BpmnType) -> bool {
        self.bpmn_type == bpmn_type
    }
}

// ─── Store ───────────────────────────────────────────────────────────────

/// Arena of business objects and DI objects plus the shared id registry.
///
/// Objects are never freed: a deleted element's business object simply
/// loses its `$parent` so revert can reattach the same instance.
#[derive(Debug, Clone)]
pub struct Moddle {
    objects: Vec<BusinessObject>,
    di: Vec<DiObject>,
    pub ids: IdRegistry,
    pub definitions: ObjectIndex,
    pub plane: DiIndex,
}

impl Moddle {
    /// A fresh document with a `Definitions` root and one BPMN plane.
    pub fn new() -> Self {
        let mut moddle = Self {
            objects: Vec::new(),
            di: Vec::new(),
            ids: IdRegistry::new(),
            definitions: ObjectIndex(0),
            plane: DiIndex::new(0),
        };
        let def_id = ElementId::intern("Definitions_1");
        moddle.definitions = moddle.create(BpmnType::Definitions, def_id);
        // fresh registry, the claim cannot conflict
        let _ = moddle.ids.claim(def_id, def_id);
        moddle.plane = moddle.create_di(DiObject::new(
            ElementId::intern("BPMNPlane_1"),
            DiKind::Plane,
            None,
        ));
        moddle
    }

    /// Allocate a business object. Id claiming is left to the caller.
    pub fn create(&mut self, bpmn_type: BpmnType, id: ElementId) -> ObjectIndex {
        let idx = ObjectIndex(self.objects.len() as u32);
        self.objects.push(BusinessObject::new(id, bpmn_type));
        idx
    }

    pub fn create_di(&mut self, di: DiObject) -> DiIndex {
        let idx = DiIndex::new(self.di.len() as u32);
        self.di.push(di);
        idx
    }

    pub fn get(&self, idx: ObjectIndex) -> &BusinessObject {
        &self.objects[idx.index()]
    }

    pub fn get_mut(&mut self, idx: ObjectIndex) -> &mut BusinessObject {
        &mut self.objects[idx.index()]
    }

    pub fn di(&self, idx: DiIndex) -> &DiObject {
        &self.di[idx.index()]
    }

    pub fn di_mut(&mut self, idx: DiIndex) -> &mut DiObject {
        &mut self.di[idx.index()]
    }

    /// The DI object of a business object, if drawn.
    pub fn di_of(&self, idx: ObjectIndex) -> Option<DiIndex> {
        self.get(idx).di
    }

    /// Bind a DI object to its business object (both directions).
    pub fn link_di(&mut self, bo: ObjectIndex, di: DiIndex) {
        self.get_mut(bo).di = Some(di);
        self.di_mut(di).bpmn_element = Some(bo);
    }

    pub fn find_by_id(&self, id: ElementId) -> Option<ObjectIndex> {
        self.objects
            .iter()
            .position(|o| o.id == id)
            .map(|i| ObjectIndex(i as u32))
    }

    pub fn type_of(&self, idx: ObjectIndex) -> BpmnType {
        self.get(idx).bpmn_type
    }

    pub fn parent_of(&self, idx: ObjectIndex) -> Option<ObjectIndex> {
        self.get(idx).parent
    }

    /// Insert `item` into the list `prop` of `owner`. Already-present items
    /// are left in place. Returns the index the item occupies.
    pub fn add_to(
        &mut self,
        owner: ObjectIndex,
        prop: &str,
        item: ObjectIndex,
        index: Option<usize>,
    ) -> usize {
        let list = self.get_mut(owner).list_mut(prop);
        if let Some(pos) = list.iter().position(|i| *i == item) {
            return pos;
        }
        let at = index.unwrap_or(list.len()).min(list.len());
        list.insert(at, item);
        at
    }

    /// Remove `item` from the list `prop` of `owner`, returning its former index.
    pub fn remove_from(&mut self, owner: ObjectIndex, prop: &str, item: ObjectIndex) -> Option<usize> {
        let list = self.get_mut(owner).list_mut(prop);
        let pos = list.iter().position(|i| *i == item)?;
        list.remove(pos);
        Some(pos)
    }

    pub fn list(&self, owner: ObjectIndex, prop: &str) -> &[ObjectIndex] {
        self.get(owner).list(prop)
    }

    /// Walk `$parent` links until `pred` matches.
    pub fn find_ancestor(
        &self,
        start: ObjectIndex,
        pred: impl Fn(&BusinessObject) -> bool,
    ) -> Option<ObjectIndex> {
        let mut current = Some(start);
        while let Some(idx) = current {
            if pred(self.get(idx)) {
                return Some(idx);
            }
            current = self.get(idx).parent;
        }
        None
    }

    /// Move a DI object under a new DI parent (`planeElement` splice).
    pub fn set_di_parent(&mut self, di: DiIndex, parent: Option<DiIndex>) {
        if let Some(old) = self.di(di).parent {
            self.di_mut(old).plane_elements.retain(|d| *d != di);
        }
        if let Some(new) = parent
            && !self.di(new).plane_elements.contains(&di)
        {
            self.di_mut(new).plane_elements.push(di);
        }
        self.di_mut(di).parent = parent;
    }
}

impl Default for Moddle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_get_set_returns_old_value() {
        let mut moddle = Moddle::new();
        let task = moddle.create(BpmnType::Task, ElementId::intern("Moddle_Task"));

        assert!(moddle.get(task).get(props::NAME).is_null());
        let old = moddle.get_mut(task).set(props::NAME, "Review".into());
        assert!(old.is_null());
        let old = moddle.get_mut(task).set(props::NAME, Value::Null);
        assert_eq!(old, Value::String("Review".into()));
        assert_eq!(moddle.get(task).name(), None);
    }

    #[test]
    fn collection_add_remove_keeps_index() {
        let mut moddle = Moddle::new();
        let process = moddle.create(BpmnType::Process, ElementId::intern("Moddle_P"));
        let a = moddle.create(BpmnType::Task, ElementId::intern("Moddle_A"));
        let b = moddle.create(BpmnType::Task, ElementId::intern("Moddle_B"));

        moddle.add_to(process, props::FLOW_ELEMENTS, a, None);
        moddle.add_to(process, props::FLOW_ELEMENTS, b, None);
        assert_eq!(moddle.remove_from(process, props::FLOW_ELEMENTS, a), Some(0));
        moddle.add_to(process, props::FLOW_ELEMENTS, a, Some(0));
        assert_eq!(moddle.list(process, props::FLOW_ELEMENTS), &[a, b]);

        // adding twice is idempotent
        assert_eq!(moddle.add_to(process, props::FLOW_ELEMENTS, b, None), 1);
        assert_eq!(moddle.list(process, props::FLOW_ELEMENTS).len(), 2);
    }

    #[test]
    fn type_hierarchy() {
        assert!(BpmnType::UserTask.is_flow_node());
        assert!(BpmnType::Transaction.is_sub_process());
        assert!(BpmnType::DataObjectReference.is_flow_element());
        assert!(!BpmnType::DataObjectReference.is_flow_node());
        assert!(BpmnType::Group.is_artifact());
        assert!(!BpmnType::ParallelGateway.supports_default_flow());
        assert_eq!(BpmnType::BoundaryEvent.id_prefix(), "Event");
    }
}
