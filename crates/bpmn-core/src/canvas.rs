//! The canvas: element arena, element registry and relation bookkeeping.
//!
//! Elements are allocated once and never freed. Adding an element to the
//! canvas registers it by id and links it into its parent's children;
//! removing it unregisters and unlinks it but keeps the arena slot, so a
//! command's revert can put back the very same element.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::CoreError;
use crate::geometry::Bounds;
use crate::id::ElementId;
use crate::model::{Element, ElementIndex, ElementKind, Waypoint};

#[derive(Debug, Clone)]
pub struct Canvas {
    elements: Vec<Element>,
    registry: HashMap<ElementId, ElementIndex>,
    root: ElementIndex,
}

impl Canvas {
    /// A canvas with an implicit root element.
    pub fn new() -> Self {
        let mut canvas = Self {
            elements: Vec::new(),
            registry: HashMap::new(),
            root: ElementIndex::new(0),
        };
        let root = canvas.create(Element::root(ElementId::intern("__implicitroot")));
        canvas.registry.insert(canvas.elements[0].id, root);
        canvas.root = root;
        canvas
    }

    /// Allocate an element without adding it to the canvas.
    pub fn create(&mut self, element: Element) -> ElementIndex {
        let idx = ElementIndex::new(self.elements.len() as u32);
        self.elements.push(element);
        idx
    }

    pub fn get(&self, idx: ElementIndex) -> &Element {
        &self.elements[idx.index()]
    }

    pub fn get_mut(&mut self, idx: ElementIndex) -> &mut Element {
        &mut self.elements[idx.index()]
    }

    /// Look up a registered element by id.
    pub fn by_id(&self, id: ElementId) -> Option<ElementIndex> {
        self.registry.get(&id).copied()
    }

    /// Look up a registered element by its string id.
    pub fn find(&self, id: &str) -> Option<ElementIndex> {
        self.by_id(ElementId::intern(id))
    }

    /// Whether the element is currently on the canvas.
    pub fn contains(&self, idx: ElementIndex) -> bool {
        self.registry.get(&self.get(idx).id) == Some(&idx)
    }

    pub fn root(&self) -> ElementIndex {
        self.root
    }

    /// Registered elements matching `pred`, in allocation order.
    pub fn filter(&self, pred: impl Fn(&Element) -> bool) -> Vec<ElementIndex> {
        let mut found: Vec<ElementIndex> = self
            .registry
            .values()
            .copied()
            .filter(|idx| pred(self.get(*idx)))
            .collect();
        found.sort();
        found
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    // ─── Add / remove ────────────────────────────────────────────────────

    /// Add a shape (or label) to the canvas under `parent`.
    pub fn add_shape(
        &mut self,
        idx: ElementIndex,
        parent: ElementIndex,
        index: Option<usize>,
    ) -> Result<(), CoreError> {
        self.add_element(idx, parent, index)
    }

    /// Add a connection to the canvas under `parent`.
    pub fn add_connection(
        &mut self,
        idx: ElementIndex,
        parent: ElementIndex,
        index: Option<usize>,
    ) -> Result<(), CoreError> {
        self.add_element(idx, parent, index)
    }

    fn add_element(
        &mut self,
        idx: ElementIndex,
        parent: ElementIndex,
        index: Option<usize>,
    ) -> Result<(), CoreError> {
        let id = self.get(idx).id;
        if let Some(existing) = self.registry.get(&id)
            && *existing != idx
        {
            return Err(CoreError::DuplicateElement(id));
        }
        self.registry.insert(id, idx);
        self.set_parent(idx, Some(parent), index);
        log::trace!("canvas add {id}");
        Ok(())
    }

    /// Remove an element from the canvas. Returns the parent and the index
    /// it occupied among its siblings.
    pub fn remove(&mut self, idx: ElementIndex) -> Option<(ElementIndex, usize)> {
        let id = self.get(idx).id;
        if self.registry.get(&id) == Some(&idx) {
            self.registry.remove(&id);
        }
        let parent = self.get(idx).parent?;
        let index = self.set_parent(idx, None, None)?;
        log::trace!("canvas remove {id}");
        Some((parent, index))
    }

    /// Replace the canvas root, returning the previous one.
    pub fn set_root_element(&mut self, root: ElementIndex) -> ElementIndex {
        let old = self.root;
        if old == root {
            return old;
        }
        let old_id = self.get(old).id;
        if self.registry.get(&old_id) == Some(&old) {
            self.registry.remove(&old_id);
        }
        self.registry.insert(self.get(root).id, root);
        self.root = root;
        old
    }

    /// Walk up to the root the element belongs to.
    pub fn find_root(&self, idx: ElementIndex) -> ElementIndex {
        let mut current = idx;
        while let Some(parent) = self.get(current).parent {
            current = parent;
        }
        current
    }

    /// Change an element's id, keeping the registry in sync.
    pub fn update_id(&mut self, idx: ElementIndex, new_id: ElementId) -> Result<(), CoreError> {
        if let Some(existing) = self.registry.get(&new_id)
            && *existing != idx
        {
            return Err(CoreError::DuplicateElement(new_id));
        }
        let old_id = self.get(idx).id;
        if self.registry.get(&old_id) == Some(&idx) {
            self.registry.remove(&old_id);
            self.registry.insert(new_id, idx);
        }
        self.get_mut(idx).id = new_id;
        Ok(())
    }

    // ─── Relations ───────────────────────────────────────────────────────

    /// Move `child` into `parent.children` at `index` (append when `None`).
    /// Returns the index the child had in its previous parent.
    pub fn set_parent(
        &mut self,
        child: ElementIndex,
        parent: Option<ElementIndex>,
        index: Option<usize>,
    ) -> Option<usize> {
        let old_index = self.get(child).parent.and_then(|old| {
            let siblings = &mut self.get_mut(old).children;
            let pos = siblings.iter().position(|c| *c == child)?;
            siblings.remove(pos);
            Some(pos)
        });
        if let Some(new) = parent {
            let siblings = &mut self.get_mut(new).children;
            let at = index.unwrap_or(siblings.len()).min(siblings.len());
            siblings.insert(at, child);
        }
        self.get_mut(child).parent = parent;
        old_index
    }

    /// Link (or unlink) a label to its target.
    pub fn set_label(&mut self, target: ElementIndex, label: Option<ElementIndex>) {
        if let Some(old) = self.get(target).label {
            self.get_mut(old).label_target = None;
        }
        if let Some(new) = label {
            if let Some(old_target) = self.get(new).label_target {
                self.get_mut(old_target).label = None;
            }
            self.get_mut(new).label_target = Some(target);
        }
        self.get_mut(target).label = label;
    }

    /// Set a connection's source. Returns the index the connection had in
    /// the previous source's `outgoing`.
    pub fn set_source(
        &mut self,
        connection: ElementIndex,
        source: Option<ElementIndex>,
    ) -> Option<usize> {
        self.set_source_at(connection, source, None)
    }

    /// Like [`set_source`](Self::set_source), inserting at `index` of the new
    /// source's `outgoing` (append when `None`).
    pub fn set_source_at(
        &mut self,
        connection: ElementIndex,
        source: Option<ElementIndex>,
        index: Option<usize>,
    ) -> Option<usize> {
        let old_index = self
            .get(connection)
            .source
            .and_then(|old| remove_item(&mut self.get_mut(old).outgoing, connection));
        if let Some(new) = source {
            insert_item(&mut self.get_mut(new).outgoing, connection, index);
        }
        self.get_mut(connection).source = source;
        old_index
    }

    /// Set a connection's target. Returns the index the connection had in
    /// the previous target's `incoming`.
    pub fn set_target(
        &mut self,
        connection: ElementIndex,
        target: Option<ElementIndex>,
    ) -> Option<usize> {
        self.set_target_at(connection, target, None)
    }

    pub fn set_target_at(
        &mut self,
        connection: ElementIndex,
        target: Option<ElementIndex>,
        index: Option<usize>,
    ) -> Option<usize> {
        let old_index = self
            .get(connection)
            .target
            .and_then(|old| remove_item(&mut self.get_mut(old).incoming, connection));
        if let Some(new) = target {
            insert_item(&mut self.get_mut(new).incoming, connection, index);
        }
        self.get_mut(connection).target = target;
        old_index
    }

    /// Attach `attacher` to `host` (detach when `None`). Returns the index
    /// the attacher had in its previous host's attachers.
    pub fn set_host(
        &mut self,
        attacher: ElementIndex,
        host: Option<ElementIndex>,
        index: Option<usize>,
    ) -> Option<usize> {
        let old_index = self.get(attacher).host.and_then(|old| {
            let attachers = &mut self.get_mut(old).attachers;
            let pos = attachers.iter().position(|a| *a == attacher)?;
            attachers.remove(pos);
            Some(pos)
        });
        if let Some(new) = host {
            let attachers = &mut self.get_mut(new).attachers;
            let at = index.unwrap_or(attachers.len()).min(attachers.len());
            attachers.insert(at, attacher);
        }
        self.get_mut(attacher).host = host;
        old_index
    }

    // ─── Traversal ───────────────────────────────────────────────────────

    /// All descendants of `roots` (excluding the roots themselves), each
    /// once, in depth-first order.
    pub fn descendants(&self, roots: &[ElementIndex]) -> Vec<ElementIndex> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for root in roots {
            if !self.contains(*root) {
                continue;
            }
            let mut stack: Vec<ElementIndex> = self.get(*root).children.iter().rev().copied().collect();
            while let Some(node) = stack.pop() {
                if seen.insert(node) {
                    found.push(node);
                    stack.extend(self.get(node).children.iter().rev());
                }
            }
        }
        found
    }

    /// Whether `ancestor` is a (transitive) parent of `idx`.
    pub fn is_ancestor(&self, ancestor: ElementIndex, idx: ElementIndex) -> bool {
        let mut current = self.get(idx).parent;
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.get(p).parent;
        }
        false
    }

    /// Nearest ancestor (including `idx`) matching `pred`.
    pub fn find_parent(
        &self,
        idx: ElementIndex,
        pred: impl Fn(&Element) -> bool,
    ) -> Option<ElementIndex> {
        let mut current = Some(idx);
        while let Some(c) = current {
            if pred(self.get(c)) {
                return Some(c);
            }
            current = self.get(c).parent;
        }
        None
    }

    /// A structural snapshot of every registered element.
    pub fn snapshot(&self) -> DiagramSnapshot {
        let id_of = |idx: ElementIndex| self.get(idx).id.to_string();
        let ids_of = |list: &[ElementIndex]| list.iter().map(|i| id_of(*i)).collect::<Vec<_>>();

        let elements = self
            .registry
            .values()
            .map(|idx| {
                let el = self.get(*idx);
                let snapshot = ElementSnapshot {
                    kind: el.kind,
                    parent: el.parent.map(id_of),
                    children: ids_of(&el.children),
                    bounds: el.bounds,
                    waypoints: el.waypoints.to_vec(),
                    label: el.label.map(id_of),
                    label_target: el.label_target.map(id_of),
                    source: el.source.map(id_of),
                    target: el.target.map(id_of),
                    incoming: ids_of(&el.incoming),
                    outgoing: ids_of(&el.outgoing),
                    host: el.host.map(id_of),
                    attachers: ids_of(&el.attachers),
                };
                (el.id.to_string(), snapshot)
            })
            .collect();

        DiagramSnapshot { elements }
    }
}

fn remove_item(list: &mut Vec<ElementIndex>, item: ElementIndex) -> Option<usize> {
    let pos = list.iter().position(|i| *i == item)?;
    list.remove(pos);
    Some(pos)
}

fn insert_item(list: &mut Vec<ElementIndex>, item: ElementIndex, index: Option<usize>) {
    if list.contains(&item) {
        return;
    }
    let at = index.unwrap_or(list.len()).min(list.len());
    list.insert(at, item);
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Snapshots ───────────────────────────────────────────────────────────

/// Structural view of one element, by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub kind: ElementKind,
    pub parent: Option<String>,
    pub children: Vec<String>,
    pub bounds: Bounds,
    pub waypoints: Vec<Waypoint>,
    pub label: Option<String>,
    pub label_target: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub incoming: Vec<String>,
    pub outgoing: Vec<String>,
    pub host: Option<String>,
    pub attachers: Vec<String>,
}

/// Structural view of the whole diagram, used to compare states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramSnapshot {
    pub elements: BTreeMap<String, ElementSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn shape(canvas: &mut Canvas, id: &str) -> ElementIndex {
        canvas.create(Element::shape(
            ElementId::intern(id),
            Bounds::new(0.0, 0.0, 100.0, 80.0),
        ))
    }

    #[test]
    fn add_and_remove_keep_sibling_index() {
        let mut canvas = Canvas::new();
        let root = canvas.root();
        let a = shape(&mut canvas, "canvas_a");
        let b = shape(&mut canvas, "canvas_b");
        let c = shape(&mut canvas, "canvas_c");
        for s in [a, b, c] {
            canvas.add_shape(s, root, None).unwrap();
        }

        assert_eq!(canvas.remove(b), Some((root, 1)));
        assert!(!canvas.contains(b));
        assert!(canvas.find("canvas_b").is_none());

        canvas.add_shape(b, root, Some(1)).unwrap();
        assert_eq!(canvas.get(root).children, vec![a, b, c]);
    }

    #[test]
    fn connection_relations_are_symmetric() {
        let mut canvas = Canvas::new();
        let root = canvas.root();
        let a = shape(&mut canvas, "canvas_src");
        let b = shape(&mut canvas, "canvas_tgt");
        let conn = canvas.create(Element::connection(
            ElementId::intern("canvas_flow"),
            [Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
        ));
        canvas.add_connection(conn, root, None).unwrap();
        canvas.set_source(conn, Some(a));
        canvas.set_target(conn, Some(b));
        assert_eq!(canvas.get(a).outgoing, vec![conn]);
        assert_eq!(canvas.get(b).incoming, vec![conn]);

        canvas.set_source(conn, Some(b));
        assert!(canvas.get(a).outgoing.is_empty());
        assert_eq!(canvas.get(b).outgoing, vec![conn]);
    }

    #[test]
    fn descendants_follow_containment() {
        let mut canvas = Canvas::new();
        let root = canvas.root();
        let outer = shape(&mut canvas, "canvas_outer");
        let inner = shape(&mut canvas, "canvas_inner");
        let leaf = shape(&mut canvas, "canvas_leaf");
        canvas.add_shape(outer, root, None).unwrap();
        canvas.add_shape(inner, outer, None).unwrap();
        canvas.add_shape(leaf, inner, None).unwrap();

        let found = canvas.descendants(&[outer]);
        assert_eq!(found.len(), 2);
        assert!(found.contains(&inner) && found.contains(&leaf));
        assert!(canvas.is_ancestor(outer, leaf));
        assert!(!canvas.is_ancestor(leaf, outer));
    }

    #[test]
    fn nested_roots_list_each_descendant_once() {
        let mut canvas = Canvas::new();
        let root = canvas.root();
        let outer = shape(&mut canvas, "canvas_nest_outer");
        let inner = shape(&mut canvas, "canvas_nest_inner");
        let first = shape(&mut canvas, "canvas_nest_first");
        let second = shape(&mut canvas, "canvas_nest_second");
        canvas.add_shape(outer, root, None).unwrap();
        canvas.add_shape(inner, outer, None).unwrap();
        canvas.add_shape(first, inner, None).unwrap();
        canvas.add_shape(second, inner, None).unwrap();

        // inner first: its children are seen before outer's walk reaches them
        assert_eq!(canvas.descendants(&[inner, outer]), vec![first, second, inner]);
        assert_eq!(canvas.descendants(&[outer, inner]), vec![inner, first, second]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut canvas = Canvas::new();
        let root = canvas.root();
        let a = shape(&mut canvas, "canvas_dup");
        let b = shape(&mut canvas, "canvas_dup");
        canvas.add_shape(a, root, None).unwrap();
        assert!(matches!(
            canvas.add_shape(b, root, None),
            Err(CoreError::DuplicateElement(_))
        ));
    }
}
