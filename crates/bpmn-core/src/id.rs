use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::error::CoreError;

/// Global string interner backing every `ElementId`.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A lightweight, interned identifier for diagram elements and business objects.
/// A 4-byte `Spur` index into the interner.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(Spur);

impl ElementId {
    /// Intern a new string as an ElementId, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        ElementId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// The id of the label shape that annotates `self` (`Task_1` → `Task_1_label`).
    pub fn label_id(&self) -> Self {
        Self::intern(&format!("{}_label", self.as_str()))
    }

    /// The id of the DI object backing `self` (`Task_1` → `Task_1_di`).
    pub fn di_id(&self) -> Self {
        Self::intern(&format!("{}_di", self.as_str()))
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ElementId::intern(&s))
    }
}

// ─── Id registry ─────────────────────────────────────────────────────────

/// Process-wide registry of claimed business-object ids.
///
/// Every business object claims its id on creation; deleting an element
/// unclaims it so the id can be reused.
#[derive(Debug, Default, Clone)]
pub struct IdRegistry {
    claimed: HashMap<ElementId, ElementId>,
    counters: HashMap<String, u64>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id` for `owner`.
    ///
    /// # Errors
    /// Returns [`CoreError::IdConflict`] if the id is already claimed.
    pub fn claim(&mut self, id: ElementId, owner: ElementId) -> Result<(), CoreError> {
        if self.claimed.contains_key(&id) {
            return Err(CoreError::IdConflict(id.to_string()));
        }
        self.claimed.insert(id, owner);
        Ok(())
    }

    /// Release `id`. Unclaiming an unknown id is a no-op.
    pub fn unclaim(&mut self, id: ElementId) {
        self.claimed.remove(&id);
    }

    pub fn assigned(&self, id: ElementId) -> bool {
        self.claimed.contains_key(&id)
    }

    /// Generate and claim the next free id with the given prefix,
    /// e.g. `Activity_1`, `Activity_2`.
    pub fn next_prefixed(&mut self, prefix: &str, owner: Option<ElementId>) -> ElementId {
        loop {
            let counter = self.counters.entry(prefix.to_string()).or_insert(0);
            *counter += 1;
            let id = ElementId::intern(&format!("{prefix}_{counter}"));
            if !self.claimed.contains_key(&id) {
                self.claimed.insert(id, owner.unwrap_or(id));
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ElementId::intern("Task_1");
        let b = ElementId::intern("Task_1");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "Task_1");
        assert_eq!(a.label_id().as_str(), "Task_1_label");
    }

    #[test]
    fn claiming_twice_conflicts() {
        let mut ids = IdRegistry::new();
        let id = ElementId::intern("Claimed_1");
        ids.claim(id, id).unwrap();
        assert!(matches!(ids.claim(id, id), Err(CoreError::IdConflict(_))));

        ids.unclaim(id);
        assert!(!ids.assigned(id));
        assert!(ids.claim(id, id).is_ok());
    }

    #[test]
    fn prefixed_ids_skip_claimed() {
        let mut ids = IdRegistry::new();
        let taken = ElementId::intern("Skip_1");
        ids.claim(taken, taken).unwrap();
        let next = ids.next_prefixed("Skip", None);
        assert_eq!(next.as_str(), "Skip_2");
        assert!(ids.assigned(next));
    }
}
