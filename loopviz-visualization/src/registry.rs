//! Scene registry
//!
//! Every object added to a scene gets a unique, human-readable name. The
//! registry maps those names to renderer actor handles so objects can be
//! looked up, toggled and removed later.

use crate::renderer::ActorId;
use indexmap::IndexMap;

/// An object added to a scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedObject {
    pub name: String,
    pub actor: ActorId,
}

/// Produce a name for which `is_taken` is false.
///
/// A name without an underscore first gets `_1` appended. While the candidate
/// is taken, a trailing `_<integer>` segment (possibly negative) is incremented, or `_1` appended
/// when the last segment is not an integer.
pub fn unique_name<F>(base: &str, is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut name = if base.contains('_') {
        base.to_string()
    } else {
        format!("{}_1", base)
    };

    while is_taken(&name) {
        name = match name.rsplit_once('_') {
            Some((head, last)) => match last.parse::<i64>().ok().and_then(|n| n.checked_add(1)) {
                Some(next) => format!("{}_{}", head, next),
                None => format!("{}_1", name),
            },
            None => format!("{}_1", name),
        };
    }
    name
}

/// Per-scene mapping from object name to actor, in insertion order
#[derive(Debug, Clone, Default)]
pub struct SceneRegistry {
    objects: IndexMap<String, NamedObject>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A name derived from `base` that is not yet registered
    pub fn unique_name(&self, base: &str) -> String {
        unique_name(base, |candidate| self.objects.contains_key(candidate))
    }

    /// Register `actor` under a unique name derived from `base` and return that name
    pub fn register(&mut self, base: &str, actor: ActorId) -> String {
        let name = self.unique_name(base);
        self.insert(name.clone(), actor);
        name
    }

    /// Register `actor` under `name` as given when it is free, otherwise
    /// under a unique name derived from it
    pub fn register_exact(&mut self, name: &str, actor: ActorId) -> String {
        let name = if self.contains(name) {
            self.unique_name(name)
        } else {
            name.to_string()
        };
        self.insert(name.clone(), actor);
        name
    }

    fn insert(&mut self, name: String, actor: ActorId) {
        self.objects.insert(name.clone(), NamedObject { name, actor });
    }

    pub fn get(&self, name: &str) -> Option<&NamedObject> {
        self.objects.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    /// Remove an object, keeping the order of the rest
    pub fn remove(&mut self, name: &str) -> Option<NamedObject> {
        self.objects.shift_remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedObject> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
