use std::any::TypeId;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::injector::Initializer;
use crate::key::Key;
use crate::lifecycle::Lifecycle;
use crate::provider::{Exposure, Provider};

/// All registrations of a container, shared by its root and child scopes.
pub struct RegistrationMap {
    registrations: HashMap<Key, Arc<Registration>>,
    collections: HashMap<Key, Vec<Key>>,
    initializers: HashMap<TypeId, Vec<Initializer>>,
    next_id: u64,
}

impl RegistrationMap {
    pub fn new() -> Self {
        Self {
            registrations: HashMap::new(),
            collections: HashMap::new(),
            initializers: HashMap::new(),
            next_id: 0,
        }
    }

    /// Registers `provider` under `key`, replacing and returning the previous
    /// registration of `key` if any.
    pub fn insert(
        &mut self,
        key: Key,
        provider: Arc<dyn Provider>,
        lifecycle: Lifecycle,
        exposed: Vec<Exposure>,
    ) -> Option<Arc<Registration>> {
        let registration = Registration {
            id: self.next_id,
            key,
            provider,
            lifecycle,
            exposed,
        };
        self.next_id += 1;

        let replaced = self.registrations.insert(key, Arc::new(registration));
        if let Some(replaced) = &replaced {
            self.withdraw_from_collections(replaced);
        }
        self.append_to_collections(key);
        replaced
    }

    pub fn get(&self, key: &Key) -> Option<Arc<Registration>> {
        self.registrations.get(key).map(Arc::clone)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.registrations.contains_key(key)
    }

    /// Returns every registration exposing `interface` together with the
    /// matching exposure, in the order they were first exposed.
    pub fn collection(&self, interface: &Key) -> Vec<(Arc<Registration>, Exposure)> {
        let Some(members) = self.collections.get(interface) else {
            return Vec::new();
        };

        members
            .iter()
            .filter_map(|key| self.registrations.get(key))
            .filter_map(|registration| {
                registration
                    .exposure(interface)
                    .map(|exposure| (Arc::clone(registration), exposure.clone()))
            })
            .collect()
    }

    pub fn add_initializer(&mut self, target: TypeId, initializer: Initializer) {
        self.initializers.entry(target).or_default().push(initializer);
    }

    pub fn initializers(&self, target: TypeId) -> Vec<Initializer> {
        self.initializers.get(&target).cloned().unwrap_or_default()
    }

    fn withdraw_from_collections(&mut self, replaced: &Registration) {
        let key = replaced.key;
        let still_exposed = |interface: &Key| {
            self.registrations
                .get(&key)
                .is_some_and(|current| current.exposure(interface).is_some())
        };

        let withdrawn: Vec<Key> = replaced
            .exposed
            .iter()
            .map(|exposure| exposure.interface)
            .filter(|interface| !still_exposed(interface))
            .collect();

        for interface in withdrawn {
            if let Some(members) = self.collections.get_mut(&interface) {
                members.retain(|member| *member != key);
            }
        }
    }

    fn append_to_collections(&mut self, key: Key) {
        let Some(registration) = self.registrations.get(&key) else {
            unreachable!("`key` should be inserted before its exposures are recorded")
        };

        for exposure in &registration.exposed {
            let members = self.collections.entry(exposure.interface).or_default();
            if !members.contains(&key) {
                members.push(key);
            }
        }
    }
}

/// How to produce instances for one key. Immutable once created.
pub struct Registration {
    id: u64,
    key: Key,
    provider: Arc<dyn Provider>,
    lifecycle: Lifecycle,
    exposed: Vec<Exposure>,
}

impl Registration {
    /// Returns the generation of this registration. A key registered again
    /// gets a new generation, so instances cached for an older one are stale.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn exposure(&self, interface: &Key) -> Option<&Exposure> {
        self.exposed
            .iter()
            .find(|exposure| exposure.interface == *interface)
    }
}

impl Debug for Registration {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("provider", &self.provider)
            .field("lifecycle", &self.lifecycle)
            .field("exposed", &self.exposed)
            .finish()
    }
}
