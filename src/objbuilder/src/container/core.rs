use std::any::TypeId;
use std::collections::HashMap;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use oneshot::{Receiver, Sender};
use parking_lot::{RwLock, RwLockWriteGuard};
use tracing::{debug, trace};

use crate::container::injector::{CallContext, Initializer, Injector, InjectorError};
use crate::container::registry::{Registration, RegistrationMap};
use crate::container::{ScopeId, SharedManaged};
use crate::key::Key;
use crate::lifecycle::Lifecycle;
use crate::provider::{Constructed, Dispose};

/// The state shared by every handle of one scope.
///
/// The root scope caches singletons and its own per-unit-of-work instances.
/// A child scope caches its per-unit-of-work instances and forwards singleton
/// requests to the root.
pub struct ScopeCore {
    id: ScopeId,
    parent: Option<Arc<Self>>,
    registrations: Arc<RwLock<RegistrationMap>>,
    next_child_id: AtomicU64,
    managed: RwLock<ManagedObjectData>,
}

impl ScopeCore {
    pub fn new_root() -> Self {
        let registrations = Arc::new(RwLock::new(RegistrationMap::new()));
        Self::new_impl(ScopeId::ROOT, None, registrations)
    }

    pub fn new_child(parent: &Arc<Self>) -> Self {
        let id = ScopeId::new(parent.next_child_id.fetch_add(1, Ordering::Relaxed));
        let registrations = Arc::clone(&parent.registrations);
        Self::new_impl(id, Some(Arc::clone(parent)), registrations)
    }

    fn new_impl(
        id: ScopeId,
        parent: Option<Arc<Self>>,
        registrations: Arc<RwLock<RegistrationMap>>,
    ) -> Self {
        Self {
            id,
            parent,
            registrations,
            next_child_id: AtomicU64::new(1),
            managed: RwLock::new(ManagedObjectData::new()),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn registrations(&self) -> &RwLock<RegistrationMap> {
        &self.registrations
    }

    pub fn is_disposed(&self) -> bool {
        self.managed.read().disposed
    }

    /// Releases every tracked disposable in reverse construction order and
    /// drops the cached instances. Later calls do nothing.
    pub fn dispose(&self) {
        let (objects, disposables) = {
            let mut managed = self.managed.write();
            if managed.disposed {
                return;
            }
            managed.disposed = true;
            (
                mem::take(&mut managed.objects),
                mem::take(&mut managed.disposables),
            )
        };

        debug!(scope = %self.id, disposables = disposables.len(), "disposing scope");
        for (key, disposer) in disposables.into_iter().rev() {
            trace!(scope = %self.id, component = %key, "disposing component");
            disposer.dispose();
        }
        drop(objects);
    }

    fn ensure_active(&self) -> Result<(), InjectorError> {
        if self.is_disposed() {
            Err(InjectorError::ScopeDisposed { scope: self.id })
        } else {
            Ok(())
        }
    }

    fn get_object(
        &self,
        context: &CallContext<'_>,
    ) -> Result<Box<dyn SharedManaged>, InjectorError> {
        self.ensure_active()?;
        let registration = self.try_get_registration(context.key())?;

        match registration.lifecycle() {
            Lifecycle::SingleInstance => match self.parent.as_ref() {
                Some(parent) => parent.get_object(context),
                None => self.get_shared_object_from_self(&registration, context),
            },
            Lifecycle::InstancePerUnitOfWork => {
                self.get_shared_object_from_self(&registration, context)
            }
            Lifecycle::InstancePerCall => self.get_unbounded_object_from_self(&registration, context),
        }
    }

    fn get_all_objects(
        &self,
        context: &CallContext<'_>,
    ) -> Result<Vec<Box<dyn SharedManaged>>, InjectorError> {
        self.ensure_active()?;
        let members = self.registrations.read().collection(context.key());

        let mut objects = Vec::with_capacity(members.len());
        for (registration, exposure) in members {
            let key = *registration.key();
            let object = self.get_object(&context.append(&key))?;
            objects.push(exposure.upcast(object));
        }
        Ok(objects)
    }

    fn try_get_registration(&self, key: &Key) -> Result<Arc<Registration>, InjectorError> {
        match self.registrations.read().get(key) {
            Some(registration) => Ok(registration),
            None => Err(InjectorError::UnregisteredComponent { key: *key }),
        }
    }

    fn try_get_constructed_object(
        &self,
        key: &Key,
        generation: u64,
    ) -> Option<Box<dyn SharedManaged>> {
        self.managed.read().cached(key, generation)
    }

    fn get_shared_object_from_self(
        &self,
        registration: &Registration,
        context: &CallContext<'_>,
    ) -> Result<Box<dyn SharedManaged>, InjectorError> {
        let key = context.key();
        if let Some(object) = self.try_get_constructed_object(key, registration.id()) {
            return Ok(object);
        }

        let mut managed = self.managed.write();
        if let Some(object) = managed.cached(key, registration.id()) {
            return Ok(object);
        }

        if let Some(constructing) = managed.constructing.get_mut(key) {
            if constructing.is_constructed_by_current_thread() {
                Err(self.stop_construction_on_cyclic_dependency(managed, key))
            } else {
                let (sender, receiver) = oneshot::channel();
                constructing.register_waiter(sender);
                drop(managed);
                self.get_object_on_object_context_response(receiver, registration, context)
            }
        } else {
            self.construct_shared_object(managed, registration, context)
        }
    }

    fn stop_construction_on_cyclic_dependency(
        &self,
        managed: RwLockWriteGuard<'_, ManagedObjectData>,
        key: &Key,
    ) -> InjectorError {
        let err = InjectorError::CyclicDependency { key: *key };
        self.notify_waiters(managed, key, WaitResponse::Error(err.clone()));
        err
    }

    fn get_object_on_object_context_response(
        &self,
        receiver: Receiver<WaitResponse>,
        registration: &Registration,
        context: &CallContext<'_>,
    ) -> Result<Box<dyn SharedManaged>, InjectorError> {
        let key = context.key();
        match receiver.recv() {
            Ok(WaitResponse::Constructed) => {
                let managed = self.managed.read();
                if managed.disposed {
                    return Err(InjectorError::ScopeDisposed { scope: self.id });
                }
                match managed.cached(key, registration.id()) {
                    Some(object) => Ok(object),
                    // The peer built an instance of a replaced registration.
                    None => {
                        drop(managed);
                        self.get_object(context)
                    }
                }
            }
            Ok(WaitResponse::Error(err)) => Err(err),
            Err(_) => Err(InjectorError::ConstructionAborted { key: *key }),
        }
    }

    fn construct_shared_object(
        &self,
        mut managed: RwLockWriteGuard<'_, ManagedObjectData>,
        registration: &Registration,
        context: &CallContext<'_>,
    ) -> Result<Box<dyn SharedManaged>, InjectorError> {
        let key = context.key();
        let on_thread = thread::current().id();
        managed
            .constructing
            .insert(*key, ConstructingObjectContext::new(on_thread));
        drop(managed);

        let guard = ConstructionGuard::new(self, *key);
        let provided = registration.provider().dyn_provide(self, context);
        guard.disarm();

        match provided {
            Ok(Constructed { object, disposer }) => {
                let mut managed = self.managed.write();
                if managed.disposed {
                    let err = InjectorError::ScopeDisposed { scope: self.id };
                    self.notify_waiters(managed, key, WaitResponse::Error(err.clone()));
                    if let Some(disposer) = disposer {
                        disposer.dispose();
                    }
                    return Err(err);
                }

                managed.objects.insert(
                    *key,
                    CachedObject {
                        generation: registration.id(),
                        object: object.dyn_clone(),
                    },
                );
                if let Some(disposer) = disposer {
                    managed.disposables.push((*key, disposer));
                }
                self.notify_waiters(managed, key, WaitResponse::Constructed);
                Ok(object)
            }
            Err(err) => {
                let managed = self.managed.write();
                self.notify_waiters(managed, key, WaitResponse::Error(err.clone()));
                Err(err)
            }
        }
    }

    fn notify_waiters(
        &self,
        mut managed: RwLockWriteGuard<'_, ManagedObjectData>,
        key: &Key,
        response: WaitResponse,
    ) {
        if let Some(context) = managed.constructing.remove(key) {
            drop(managed);
            context.notify(response);
        }
    }

    fn get_unbounded_object_from_self(
        &self,
        registration: &Registration,
        context: &CallContext<'_>,
    ) -> Result<Box<dyn SharedManaged>, InjectorError> {
        let key = context.key();
        if context.trace().previous_exist_key(key) {
            Err(InjectorError::CyclicDependency { key: *key })
        } else {
            registration
                .provider()
                .dyn_provide(self, context)
                .map(|constructed| constructed.object)
        }
    }
}

impl Injector for ScopeCore {
    fn dyn_get(&self, key: &Key) -> Result<Box<dyn SharedManaged>, InjectorError> {
        let context = CallContext::new(key);
        self.get_object(&context)
    }

    fn dyn_get_dependency<'a>(
        &self,
        key: &Key,
        context: &'a CallContext<'a>,
    ) -> Result<Box<dyn SharedManaged>, InjectorError> {
        let context = context.append(key);
        self.get_object(&context)
    }

    fn dyn_get_all(&self, key: &Key) -> Result<Vec<Box<dyn SharedManaged>>, InjectorError> {
        let context = CallContext::new(key);
        self.get_all_objects(&context)
    }

    fn dyn_get_all_dependencies<'a>(
        &self,
        key: &Key,
        context: &'a CallContext<'a>,
    ) -> Result<Vec<Box<dyn SharedManaged>>, InjectorError> {
        let context = context.append(key);
        self.get_all_objects(&context)
    }

    fn contains(&self, key: &Key) -> bool {
        self.registrations.read().contains(key)
    }

    fn initializers(&self, target: TypeId) -> Vec<Initializer> {
        self.registrations.read().initializers(target)
    }
}

impl Drop for ScopeCore {
    fn drop(&mut self) {
        self.dispose();
    }
}

struct ManagedObjectData {
    objects: HashMap<Key, CachedObject>,
    constructing: HashMap<Key, ConstructingObjectContext>,
    disposables: Vec<(Key, Arc<dyn Dispose>)>,
    disposed: bool,
}

impl ManagedObjectData {
    fn new() -> Self {
        Self {
            objects: HashMap::new(),
            constructing: HashMap::new(),
            disposables: Vec::new(),
            disposed: false,
        }
    }

    fn cached(&self, key: &Key, generation: u64) -> Option<Box<dyn SharedManaged>> {
        self.objects
            .get(key)
            .filter(|cached| cached.generation == generation)
            .map(|cached| cached.object.dyn_clone())
    }
}

struct CachedObject {
    generation: u64,
    object: Box<dyn SharedManaged>,
}

struct ConstructingObjectContext {
    on_thread: ThreadId,
    waiters: Vec<Sender<WaitResponse>>,
}

impl ConstructingObjectContext {
    fn new(on_thread: ThreadId) -> Self {
        Self {
            on_thread,
            waiters: Vec::new(),
        }
    }

    fn is_constructed_by_current_thread(&self) -> bool {
        thread::current().id() == self.on_thread
    }

    fn register_waiter(&mut self, sender: Sender<WaitResponse>) {
        self.waiters.push(sender);
    }

    fn notify(self, response: WaitResponse) {
        for sender in self.waiters {
            let _ = sender.send(response.clone());
        }
    }
}

/// Clears the constructing marker of `key` if the factory unwinds, so that
/// later requests can construct the object again.
struct ConstructionGuard<'a> {
    core: &'a ScopeCore,
    key: Key,
    armed: bool,
}

impl<'a> ConstructionGuard<'a> {
    fn new(core: &'a ScopeCore, key: Key) -> Self {
        Self {
            core,
            key,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ConstructionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!(scope = %self.core.id, component = %self.key, "construction panicked");
            let managed = self.core.managed.write();
            let err = InjectorError::ConstructionAborted { key: self.key };
            self.core.notify_waiters(managed, &self.key, WaitResponse::Error(err));
        }
    }
}

#[derive(Debug, Clone)]
enum WaitResponse {
    Constructed,
    Error(InjectorError),
}
