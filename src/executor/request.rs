use std::{
    any::{Any, TypeId},
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use arcstr::ArcStr;
use fnv::FnvHashMap;

use crate::executor::{Cancellation, SourceValue};

/// Dependency-resolution capability of a request.
///
/// Services are looked up by the [`TypeId`] of their Rust type.
pub trait ServiceProvider: Send + Sync {
    /// Returns the service registered for the given type, if any.
    fn get_service(&self, ty: TypeId) -> Option<SourceValue>;
}

impl dyn ServiceProvider {
    /// Typed lookup of a service.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.get_service(TypeId::of::<T>())?.downcast::<T>().ok()
    }
}

/// Default [`ServiceProvider`] backed by a map of instances.
#[derive(Clone, Default)]
pub struct ServiceCollection {
    services: FnvHashMap<TypeId, SourceValue>,
}

impl ServiceCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `service`, replacing a previous one of the same type.
    #[must_use]
    pub fn with<T: Any + Send + Sync>(mut self, service: T) -> Self {
        self.add(service);
        self
    }

    /// Registers `service`, replacing a previous one of the same type.
    pub fn add<T: Any + Send + Sync>(&mut self, service: T) -> &mut Self {
        self.add_shared(Arc::new(service))
    }

    /// Registers a shared `service`, keeping the caller's handle valid.
    pub fn add_shared<T: Any + Send + Sync>(&mut self, service: Arc<T>) -> &mut Self {
        self.services.insert(TypeId::of::<T>(), service);
        self
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether no services are registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl ServiceProvider for ServiceCollection {
    fn get_service(&self, ty: TypeId) -> Option<SourceValue> {
        self.services.get(&ty).cloned()
    }
}

impl fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("len", &self.services.len())
            .finish()
    }
}

/// Batched-loading instances shared by every resolver of a session.
///
/// Each loader is created on first use under a key, so resolvers running
/// concurrently end up batching through the same instance.
#[derive(Default)]
pub struct DataLoaders {
    loaders: RwLock<FnvHashMap<(TypeId, ArcStr), SourceValue>>,
}

impl DataLoaders {
    /// Returns the loader registered under `key`, creating it with `create`
    /// when missing.
    pub fn get_or_register<T, F>(&self, key: &str, create: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let id = (TypeId::of::<T>(), ArcStr::from(key));
        if let Some(loader) = self.lookup::<T>(&id) {
            return loader;
        }

        let mut loaders = self.loaders.write().unwrap_or_else(PoisonError::into_inner);
        let entry = loaders
            .entry(id)
            .or_insert_with(|| Arc::new(create()) as SourceValue);
        Arc::clone(entry)
            .downcast::<T>()
            .unwrap_or_else(|_| unreachable!("loaders are keyed by their type"))
    }

    /// Returns the loader registered under `key`, if any.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.lookup(&(TypeId::of::<T>(), ArcStr::from(key)))
    }

    fn lookup<T: Any + Send + Sync>(&self, id: &(TypeId, ArcStr)) -> Option<Arc<T>> {
        let loaders = self.loaders.read().unwrap_or_else(PoisonError::into_inner);
        loaders.get(id).cloned()?.downcast::<T>().ok()
    }
}

impl fmt::Debug for DataLoaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loaders = self.loaders.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_list()
            .entries(loaders.keys().map(|(_, key)| key))
            .finish()
    }
}

/// Custom per-request contexts, one per Rust type.
#[derive(Default)]
pub struct CustomContexts {
    contexts: RwLock<FnvHashMap<TypeId, SourceValue>>,
}

impl CustomContexts {
    /// Stores `context`, returning the one it replaced.
    pub fn insert<T: Any + Send + Sync>(&self, context: T) -> Option<Arc<T>> {
        self.contexts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(TypeId::of::<T>(), Arc::new(context))?
            .downcast::<T>()
            .ok()
    }

    /// Returns the context of type `T`, if any.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.contexts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .cloned()?
            .downcast::<T>()
            .ok()
    }
}

impl fmt::Debug for CustomContexts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let contexts = self.contexts.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("CustomContexts")
            .field("len", &contexts.len())
            .finish()
    }
}

/// Cross-cutting state of a client session, shared between its operations.
#[derive(Debug, Default)]
pub struct Session {
    data_loaders: DataLoaders,
    custom_contexts: CustomContexts,
}

impl Session {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Batched-loading instances of this session.
    pub fn data_loaders(&self) -> &DataLoaders {
        &self.data_loaders
    }

    /// Custom contexts of this session.
    pub fn custom_contexts(&self) -> &CustomContexts {
        &self.custom_contexts
    }
}

/// Everything the caller supplies alongside an operation besides the
/// document and its variables.
#[derive(Clone)]
pub struct OperationRequest {
    services: Arc<dyn ServiceProvider>,
    session: Arc<Session>,
    initial_value: Option<SourceValue>,
    cancellation: Cancellation,
}

impl OperationRequest {
    /// Creates a request with no services, a fresh session and no initial
    /// value.
    pub fn new() -> Self {
        Self {
            services: Arc::new(ServiceCollection::new()),
            session: Arc::new(Session::new()),
            initial_value: None,
            cancellation: Cancellation::new(),
        }
    }

    /// Sets the dependency-resolution service.
    #[must_use]
    pub fn services(mut self, services: impl ServiceProvider + 'static) -> Self {
        self.services = Arc::new(services);
        self
    }

    /// Sets the session the operation runs in.
    #[must_use]
    pub fn session(mut self, session: Arc<Session>) -> Self {
        self.session = session;
        self
    }

    /// Sets the root value passed to top-level resolvers.
    ///
    /// The caller keeps ownership: the engine never disposes it.
    #[must_use]
    pub fn initial_value<T: Any + Send + Sync>(self, value: T) -> Self {
        self.shared_initial_value(Arc::new(value))
    }

    /// Sets an already shared root value.
    #[must_use]
    pub fn shared_initial_value(mut self, value: SourceValue) -> Self {
        self.initial_value = Some(value);
        self
    }

    /// Sets the cancellation signal observed by resolver invocations.
    #[must_use]
    pub fn cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        Arc<dyn ServiceProvider>,
        Arc<Session>,
        Option<SourceValue>,
        Cancellation,
    ) {
        (
            self.services,
            self.session,
            self.initial_value,
            self.cancellation,
        )
    }
}

impl Default for OperationRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OperationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRequest")
            .field("session", &self.session)
            .field("initial_value", &self.initial_value.is_some())
            .field("cancellation", &self.cancellation)
            .finish_non_exhaustive()
    }
}
