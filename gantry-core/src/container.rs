// Dependency injection container

use crate::error::{CoreError, CoreResult};
use crate::traits::{Inject, Provider};
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

type AnyArc = Arc<dyn Any + Send + Sync>;
type ProviderFn = Arc<dyn Fn(&Container) -> CoreResult<AnyArc> + Send + Sync>;

/// Lifetime of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// One instance per container; built lazily on first resolution (or
    /// bound up front) and cached.
    Singleton,
    /// A fresh instance per resolution.
    Transient,
    /// A user-supplied constructor invoked per resolution; the closure
    /// receives the container for manual composition.
    Factory,
}

/// A single binding: lifetime tag plus an optional provider closure.
/// Instance-bound singletons carry no closure.
#[derive(Clone)]
struct Registration {
    lifetime: Lifetime,
    provider: Option<ProviderFn>,
}

struct ContainerInner {
    registrations: RwLock<HashMap<TypeId, Registration>>,
    singletons: RwLock<HashMap<TypeId, AnyArc>>,
    parent: Option<Container>,
}

/// The dependency injection container.
///
/// Cloning is cheap (shared inner state). Child scopes created with
/// [`Container::create_scope`] shadow their parent's registrations
/// without ever mutating the parent; resolution falls back along the
/// parent chain.
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    /// Create a new root container.
    pub fn new() -> Self {
        debug!("Creating new DI container");
        Self {
            inner: Arc::new(ContainerInner {
                registrations: RwLock::new(HashMap::new()),
                singletons: RwLock::new(HashMap::new()),
                parent: None,
            }),
        }
    }

    /// Bind an already-constructed instance as a singleton.
    ///
    /// Every [`Container::resolve`] for `T` returns the same `Arc`.
    /// Re-registration overwrites the binding and evicts any cached
    /// instance.
    pub fn register_singleton<T: Provider>(&self, instance: T) {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        trace!(provider = type_name, "Registering singleton instance");
        let mut registrations = self.inner.registrations.write();
        let mut singletons = self.inner.singletons.write();
        registrations.insert(
            type_id,
            Registration {
                lifetime: Lifetime::Singleton,
                provider: None,
            },
        );
        singletons.insert(type_id, Arc::new(instance));

        debug!(provider = type_name, "Singleton instance registered");
    }

    /// Bind a lazily-built singleton.
    ///
    /// The provider runs on first resolution; the result is cached and
    /// shared by every later resolution from this container.
    pub fn register_singleton_with<T, F>(&self, provider: F)
    where
        T: Provider,
        F: Fn(&Container) -> CoreResult<T> + Send + Sync + 'static,
    {
        self.register_provider::<T, F>(Lifetime::Singleton, provider);
    }

    /// Bind a transient: the provider builds a fresh instance on every
    /// resolution.
    pub fn register_transient<T, F>(&self, provider: F)
    where
        T: Provider,
        F: Fn(&Container) -> CoreResult<T> + Send + Sync + 'static,
    {
        self.register_provider::<T, F>(Lifetime::Transient, provider);
    }

    /// Bind a user-supplied constructor function.
    ///
    /// The closure receives the container itself, so it can resolve
    /// dependencies conditionally. Invoked on every resolution.
    pub fn register_factory<T, F>(&self, provider: F)
    where
        T: Provider,
        F: Fn(&Container) -> CoreResult<T> + Send + Sync + 'static,
    {
        self.register_provider::<T, F>(Lifetime::Factory, provider);
    }

    fn register_provider<T, F>(&self, lifetime: Lifetime, provider: F)
    where
        T: Provider,
        F: Fn(&Container) -> CoreResult<T> + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        let wrapped: ProviderFn =
            Arc::new(move |container| provider(container).map(|value| Arc::new(value) as AnyArc));

        trace!(provider = type_name, lifetime = ?lifetime, "Registering provider");
        let mut registrations = self.inner.registrations.write();
        let mut singletons = self.inner.singletons.write();
        registrations.insert(
            type_id,
            Registration {
                lifetime,
                provider: Some(wrapped),
            },
        );
        // A rebind must not leave a stale cached instance behind.
        singletons.remove(&type_id);

        debug!(provider = type_name, lifetime = ?lifetime, "Provider registered");
    }

    /// Resolve a registered type.
    ///
    /// Looks up the local registration first, then walks the parent
    /// chain. Singletons are cached in the container that owns the
    /// registration; transients and factories run their provider on
    /// every call.
    pub fn resolve<T: Provider>(&self) -> CoreResult<Arc<T>> {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        trace!(provider = type_name, "Attempting to resolve provider");
        let registration = self.inner.registrations.read().get(&type_id).cloned();

        let Some(registration) = registration else {
            return match &self.inner.parent {
                Some(parent) => parent.resolve::<T>(),
                None => {
                    debug!(provider = type_name, "Provider not found in container");
                    Err(CoreError::NotRegistered(type_name))
                }
            };
        };

        match registration.lifetime {
            Lifetime::Singleton => {
                if let Some(cached) = self.inner.singletons.read().get(&type_id) {
                    trace!(provider = type_name, "Singleton cache hit");
                    return downcast::<T>(cached.clone());
                }
                let provider = registration
                    .provider
                    .ok_or(CoreError::NoProvider(type_name))?;
                // Build outside the lock so the provider can resolve its
                // own dependencies through this container.
                let built = provider(self)?;
                let mut singletons = self.inner.singletons.write();
                // Double-checked: if another thread won the race, its
                // instance stays and ours is discarded.
                let cached = singletons.entry(type_id).or_insert(built).clone();
                drop(singletons);
                debug!(provider = type_name, "Singleton resolved");
                downcast::<T>(cached)
            }
            Lifetime::Transient | Lifetime::Factory => {
                let provider = registration
                    .provider
                    .ok_or(CoreError::NoProvider(type_name))?;
                let built = provider(self)?;
                debug!(provider = type_name, "Provider resolved");
                downcast::<T>(built)
            }
        }
    }

    /// Resolve a type, returning `None` when nothing is registered.
    ///
    /// The optional-dependency form used by [`Inject`] implementations;
    /// provider failures other than a missing registration still
    /// propagate as `None` is only about absence.
    pub fn try_resolve<T: Provider>(&self) -> Option<Arc<T>> {
        self.resolve::<T>().ok()
    }

    /// Resolve a required member, wrapping failures with the member name.
    pub fn resolve_member<T: Provider>(&self, member: &str) -> CoreResult<Arc<T>> {
        self.resolve::<T>().map_err(|source| CoreError::Injection {
            member: member.to_string(),
            source: Box::new(source),
        })
    }

    /// Build a fresh instance, bypassing the singleton cache.
    ///
    /// Runs the provider closure of the nearest registration in the
    /// scope chain against *this* container, so dependencies resolve
    /// through local overrides. Fails with [`CoreError::NoProvider`] for
    /// instance-bound singletons, which carry no constructor.
    pub fn build<T: Provider>(&self) -> CoreResult<Arc<T>> {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        let Some(registration) = self.find_registration(type_id) else {
            return Err(CoreError::NotRegistered(type_name));
        };
        let provider = registration
            .provider
            .ok_or(CoreError::NoProvider(type_name))?;

        debug!(provider = type_name, "Building fresh instance");
        downcast::<T>(provider(self)?)
    }

    /// Wire a target's dependencies from this container.
    ///
    /// Construction either fully succeeds or the error propagates before
    /// the instance is used.
    pub fn inject<T: Inject>(&self, target: &mut T) -> CoreResult<()> {
        target.inject(self)
    }

    /// Create a child scope.
    ///
    /// The child's registrations shadow this container's for resolutions
    /// through the child, and are invisible to the parent.
    pub fn create_scope(&self) -> Container {
        debug!("Creating child scope");
        Container {
            inner: Arc::new(ContainerInner {
                registrations: RwLock::new(HashMap::new()),
                singletons: RwLock::new(HashMap::new()),
                parent: Some(self.clone()),
            }),
        }
    }

    /// Check whether a type is registered here or in any ancestor scope.
    pub fn is_registered<T: Provider>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        if self.inner.registrations.read().contains_key(&type_id) {
            return true;
        }
        match &self.inner.parent {
            Some(parent) => parent.is_registered::<T>(),
            None => false,
        }
    }

    /// Number of local registrations (excludes ancestors).
    pub fn registration_count(&self) -> usize {
        self.inner.registrations.read().len()
    }

    /// Drop all local registrations and cached singletons.
    pub fn clear(&self) {
        let mut registrations = self.inner.registrations.write();
        let mut singletons = self.inner.singletons.write();
        let count = registrations.len();
        registrations.clear();
        singletons.clear();

        debug!(provider_count = count, "Cleared all providers from container");
    }

    fn find_registration(&self, type_id: TypeId) -> Option<Registration> {
        if let Some(registration) = self.inner.registrations.read().get(&type_id) {
            return Some(registration.clone());
        }
        self.inner
            .parent
            .as_ref()
            .and_then(|parent| parent.find_registration(type_id))
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast<T: Provider>(any: AnyArc) -> CoreResult<Arc<T>> {
    any.downcast::<T>().map_err(|_| CoreError::Provider {
        type_name: std::any::type_name::<T>(),
        message: "provider produced a value of the wrong type".to_string(),
    })
}
