// Core traits for the Gantry runtime

use crate::{Container, CoreResult};

/// Trait for types that can be provided by the DI container.
pub trait Provider: Send + Sync + 'static {}

/// Trait for types whose members are wired from the container after
/// construction.
///
/// This is the statically checked counterpart of attribute-marked member
/// injection: each implementor resolves its own dependencies explicitly.
/// Required members use [`Container::resolve_member`] so a failure names
/// the member; optional members use [`Container::try_resolve`] and stay
/// `None` when nothing is registered.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use gantry_core::{Container, CoreResult, Inject, Provider};
///
/// struct Clock;
/// impl Provider for Clock {}
///
/// struct Metrics;
/// impl Provider for Metrics {}
///
/// #[derive(Default)]
/// struct Reporter {
///     clock: Option<Arc<Clock>>,
///     metrics: Option<Arc<Metrics>>,
/// }
///
/// impl Inject for Reporter {
///     fn inject(&mut self, container: &Container) -> CoreResult<()> {
///         self.clock = Some(container.resolve_member::<Clock>("clock")?);
///         self.metrics = container.try_resolve::<Metrics>();
///         Ok(())
///     }
/// }
///
/// let container = Container::new();
/// container.register_singleton(Clock);
///
/// let mut reporter = Reporter::default();
/// container.inject(&mut reporter).unwrap();
/// assert!(reporter.clock.is_some());
/// assert!(reporter.metrics.is_none());
/// ```
pub trait Inject {
    /// Resolve this value's dependencies from `container`.
    fn inject(&mut self, container: &Container) -> CoreResult<()>;
}
