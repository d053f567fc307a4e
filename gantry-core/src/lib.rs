//! Dependency injection container for Gantry applications.
//!
//! Provides object-graph construction with lifetime management:
//! - 🧩 Singleton, transient, and factory lifetimes
//! - 🪆 Hierarchical scopes — child registrations shadow, never mutate,
//!   the parent
//! - 🔧 Statically checked wiring via typed provider closures and the
//!   [`Inject`] trait
//! - 🔒 Thread-safe resolution with a race-free singleton cache
//!
//! ## Quick Start
//!
//! ```
//! use gantry_core::{Container, Provider};
//!
//! struct Settings {
//!     rows: usize,
//! }
//! impl Provider for Settings {}
//!
//! let container = Container::new();
//! container.register_singleton(Settings { rows: 6 });
//!
//! let settings = container.resolve::<Settings>().unwrap();
//! assert_eq!(settings.rows, 6);
//! ```
//!
//! ## Scopes
//!
//! ```
//! use gantry_core::{Container, Provider};
//!
//! struct Theme(&'static str);
//! impl Provider for Theme {}
//!
//! let root = Container::new();
//! root.register_singleton(Theme("dark"));
//!
//! let screen = root.create_scope();
//! screen.register_singleton(Theme("light"));
//!
//! assert_eq!(screen.resolve::<Theme>().unwrap().0, "light");
//! assert_eq!(root.resolve::<Theme>().unwrap().0, "dark");
//! ```

pub mod container;
pub mod error;
pub mod traits;

pub use container::{Container, Lifetime};
pub use error::{CoreError, CoreResult};
pub use traits::{Inject, Provider};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::container::{Container, Lifetime};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::traits::{Inject, Provider};
}
