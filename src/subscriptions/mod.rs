//! Registration tables for store subscribers and middlewares.
//!
//! Both registries hand out a monotonically increasing [`RegistrationId`]
//! and an [`Unsubscribe`] handle that removes exactly that entry. Iteration
//! follows registration order, which the middleware chain depends on.
//!
//! # Example
//!
//! ```
//! use fabux::subscriptions::Registry;
//! use std::sync::Arc;
//!
//! let registry: Arc<Registry<&'static str>> = Arc::new(Registry::new());
//! let first = Registry::register(&registry, "first");
//! Registry::register(&registry, "second");
//!
//! first.unsubscribe();
//! first.unsubscribe(); // no-op
//! assert_eq!(registry.snapshot(), vec!["second"]);
//! ```
//!
//! [`RegistrationId`]: crate::types::RegistrationId

mod registry;

pub use registry::{Deregister, Registry, Subscriber, Unsubscribe};
