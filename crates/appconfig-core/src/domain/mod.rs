//! Domain model (ids, application records, listing criteria, errors).
//!
//! Nothing in here knows about storage or locking; it only defines the
//! shapes the service passes around and the pure rules over them.

pub mod application;
pub mod attribute;
pub mod command;
pub mod errors;
pub mod ids;
pub mod query;
pub mod spec;
pub mod state;

pub use application::Application;
pub use attribute::AttributeFamily;
pub use command::Command;
pub use errors::{ErrorKind, ServiceError};
pub use ids::{ApplicationId, CommandId};
pub use query::{ApplicationFilter, ApplicationQuery, NamePattern, SortField, UnknownSortField};
pub use spec::ApplicationSpec;
pub use state::{ApplicationStatus, CommandStatus, UnknownStatus};
