//! # Tooling Module
//!
//! Tools are named callables with an explicit parameter schema attached at
//! registration time. The [`ToolRegistry`] owns every [`ToolSpec`] and is
//! read-only once a conversation starts, so one registry can be shared by
//! any number of concurrent conversations behind an `Arc`.

pub mod builtin;
mod error;
mod registry;
mod spec;

pub use error::{RegistryError, ToolInvokeError};
pub use registry::ToolRegistry;
pub use spec::{ParamSpec, ToolDescriptor, ToolHandler, ToolSpec};
