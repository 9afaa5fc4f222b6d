//! cw-template: the hierarchical parameter tree that drives chip composition.
//!
//! Templates are YAML or JSON documents. Any object carrying an
//! `"@include@": "<file>"` key is replaced at load time by the referenced
//! file's content, with the object's own keys layered on top.

pub mod error;
pub mod loader;
pub mod template;

pub use error::{TemplateError, TemplateResult};
pub use loader::{Format, INCLUDE_KEY, SEARCH_PATH_ENV, TemplateLoader};
pub use template::Template;
