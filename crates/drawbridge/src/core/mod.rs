//! Core abstractions for diagram processing
//!
//! This module defines the traits every diagram plugin implements
//! (parse into a database, lay it out, render it) together with the shared
//! draw.io document model the renderers emit.

mod database;
mod diagram;
pub mod drawio;
mod error;
mod layout;
pub mod logging;
mod parser;
mod renderer;
mod style;

pub use database::*;
pub use diagram::*;
pub use drawio::{CellKind, DrawioDocument, FileMeta, GraphModel, MxCell, MxGeometry, MxPoint};
pub use error::*;
pub use layout::*;
pub use logging::*;
pub use parser::*;
pub use renderer::*;
pub use style::*;
