//! Core parser trait for diagram source text
//!
//! Parsers turn line-oriented source text into structured data stored in a
//! [`Database`]. They are permissive: unrecognised lines are skipped rather
//! than reported, so a parse only fails on internal errors.

use anyhow::Result;

use super::Database;

/// Core trait for diagram parsers
///
/// # Example
/// ```
/// use drawbridge::core::{Database, Parser};
/// use drawbridge::plugins::flowchart::{FlowchartDatabase, FlowchartParser};
///
/// let parser = FlowchartParser::new();
/// let mut db = FlowchartDatabase::new();
/// parser.parse("[Plan]\n[Build]", &mut db).unwrap();
/// assert_eq!(db.node_count(), 2);
/// ```
pub trait Parser<D: Database>: Send + Sync {
    /// Parse source text into the provided database
    fn parse(&self, input: &str, database: &mut D) -> Result<()>;

    /// Get the name of this parser
    fn name(&self) -> &'static str;

    /// Get the version of this parser
    fn version(&self) -> &'static str;

    /// Check if the input looks like something this parser understands
    fn can_parse(&self, input: &str) -> bool;
}
