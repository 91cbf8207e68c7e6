//! JSON form of a template, as persisted by the host application.
//!
//! The stored payload is an opaque string to the storage medium; only the
//! shape of [`RawNode`] is fixed.

use crate::ast::{RawForest, RawNode, Template};
use crate::error::TemplateResult;
use tracing::debug;

/// Parse a raw forest. `null` parses as an empty forest.
pub fn parse_raw(source: &str) -> TemplateResult<RawForest> {
    let raw: Option<RawForest> = serde_json::from_str(source)?;
    Ok(raw.unwrap_or_default())
}

/// Parse and normalize a template. `null` and `[]` give the default template.
pub fn parse(source: &str) -> TemplateResult<Template> {
    let raw = parse_raw(source)?;
    debug!(roots = raw.len(), "Parsed template JSON");
    Ok(Template::from_raw(Some(raw.as_slice())))
}

/// Serialize the template's raw form as compact JSON
pub fn stringify(template: &Template) -> String {
    to_json(&template.to_raw(), false)
}

/// Serialize the template's raw form as indented JSON
pub fn stringify_pretty(template: &Template) -> String {
    to_json(&template.to_raw(), true)
}

fn to_json(raw: &[RawNode], pretty: bool) -> String {
    // RawNode holds only strings and vectors, which always serialize
    let result = if pretty {
        serde_json::to_string_pretty(raw)
    } else {
        serde_json::to_string(raw)
    };
    result.unwrap_or_else(|_| String::from("[]"))
}
