//! Helpers for building value maps

use crate::evaluator::{placeholder_regex, VarValues};

/// Value map with every known variable set to `""`.
///
/// Rendering against it shows the template's fixed text: placeholders
/// disappear and conditions on them fall through to `else`.
pub fn preview_values<I, S>(var_names: I) -> VarValues
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    var_names
        .into_iter()
        .map(|name| (name.as_ref().to_string(), String::new()))
        .collect()
}

/// Placeholder names in `text`, in order of appearance
pub fn placeholders(text: &str) -> impl Iterator<Item = &str> + '_ {
    placeholder_regex()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_values_are_blank() {
        let values = preview_values(["firstname", "company"]);

        assert_eq!(values.len(), 2);
        assert_eq!(values.get("company").map(String::as_str), Some(""));
    }

    #[test]
    fn test_placeholders_in_order() {
        let names: Vec<&str> = placeholders("Dear {firstname} {lastname}, {} {a+b} {company.name}").collect();
        assert_eq!(names, vec!["firstname", "lastname", "company.name"]);
    }
}
