//! # Missive Evaluator
//!
//! Renders a message template against variable values.
//!
//! ## Algorithm
//!
//! The forest is walked in document order and the results concatenated:
//!
//! - **Text**: every `{name}` placeholder whose name is a key of the value
//!   map is replaced by its value, in a single pass. Replacement text is never
//!   scanned again, so a value that looks like a placeholder stays literal.
//!   Unknown placeholders are left untouched.
//! - **Conditional**: the `condition` branch is rendered first. A non-empty
//!   result selects `then`, an empty one selects `else`.
//!
//! ## Determinism Contract
//!
//! Rendering is a pure function of the forest and the value map. There are no
//! error conditions: a missing forest renders as `""` and a missing value map
//! leaves every placeholder literal.
//!
//! ## Usage
//!
//! ```rust
//! use missive_evaluator::{render, VarValues};
//! use missive_template::parse;
//!
//! let template = parse(r#"[{"type":"TEXT","text":"Hi {name}"}]"#).unwrap();
//! let mut values = VarValues::new();
//! values.insert("name".to_string(), "Ada".to_string());
//!
//! assert_eq!(render(Some(template.nodes()), Some(&values)), "Hi Ada");
//! ```

use missive_template::{NodeView, TemplateNode};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, instrument};

/// Variable name to value
pub type VarValues = HashMap<String, String>;

/// `{`, then word characters, whitespace, `-` or `.`, then `}`
const PLACEHOLDER_PATTERN: &str = r"\{((?:[0-9A-Za-z_\-.]|\s)+)\}";

pub(crate) fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("valid placeholder pattern"))
}

/// Renders forests against one value map
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator<'v> {
    values: Option<&'v VarValues>,
}

impl<'v> Evaluator<'v> {
    pub fn new(values: Option<&'v VarValues>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> Option<&'v VarValues> {
        self.values
    }

    /// Render a raw or working forest
    #[instrument(level = "trace", skip_all, fields(roots = forest.map_or(0, |f| f.len())))]
    pub fn render<N: TemplateNode>(&self, forest: Option<&[N]>) -> String {
        let mut out = String::new();
        if let Some(forest) = forest {
            self.render_into(forest, &mut out);
        }
        out
    }

    fn render_into<N: TemplateNode>(&self, forest: &[N], out: &mut String) {
        for node in forest {
            match node.view() {
                NodeView::Text(text) => out.push_str(&self.substitute(text)),
                NodeView::Conditional {
                    condition,
                    then,
                    otherwise,
                } => {
                    let mut condition_text = String::new();
                    self.render_into(condition, &mut condition_text);

                    if condition_text.is_empty() {
                        self.render_into(otherwise, out);
                    } else {
                        self.render_into(then, out);
                    }
                }
            }
        }
    }

    /// Replace known placeholders in one text, in a single pass
    pub fn substitute(&self, text: &str) -> String {
        let Some(values) = self.values else {
            return text.to_string();
        };

        placeholder_regex()
            .replace_all(text, |caps: &Captures| match values.get(&caps[1]) {
                Some(value) => value.clone(),
                None => {
                    debug!(placeholder = &caps[1], "No value for placeholder, leaving literal");
                    caps[0].to_string()
                }
            })
            .into_owned()
    }
}

/// Render `forest` against `values`
pub fn render<N: TemplateNode>(forest: Option<&[N]>, values: Option<&VarValues>) -> String {
    Evaluator::new(values).render(forest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use missive_template::{parse, parse_raw, RawNode, Template};

    fn values(pairs: &[(&str, &str)]) -> VarValues {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    fn greeting() -> Template {
        parse(
            r#"[
                {"type":"TEXT","text":"Hello, {firstname}."},
                {"type":"IF",
                 "condition":[{"type":"TEXT","text":"{company}"}],
                 "then":[{"type":"TEXT","text":" I know you work at {company}"}],
                 "else":[{"type":"TEXT","text":" Where do you work?"}]},
                {"type":"TEXT","text":" Regards, John."}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_missing_forest_and_values() {
        let no_forest: Option<&[RawNode]> = None;
        assert_eq!(render(no_forest, Some(&values(&[("a", "1")]))), "");
        assert_eq!(render(no_forest, None), "");
    }

    #[test]
    fn test_missing_values_leave_placeholders() {
        let template = greeting();
        // the literal "{company}" is non-empty, so the condition holds
        assert_eq!(
            render(Some(template.nodes()), None),
            "Hello, {firstname}. I know you work at {company} Regards, John."
        );
    }

    #[test]
    fn test_condition_selects_else_with_blank_company() {
        let template = greeting();
        let values = values(&[("firstname", "Peter"), ("company", "")]);
        assert_eq!(
            render(Some(template.nodes()), Some(&values)),
            "Hello, Peter. Where do you work? Regards, John."
        );
    }

    #[test]
    fn test_absent_company_key_selects_then() {
        let template = greeting();
        assert_eq!(
            render(Some(template.nodes()), Some(&values(&[("firstname", "Peter")]))),
            "Hello, Peter. I know you work at {company} Regards, John."
        );
    }

    #[test]
    fn test_condition_selects_then_with_company() {
        let template = greeting();
        let values = values(&[("firstname", "Peter"), ("company", "Web Studio")]);
        assert_eq!(
            render(Some(template.nodes()), Some(&values)),
            "Hello, Peter. I know you work at Web Studio Regards, John."
        );
    }

    #[test]
    fn test_empty_value_is_substituted_and_falsy() {
        let template = greeting();
        let values = values(&[("firstname", ""), ("company", "")]);
        assert_eq!(
            render(Some(template.nodes()), Some(&values)),
            "Hello, . Where do you work? Regards, John."
        );
    }

    #[test]
    fn test_no_re_expansion() {
        let raw = parse_raw(r#"[{"type":"TEXT","text":"A {x} B {y} C"}]"#).unwrap();
        let values = values(&[("x", "{y}"), ("y", "Z")]);
        assert_eq!(render(Some(raw.as_slice()), Some(&values)), "A {y} B Z C");
    }

    #[test]
    fn test_permissive_placeholder_names() {
        let evaluator_values = values(&[("first name", "Ann"), ("a-b.c", "x")]);
        let evaluator = Evaluator::new(Some(&evaluator_values));

        assert_eq!(evaluator.substitute("{first name}|{a-b.c}|{a+b}"), "Ann|x|{a+b}");
    }

    #[test]
    fn test_raw_and_working_forms_agree() {
        let template = greeting();
        let raw = template.to_raw();
        let values = values(&[("company", "Acme")]);

        assert_eq!(
            render(Some(raw.as_slice()), Some(&values)),
            render(Some(template.nodes()), Some(&values))
        );
    }

    #[test]
    fn test_nested_conditional_truthiness() {
        // condition is itself a conditional that renders "" when {vip} is empty
        let raw = parse_raw(
            r#"[{"type":"IF",
                 "condition":[{"type":"IF",
                               "condition":[{"type":"TEXT","text":"{vip}"}],
                               "then":[{"type":"TEXT","text":"yes"}]}],
                 "then":[{"type":"TEXT","text":"Welcome back"}],
                 "else":[{"type":"TEXT","text":"Hello"}]}]"#,
        )
        .unwrap();

        assert_eq!(render(Some(raw.as_slice()), Some(&values(&[("vip", "1")]))), "Welcome back");
        assert_eq!(render(Some(raw.as_slice()), Some(&values(&[("vip", "")]))), "Hello");
        // An unresolved placeholder is still non-empty text
        assert_eq!(render(Some(raw.as_slice()), None), "Welcome back");
    }
}
