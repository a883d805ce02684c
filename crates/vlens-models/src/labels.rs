//! Object-detector label trees.
//!
//! Detectors may report labels as arbitrarily nested arrays (per result,
//! per box, per class). `LabelTree` captures that shape and `flatten`
//! reduces it to the ordered list of strings shown in the analysis table.

use serde::{Deserialize, Serialize};

use crate::sentinel::NO_OBJECTS;

/// A scalar label token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelScalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl LabelScalar {
    /// Render the token as text.
    ///
    /// Whole-valued floats keep one decimal place (`2.0`), so integer and
    /// float class ids stay distinguishable. Booleans render as `True` and
    /// `False`, the form detector label dumps use.
    pub fn render(&self) -> String {
        match self {
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) if value.is_finite() && value.fract() == 0.0 => {
                format!("{:.1}", value)
            }
            Self::Float(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }
}

/// A scalar label or a nested sequence of labels.
///
/// Any other JSON value (nulls, objects) deserializes into
/// `Ignored` and contributes nothing when flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelTree {
    Nested(Vec<LabelTree>),
    Scalar(LabelScalar),
    Ignored(serde_json::Value),
}

impl LabelTree {
    /// Create a text leaf.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Scalar(LabelScalar::Text(value.into()))
    }

    /// Create a nested node.
    pub fn nested(children: impl IntoIterator<Item = LabelTree>) -> Self {
        Self::Nested(children.into_iter().collect())
    }

    /// An empty label collection.
    pub fn empty() -> Self {
        Self::Nested(Vec::new())
    }

    /// Flatten into an ordered list of strings.
    ///
    /// Nested sequences are descended depth-first, scalars are stringified,
    /// and encounter order is preserved.
    pub fn flatten(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<String>) {
        match self {
            Self::Nested(children) => {
                for child in children {
                    child.flatten_into(out);
                }
            }
            Self::Scalar(scalar) => out.push(scalar.render()),
            Self::Ignored(_) => {}
        }
    }
}

impl From<&str> for LabelTree {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for LabelTree {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl From<Vec<LabelTree>> for LabelTree {
    fn from(children: Vec<LabelTree>) -> Self {
        Self::Nested(children)
    }
}

/// Join flattened labels for display, or return the "None" sentinel.
pub fn join_labels(labels: &[String]) -> String {
    if labels.is_empty() {
        NO_OBJECTS.to_string()
    } else {
        labels.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_nested() {
        let tree = LabelTree::nested([
            LabelTree::nested([LabelTree::text("a"), LabelTree::nested([LabelTree::text("b")])]),
            LabelTree::text("c"),
        ]);
        assert_eq!(tree.flatten(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_flatten_is_idempotent_on_flat_input() {
        let flat = vec!["person".to_string(), "dog".to_string(), "person".to_string()];
        let tree = LabelTree::nested(flat.iter().cloned().map(LabelTree::from));

        let once = tree.flatten();
        assert_eq!(once, flat);

        let twice = LabelTree::nested(once.iter().cloned().map(LabelTree::from)).flatten();
        assert_eq!(twice, once);
    }

    #[test]
    fn test_flatten_from_json() {
        let tree: LabelTree =
            serde_json::from_str(r#"[["a", ["b"]], "c", 3, 2.5, 1.0, true, null, {"k": 1}]"#).unwrap();
        assert_eq!(tree.flatten(), vec!["a", "b", "c", "3", "2.5", "1.0", "True"]);
    }

    #[test]
    fn test_bool_labels_render_capitalized() {
        let tree: LabelTree = serde_json::from_str(r#"["cat", false, [true]]"#).unwrap();
        assert_eq!(tree.flatten(), vec!["cat", "False", "True"]);
        assert_eq!(join_labels(&tree.flatten()), "cat, False, True");
    }

    #[test]
    fn test_flatten_empty() {
        assert!(LabelTree::empty().flatten().is_empty());
        let tree: LabelTree = serde_json::from_str("[[], [[]]]").unwrap();
        assert!(tree.flatten().is_empty());
    }

    #[test]
    fn test_join_labels() {
        assert_eq!(join_labels(&[]), "None");
        assert_eq!(join_labels(&["person".to_string()]), "person");
        assert_eq!(
            join_labels(&["person".to_string(), "cup".to_string()]),
            "person, cup"
        );
    }
}
