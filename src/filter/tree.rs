use super::error::FilterError;
use super::pattern::resolve_delimiter_escapes;
use regex::Regex;
use std::fmt::{self, Write};

/// A field resolved against the schema at compile time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub index: usize,
    pub name: String,
}

impl FieldRef {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

/// Compiled matching program.
///
/// Built once by the parser and never mutated afterwards, so a single tree can
/// be shared by reference between any number of threads evaluating records.
#[derive(Debug, Clone)]
pub enum ExpressionNode {
    And {
        left: Box<ExpressionNode>,
        right: Box<ExpressionNode>,
    },
    Or {
        left: Box<ExpressionNode>,
        right: Box<ExpressionNode>,
    },
    Not {
        operand: Box<ExpressionNode>,
    },
    /// Case-sensitive full-string equality
    ExactMatch { field: FieldRef, value: String },
    /// Unanchored regex search; `source` keeps the pattern text as written
    RegexMatch {
        field: FieldRef,
        source: String,
        regex: Regex,
    },
}

impl ExpressionNode {
    pub fn and(left: ExpressionNode, right: ExpressionNode) -> Self {
        ExpressionNode::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: ExpressionNode, right: ExpressionNode) -> Self {
        ExpressionNode::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(operand: ExpressionNode) -> Self {
        ExpressionNode::Not {
            operand: Box::new(operand),
        }
    }

    pub fn exact(field: FieldRef, value: impl Into<String>) -> Self {
        ExpressionNode::ExactMatch {
            field,
            value: value.into(),
        }
    }

    /// Compile `source` (pattern text without delimiters) into a regex leaf
    pub fn regex(field: FieldRef, source: impl Into<String>) -> Result<Self, FilterError> {
        let source = source.into();
        match Regex::new(&resolve_delimiter_escapes(&source)) {
            Ok(regex) => Ok(ExpressionNode::RegexMatch {
                field,
                source,
                regex,
            }),
            Err(err) => Err(FilterError::InvalidRegex {
                field: field.name,
                pattern: source,
                source: err,
            }),
        }
    }

    pub fn children(&self) -> Vec<&ExpressionNode> {
        match self {
            ExpressionNode::And { left, right } | ExpressionNode::Or { left, right } => {
                vec![left.as_ref(), right.as_ref()]
            }
            ExpressionNode::Not { operand } => vec![operand.as_ref()],
            ExpressionNode::ExactMatch { .. } | ExpressionNode::RegexMatch { .. } => Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            ExpressionNode::ExactMatch { .. } | ExpressionNode::RegexMatch { .. }
        )
    }

    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(ExpressionNode::depth)
            .max()
            .unwrap_or(0)
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            return 1;
        }
        self.children()
            .into_iter()
            .map(ExpressionNode::leaf_count)
            .sum()
    }

    fn label(&self) -> String {
        match self {
            ExpressionNode::And { .. } => "&&".to_string(),
            ExpressionNode::Or { .. } => "||".to_string(),
            ExpressionNode::Not { .. } => "-".to_string(),
            ExpressionNode::ExactMatch { field, value } => format!("{} = {}", field.name, value),
            ExpressionNode::RegexMatch { field, source, .. } => {
                format!("{} ~ {}", field.name, source)
            }
        }
    }

    /// Graphviz description of the tree, one node per expression node
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph g {\n");
        let mut next_id = 0;
        self.write_dot_node(&mut out, &mut next_id);
        out.push_str("}\n");
        out
    }

    fn write_dot_node(&self, out: &mut String, next_id: &mut usize) -> usize {
        let id = *next_id;
        *next_id += 1;
        // writing into a String cannot fail
        let _ = writeln!(out, "  N{id} [label={:?}];", self.label());
        for child in self.children() {
            let child_id = child.write_dot_node(out, next_id);
            let _ = writeln!(out, "  N{id} -> N{child_id};");
        }
        id
    }
}

/// Fully parenthesized canonical form.
///
/// Trees built by `compile` render to text that compiles back to an equal
/// tree. An exact leaf whose value holds a bare `/` has no such form.
impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionNode::And { left, right } => write!(f, "({left} && {right})"),
            ExpressionNode::Or { left, right } => write!(f, "({left} || {right})"),
            ExpressionNode::Not { operand } => write!(f, "-{operand}"),
            ExpressionNode::ExactMatch { field, value } => write!(f, "{}=/{}/", field.name, value),
            ExpressionNode::RegexMatch { field, source, .. } => {
                write!(f, "{}~/{}/", field.name, source)
            }
        }
    }
}

impl PartialEq for ExpressionNode {
    fn eq(&self, other: &Self) -> bool {
        use ExpressionNode::*;
        match (self, other) {
            (And { left: l1, right: r1 }, And { left: l2, right: r2 })
            | (Or { left: l1, right: r1 }, Or { left: l2, right: r2 }) => l1 == l2 && r1 == r2,
            (Not { operand: a }, Not { operand: b }) => a == b,
            (ExactMatch { field: f1, value: v1 }, ExactMatch { field: f2, value: v2 }) => {
                f1 == f2 && v1 == v2
            }
            (
                RegexMatch {
                    field: f1,
                    source: s1,
                    ..
                },
                RegexMatch {
                    field: f2,
                    source: s2,
                    ..
                },
            ) => f1 == f2 && s1 == s2,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method() -> FieldRef {
        FieldRef::new(3, "method")
    }

    fn code() -> FieldRef {
        FieldRef::new(6, "code")
    }

    #[test]
    fn test_display_nested() {
        let tree = ExpressionNode::or(
            ExpressionNode::and(
                ExpressionNode::exact(method(), "GET"),
                ExpressionNode::not(ExpressionNode::regex(code(), "^5").unwrap()),
            ),
            ExpressionNode::exact(code(), "404"),
        );
        assert_eq!(
            tree.to_string(),
            "((method=/GET/ && -code~/^5/) || code=/404/)"
        );
    }

    #[test]
    fn test_not_renders_without_extra_parens() {
        let tree = ExpressionNode::not(ExpressionNode::and(
            ExpressionNode::exact(method(), "GET"),
            ExpressionNode::exact(code(), "200"),
        ));
        assert_eq!(tree.to_string(), "-(method=/GET/ && code=/200/)");
    }

    #[test]
    fn test_regex_keeps_source_escapes() {
        let leaf = ExpressionNode::regex(FieldRef::new(4, "url"), r"^\/index\.html").unwrap();
        assert_eq!(leaf.to_string(), r"url~/^\/index\.html/");
        let ExpressionNode::RegexMatch { regex, .. } = &leaf else {
            panic!("expected regex leaf");
        };
        assert!(regex.is_match("/index.html"));
    }

    #[test]
    fn test_invalid_regex() {
        let err = ExpressionNode::regex(method(), "GET(").unwrap_err();
        assert!(matches!(
            err,
            FilterError::InvalidRegex { ref field, ref pattern, .. } if field == "method" && pattern == "GET("
        ));
    }

    #[test]
    fn test_shape_helpers() {
        let tree = ExpressionNode::and(
            ExpressionNode::exact(method(), "GET"),
            ExpressionNode::not(ExpressionNode::exact(code(), "200")),
        );
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.children().len(), 2);
        assert!(!tree.is_leaf());
    }

    #[test]
    fn test_to_dot() {
        let tree = ExpressionNode::not(ExpressionNode::exact(method(), "GET"));
        assert_eq!(
            tree.to_dot(),
            "digraph g {\n  N0 [label=\"-\"];\n  N1 [label=\"method = GET\"];\n  N0 -> N1;\n}\n"
        );
    }

    #[test]
    fn test_equality_compares_regex_source() {
        let a = ExpressionNode::regex(method(), "GET|HEAD").unwrap();
        let b = ExpressionNode::regex(method(), "GET|HEAD").unwrap();
        let c = ExpressionNode::regex(method(), "GET").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, ExpressionNode::exact(method(), "GET|HEAD"));
    }
}
