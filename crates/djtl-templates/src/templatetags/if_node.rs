use std::fmt::Write;

use crate::context::Context;
use crate::error::RenderError;
use crate::error::TemplateError;
use crate::expression::FilterExpression;
use crate::nodelist::Node;
use crate::nodelist::NodeList;
use crate::parser::Parser;
use crate::quotes::smart_split;

/// How the terms of an `{% if %}` combine. A single tag uses exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkType {
    And,
    Or,
}

#[derive(Clone, Debug)]
pub struct IfTerm {
    negate: bool,
    condition: FilterExpression,
}

impl IfTerm {
    #[must_use]
    pub fn is_negated(&self) -> bool {
        self.negate
    }

    #[must_use]
    pub fn condition(&self) -> &FilterExpression {
        &self.condition
    }

    /// Truth of the term after applying `not`.
    fn holds(&self, context: &Context) -> Result<bool, RenderError> {
        Ok(self.condition.is_true(context)? != self.negate)
    }
}

/// `{% if [not] a (and|or) [not] b ... %} ... [{% else %} ...] {% endif %}`
///
/// Operators are found by splitting the joined arguments on the literal
/// substrings `" and "` and `" or "`, so a quoted operand containing either
/// substring is split as well.
pub(super) fn parse_if(content: &str, parser: &mut Parser<'_>) -> Result<Node, TemplateError> {
    let bits = smart_split(content);
    let Some(args) = bits.get(1..).filter(|args| !args.is_empty()) else {
        return Err(TemplateError::tag_syntax(format!(
            "'if' statement requires at least one argument: {content}"
        )));
    };

    let expression = args.join(" ");

    let and_pieces: Vec<&str> = expression.split(" and ").collect();
    let (link, pieces) = if and_pieces.len() == 1 {
        (LinkType::Or, expression.split(" or ").collect::<Vec<_>>())
    } else {
        if expression.contains(" or ") {
            return Err(TemplateError::tag_syntax(format!(
                "'if' tags can't mix 'and' and 'or': {content}"
            )));
        }
        (LinkType::And, and_pieces)
    };

    let mut terms = Vec::with_capacity(pieces.len());
    for piece in pieces {
        let term = if piece.contains(' ') {
            let words: Vec<&str> = piece.split(' ').collect();
            let [first, operand] = words.as_slice() else {
                return Err(TemplateError::tag_syntax(format!(
                    "'if' statement improperly formatted: {content}"
                )));
            };
            if *first != "not" {
                return Err(TemplateError::tag_syntax(format!(
                    "Expected 'not' in if statement: {content}"
                )));
            }
            IfTerm {
                negate: true,
                condition: parser.compile_filter(operand.trim())?,
            }
        } else {
            IfTerm {
                negate: false,
                condition: parser.compile_filter(piece.trim())?,
            }
        };
        terms.push(term);
    }

    let true_body = parser.parse_until("if", &["else", "endif"])?;
    let false_body = match parser.next_token() {
        Some(token) if token.tag_name() == Some("else") => {
            let false_body = parser.parse_until("if", &["endif"])?;
            parser.next_token();
            false_body
        }
        _ => NodeList::default(),
    };

    Ok(Node::If(IfNode {
        terms,
        link,
        true_body,
        false_body,
    }))
}

#[derive(Clone, Debug)]
pub struct IfNode {
    terms: Vec<IfTerm>,
    link: LinkType,
    true_body: NodeList,
    false_body: NodeList,
}

impl IfNode {
    #[must_use]
    pub fn terms(&self) -> &[IfTerm] {
        &self.terms
    }

    #[must_use]
    pub fn link(&self) -> LinkType {
        self.link
    }

    #[must_use]
    pub fn true_body(&self) -> &NodeList {
        &self.true_body
    }

    #[must_use]
    pub fn false_body(&self) -> &NodeList {
        &self.false_body
    }

    /// Evaluate terms left to right, stopping as soon as the outcome is known.
    fn evaluate(&self, context: &Context) -> Result<bool, RenderError> {
        match self.link {
            LinkType::Or => {
                for term in &self.terms {
                    if term.holds(context)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            LinkType::And => {
                for term in &self.terms {
                    if !term.holds(context)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    pub fn render(&self, context: &mut Context, output: &mut dyn Write) -> Result<(), RenderError> {
        if self.evaluate(context)? {
            self.true_body.render(context, output)
        } else {
            self.false_body.render(context, output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::filters::FilterLibrary;
    use crate::value::Value;

    fn parse(source: &str) -> Result<IfNode, TemplateError> {
        let template = Engine::default().compile(source)?;
        match template.nodelist().nodes() {
            [Node::If(node)] => Ok(node.clone()),
            other => panic!("expected a single if node, got {other:?}"),
        }
    }

    fn syntax_error(source: &str) -> String {
        match parse(source) {
            Err(TemplateError::TagSyntax(message)) => message,
            other => panic!("expected a tag syntax error, got {other:?}"),
        }
    }

    fn summary(node: &IfNode) -> Vec<(bool, String)> {
        node.terms()
            .iter()
            .map(|t| (t.is_negated(), t.condition().source().to_string()))
            .collect()
    }

    mod parsing {
        use super::*;

        #[test]
        fn test_single_term_defaults_to_or() {
            let node = parse("{% if a %}T{% endif %}").unwrap();
            assert_eq!(node.link(), LinkType::Or);
            assert_eq!(summary(&node), vec![(false, "a".to_string())]);
            assert!(node.false_body().is_empty());
        }

        #[test]
        fn test_and_terms() {
            let node = parse("{% if a and not b and c.d %}T{% endif %}").unwrap();
            assert_eq!(node.link(), LinkType::And);
            assert_eq!(
                summary(&node),
                vec![
                    (false, "a".to_string()),
                    (true, "b".to_string()),
                    (false, "c.d".to_string()),
                ]
            );
        }

        #[test]
        fn test_or_terms() {
            let node = parse("{% if not a or b %}T{% endif %}").unwrap();
            assert_eq!(node.link(), LinkType::Or);
            assert_eq!(
                summary(&node),
                vec![(true, "a".to_string()), (false, "b".to_string())]
            );
        }

        #[test]
        fn test_else_branch() {
            let node = parse("{% if a %}T{% else %}F{% endif %}").unwrap();
            assert_eq!(node.true_body().len(), 1);
            assert_eq!(node.false_body().len(), 1);
        }

        #[test]
        fn test_operator_substring_inside_quotes_still_splits() {
            // Literal-substring splitting applies inside quoted operands too.
            assert_eq!(
                syntax_error(r#"{% if x == "a and b" %}{% endif %}"#),
                r#"'if' statement improperly formatted: if x == "a and b""#
            );
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn test_no_arguments() {
            assert_eq!(
                syntax_error("{% if %}{% endif %}"),
                "'if' statement requires at least one argument: if"
            );
        }

        #[test]
        fn test_mixed_operators() {
            assert_eq!(
                syntax_error("{% if x and y or z %}{% endif %}"),
                "'if' tags can't mix 'and' and 'or': if x and y or z"
            );
        }

        #[test]
        fn test_improperly_formatted() {
            assert_eq!(
                syntax_error("{% if not a b %}{% endif %}"),
                "'if' statement improperly formatted: if not a b"
            );
        }

        #[test]
        fn test_expected_not() {
            assert_eq!(
                syntax_error("{% if a b %}{% endif %}"),
                "Expected 'not' in if statement: if a b"
            );
        }

        #[test]
        fn test_unknown_filter_in_term() {
            assert_eq!(
                parse("{% if a|nope %}{% endif %}").unwrap_err(),
                TemplateError::InvalidFilter("nope".to_string())
            );
        }
    }

    mod evaluation {
        use super::*;

        thread_local! {
            static CALLS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
        }

        fn counted(value: &Value, _arg: Option<&Value>) -> Result<Value, String> {
            CALLS.with(|calls| calls.set(calls.get() + 1));
            Ok(value.clone())
        }

        fn engine() -> Engine {
            let mut filters = FilterLibrary::builtins();
            filters.register("counted", counted);
            Engine::default().with_filters(filters)
        }

        fn render(source: &str, vars: &[(&str, bool)]) -> (String, usize) {
            let template = engine().compile(source).unwrap();
            let mut context = Context::new();
            for (name, value) in vars {
                context.insert(*name, *value);
            }
            CALLS.with(|calls| calls.set(0));
            let out = template.render(&mut context).unwrap();
            (out, CALLS.with(std::cell::Cell::get))
        }

        #[test]
        fn test_or_short_circuits() {
            let source = "{% if a|counted or b|counted %}T{% else %}F{% endif %}";
            assert_eq!(render(source, &[("a", true), ("b", false)]), ("T".to_string(), 1));
            assert_eq!(render(source, &[("a", false), ("b", true)]), ("T".to_string(), 2));
            assert_eq!(render(source, &[("a", false), ("b", false)]), ("F".to_string(), 2));
        }

        #[test]
        fn test_and_short_circuits() {
            let source = "{% if a|counted and b|counted %}T{% else %}F{% endif %}";
            assert_eq!(render(source, &[("a", false), ("b", true)]), ("F".to_string(), 1));
            assert_eq!(render(source, &[("a", true), ("b", false)]), ("F".to_string(), 2));
            assert_eq!(render(source, &[("a", true), ("b", true)]), ("T".to_string(), 2));
        }

        #[test]
        fn test_negated_and() {
            let source = "{% if not a and not b %}T{% else %}F{% endif %}";
            assert_eq!(render(source, &[]).0, "T");
            assert_eq!(render(source, &[("a", true)]).0, "F");
            assert_eq!(render(source, &[("b", true)]).0, "F");
        }
    }
}
