use std::collections::BTreeMap;
use std::fmt::Write;

use crate::context::Context;
use crate::error::RenderError;
use crate::error::TemplateError;
use crate::expression::FilterExpression;
use crate::nodelist::Node;
use crate::nodelist::NodeList;
use crate::parser::Parser;
use crate::quotes::smart_split;
use crate::value::Value;

const FORLOOP: &str = "forloop";
const PARENTLOOP: &str = "parentloop";

/// `{% for a, b in sequence [reversed] %} ... [{% empty %} ...] {% endfor %}`
pub(super) fn parse_for(content: &str, parser: &mut Parser<'_>) -> Result<Node, TemplateError> {
    let mut bits = smart_split(content);

    if bits.len() < 4 {
        return Err(TemplateError::tag_syntax(format!(
            "'for' statements should have at least four words: {content}"
        )));
    }
    bits.remove(0);

    let reversed = bits.last().is_some_and(|bit| bit == "reversed");
    if reversed {
        bits.pop();
    }

    let Some(sequence) = bits.pop() else {
        return Err(TemplateError::tag_syntax(format!(
            "'for' statements should use the form 'for x in y': {content}"
        )));
    };
    if bits.pop().as_deref() != Some("in") {
        return Err(TemplateError::tag_syntax(format!(
            "'for' statements should use the form 'for x in y': {content}"
        )));
    }

    let loop_vars: Vec<String> = bits
        .iter()
        .flat_map(|bit| bit.split(','))
        .filter(|var| !var.is_empty())
        .map(str::to_string)
        .collect();
    if loop_vars.is_empty() {
        return Err(TemplateError::tag_syntax(format!(
            "'for' tag received invalid argument: {content}"
        )));
    }

    let sequence = parser.compile_filter(&sequence)?;

    let body = parser.parse_until("for", &["empty", "endfor"])?;
    let empty_body = match parser.next_token() {
        Some(token) if token.tag_name() == Some("empty") => {
            let empty_body = parser.parse_until("for", &["endfor"])?;
            parser.next_token();
            empty_body
        }
        _ => NodeList::default(),
    };

    Ok(Node::For(ForNode {
        loop_vars,
        sequence,
        reversed,
        body,
        empty_body,
    }))
}

#[derive(Clone, Debug)]
pub struct ForNode {
    loop_vars: Vec<String>,
    sequence: FilterExpression,
    reversed: bool,
    body: NodeList,
    empty_body: NodeList,
}

impl ForNode {
    #[must_use]
    pub fn loop_vars(&self) -> &[String] {
        &self.loop_vars
    }

    #[must_use]
    pub fn sequence(&self) -> &FilterExpression {
        &self.sequence
    }

    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    #[must_use]
    pub fn body(&self) -> &NodeList {
        &self.body
    }

    #[must_use]
    pub fn empty_body(&self) -> &NodeList {
        &self.empty_body
    }

    pub fn render(&self, context: &mut Context, output: &mut dyn Write) -> Result<(), RenderError> {
        // Snapshot of the enclosing loop's record, taken before our frame exists.
        let parentloop = context.lookup(FORLOOP).cloned();

        let mut scope = context.scope();
        let items = self.sequence.to_sequence(&scope)?;

        if items.is_empty() {
            drop(scope);
            tracing::trace!("'{}' is empty, rendering fallback", self.sequence);
            return self.empty_body.render(context, output);
        }

        let len = items.len();
        tracing::trace!(
            "Iterating {} items of '{}' (reversed: {})",
            len,
            self.sequence,
            self.reversed
        );

        for i in 0..len {
            let index = if self.reversed { len - 1 - i } else { i };
            scope.insert(FORLOOP, loop_record(len, i, parentloop.as_ref()));
            self.bind_loop_vars(&mut scope, &items[index]);
            self.body.render(&mut scope, output)?;
        }

        Ok(())
    }

    fn bind_loop_vars(&self, context: &mut Context, item: &Value) {
        match (self.loop_vars.as_slice(), item.as_list()) {
            ([var], _) => context.insert(var.as_str(), item.clone()),
            (vars, Some(parts)) => {
                // Slots past the end of `parts` are bound to None, not left unbound.
                for (idx, var) in vars.iter().enumerate() {
                    context.insert(var.as_str(), parts.get(idx).cloned().unwrap_or_default());
                }
            }
            (vars, None) => {
                for var in vars {
                    context.insert(var.as_str(), item.get_attr(var));
                }
            }
        }
    }
}

/// The `forloop` record for iteration `i` of `len`.
///
/// Counters follow iteration order whether or not the loop is reversed.
fn loop_record(len: usize, i: usize, parentloop: Option<&Value>) -> Value {
    let mut record = BTreeMap::new();
    record.insert("counter0".to_string(), Value::from(i));
    record.insert("counter".to_string(), Value::from(i + 1));
    record.insert("revcounter".to_string(), Value::from(len - i));
    record.insert("revcounter0".to_string(), Value::from(len - i - 1));
    record.insert("first".to_string(), Value::Bool(i == 0));
    record.insert("last".to_string(), Value::Bool(i == len - 1));
    if let Some(parent) = parentloop {
        record.insert(PARENTLOOP.to_string(), parent.clone());
    }
    Value::Map(record)
}
