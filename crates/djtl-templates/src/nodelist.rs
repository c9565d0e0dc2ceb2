use std::fmt::Write;
use std::sync::Arc;

use crate::context::Context;
use crate::error::RenderError;
use crate::expression::FilterExpression;
use crate::templatetags::ForNode;
use crate::templatetags::IfNode;

/// One renderable unit of a parsed template.
#[derive(Clone, Debug)]
pub enum Node {
    Text(String),
    Variable(VariableNode),
    For(ForNode),
    If(IfNode),
}

impl Node {
    pub fn render(&self, context: &mut Context, output: &mut dyn Write) -> Result<(), RenderError> {
        match self {
            Node::Text(text) => output.write_str(text).map_err(RenderError::from),
            Node::Variable(variable) => variable.render(context, output),
            Node::For(node) => node.render(context, output),
            Node::If(node) => node.render(context, output),
        }
    }
}

/// `{{ expression }}`
#[derive(Clone, Debug)]
pub struct VariableNode {
    expression: FilterExpression,
    if_invalid: Arc<str>,
}

impl VariableNode {
    #[must_use]
    pub fn new(expression: FilterExpression, if_invalid: Arc<str>) -> Self {
        Self {
            expression,
            if_invalid,
        }
    }

    #[must_use]
    pub fn expression(&self) -> &FilterExpression {
        &self.expression
    }

    fn render(&self, context: &mut Context, output: &mut dyn Write) -> Result<(), RenderError> {
        let value = self.expression.resolve(context)?;
        if value.is_none() {
            output.write_str(&self.if_invalid)?;
        } else {
            write!(output, "{value}")?;
        }
        Ok(())
    }
}

/// An ordered run of nodes.
///
/// Rendering is a plain left-to-right fold over the children against the same
/// context; a node list never opens a scope of its own.
#[derive(Clone, Debug, Default)]
pub struct NodeList {
    nodes: Vec<Node>,
}

impl NodeList {
    #[must_use]
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn render(&self, context: &mut Context, output: &mut dyn Write) -> Result<(), RenderError> {
        for node in &self.nodes {
            node.render(context, output)?;
        }
        Ok(())
    }
}

impl FromIterator<Node> for NodeList {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
