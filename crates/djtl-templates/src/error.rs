use serde::Serialize;
use thiserror::Error;

/// Errors raised while turning template source into a node tree.
///
/// Every variant is fatal to the parse that produced it; the driver never
/// tries to recover and keep going.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
pub enum TemplateError {
    /// Tag Syntax Error
    ///
    /// A tag factory rejected the arguments of its tag. The message names the
    /// raw tag content or the rule that was broken, e.g.
    ///
    /// ```django
    /// {% for x %}
    /// {% if a and b or c %}
    /// ```
    #[error("{0}")]
    TagSyntax(String),

    /// A block tag with no registered factory, or a closing tag with no opener.
    #[error("Invalid block tag on line {line}: '{name}'")]
    InvalidBlockTag { name: String, line: usize },

    /// The token stream ended while a block was still waiting for its closer.
    #[error("Unclosed tag '{tag}': looking for one of: {}", expected.join(", "))]
    UnclosedTag { tag: String, expected: Vec<String> },

    /// A `{%`, `{{` or `{#` that never saw its closing delimiter.
    #[error("Unclosed construct on line {line}: {content}")]
    UnclosedConstruct { content: String, line: usize },

    #[error("Empty block tag on line {line}")]
    EmptyTag { line: usize },

    #[error("Invalid filter: '{0}'")]
    InvalidFilter(String),

    #[error("Could not parse variable expression: '{0}'")]
    MalformedVariable(String),
}

impl TemplateError {
    pub fn tag_syntax(message: impl Into<String>) -> Self {
        Self::TagSyntax(message.into())
    }
}

/// Errors raised while rendering an already parsed template.
///
/// Nodes never produce these themselves; they only pass along what the
/// expression layer or the output sink reported.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Filter '{filter}' failed: {message}")]
    Filter { filter: String, message: String },

    #[error("Failed to write rendered output")]
    Write(#[from] std::fmt::Error),
}
