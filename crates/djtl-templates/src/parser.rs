use std::sync::Arc;

use crate::engine::Engine;
use crate::error::TemplateError;
use crate::expression::FilterExpression;
use crate::nodelist::Node;
use crate::nodelist::NodeList;
use crate::nodelist::VariableNode;
use crate::tokens::Token;
use crate::tokens::TokenKind;

/// Recursive-descent driver over a token stream.
///
/// Block tags are handed to the factory registered for their name; factories
/// call back into [`Parser::parse_until`] to collect their bodies.
pub struct Parser<'e> {
    engine: &'e Engine,
    tokens: Vec<Token>,
    current: usize,
    if_invalid: Arc<str>,
}

impl<'e> Parser<'e> {
    #[must_use]
    pub fn new(tokens: Vec<Token>, engine: &'e Engine) -> Self {
        Self {
            engine,
            tokens,
            current: 0,
            if_invalid: Arc::from(engine.settings().string_if_invalid.as_str()),
        }
    }

    /// Parse the whole stream into a top-level node list.
    pub fn parse(&mut self) -> Result<NodeList, TemplateError> {
        self.parse_nodes(None, &[])
    }

    /// Parse nodes until a block tag named in `boundaries` is next.
    ///
    /// The boundary token is left in the stream for the caller to inspect with
    /// [`Parser::peek_token`] and consume with [`Parser::next_token`]. `tag` is
    /// the opening tag, reported if the stream ends first.
    pub fn parse_until(&mut self, tag: &str, boundaries: &[&str]) -> Result<NodeList, TemplateError> {
        self.parse_nodes(Some(tag), boundaries)
    }

    fn parse_nodes(
        &mut self,
        opener: Option<&str>,
        boundaries: &[&str],
    ) -> Result<NodeList, TemplateError> {
        let mut nodelist = NodeList::default();

        while let Some(token) = self.tokens.get(self.current).cloned() {
            match token.kind() {
                TokenKind::Text => {
                    self.current += 1;
                    nodelist.push(Node::Text(token.content().to_string()));
                }
                TokenKind::Comment => {
                    self.current += 1;
                }
                TokenKind::Variable => {
                    self.current += 1;
                    let expression = self.compile_filter(token.content())?;
                    nodelist.push(Node::Variable(VariableNode::new(
                        expression,
                        Arc::clone(&self.if_invalid),
                    )));
                }
                TokenKind::Error => {
                    return Err(TemplateError::UnclosedConstruct {
                        content: token.content().to_string(),
                        line: token.line(),
                    });
                }
                TokenKind::Block => {
                    let Some(name) = token.tag_name() else {
                        return Err(TemplateError::EmptyTag { line: token.line() });
                    };
                    if boundaries.contains(&name) {
                        return Ok(nodelist);
                    }
                    self.current += 1;

                    let factory =
                        self.engine
                            .tags()
                            .get(name)
                            .ok_or_else(|| TemplateError::InvalidBlockTag {
                                name: name.to_string(),
                                line: token.line(),
                            })?;
                    let node = factory(token.content(), self)?;
                    tracing::debug!("Parsed '{}' tag on line {}", name, token.line());
                    nodelist.push(node);
                }
            }
        }

        match opener {
            Some(tag) => Err(TemplateError::UnclosedTag {
                tag: tag.to_string(),
                expected: boundaries.iter().map(ToString::to_string).collect(),
            }),
            None => Ok(nodelist),
        }
    }

    /// The next unconsumed token, if any.
    #[must_use]
    pub fn peek_token(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.current).cloned()?;
        self.current += 1;
        Some(token)
    }

    /// Compile a filter expression against the engine's filter library.
    pub fn compile_filter(&self, text: &str) -> Result<FilterExpression, TemplateError> {
        FilterExpression::new(text, self.engine.filters())
    }
}
