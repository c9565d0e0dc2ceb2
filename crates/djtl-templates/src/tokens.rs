use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Block,
    Comment,
    Error,
    Text,
    Variable,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Token {
    kind: TokenKind,
    content: String,
    line: usize,
    offset: usize,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, content: String, line: usize, offset: usize) -> Self {
        Self {
            kind,
            content,
            line,
            offset,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Inner content of the token. Delimiters are stripped and, for Django
    /// constructs, surrounding whitespace is trimmed.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// First word of a block token, e.g. `for` in `{% for x in xs %}`.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self.kind {
            TokenKind::Block => self.content.split_whitespace().next(),
            _ => None,
        }
    }

    /// Source form of the token, delimiters included.
    #[must_use]
    pub fn lexeme(&self) -> String {
        match self.kind {
            TokenKind::Block => format!("{{% {} %}}", self.content),
            TokenKind::Variable => format!("{{{{ {} }}}}", self.content),
            TokenKind::Comment => format!("{{# {} #}}", self.content),
            TokenKind::Error | TokenKind::Text => self.content.clone(),
        }
    }
}
