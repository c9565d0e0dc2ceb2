//! Compiled variable references: an operand followed by a filter chain.
//!
//! `user.name|default:"Guest"|upper` compiles once, at parse time, into a
//! [`FilterExpression`] that can then be resolved against any number of
//! contexts. Unknown filters are rejected while compiling; a filter that fails
//! while rendering surfaces as [`RenderError::Filter`].

use std::fmt;

use crate::context::Context;
use crate::error::RenderError;
use crate::error::TemplateError;
use crate::filters::FilterFn;
use crate::filters::FilterLibrary;
use crate::quotes::for_each_unquoted;
use crate::value::Value;

#[derive(Clone, Debug, PartialEq)]
enum Operand {
    Literal(Value),
    Variable(Vec<String>),
}

impl Operand {
    fn parse(text: &str, source: &str) -> Result<Self, TemplateError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TemplateError::MalformedVariable(source.to_string()));
        }

        if let Some(literal) = parse_string_literal(text) {
            return Ok(Operand::Literal(Value::String(literal)));
        }

        match text {
            "True" => return Ok(Operand::Literal(Value::Bool(true))),
            "False" => return Ok(Operand::Literal(Value::Bool(false))),
            "None" => return Ok(Operand::Literal(Value::None)),
            _ => {}
        }

        if text.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+') {
            if let Ok(int) = text.parse::<i64>() {
                return Ok(Operand::Literal(Value::Int(int)));
            }
            if let Ok(float) = text.parse::<f64>() {
                return Ok(Operand::Literal(Value::Float(float)));
            }
            return Err(TemplateError::MalformedVariable(source.to_string()));
        }

        let segments: Vec<String> = text.split('.').map(str::to_string).collect();
        if segments
            .iter()
            .any(|s| s.is_empty() || s.contains(char::is_whitespace) || s.contains(['"', '\'']))
        {
            return Err(TemplateError::MalformedVariable(source.to_string()));
        }
        Ok(Operand::Variable(segments))
    }

    fn resolve(&self, context: &Context) -> Value {
        match self {
            Operand::Literal(value) => value.clone(),
            Operand::Variable(segments) => {
                let Some((head, rest)) = segments.split_first() else {
                    return Value::None;
                };
                let root = context.lookup(head).cloned().unwrap_or_default();
                rest.iter().fold(root, |value, segment| value.get_attr(segment))
            }
        }
    }
}

/// Strip matching quotes and resolve backslash escapes.
fn parse_string_literal(text: &str) -> Option<String> {
    let quote = text.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    if text.len() < 2 || !text.ends_with(quote) {
        return None;
    }

    let inner = &text[1..text.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(ch);
        }
    }
    Some(out)
}

#[derive(Clone, Debug)]
struct Filter {
    name: String,
    func: FilterFn,
    arg: Option<Operand>,
}

#[derive(Clone, Debug)]
pub struct FilterExpression {
    source: String,
    operand: Operand,
    filters: Vec<Filter>,
}

impl FilterExpression {
    /// Compile `text`, checking every filter name against `library`.
    pub fn new(text: &str, library: &FilterLibrary) -> Result<Self, TemplateError> {
        let mut cuts = Vec::new();
        for_each_unquoted(
            text,
            |ch| ch == '|',
            |idx| {
                cuts.push(idx);
                false
            },
        );

        let mut pieces = Vec::with_capacity(cuts.len() + 1);
        let mut begin = 0;
        for cut in cuts {
            pieces.push(&text[begin..cut]);
            begin = cut + 1;
        }
        pieces.push(&text[begin..]);

        let mut pieces = pieces.into_iter();
        let operand = Operand::parse(pieces.next().unwrap_or_default(), text)?;

        let filters = pieces
            .map(|piece| Self::compile_filter(piece, text, library))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: text.trim().to_string(),
            operand,
            filters,
        })
    }

    fn compile_filter(
        piece: &str,
        source: &str,
        library: &FilterLibrary,
    ) -> Result<Filter, TemplateError> {
        let piece = piece.trim();

        let mut colon = None;
        for_each_unquoted(
            piece,
            |ch| ch == ':',
            |idx| {
                colon = Some(idx);
                true
            },
        );

        let (name, arg) = match colon {
            Some(idx) => (piece[..idx].trim(), Some(&piece[idx + 1..])),
            None => (piece, None),
        };

        if name.is_empty() {
            return Err(TemplateError::InvalidFilter(source.trim().to_string()));
        }
        let func = library
            .get(name)
            .ok_or_else(|| TemplateError::InvalidFilter(name.to_string()))?;
        let arg = arg.map(|a| Operand::parse(a, source)).transpose()?;

        Ok(Filter {
            name: name.to_string(),
            func,
            arg,
        })
    }

    /// The expression text as written in the template.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Resolve the operand and run it through the filter chain.
    ///
    /// Missing variables and attributes resolve to [`Value::None`].
    pub fn resolve(&self, context: &Context) -> Result<Value, RenderError> {
        let mut value = self.operand.resolve(context);
        for filter in &self.filters {
            let arg = filter.arg.as_ref().map(|a| a.resolve(context));
            value = (filter.func)(&value, arg.as_ref()).map_err(|message| RenderError::Filter {
                filter: filter.name.clone(),
                message,
            })?;
        }
        Ok(value)
    }

    pub fn is_true(&self, context: &Context) -> Result<bool, RenderError> {
        Ok(self.resolve(context)?.is_truthy())
    }

    pub fn to_sequence(&self, context: &Context) -> Result<Vec<Value>, RenderError> {
        Ok(self.resolve(context)?.into_sequence())
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
