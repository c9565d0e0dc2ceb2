//! Django template parsing and rendering.
//!
//! ## Architecture
//!
//! The system uses a multi-stage pipeline:
//!
//! 1. **Lexing**: Template text is tokenized into Django constructs (tags, variables, text)
//! 2. **Parsing**: The [`Parser`] walks the tokens and hands each block tag to the
//!    factory registered for its name, which parses its own body recursively
//! 3. **Rendering**: The resulting [`NodeList`] is rendered against a [`Context`]
//!
//! ## Key Components
//!
//! - [`context`]: Variable scopes with shadowing and guarded push/pop
//! - [`expression`]: Compiled `variable.path|filter:arg` references
//! - [`templatetags`]: The `{% for %}` and `{% if %}` tags and the tag registry
//! - [`nodelist`]: Node definitions and rendering
//!
//! ## Example
//!
//! ```
//! use djtl_templates::{Context, Engine};
//!
//! let engine = Engine::default();
//! let template = engine
//!     .compile("{% for x in items reversed %}{{ x }}{% if not forloop.last %},{% endif %}{% endfor %}")
//!     .unwrap();
//!
//! let mut context = Context::new();
//! context.insert("items", vec![1_i64, 2, 3]);
//! assert_eq!(template.render(&mut context).unwrap(), "3,2,1");
//! ```

pub mod context;
mod engine;
mod error;
pub mod expression;
pub mod filters;
mod lexer;
pub mod nodelist;
mod parser;
mod quotes;
pub mod templatetags;
mod tokens;
mod value;

pub use context::Context;
pub use djtl_conf::Settings;
pub use engine::Engine;
pub use engine::Template;
pub use error::RenderError;
pub use error::TemplateError;
pub use expression::FilterExpression;
pub use filters::FilterLibrary;
pub use lexer::Lexer;
pub use nodelist::Node;
pub use nodelist::NodeList;
pub use parser::Parser;
pub use quotes::smart_split;
pub use templatetags::TagLibrary;
pub use tokens::Token;
pub use tokens::TokenKind;
pub use value::Value;
