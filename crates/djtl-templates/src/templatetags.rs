//! Block tags and the registry the parser dispatches through.

mod for_node;
mod if_node;

use std::collections::HashMap;

pub use for_node::ForNode;
pub use if_node::IfNode;
pub use if_node::IfTerm;
pub use if_node::LinkType;

use crate::error::TemplateError;
use crate::nodelist::Node;
use crate::parser::Parser;

/// Builds a node from the raw content of a block tag (tag name included).
pub type TagFactory = fn(&str, &mut Parser<'_>) -> Result<Node, TemplateError>;

#[derive(Clone, Debug)]
pub struct TagLibrary {
    tags: HashMap<String, TagFactory>,
}

impl Default for TagLibrary {
    fn default() -> Self {
        Self::builtins()
    }
}

impl TagLibrary {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tags: HashMap::new(),
        }
    }

    #[must_use]
    pub fn builtins() -> Self {
        let mut library = Self::empty();
        library.register("for", for_node::parse_for);
        library.register("if", if_node::parse_if);
        library
    }

    pub fn register(&mut self, name: impl Into<String>, factory: TagFactory) {
        self.tags.insert(name.into(), factory);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<TagFactory> {
        self.tags.get(name).copied()
    }
}
