use djtl_conf::Settings;

use crate::context::Context;
use crate::error::RenderError;
use crate::error::TemplateError;
use crate::filters::FilterLibrary;
use crate::lexer::Lexer;
use crate::nodelist::NodeList;
use crate::parser::Parser;
use crate::templatetags::TagLibrary;

/// Settings plus the tag and filter libraries templates are compiled with.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    settings: Settings,
    tags: TagLibrary,
    filters: FilterLibrary,
}

impl Engine {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: TagLibrary) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn with_filters(mut self, filters: FilterLibrary) -> Self {
        self.filters = filters;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn tags(&self) -> &TagLibrary {
        &self.tags
    }

    #[must_use]
    pub fn filters(&self) -> &FilterLibrary {
        &self.filters
    }

    /// Lex and parse `source` into a reusable [`Template`].
    pub fn compile(&self, source: &str) -> Result<Template, TemplateError> {
        let tokens = Lexer::new(source).tokenize();
        tracing::trace!("Lexed {} tokens", tokens.len());
        let nodelist = Parser::new(tokens, self).parse()?;
        Ok(Template { nodelist })
    }
}

/// A parsed template.
///
/// The node tree is immutable once built, so one template can be rendered
/// from several threads at once as long as each render has its own
/// [`Context`].
#[derive(Clone, Debug)]
pub struct Template {
    nodelist: NodeList,
}

impl Template {
    #[must_use]
    pub fn nodelist(&self) -> &NodeList {
        &self.nodelist
    }

    pub fn render(&self, context: &mut Context) -> Result<String, RenderError> {
        let mut output = String::new();
        self.render_to(context, &mut output)?;
        Ok(output)
    }

    pub fn render_to(
        &self,
        context: &mut Context,
        output: &mut dyn std::fmt::Write,
    ) -> Result<(), RenderError> {
        self.nodelist.render(context, output)
    }
}
