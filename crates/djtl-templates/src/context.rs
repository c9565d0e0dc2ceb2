//! Variable scopes active while a template renders.
//!
//! A [`Context`] is a stack of frames. Lookups walk from the innermost frame
//! outwards, so a name bound by a loop shadows the same name further out
//! until the loop's frame is popped.
//!
//! Nodes that introduce bindings should go through [`Context::scope`], which
//! hands back a guard that pops its frame when dropped. That keeps the stack
//! balanced on every exit path, including `?` propagation of a render error.

use std::collections::HashMap;
use std::ops::Deref;
use std::ops::DerefMut;

use crate::value::Value;

#[derive(Debug, Clone)]
pub struct Context {
    /// Last element is the innermost scope.
    frames: Vec<HashMap<String, Value>>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a context with one empty root frame.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    /// Push a new innermost frame.
    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Pop the innermost frame.
    ///
    /// The root frame is never popped; returns `false` if that was attempted.
    pub fn pop(&mut self) -> bool {
        if self.frames.len() > 1 {
            self.frames.pop();
            true
        } else {
            false
        }
    }

    /// Push a frame that is popped again when the returned guard drops.
    pub fn scope(&mut self) -> ScopeGuard<'_> {
        self.push();
        ScopeGuard { context: self }
    }

    /// Bind `name` in the innermost frame.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), value.into());
        }
    }

    /// Find `name`, searching from the innermost frame outwards.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Number of frames, root included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl From<HashMap<String, Value>> for Context {
    fn from(root: HashMap<String, Value>) -> Self {
        Self { frames: vec![root] }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Context {
    fn from(root: serde_json::Map<String, serde_json::Value>) -> Self {
        root.into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect::<HashMap<_, _>>()
            .into()
    }
}

/// A pushed frame, popped on drop.
pub struct ScopeGuard<'a> {
    context: &'a mut Context,
}

impl Deref for ScopeGuard<'_> {
    type Target = Context;

    fn deref(&self) -> &Context {
        self.context
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Context {
        self.context
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.context.pop();
    }
}
