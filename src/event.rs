use crate::{definition::Definition, set::Set, Occurrence, Occurs, Window};

/// A parent that owns its definitions and has no times of its own.
///
/// Its occurrences are the merged occurrences of every definition, in the
/// order the definitions were added when two start together.
#[derive(Debug, Clone)]
pub struct Event<P = ()> {
    definitions: Vec<Definition<P>>,
}

impl<P> Default for Event<P> {
    fn default() -> Self {
        Event {
            definitions: Vec::new(),
        }
    }
}

impl<P> FromIterator<Definition<P>> for Event<P> {
    fn from_iter<I: IntoIterator<Item = Definition<P>>>(definitions: I) -> Self {
        Event {
            definitions: definitions.into_iter().collect(),
        }
    }
}

impl<P> Event<P> {
    pub fn new() -> Self {
        Event::default()
    }

    pub fn definition(mut self, definition: Definition<P>) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn add(&mut self, definition: Definition<P>) {
        self.definitions.push(definition);
    }

    /// Drops every definition `keep` rejects.
    pub fn retain(&mut self, keep: impl FnMut(&Definition<P>) -> bool) {
        self.definitions.retain(keep);
    }

    pub fn definitions(&self) -> &[Definition<P>] {
        &self.definitions
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl<P> Occurs for Event<P> {
    type Data = P;

    fn occurrences<'a>(&'a self, window: Window) -> impl Iterator<Item = Occurrence<'a, P>> + 'a
    where
        P: 'a,
    {
        self.definitions
            .iter()
            .collect::<Set<'a, Definition<P>>>()
            .occurrences(window)
    }
}
