use serde::{Deserialize, Serialize};

/// One declared value of an enumerated field
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Choice<C> {
    pub code: C,             // Persisted value
    pub name: String,        // Program-facing identifier, e.g. "VALID"
    pub label: String,       // User-facing text
}

/// Closed set of (code, name, label) triples for an enumerated field
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Enumeration<C> {
    entries: Vec<Choice<C>>,
}

impl<C> Default for Enumeration<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C: Clone + PartialEq> Enumeration<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style declaration of one entry
    pub fn with(mut self, code: C, name: &str, label: &str) -> Self {
        self.entries.push(Choice {
            code,
            name: name.to_string(),
            label: label.to_string(),
        });
        self
    }

    /// Declaration without a separate label; the name doubles as the label
    pub fn with_name(self, code: C, name: &str) -> Self {
        self.with(code, name, name)
    }

    /// Code for a symbolic name, e.g. `code("UNKNOWN")`
    pub fn code(&self, name: &str) -> Option<C> {
        self.entries
            .iter()
            .find(|choice| choice.name == name)
            .map(|choice| choice.code.clone())
    }

    pub fn name_of(&self, code: &C) -> Option<&str> {
        self.find(code).map(|choice| choice.name.as_str())
    }

    pub fn label_of(&self, code: &C) -> Option<&str> {
        self.find(code).map(|choice| choice.label.as_str())
    }

    pub fn contains(&self, code: &C) -> bool {
        self.find(code).is_some()
    }

    /// (code, label) pairs in declaration order, for rendering
    pub fn choices(&self) -> Vec<(C, String)> {
        self.entries
            .iter()
            .map(|choice| (choice.code.clone(), choice.label.clone()))
            .collect()
    }

    pub fn codes(&self) -> Vec<C> {
        self.entries.iter().map(|choice| choice.code.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Choice<C>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, code: &C) -> Option<&Choice<C>> {
        self.entries.iter().find(|choice| &choice.code == code)
    }
}

impl<'a, C: Clone + PartialEq> FromIterator<(C, &'a str, &'a str)> for Enumeration<C> {
    fn from_iter<I: IntoIterator<Item = (C, &'a str, &'a str)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Enumeration::new(), |acc, (code, name, label)| {
                acc.with(code, name, label)
            })
    }
}
