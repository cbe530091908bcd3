//! Needed-test enumeration
//!
//! Pairs every non-test snippet's expected test location with the test
//! functions that already exist and lists the locations nobody covers.

use crate::naming::TestLocation;
use crate::snippet::CodeSnippet;
use serde::Serialize;
use std::collections::HashSet;

/// A definition without a covering test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NeededTest<'a> {
    /// Where the test should be written
    pub location: &'a TestLocation,
    /// The definition to cover
    pub snippet: &'a CodeSnippet,
}

/// Index of expected and existing tests over a batch of snippets
#[derive(Debug, Default)]
pub struct TestIndex<'a> {
    expected: Vec<(&'a TestLocation, &'a CodeSnippet)>,
    existing: HashSet<(String, String)>,
}

impl<'a> TestIndex<'a> {
    /// Index `snippets`
    ///
    /// Snippets without a module path (extracted with no project root) and
    /// module snippets have no test location and are ignored.
    pub fn build<I>(snippets: I) -> Self
    where
        I: IntoIterator<Item = &'a CodeSnippet>,
    {
        let mut index = Self::default();
        for snippet in snippets {
            index.insert(snippet);
        }
        index
    }

    /// Add one snippet
    pub fn insert(&mut self, snippet: &'a CodeSnippet) {
        if snippet.is_test() {
            if let Ok(module) = snippet.module_path() {
                self.existing
                    .insert((module.to_string(), snippet.qualified_path().to_string()));
            }
        } else if let Some(location) = snippet.test_location() {
            self.expected.push((location, snippet));
        }
    }

    /// Number of existing test functions indexed
    #[inline]
    #[must_use]
    pub fn existing_count(&self) -> usize {
        self.existing.len()
    }

    /// Number of non-test snippets with an expected location
    #[inline]
    #[must_use]
    pub fn expected_count(&self) -> usize {
        self.expected.len()
    }

    /// A test with this exact module and identifier exists
    #[must_use]
    pub fn is_satisfied(&self, location: &TestLocation) -> bool {
        self.existing
            .contains(&(location.module_path.clone(), location.identifier.clone()))
    }

    /// Uncovered locations sorted by module path then identifier
    ///
    /// Equal locations keep their indexing order.
    #[must_use]
    pub fn needed(&self) -> Vec<NeededTest<'a>> {
        let mut needed: Vec<_> = self
            .expected
            .iter()
            .filter(|(location, _)| !self.is_satisfied(location))
            .map(|&(location, snippet)| NeededTest { location, snippet })
            .collect();
        needed.sort_by(|a, b| a.location.cmp(b.location));
        needed
    }
}

/// Uncovered locations of `snippets`, sorted
#[must_use]
pub fn needed_tests<'a, I>(snippets: I) -> Vec<NeededTest<'a>>
where
    I: IntoIterator<Item = &'a CodeSnippet>,
{
    TestIndex::build(snippets).needed()
}
