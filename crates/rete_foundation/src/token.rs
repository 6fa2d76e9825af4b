//! Tokens: ordered partial matches.

use std::fmt;
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::fact::{Fact, SlotKey};

/// An ordered sequence of facts, one per condition matched so far.
///
/// Tokens are persistent: [`Token::extended`] shares structure with the
/// token it extends, so every join can keep its own copy in O(1).
#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token(im::Vector<Fact>);

impl Token {
    /// Creates an empty token.
    #[must_use]
    pub fn new() -> Self {
        Self(im::Vector::new())
    }

    /// Returns the number of facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the token holds no facts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets a fact by position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Fact> {
        self.0.get(index)
    }

    /// Returns the most recently appended fact.
    #[must_use]
    pub fn last(&self) -> Option<&Fact> {
        self.0.last()
    }

    /// Returns a new token with `fact` appended.
    #[must_use]
    pub fn extended(&self, fact: Fact) -> Self {
        let mut next = self.0.clone();
        next.push_back(fact);
        Self(next)
    }

    /// Returns an iterator over the facts in match order.
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.0.iter()
    }

    /// Returns the first fact with the given attribute.
    #[must_use]
    pub fn find(&self, attribute: &str) -> Option<&Fact> {
        self.0.iter().find(|f| f.attribute.as_str() == attribute)
    }

    /// Returns true if any fact in the token occupies `slot`.
    #[must_use]
    pub fn contains_slot(&self, slot: &SlotKey) -> bool {
        self.0.iter().any(|f| f.occupies(slot))
    }

    /// Returns the slots of every fact in the token.
    pub fn slots(&self) -> impl Iterator<Item = SlotKey> + '_ {
        self.0.iter().map(Fact::slot)
    }
}

impl Index<usize> for Token {
    type Output = Fact;

    fn index(&self, index: usize) -> &Fact {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a Token {
    type Item = &'a Fact;
    type IntoIter = im::vector::Iter<'a, Fact>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Fact> for Token {
    fn from_iter<I: IntoIterator<Item = Fact>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, fact) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{fact}")?;
        }
        Ok(())
    }
}
