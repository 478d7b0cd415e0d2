//! Deferred element descriptors.
//!
//! A [`Locator`] is plain data describing how to find an element: an optional
//! chain of iframes to enter, a chain of queries each evaluated inside the
//! previous matches, and an optional index. Nothing is resolved until a
//! [`Session`](crate::Session) acts on it, so the same accessor can be called
//! again after the document re-renders.
//!
//! Strategies in order of preference:
//!
//! 1. [`Locator::test_id`] when the element carries a `data-testid`;
//! 2. [`Locator::role`] / [`Locator::role_named`] (accessible role and name);
//! 3. [`Locator::css`] / [`Locator::xpath`] for structure or attribute patterns,
//!    e.g. third-party payment widgets.

use serde::Serialize;
use std::fmt;

/// How an accessible name is compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum NameMatch {
    /// Case-insensitive substring.
    Substring(String),
    Exact(String),
    /// JavaScript-compatible regular expression source.
    Pattern(String),
}

impl fmt::Display for NameMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameMatch::Substring(s) => write!(f, "{:?}", s),
            NameMatch::Exact(s) => write!(f, "{:?} exact", s),
            NameMatch::Pattern(s) => write!(f, "/{}/", s),
        }
    }
}

/// One query step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Query {
    TestId { value: String },
    Role { role: String, name: Option<NameMatch> },
    Css { value: String },
    #[serde(rename = "xpath")]
    XPath { value: String },
    /// Keep only the n-th of the current matches (negative counts from the end).
    Nth { index: i64 },
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::TestId { value } => write!(f, "test-id={}", value),
            Query::Role { role, name: None } => write!(f, "role={}", role),
            Query::Role {
                role,
                name: Some(name),
            } => write!(f, "role={}[name={}]", role, name),
            Query::Css { value } => write!(f, "css={}", value),
            Query::XPath { value } => {
                let compact = value.split_whitespace().collect::<Vec<_>>().join(" ");
                write!(f, "xpath={}", compact)
            }
            Query::Nth { index } => write!(f, "nth={}", index),
        }
    }
}

/// A deferred, re-resolvable element reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Locator {
    frames: Vec<String>,
    chain: Vec<Query>,
}

impl Locator {
    fn from_query(query: Query) -> Self {
        Self {
            frames: Vec::new(),
            chain: vec![query],
        }
    }

    /// Element whose `data-testid` equals `id`.
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::from_query(Query::TestId { value: id.into() })
    }

    /// Any element with the given ARIA role (explicit or implicit).
    pub fn role(role: impl Into<String>) -> Self {
        Self::from_query(Query::Role {
            role: role.into(),
            name: None,
        })
    }

    /// Element with the given role whose accessible name matches.
    pub fn role_named(role: impl Into<String>, name: NameMatch) -> Self {
        Self::from_query(Query::Role {
            role: role.into(),
            name: Some(name),
        })
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_query(Query::Css {
            value: selector.into(),
        })
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::from_query(Query::XPath { value: expr.into() })
    }

    /// Narrow to CSS matches inside this locator's matches.
    pub fn locator(mut self, selector: impl Into<String>) -> Self {
        self.chain.push(Query::Css {
            value: selector.into(),
        });
        self
    }

    /// Narrow to role matches inside this locator's matches.
    pub fn get_by_role(mut self, role: impl Into<String>, name: Option<NameMatch>) -> Self {
        self.chain.push(Query::Role {
            role: role.into(),
            name,
        });
        self
    }

    /// Pick the n-th match (negative counts from the end).
    pub fn nth(mut self, index: i64) -> Self {
        self.chain.push(Query::Nth { index });
        self
    }

    pub fn first(self) -> Self {
        self.nth(0)
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn chain(&self) -> &[Query] {
        &self.chain
    }

    /// Whether the final step picks a single match.
    pub fn is_single(&self) -> bool {
        matches!(self.chain.last(), Some(Query::Nth { .. }))
    }

    /// Whether this locator is resolved inside an iframe.
    pub fn is_framed(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Whether any query in the chain mentions `needle` (test ids, selectors,
    /// role names).
    pub fn references(&self, needle: &str) -> bool {
        self.chain.iter().any(|q| match q {
            Query::TestId { value } | Query::Css { value } | Query::XPath { value } => {
                value.contains(needle)
            }
            Query::Role { role, name } => {
                role.contains(needle)
                    || matches!(
                        name,
                        Some(
                            NameMatch::Substring(s)
                                | NameMatch::Exact(s)
                                | NameMatch::Pattern(s)
                        ) if s.contains(needle)
                    )
            }
            Query::Nth { .. } => false,
        })
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            write!(f, "frame[{}] >> ", frame)?;
        }
        for (i, query) in self.chain.iter().enumerate() {
            if i > 0 {
                f.write_str(" >> ")?;
            }
            write!(f, "{}", query)?;
        }
        Ok(())
    }
}

/// An iframe boundary, matched by CSS on the `<iframe>` element.
///
/// Payment providers generate frame ids and URLs, so the selector is usually
/// a partial match such as `iframe[id*="cardNumber"][src*="payment.example.com"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameLocator {
    frames: Vec<String>,
}

impl FrameLocator {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            frames: vec![selector.into()],
        }
    }

    /// Enter a nested iframe.
    pub fn frame(mut self, selector: impl Into<String>) -> Self {
        self.frames.push(selector.into());
        self
    }

    /// CSS query resolved against this frame's document only.
    pub fn locator(&self, selector: impl Into<String>) -> Locator {
        Locator {
            frames: self.frames.clone(),
            ..Locator::css(selector)
        }
    }

    /// Role query resolved against this frame's document only.
    pub fn get_by_role(&self, role: impl Into<String>, name: Option<NameMatch>) -> Locator {
        Locator {
            frames: self.frames.clone(),
            ..Locator::from_query(Query::Role {
                role: role.into(),
                name,
            })
        }
    }

    pub fn selectors(&self) -> &[String] {
        &self.frames
    }
}
