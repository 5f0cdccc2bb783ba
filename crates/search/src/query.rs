//! Query parser
//!
//! Turns a free-text query into a [`QueryPlan`]: an ordered list of
//! synonym groups (AND-ed together, each OR-ing its terms) plus a set of
//! excluded terms.
//!
//! # Grammar
//!
//! Tokens are runs of two or more letters/apostrophes, optionally
//! prefixed by a single `+` or `-`:
//!
//! - `-term` excludes the term from the results
//! - `+term` joins the term to the currently open synonym group
//! - a bare term closes the open group (if any) and opens a new one
//!
//! So `connect +connection chat` yields `[{connect, connection}, {chat}]`.
//! Tokens that normalize to fewer than 2 characters or to a stop word are
//! dropped along with their prefix. The parser never fails.

use std::collections::hash_set;
use std::collections::HashSet;
use std::mem;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::tokenizer::normalize;

static QUERY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("[+-]?[a-z']{2,}").expect("query pattern is a valid regex"));

/// Terms combined by union during evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymGroup {
    terms: HashSet<String>,
}

impl SynonymGroup {
    fn with_term(term: String) -> Self {
        SynonymGroup {
            terms: HashSet::from([term]),
        }
    }

    /// Terms of the group, unordered
    pub fn terms(&self) -> &HashSet<String> {
        &self.terms
    }

    /// Terms of the group in lexical order
    pub fn sorted_terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.terms.iter().map(String::as_str).collect();
        terms.sort_unstable();
        terms
    }

    /// Whether the group holds `term`
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    /// Number of terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if the group has no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate over the terms
    pub fn iter(&self) -> hash_set::Iter<'_, String> {
        self.terms.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for SynonymGroup {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        SynonymGroup {
            terms: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Parsed query: groups to intersect, terms to subtract
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPlan {
    groups: Vec<SynonymGroup>,
    excluded: HashSet<String>,
}

impl QueryPlan {
    /// Build a plan directly from its parts
    pub fn new(groups: Vec<SynonymGroup>, excluded: HashSet<String>) -> Self {
        QueryPlan { groups, excluded }
    }

    /// Synonym groups in the order they were opened
    pub fn groups(&self) -> &[SynonymGroup] {
        &self.groups
    }

    /// Excluded terms, unordered
    pub fn excluded(&self) -> &HashSet<String> {
        &self.excluded
    }

    /// True if there is nothing to include
    ///
    /// Such a plan matches no documents, whatever it excludes.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Consume the plan, yielding groups and exclusions
    pub fn into_parts(self) -> (Vec<SynonymGroup>, HashSet<String>) {
        (self.groups, self.excluded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    Bare,
    Join,
    Exclude,
}

#[derive(Debug)]
enum ParseState {
    Idle,
    Collecting(SynonymGroup),
}

#[derive(Debug)]
struct PlanBuilder {
    state: ParseState,
    groups: Vec<SynonymGroup>,
    excluded: HashSet<String>,
}

impl PlanBuilder {
    fn new() -> Self {
        PlanBuilder {
            state: ParseState::Idle,
            groups: Vec::new(),
            excluded: HashSet::new(),
        }
    }

    fn accept(&mut self, prefix: Prefix, term: &str) {
        if prefix == Prefix::Exclude {
            self.excluded.insert(term.to_string());
            return;
        }
        // Once excluded, a term never joins a group
        if self.excluded.contains(term) {
            return;
        }

        if prefix == Prefix::Join {
            if let ParseState::Collecting(group) = &mut self.state {
                group.terms.insert(term.to_string());
                return;
            }
        }
        // Bare terms close the open group; a join with nothing open starts one
        self.flush();
        self.state = ParseState::Collecting(SynonymGroup::with_term(term.to_string()));
    }

    fn flush(&mut self) {
        if let ParseState::Collecting(group) = mem::replace(&mut self.state, ParseState::Idle) {
            if !group.is_empty() {
                self.groups.push(group);
            }
        }
    }

    fn finish(mut self) -> QueryPlan {
        self.flush();
        QueryPlan {
            groups: self.groups,
            excluded: self.excluded,
        }
    }
}

/// Parse a query string into a plan
///
/// # Example
///
/// ```
/// use sift_search::query::parse;
///
/// let plan = parse("connect +connection chat -proxy");
/// assert_eq!(plan.groups().len(), 2);
/// assert!(plan.excluded().contains("proxy"));
/// ```
pub fn parse(query: &str) -> QueryPlan {
    let lowered = query.to_lowercase();
    let mut builder = PlanBuilder::new();

    for m in QUERY_RE.find_iter(&lowered) {
        let token = m.as_str();
        let (prefix, word) = match token.as_bytes()[0] {
            b'+' => (Prefix::Join, &token[1..]),
            b'-' => (Prefix::Exclude, &token[1..]),
            _ => (Prefix::Bare, token),
        };
        if let Some(term) = normalize(word) {
            builder.accept(prefix, term);
        }
    }

    let plan = builder.finish();
    debug!(
        target: "sift::query",
        groups = plan.groups.len(),
        excluded = plan.excluded.len(),
        "Query parsed"
    );
    plan
}
