//! Fuzzy filtering of tree labels.
//!
//! A search term is matched greedily against a node name: every character of
//! the (whitespace-stripped, lowercased) term must be consumed, in order, by
//! the end of the name. A term of the form `scope/name` additionally requires
//! the node's parent to contain `scope` as a subsequence.

/// A run of characters in a label, either matched by the search term or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

/// A display name split into matched and unmatched runs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkedName {
    segments: Vec<Segment>,
}

impl MarkedName {
    /// A name with no markup
    pub fn plain(name: &str) -> Self {
        let mut marked = Self::default();
        for c in name.chars() {
            marked.push(c, false);
        }
        marked
    }

    fn push(&mut self, c: char, matched: bool) {
        match self.segments.last_mut() {
            Some(last) if last.matched == matched => last.text.push(c),
            _ => self.segments.push(Segment {
                text: c.to_string(),
                matched,
            }),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The name without markup
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn has_matches(&self) -> bool {
        self.segments.iter().any(|s| s.matched)
    }

    /// Only the characters that carry match emphasis
    pub fn matched_text(&self) -> String {
        self.segments
            .iter()
            .filter(|s| s.matched)
            .map(|s| s.text.as_str())
            .collect()
    }
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn normalize(term: &str) -> Vec<char> {
    term.chars().filter(|c| !c.is_whitespace()).map(fold).collect()
}

/// Case-insensitive subsequence test. An empty term matches everything.
pub fn is_fuzzy_match(term: &str, name: &str) -> bool {
    let pattern = normalize(term);
    let mut next = 0;

    for c in name.chars() {
        if next == pattern.len() {
            break;
        }
        if fold(c) == pattern[next] {
            next += 1;
        }
    }

    next == pattern.len()
}

/// Walk `name`, marking each character that consumes the next pattern
/// character. Fails unless the whole pattern is consumed.
fn mark_name(term: &str, name: &str) -> Option<MarkedName> {
    let pattern = normalize(term);
    let mut marked = MarkedName::default();
    let mut next = 0;

    for c in name.chars() {
        let is_match = next < pattern.len() && fold(c) == pattern[next];
        if is_match {
            next += 1;
        }
        marked.push(c, is_match);
    }

    (next == pattern.len()).then_some(marked)
}

/// Match a node against the search term.
///
/// `parent_name` is `None` for root (session) nodes. Roots are matched only
/// against the scope part of a `scope/name` term and pass unfiltered when
/// the term has no scope.
pub fn apply_fuzzy_markup(
    search_term: &str,
    parent_name: Option<&str>,
    name: &str,
) -> Option<MarkedName> {
    if search_term.is_empty() {
        return Some(MarkedName::plain(name));
    }

    let (scope, own) = match search_term.split_once('/') {
        Some((scope, own)) => (Some(scope), own),
        None => (None, search_term),
    };

    match parent_name {
        None => match scope {
            Some(scope) => mark_name(scope, name),
            None => Some(MarkedName::plain(name)),
        },
        Some(parent) => {
            if let Some(scope) = scope {
                if !parent.is_empty() && !is_fuzzy_match(scope, parent) {
                    return None;
                }
            }
            mark_name(own, name)
        }
    }
}
