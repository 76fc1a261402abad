//! Textual specifier grammar: import paths, unqualified names and fullnames.
//!
//! ```text
//! import-path      = ident *( "/" ident )
//! unqualified-name = ident [ "::" ident ]
//! qualified-name   = import-path ":" unqualified-name
//! ident            = 1*(alpha / digit / "_")    ; no leading digit
//! ```
//!
//! Parsing rejects empty components, empty segments, and owner/member splits
//! with empty halves. Formatting is lossless: `parse(format(x)) == x`.

use std::fmt;

fn is_valid_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `head[/segment]*`. Identifies a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportPath {
    segments: Vec<String>,
}

impl ImportPath {
    pub fn parse(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }
        let segments: Vec<String> = s.split('/').map(str::to_owned).collect();
        if segments.iter().any(|seg| !is_valid_ident(seg)) {
            return None;
        }
        Some(Self { segments })
    }

    pub fn head(&self) -> &str {
        &self.segments[0]
    }

    pub fn tail(&self) -> &[String] {
        &self.segments[1..]
    }

    /// Rebuilds the path with a different head, keeping the tail.
    pub fn with_head(&self, new_head: &str) -> Self {
        let mut segments = self.segments.clone();
        segments[0] = new_head.to_owned();
        Self { segments }
    }

    pub fn join(head: &str, tail: &[String]) -> Self {
        let mut segments = vec![head.to_owned()];
        segments.extend(tail.iter().cloned());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn starts_with(&self, prefix: &ImportPath) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }

    /// Replaces a matched leading prefix with `after`'s segments, keeping
    /// whatever segments of `self` came after the prefix.
    pub fn rewrite_prefix(&self, before: &ImportPath, after: &ImportPath) -> ImportPath {
        debug_assert!(self.starts_with(before));
        let mut segments = after.segments.clone();
        segments.extend(self.segments[before.segments.len()..].iter().cloned());
        Self { segments }
    }
}

impl fmt::Display for ImportPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Either a plain identifier (non-member) or `owner::member`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnqualifiedName {
    Plain(String),
    Member { owner: String, member: String },
}

impl UnqualifiedName {
    pub fn parse(s: &str) -> Option<Self> {
        if let Some((owner, member)) = s.split_once("::") {
            if owner.is_empty() || member.is_empty() {
                return None;
            }
            if !is_valid_ident(owner) || !is_valid_ident(member) {
                return None;
            }
            Some(Self::Member { owner: owner.to_owned(), member: member.to_owned() })
        } else {
            if !is_valid_ident(s) {
                return None;
            }
            Some(Self::Plain(s.to_owned()))
        }
    }

    pub fn is_member(&self) -> bool {
        matches!(self, Self::Member { .. })
    }

    pub fn owner(&self) -> Option<&str> {
        match self {
            Self::Member { owner, .. } => Some(owner),
            Self::Plain(_) => None,
        }
    }
}

impl fmt::Display for UnqualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(name) => write!(f, "{name}"),
            Self::Member { owner, member } => write!(f, "{owner}::{member}"),
        }
    }
}

/// `import-path : unqualified-name`. Domain-unique identifier of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fullname {
    pub path: ImportPath,
    pub name: UnqualifiedName,
}

impl Fullname {
    pub fn parse(s: &str) -> Option<Self> {
        let (path, name) = s.split_once(':')?;
        let path = ImportPath::parse(path)?;
        let name = UnqualifiedName::parse(name)?;
        Some(Self { path, name })
    }

    pub fn new(path: ImportPath, name: UnqualifiedName) -> Self {
        Self { path, name }
    }
}

impl fmt::Display for Fullname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_path() {
        assert!(ImportPath::parse("").is_none());
    }

    #[test]
    fn rejects_empty_segment() {
        assert!(ImportPath::parse("a//b").is_none());
    }

    #[test]
    fn rejects_leading_digit() {
        assert!(ImportPath::parse("1abc").is_none());
    }

    #[test]
    fn parses_multi_segment_path() {
        let p = ImportPath::parse("a/b/c").unwrap();
        assert_eq!(p.head(), "a");
        assert_eq!(p.tail(), &["b".to_string(), "c".to_string()]);
        assert_eq!(p.to_string(), "a/b/c");
    }

    #[test]
    fn rejects_empty_member_halves() {
        assert!(UnqualifiedName::parse("::m").is_none());
        assert!(UnqualifiedName::parse("O::").is_none());
    }

    #[test]
    fn fullname_round_trips() {
        let f = Fullname::parse("p/sub:O::m").unwrap();
        assert_eq!(f.to_string(), "p/sub:O::m");
        assert!(f.name.is_member());
        assert_eq!(f.name.owner(), Some("O"));
    }

    #[test]
    fn fullname_round_trip_plain() {
        let f = Fullname::parse("yama:Int").unwrap();
        assert_eq!(Fullname::parse(&f.to_string()).unwrap(), f);
    }
}
