//! Two-segment filename masks.
//!
//! A mask has the form `<name>.<ext>`. Each segment is either the wildcard
//! `*` or a literal compared exactly; there is no partial globbing inside a
//! segment, so `ma*` only matches an entry whose basename is literally `ma*`.
//!
//! The mask is split at its first `.`, entry names at their last `.`:
//!
//! | entry        | basename  | extension   |
//! |--------------|-----------|-------------|
//! | `main.c`     | `main`    | `c`         |
//! | `a.tar.gz`   | `a.tar`   | `gz`        |
//! | `README`     | `README`  | (empty)     |
//! | `.gitignore` | (empty)   | `gitignore` |
//! | `notes.`     | `notes`   | (empty)     |
//!
//! A mask without a dot is a name-only mask: it matches entries whose
//! basename equals it and whose extension is empty. The bare mask `*` is the
//! exception and matches everything.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The match-all segment.
pub const WILDCARD: &str = "*";

/// One side of a mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Any,
    Exact(String),
}

impl Segment {
    fn parse(s: &str) -> Self {
        if s == WILDCARD {
            Segment::Any
        } else {
            Segment::Exact(s.to_string())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Segment::Any => true,
            Segment::Exact(expected) => expected == value,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Any => f.write_str(WILDCARD),
            Segment::Exact(s) => f.write_str(s),
        }
    }
}

/// Parsed `<name>.<ext>` mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    name: Segment,
    ext: Segment,
}

impl Mask {
    /// Parse a mask string. Never fails: a mask without a dot is name-only.
    ///
    /// A single leading `/` or `\` is ignored, so `"/*.*"` and `"*.*"` are
    /// the same mask.
    pub fn parse(mask: &str) -> Self {
        let mask = mask
            .strip_prefix('/')
            .or_else(|| mask.strip_prefix('\\'))
            .unwrap_or(mask);

        match mask.split_once('.') {
            Some((name, ext)) => Mask {
                name: Segment::parse(name),
                ext: Segment::parse(ext),
            },
            None if mask == WILDCARD => Mask::any(),
            None => Mask {
                name: Segment::parse(mask),
                ext: Segment::Exact(String::new()),
            },
        }
    }

    /// The `*.*` mask.
    pub fn any() -> Self {
        Mask {
            name: Segment::Any,
            ext: Segment::Any,
        }
    }

    /// Mask selecting every entry with the given extension.
    pub fn extension(ext: &str) -> Self {
        Mask {
            name: Segment::Any,
            ext: Segment::parse(ext),
        }
    }

    pub fn name_segment(&self) -> &Segment {
        &self.name
    }

    pub fn ext_segment(&self) -> &Segment {
        &self.ext
    }

    /// Whether an entry name passes this mask.
    pub fn matches(&self, entry: &str) -> bool {
        let (base, ext) = split_entry(entry);
        self.name.matches(base) && self.ext.matches(ext)
    }
}

impl Default for Mask {
    fn default() -> Self {
        Mask::any()
    }
}

impl FromStr for Mask {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Mask::parse(s))
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.ext)
    }
}

/// Split an entry name into `(basename, extension)` at its last dot.
pub fn split_entry(entry: &str) -> (&str, &str) {
    entry.rsplit_once('.').unwrap_or((entry, ""))
}

/// Convenience form of [`Mask::matches`] for one-off checks.
pub fn matches(entry: &str, mask: &str) -> bool {
    Mask::parse(mask).matches(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_masks() {
        assert!(matches("main.c", "*.c"));
        assert!(!matches("main.cpp", "*.c"));
        assert!(matches("main.cpp", "*.cpp"));
        assert!(!matches("main", "*.c"));
    }

    #[test]
    fn test_star_dot_star_matches_everything() {
        for entry in ["README", "main.c", ".gitignore", "notes.", "a.tar.gz", ".."] {
            assert!(matches(entry, "*.*"), "{entry} should match *.*");
        }
    }

    #[test]
    fn test_exact_name() {
        assert!(matches("main.c", "main.*"));
        assert!(!matches("util.c", "main.*"));
        assert!(matches("main.c", "main.c"));
    }

    #[test]
    fn test_entry_split_at_last_dot() {
        assert_eq!(split_entry("a.tar.gz"), ("a.tar", "gz"));
        assert!(matches("a.tar.gz", "*.gz"));
        assert!(!matches("a.tar.gz", "a.*"));
        // mask splits at its first dot: name `a`, ext `tar.gz`
        assert!(!matches("a.tar.gz", "a.tar.gz"));
    }

    #[test]
    fn test_hidden_files() {
        assert_eq!(split_entry(".gitignore"), ("", "gitignore"));
        assert!(matches(".gitignore", "*.gitignore"));
        assert!(matches(".gitignore", ".gitignore"));
        assert!(!matches(".gitignore", "gitignore"));
    }

    #[test]
    fn test_trailing_dot() {
        assert_eq!(split_entry("notes."), ("notes", ""));
        assert!(matches("notes.", "notes"));
        assert!(matches("notes.", "*."));
        assert!(!matches("notes.", "*.txt"));
    }

    #[test]
    fn test_bare_wildcard_matches_all() {
        assert_eq!(Mask::parse("*"), Mask::any());
        assert!(matches("main.c", "*"));
        assert!(matches("README", "*"));
    }

    #[test]
    fn test_name_only_mask() {
        assert!(matches("Makefile", "Makefile"));
        assert!(!matches("Makefile.am", "Makefile"));
        assert!(!matches("main.c", "main"));
    }

    #[test]
    fn test_extensionless_entries() {
        assert!(matches("README", "*."));
        assert!(!matches("README.md", "*."));
    }

    #[test]
    fn test_leading_separator_is_ignored() {
        assert_eq!(Mask::parse("/*.*"), Mask::any());
        assert_eq!(Mask::parse("\\*.c"), Mask::extension("c"));
    }

    #[test]
    fn test_no_partial_globbing() {
        assert!(!matches("main.c", "ma*.c"));
        assert!(matches("ma*.c", "ma*.c"));
        assert!(!matches("main.cpp", "*.c*"));
    }

    #[test]
    fn test_display_roundtrips_parse() {
        for mask in ["*.*", "*.c", "main.*", "Makefile."] {
            assert_eq!(Mask::parse(mask).to_string(), mask);
        }
        assert_eq!(Mask::parse("Makefile").to_string(), "Makefile.");
    }

    #[test]
    fn test_from_str() {
        let mask: Mask = "*.o".parse().unwrap();
        assert!(mask.matches("core.o"));
    }
}
