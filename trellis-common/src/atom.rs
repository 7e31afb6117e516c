use crate::Data;
use std::{cmp::Ordering, fmt, ops::Deref};
use string_cache::DefaultAtom;

/// Interned strings. Typically used for property names and dotted property paths.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct Atom(DefaultAtom);

impl Atom {
    /// Borrows the interned string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins a parent path and a child name with the `.` path separator.
    pub fn join(&self, child: &str) -> Atom {
        if self.is_empty() {
            Atom::from(child)
        } else {
            Atom::from(format!("{}.{}", self.0, child))
        }
    }

    /// Strips a leading `"<parent>."` prefix, if present.
    ///
    /// Collection adapters use this to turn owner-relative template names
    /// into member-relative ones.
    pub fn strip_prefix(&self, parent: &Atom) -> Option<Atom> {
        self.as_str()
            .strip_prefix(parent.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .map(Atom::from)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for Atom {
    type Target = DefaultAtom;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Data for Atom {
    fn same(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> From<T> for Atom
where
    DefaultAtom: From<T>,
{
    fn from(value: T) -> Self {
        Atom(DefaultAtom::from(value))
    }
}

// Interned atoms compare by hash internally; paths need string order so they
// can key ordered maps with deterministic iteration.
impl Ord for Atom {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::Atom;

    #[test]
    fn join_and_strip_are_inverse() {
        let legend = Atom::from("legend");
        let title = legend.join("title");
        assert_eq!(title.as_str(), "legend.title");
        assert_eq!(title.strip_prefix(&legend), Some(Atom::from("title")));
    }

    #[test]
    fn strip_requires_full_segment() {
        let legend = Atom::from("legend");
        assert_eq!(Atom::from("legendary.title").strip_prefix(&legend), None);
        assert_eq!(Atom::from("axis.title").strip_prefix(&legend), None);
        assert_eq!(Atom::from("legend").strip_prefix(&legend), None);
    }

    #[test]
    fn ordering_follows_string_order() {
        let mut names = vec![Atom::from("b"), Atom::from("a.z"), Atom::from("a")];
        names.sort();
        assert_eq!(names, vec![Atom::from("a"), Atom::from("a.z"), Atom::from("b")]);
    }
}
