//! Problem family registry
//!
//! Each family declares the shape of its stdin, the entry point it calls on
//! the user's solution and how the result is printed. A problem selects its
//! family through a stable `problem_type` tag; the title is only consulted
//! when no tag is present.

use tracing::debug;

/// How a single test case's stdin is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    /// `[a,b,...]` on the first line, an integer on the second
    IntArrayWithTarget,
    /// `[a,b,...]` on the first line, built into a singly linked list
    LinkedList,
    /// First line only, parsed as an array when bracketed
    RawLine,
}

/// How the entry point's return value is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    IntArray,
    LinkedList,
    /// Fixed placeholder message, no call into the solution
    Placeholder,
}

/// Capability descriptor of a problem family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindDescriptor {
    pub tag: &'static str,
    pub entry_method: &'static str,
    pub input: InputShape,
    pub output: OutputShape,
}

/// Problem families known to the harness generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProblemKind {
    TwoSum,
    ReverseLinkedList,
    #[default]
    Generic,
}

const TWO_SUM: KindDescriptor = KindDescriptor {
    tag: "two_sum",
    entry_method: "twoSum",
    input: InputShape::IntArrayWithTarget,
    output: OutputShape::IntArray,
};

const REVERSE_LINKED_LIST: KindDescriptor = KindDescriptor {
    tag: "reverse_linked_list",
    entry_method: "reverseList",
    input: InputShape::LinkedList,
    output: OutputShape::LinkedList,
};

const GENERIC: KindDescriptor = KindDescriptor {
    tag: "generic",
    entry_method: "",
    input: InputShape::RawLine,
    output: OutputShape::Placeholder,
};

/// Placeholder printed by the generic driver
pub const GENERIC_PLACEHOLDER: &str = "Generic input processed";

impl ProblemKind {
    pub const ALL: [ProblemKind; 3] = [
        ProblemKind::TwoSum,
        ProblemKind::ReverseLinkedList,
        ProblemKind::Generic,
    ];

    pub fn descriptor(&self) -> &'static KindDescriptor {
        match self {
            ProblemKind::TwoSum => &TWO_SUM,
            ProblemKind::ReverseLinkedList => &REVERSE_LINKED_LIST,
            ProblemKind::Generic => &GENERIC,
        }
    }

    pub fn uses_linked_list(&self) -> bool {
        self.descriptor().input == InputShape::LinkedList
    }

    /// Look a family up by its stable tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.descriptor().tag == tag)
    }

    /// Coarse substring match on a problem title
    pub fn from_title(title: &str) -> Option<Self> {
        let title = title.to_lowercase();

        if (title.contains("two") && title.contains("sum")) || title.contains("twosum") {
            Some(ProblemKind::TwoSum)
        } else if title.contains("reverse") && title.contains("linked") {
            Some(ProblemKind::ReverseLinkedList)
        } else {
            None
        }
    }

    /// Resolve the family of a problem: tag first, then title, then generic
    pub fn resolve(tag: Option<&str>, title: &str) -> Self {
        if let Some(tag) = tag {
            match Self::from_tag(tag) {
                Some(kind) => return kind,
                None => debug!("Unknown problem type tag '{}', falling back to title", tag),
            }
        }

        Self::from_title(title).unwrap_or_else(|| {
            debug!("No harness family matches '{}', using generic driver", title);
            ProblemKind::Generic
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_matching() {
        assert_eq!(ProblemKind::from_title("Two Sum"), Some(ProblemKind::TwoSum));
        assert_eq!(ProblemKind::from_title("TwoSum II"), Some(ProblemKind::TwoSum));
        assert_eq!(ProblemKind::from_title("Sum of Two Integers"), Some(ProblemKind::TwoSum));
        assert_eq!(
            ProblemKind::from_title("Reverse Linked List"),
            Some(ProblemKind::ReverseLinkedList)
        );
        assert_eq!(ProblemKind::from_title("Reverse String"), None);
    }

    #[test]
    fn test_tag_wins_over_title() {
        let kind = ProblemKind::resolve(Some("reverse_linked_list"), "Two Sum");
        assert_eq!(kind, ProblemKind::ReverseLinkedList);
    }

    #[test]
    fn test_unknown_tag_falls_back_to_title() {
        assert_eq!(ProblemKind::resolve(Some("graph"), "Two Sum"), ProblemKind::TwoSum);
        assert_eq!(ProblemKind::resolve(None, "Valid Parentheses"), ProblemKind::Generic);
    }

    #[test]
    fn test_descriptor_tags_round_trip() {
        for kind in ProblemKind::ALL {
            assert_eq!(ProblemKind::from_tag(kind.descriptor().tag), Some(kind));
        }
        assert!(ProblemKind::ReverseLinkedList.uses_linked_list());
        assert!(!ProblemKind::TwoSum.uses_linked_list());
    }
}
