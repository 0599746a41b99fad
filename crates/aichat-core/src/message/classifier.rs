//! Content classification for assistant replies.
//!
//! Pure functions that decide which structural components a markdown
//! renderer may use for a message. Classification never alters the message
//! itself, and plain paragraphs are always a valid rendering.

use once_cell::sync::Lazy;
use regex::Regex;

/// Two or more newlines, possibly with other whitespace in between.
static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid blank-run regex"));

/// Bullet (`-`, `*`) or numbered (`12.`) marker followed by whitespace.
static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:[-*]|\d+\.)[ \t]").expect("valid list-item regex"));

/// Collapses every run of blank lines into exactly one blank line and trims
/// the ends. Idempotent.
pub fn normalize(text: &str) -> String {
    BLANK_RUN.replace_all(text, "\n\n").trim().to_string()
}

/// True when the text has at least one pipe-delimited row and at least one
/// header separator line (`---|---`, `| :-- | --: |`, ...).
pub fn contains_table(text: &str) -> bool {
    let mut has_row = false;
    let mut has_separator = false;

    for line in text.lines() {
        if is_separator_line(line) {
            has_separator = true;
        } else if is_row_line(line) {
            has_row = true;
        }
        if has_row && has_separator {
            return true;
        }
    }

    false
}

/// True when any line, possibly indented, starts a bullet or numbered item.
pub fn contains_list(text: &str) -> bool {
    LIST_ITEM.is_match(text)
}

fn is_row_line(line: &str) -> bool {
    line.contains('|') && line.chars().any(|c| c != '|' && !c.is_whitespace())
}

fn is_separator_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.contains('|')
        && trimmed.contains('-')
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':') || c.is_whitespace())
}

/// Structural component a renderer can map a markdown node to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Paragraph,
    Strong,
    Emphasis,
    Link,
    Blockquote,
    Heading(u8),
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableHeaderCell,
    TableCell,
    UnorderedList,
    OrderedList,
    ListItem,
}

const BASE_COMPONENTS: &[Component] = &[
    Component::Paragraph,
    Component::Strong,
    Component::Emphasis,
    Component::Link,
    Component::Blockquote,
    Component::Heading(1),
    Component::Heading(2),
    Component::Heading(3),
];

const TABLE_COMPONENTS: &[Component] = &[
    Component::Table,
    Component::TableHead,
    Component::TableBody,
    Component::TableRow,
    Component::TableHeaderCell,
    Component::TableCell,
];

const LIST_COMPONENTS: &[Component] = &[
    Component::UnorderedList,
    Component::OrderedList,
    Component::ListItem,
];

/// Render affordances for one message, plus the normalized text to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub text: String,
    pub has_table: bool,
    pub has_list: bool,
}

impl Classification {
    /// Components available to the renderer. Always includes the
    /// paragraph-level set; table and list parts only when detected.
    pub fn components(&self) -> Vec<Component> {
        let mut components = BASE_COMPONENTS.to_vec();
        if self.has_table {
            components.extend_from_slice(TABLE_COMPONENTS);
        }
        if self.has_list {
            components.extend_from_slice(LIST_COMPONENTS);
        }
        components
    }

    pub fn allows(&self, component: Component) -> bool {
        self.components().contains(&component)
    }

    pub fn is_plain(&self) -> bool {
        !self.has_table && !self.has_list
    }
}

/// Classifies the raw message content. Detection runs on the original text,
/// rendering uses the normalized text.
pub fn classify(content: &str) -> Classification {
    Classification {
        text: normalize(content),
        has_table: contains_table(content),
        has_list: contains_list(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_blank_runs() {
        assert_eq!(normalize("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize("a\n  \n\t\n b"), "a\n\n b");
        assert_eq!(normalize("\n\n  hello  \n\n"), "hello");
        assert_eq!(normalize("one\ntwo"), "one\ntwo");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "",
            "   ",
            "\n",
            "\n\n\n",
            " \n \n \n ",
            "a\n\n\nb\n \n c",
            "x \n\n y",
            "\r\n\r\n\r\nz",
            "| a | b |\n|---|---|\n\n\n| 1 | 2 |",
            "- item\n\n\n\n- item",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_contains_table() {
        assert!(contains_table("a|b\n-|-\n1|2"));
        assert!(contains_table("| Name | Age |\n| :--- | ---: |\n| Ann | 31 |"));
        assert!(!contains_table("plain text, no pipes"));
        assert!(!contains_table("a|b\nrandom text"));
    }

    #[test]
    fn test_separator_alone_is_not_a_table() {
        assert!(!contains_table("---|---"));
        assert!(!contains_table("----\nno pipes"));
    }

    #[test]
    fn test_contains_list() {
        assert!(contains_list("- item1\n- item2"));
        assert!(contains_list("1. first\n2. second"));
        assert!(contains_list("Intro:\n   * nested"));
        assert!(!contains_list("no bullets here"));
        assert!(!contains_list("-not a bullet\n3.14 is pi"));
    }

    #[test]
    fn test_classification_widens_components() {
        let plain = classify("Just prose.");
        assert!(plain.is_plain());
        assert!(plain.allows(Component::Paragraph));
        assert!(!plain.allows(Component::Table));
        assert!(!plain.allows(Component::ListItem));

        let rich = classify("| a | b |\n|---|---|\n| 1 | 2 |\n\n\n- done");
        assert!(rich.has_table && rich.has_list);
        assert!(rich.allows(Component::TableCell));
        assert!(rich.allows(Component::ListItem));
        assert!(rich.allows(Component::Paragraph));
        assert_eq!(rich.text, "| a | b |\n|---|---|\n| 1 | 2 |\n\n- done");
    }
}
