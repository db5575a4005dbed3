/*!
 * Directory tree listing used as the dump preamble
 */

use crate::filter::{extension_of, FilterRules};
use crate::types::{EntryKind, WalkEntry};
use crate::walker::WalkItem;

/// Spaces per depth level
const INDENT: usize = 4;

/// Renders the visited structure as an indented listing
pub struct TreeRenderer<'a> {
    rules: &'a FilterRules,
}

impl<'a> TreeRenderer<'a> {
    /// Create a renderer listing only files the rules include
    pub fn new(rules: &'a FilterRules) -> Self {
        Self { rules }
    }

    /// Render a listing from walker output. Walk failures are left out; the
    /// content pass reports them.
    pub fn render<I>(&self, root_name: &str, entries: I) -> String
    where
        I: IntoIterator<Item = WalkItem>,
    {
        let mut out = format!("{}/\n", root_name);
        for entry in entries.into_iter().filter_map(Result::ok) {
            if entry.depth == 0 {
                continue;
            }
            if let Some(line) = self.line(&entry) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }

    fn line(&self, entry: &WalkEntry) -> Option<String> {
        let indent = " ".repeat(INDENT * entry.depth);
        let name = entry.name();
        match entry.kind {
            EntryKind::Directory => Some(format!("{}{}/", indent, name)),
            EntryKind::File if self.rules.should_include(&name, extension_of(&name)) => {
                Some(format!("{}{}", indent, name))
            }
            EntryKind::File => None,
        }
    }
}
