//! Parsed project-file tree

use super::MacroTable;
use std::path::PathBuf;

/// A keyed node; leaves carry a value, blocks carry children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigNode {
    pub key: String,
    pub value: String,
    pub children: Vec<ConfigNode>,
}

impl ConfigNode {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Child lookup; keys compare case-insensitively
    pub fn child(&self, key: &str) -> Option<&ConfigNode> {
        self.children
            .iter()
            .find(|c| c.key.eq_ignore_ascii_case(key))
    }

    pub fn child_or_insert(&mut self, key: &str) -> &mut ConfigNode {
        let index = match self
            .children
            .iter()
            .position(|c| c.key.eq_ignore_ascii_case(key))
        {
            Some(index) => index,
            None => {
                self.children.push(ConfigNode::new(key));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    /// Apply `f` to this node's value and every descendant's value
    pub fn visit_values_mut(&mut self, f: &mut dyn FnMut(&mut String)) {
        f(&mut self.value);
        for child in &mut self.children {
            child.visit_values_mut(f);
        }
    }
}

/// Result of parsing one project file, including everything it included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigTree {
    /// The file that was parsed
    pub path: PathBuf,
    pub root: ConfigNode,
    /// Macro table as it stood at the end of parsing
    pub macros: MacroTable,
}

impl ConfigTree {
    pub fn new(path: PathBuf, macros: MacroTable) -> Self {
        Self {
            path,
            root: ConfigNode::new(""),
            macros,
        }
    }

    /// Nested lookup, e.g. `["$Configuration", "$Compiler", "$PreprocessorDefinitions"]`
    pub fn lookup(&self, keys: &[&str]) -> Option<&ConfigNode> {
        let mut node = &self.root;
        for key in keys {
            node = node.child(key)?;
        }
        Some(node)
    }

    pub fn value(&self, keys: &[&str]) -> Option<&str> {
        self.lookup(keys).map(|n| n.value.as_str())
    }
}
