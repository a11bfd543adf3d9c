//! Parser for VPC project scripts
//!
//! Supports the subset of the format the pipeline needs to read compiler
//! settings: macros, conditionals, includes, nested blocks and leaf values
//! with `$BASE` accumulation.

use super::condition;
use super::{ConfigNode, ConfigTree, MacroTable, ProjectConfigError, ProjectConfigParser};
use crate::fs::FileSystem;
use crate::util::paths;
use regex::{NoExpand, Regex};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};

const DEFAULT_MAX_INCLUDE_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Word(String),
    Quoted(String),
    Condition(String),
    Open,
    Close,
    Continuation,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    line: usize,
}

fn syntax(path: &Path, line: usize, message: impl Into<String>) -> ProjectConfigError {
    ProjectConfigError::Syntax {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

fn tokenize(content: &str, path: &Path) -> Result<Vec<Token>, ProjectConfigError> {
    let chars: Vec<char> = content.chars().collect();
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                line += 1;
                i += 1;
            }
            c if c.is_whitespace() => i += 1,
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '{' => {
                tokens.push(Token {
                    kind: TokenKind::Open,
                    line,
                });
                i += 1;
            }
            '}' => {
                tokens.push(Token {
                    kind: TokenKind::Close,
                    line,
                });
                i += 1;
            }
            '"' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != '"' {
                    if chars[end] == '\n' {
                        return Err(syntax(path, line, "unterminated string"));
                    }
                    end += 1;
                }
                if end >= chars.len() {
                    return Err(syntax(path, line, "unterminated string"));
                }
                tokens.push(Token {
                    kind: TokenKind::Quoted(chars[start..end].iter().collect()),
                    line,
                });
                i = end + 1;
            }
            '[' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != ']' && chars[end] != '\n' {
                    end += 1;
                }
                if chars.get(end) != Some(&']') {
                    return Err(syntax(path, line, "unterminated condition"));
                }
                tokens.push(Token {
                    kind: TokenKind::Condition(chars[start..end].iter().collect()),
                    line,
                });
                i = end + 1;
            }
            '\\' if rest_of_line_is_blank(&chars, i + 1) => {
                tokens.push(Token {
                    kind: TokenKind::Continuation,
                    line,
                });
                i += 1;
            }
            _ => {
                let start = i;
                while i < chars.len()
                    && !chars[i].is_whitespace()
                    && !matches!(chars[i], '{' | '}' | '"' | '[')
                {
                    i += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Word(chars[start..i].iter().collect()),
                    line,
                });
            }
        }
    }

    Ok(tokens)
}

fn rest_of_line_is_blank(chars: &[char], from: usize) -> bool {
    chars[from..]
        .iter()
        .take_while(|c| **c != '\n')
        .all(|c| c.is_whitespace())
}

fn base_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\$BASE\b").expect("valid regex"))
}

/// Replace `$BASE` in a new leaf value with the value it overrides
fn replace_base(value: &str, previous: &str) -> String {
    base_regex()
        .replace_all(value, NoExpand(previous))
        .into_owned()
}

struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Cursor<'t> {
    fn peek(&self) -> Option<&'t TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }
}

/// Whether a word token reads as the next statement's key
fn is_key(word: &str) -> bool {
    word.starts_with('$') || word.starts_with("-$")
}

struct ParseContext<'a> {
    fs: &'a dyn FileSystem,
    root_dir: PathBuf,
    macros: &'a mut MacroTable,
    depth: usize,
    max_depth: usize,
}

impl ParseContext<'_> {
    fn parse_file(&mut self, path: &Path, node: &mut ConfigNode) -> Result<(), ProjectConfigError> {
        trace!(path = %path.display(), depth = self.depth, "Parsing project file");

        let content = self
            .fs
            .read_to_string(path)
            .map_err(|e| ProjectConfigError::Read {
                path: path.to_path_buf(),
                message: format!("{:#}", e),
            })?;
        let tokens = tokenize(&content, path)?;
        let mut cursor = Cursor {
            tokens: &tokens,
            pos: 0,
        };
        self.parse_block(&mut cursor, node, path, false)
    }

    fn parse_block(
        &mut self,
        cur: &mut Cursor<'_>,
        node: &mut ConfigNode,
        path: &Path,
        nested: bool,
    ) -> Result<(), ProjectConfigError> {
        loop {
            let line = cur.line();
            match cur.next().map(|t| &t.kind) {
                None if nested => return Err(syntax(path, line, "missing '}'")),
                None => return Ok(()),
                Some(TokenKind::Close) if nested => return Ok(()),
                Some(TokenKind::Close) => return Err(syntax(path, line, "unmatched '}'")),
                Some(TokenKind::Continuation) => {}
                Some(TokenKind::Word(key)) => self.parse_statement(key, cur, node, path)?,
                Some(other) => {
                    return Err(syntax(path, line, format!("expected a key, found {:?}", other)))
                }
            }
        }
    }

    fn parse_statement(
        &mut self,
        key: &str,
        cur: &mut Cursor<'_>,
        node: &mut ConfigNode,
        path: &Path,
    ) -> Result<(), ProjectConfigError> {
        match key.to_ascii_lowercase().as_str() {
            "$macro" | "$conditional" => {
                let name = self.read_name(cur, path)?;
                let value = self.read_value(cur, path)?.unwrap_or_default();
                if self.read_condition(cur, path)? {
                    let value = self.macros.substitute(&value);
                    self.macros.set(&name, value);
                }
            }
            "$macrorequired" | "$macrorequiredallowempty" => {
                let name = self.read_name(cur, path)?;
                let default = self.read_value(cur, path)?.unwrap_or_default();
                if self.read_condition(cur, path)? && !self.macros.contains(&name) {
                    let value = self.macros.substitute(&default);
                    self.macros.set(&name, value);
                }
            }
            "$include" => {
                let line = cur.line();
                let target = self
                    .read_value(cur, path)?
                    .ok_or_else(|| syntax(path, line, "$Include needs a file name"))?;
                if self.read_condition(cur, path)? {
                    self.include(&target, node)?;
                }
            }
            _ => {
                let value = self.read_value(cur, path)?;
                let enabled = self.read_condition(cur, path)?;

                if cur.peek() == Some(&TokenKind::Open) {
                    cur.next();
                    if enabled {
                        let child = node.child_or_insert(key);
                        if child.value.is_empty() {
                            child.value = value.unwrap_or_default();
                        }
                        self.parse_block(cur, child, path, true)?;
                    } else {
                        let mut discarded = ConfigNode::new(key);
                        self.parse_block(cur, &mut discarded, path, true)?;
                    }
                } else if enabled {
                    let child = node.child_or_insert(key);
                    child.value = replace_base(&value.unwrap_or_default(), &child.value);
                }
            }
        }
        Ok(())
    }

    fn include(&mut self, target: &str, node: &mut ConfigNode) -> Result<(), ProjectConfigError> {
        let include_path = paths::resolve(
            &self.root_dir,
            &paths::from_project_path(&self.macros.substitute(target)),
        );
        if self.depth >= self.max_depth {
            return Err(ProjectConfigError::IncludeDepth { path: include_path });
        }

        debug!(path = %include_path.display(), "Including project file");
        self.depth += 1;
        let result = self.parse_file(&include_path, node);
        self.depth -= 1;
        result
    }

    fn read_name(&self, cur: &mut Cursor<'_>, path: &Path) -> Result<String, ProjectConfigError> {
        let line = cur.line();
        match cur.next().map(|t| &t.kind) {
            Some(TokenKind::Word(name)) | Some(TokenKind::Quoted(name)) => Ok(name.clone()),
            _ => Err(syntax(path, line, "expected a macro name")),
        }
    }

    fn read_value(
        &self,
        cur: &mut Cursor<'_>,
        path: &Path,
    ) -> Result<Option<String>, ProjectConfigError> {
        let mut value = match cur.peek() {
            Some(TokenKind::Quoted(s)) => s.clone(),
            Some(TokenKind::Word(w)) if !is_key(w) => w.clone(),
            _ => return Ok(None),
        };
        cur.next();

        loop {
            match cur.peek() {
                Some(TokenKind::Continuation) => {
                    let line = cur.line();
                    cur.next();
                    match cur.next().map(|t| &t.kind) {
                        Some(TokenKind::Quoted(more)) => value.push_str(more),
                        _ => return Err(syntax(path, line, "expected a string after '\\'")),
                    }
                }
                Some(TokenKind::Quoted(more)) => {
                    value.push(';');
                    value.push_str(more);
                    cur.next();
                }
                _ => break,
            }
        }

        Ok(Some(value))
    }

    fn read_condition(&self, cur: &mut Cursor<'_>, path: &Path) -> Result<bool, ProjectConfigError> {
        let line = cur.line();
        match cur.peek() {
            Some(TokenKind::Condition(expr)) => {
                cur.next();
                condition::evaluate(expr, &*self.macros).map_err(|message| {
                    ProjectConfigError::Condition {
                        path: path.to_path_buf(),
                        line,
                        expr: expr.clone(),
                        message,
                    }
                })
            }
            _ => Ok(true),
        }
    }
}

/// Default configuration loader reading VPC scripts through a [`FileSystem`]
pub struct VpcParser {
    fs: Arc<dyn FileSystem>,
    max_include_depth: usize,
}

impl VpcParser {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }

    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }
}

impl ProjectConfigParser for VpcParser {
    fn parse(&self, path: &Path, macros: MacroTable) -> Result<ConfigTree, ProjectConfigError> {
        let mut tree = ConfigTree::new(path.to_path_buf(), macros);
        let root_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let ConfigTree { root, macros, .. } = &mut tree;
        let mut ctx = ParseContext {
            fs: self.fs.as_ref(),
            root_dir,
            macros,
            depth: 0,
            max_depth: self.max_include_depth,
        };
        ctx.parse_file(path, root)?;

        Ok(tree)
    }

    fn apply_macros(&self, tree: &mut ConfigTree, macros: &MacroTable) {
        tree.root
            .visit_values_mut(&mut |value| *value = macros.substitute(value));
    }
}
