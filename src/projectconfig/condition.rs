//! Evaluation of bracketed project-file conditions such as `[$WIN32 && !$X360]`

use super::MacroTable;

#[derive(Debug, Clone, PartialEq, Eq)]
enum CondToken {
    Name(String),
    Not,
    And,
    Or,
    Open,
    Close,
}

fn tokenize(expr: &str) -> Result<Vec<CondToken>, String> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '!' => {
                tokens.push(CondToken::Not);
                i += 1;
            }
            '(' => {
                tokens.push(CondToken::Open);
                i += 1;
            }
            ')' => {
                tokens.push(CondToken::Close);
                i += 1;
            }
            '&' | '|' => {
                if chars.get(i + 1) != Some(&c) {
                    return Err(format!("expected '{}{}'", c, c));
                }
                tokens.push(if c == '&' {
                    CondToken::And
                } else {
                    CondToken::Or
                });
                i += 2;
            }
            '$' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
                    end += 1;
                }
                if end == start {
                    return Err("empty condition name".to_string());
                }
                tokens.push(CondToken::Name(chars[start..end].iter().collect()));
                i = end;
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }

    Ok(tokens)
}

struct CondParser<'a> {
    tokens: &'a [CondToken],
    pos: usize,
    macros: &'a MacroTable,
}

impl CondParser<'_> {
    fn peek(&self) -> Option<&CondToken> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&CondToken> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn or_expr(&mut self) -> Result<bool, String> {
        let mut value = self.and_expr()?;
        while self.peek() == Some(&CondToken::Or) {
            self.pos += 1;
            let rhs = self.and_expr()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn and_expr(&mut self) -> Result<bool, String> {
        let mut value = self.unary()?;
        while self.peek() == Some(&CondToken::And) {
            self.pos += 1;
            let rhs = self.unary()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<bool, String> {
        match self.next().cloned() {
            Some(CondToken::Not) => Ok(!self.unary()?),
            Some(CondToken::Open) => {
                let value = self.or_expr()?;
                match self.next() {
                    Some(CondToken::Close) => Ok(value),
                    _ => Err("missing ')'".to_string()),
                }
            }
            Some(CondToken::Name(name)) => Ok(self.macros.is_true(&name)),
            Some(other) => Err(format!("unexpected {:?}", other)),
            None => Err("unexpected end of condition".to_string()),
        }
    }
}

/// Evaluate a condition expression (without the surrounding brackets)
pub fn evaluate(expr: &str, macros: &MacroTable) -> Result<bool, String> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err("empty condition".to_string());
    }

    let mut parser = CondParser {
        tokens: &tokens,
        pos: 0,
        macros,
    };
    let value = parser.or_expr()?;
    if parser.pos != tokens.len() {
        return Err("trailing tokens".to_string());
    }
    Ok(value)
}
