//! Parser and evaluator for logical definition steps.
//!
//! Operators, tightest first:
//!
//! | source      | meaning                       | node       |
//! |-------------|-------------------------------|------------|
//! | `( ... )`   | grouping                      | -          |
//! | `a+b`       | subunits of one complex       | `Complex`  |
//! | `-a`, `a-b` | optional component            | `Optional` |
//! | `a b`       | both required                 | `And`      |
//! | `a,b`       | alternatives                  | `Or`       |
//!
//! Whitespace only means AND between two operands; it is ignored next to
//! `,`, `+`, after `-` and inside parentheses edges.

use crate::domain::model::{Expression, IdentifierSet, StepFault};
use crate::utils::error::{CompletenessError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Comma,
    Plus,
    Minus,
    LParen,
    RParen,
    Space,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(id) => format!("identifier '{}'", id),
            Token::Comma => "','".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Space => "whitespace".to_string(),
        }
    }

    fn ends_operand(&self) -> bool {
        matches!(self, Token::Ident(_) | Token::RParen)
    }

    fn starts_operand(&self) -> bool {
        matches!(self, Token::Ident(_) | Token::LParen)
    }
}

/// One ASCII letter followed by at least one digit, e.g. `K00844`.
pub fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    let rest = chars.as_str();
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.' || c == ':'
}

fn tokenize(raw_step: &str) -> std::result::Result<Vec<Token>, StepFault> {
    let mut tokens = Vec::new();
    let mut chars = raw_step.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        let token = match ch {
            c if c.is_whitespace() => {
                while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
                Token::Space
            }
            ',' => Token::Comma,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if is_word_char(c) => {
                let mut end = start + c.len_utf8();
                while let Some((idx, c)) = chars.next_if(|(_, c)| is_word_char(*c)) {
                    end = idx + c.len_utf8();
                }
                let word = &raw_step[start..end];
                if !is_identifier(word) {
                    return Err(StepFault::UnknownIdentifier(word.to_string()));
                }
                Token::Ident(word.to_string())
            }
            other => {
                return Err(StepFault::Malformed(format!(
                    "unexpected character '{}'",
                    other
                )))
            }
        };
        tokens.push(token);
    }

    Ok(significant_spaces(tokens))
}

/// Keeps whitespace only where it joins two operands, and makes direct
/// adjacency such as `)(` or `K00001(` an explicit AND.
fn significant_spaces(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        if token == Token::Space {
            let before = out.last().is_some_and(Token::ends_operand);
            let after = iter
                .peek()
                .is_some_and(|next| next.starts_operand() || *next == Token::Minus);
            if before && after {
                out.push(Token::Space);
            }
            continue;
        }
        if token.starts_operand() && out.last().is_some_and(Token::ends_operand) {
            out.push(Token::Space);
        }
        out.push(token);
    }

    out
}

/// Deepest parenthesis nesting accepted in one step.
pub const MAX_NESTING: usize = 64;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> std::result::Result<Expression, StepFault> {
        let mut alternatives = vec![self.parse_and()?];
        while self.eat(&Token::Comma) {
            alternatives.push(self.parse_and()?);
        }
        Ok(collapse(alternatives, Expression::Or))
    }

    fn parse_and(&mut self) -> std::result::Result<Expression, StepFault> {
        let mut terms = vec![self.parse_complex()?];
        while self.eat(&Token::Space) {
            terms.push(self.parse_complex()?);
        }
        Ok(collapse(terms, Expression::And))
    }

    fn parse_complex(&mut self) -> std::result::Result<Expression, StepFault> {
        let first = if self.eat(&Token::Minus) {
            Expression::optional(self.parse_factor()?)
        } else {
            self.parse_factor()?
        };

        let mut parts = vec![first];
        loop {
            if self.eat(&Token::Plus) {
                parts.push(self.parse_factor()?);
            } else if self.eat(&Token::Minus) {
                parts.push(Expression::optional(self.parse_factor()?));
            } else {
                break;
            }
        }
        Ok(collapse(parts, Expression::Complex))
    }

    fn parse_factor(&mut self) -> std::result::Result<Expression, StepFault> {
        match self.tokens.get(self.pos).cloned() {
            Some(Token::Ident(id)) => {
                self.pos += 1;
                Ok(Expression::Leaf(id))
            }
            Some(Token::LParen) => {
                if self.depth >= MAX_NESTING {
                    return Err(StepFault::Malformed(format!(
                        "nesting too deep (more than {} levels)",
                        MAX_NESTING
                    )));
                }
                self.pos += 1;
                self.depth += 1;
                let inner = self.parse_or()?;
                self.depth -= 1;
                if !self.eat(&Token::RParen) {
                    return Err(StepFault::Malformed("unclosed '('".to_string()));
                }
                Ok(inner)
            }
            Some(other) => Err(StepFault::Malformed(format!(
                "expected identifier or '(' but found {}",
                other.describe()
            ))),
            None => Err(StepFault::Malformed(
                "operator has no operand at end of step".to_string(),
            )),
        }
    }
}

fn collapse(mut nodes: Vec<Expression>, wrap: fn(Vec<Expression>) -> Expression) -> Expression {
    if nodes.len() == 1 {
        nodes.remove(0)
    } else {
        wrap(nodes)
    }
}

/// Parse one logical step into an expression tree.
pub fn parse(raw_step: &str) -> std::result::Result<Expression, StepFault> {
    let tokens = tokenize(raw_step)?;
    if tokens.is_empty() {
        return Err(StepFault::Malformed("empty step".to_string()));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expression = parser.parse_or()?;

    match parser.peek() {
        None => Ok(expression),
        Some(Token::RParen) => Err(StepFault::Malformed("unmatched ')'".to_string())),
        Some(other) => Err(StepFault::Malformed(format!(
            "unexpected {} after complete expression",
            other.describe()
        ))),
    }
}

fn strip_optional(expression: &Expression) -> Option<Expression> {
    fn strip_all(children: &[Expression]) -> Option<Vec<Expression>> {
        let kept: Vec<Expression> = children.iter().filter_map(strip_optional).collect();
        (!kept.is_empty()).then_some(kept)
    }

    match expression {
        Expression::Leaf(_) => Some(expression.clone()),
        Expression::Optional(_) => None,
        Expression::And(children) => strip_all(children).map(Expression::And),
        Expression::Or(children) => strip_all(children).map(Expression::Or),
        Expression::Complex(children) => strip_all(children).map(Expression::Complex),
    }
}

fn unwrap_optional(expression: &Expression) -> Expression {
    match expression {
        Expression::Leaf(_) => expression.clone(),
        Expression::Optional(child) => unwrap_optional(child),
        Expression::And(children) => {
            Expression::And(children.iter().map(unwrap_optional).collect())
        }
        Expression::Or(children) => Expression::Or(children.iter().map(unwrap_optional).collect()),
        Expression::Complex(children) => {
            Expression::Complex(children.iter().map(unwrap_optional).collect())
        }
    }
}

/// Drop every optional component.
///
/// A step made only of optional components (e.g. a bare `-K00001`) has
/// nothing left to test, so its components are kept as required instead.
pub fn normalize(expression: &Expression) -> Expression {
    strip_optional(expression).unwrap_or_else(|| unwrap_optional(expression))
}

fn reduce(expression: &Expression, identifiers: &IdentifierSet) -> bool {
    match expression {
        Expression::Leaf(id) => identifiers.contains(id),
        Expression::And(children) | Expression::Complex(children) => {
            children.iter().all(|child| reduce(child, identifiers))
        }
        Expression::Or(children) => children.iter().any(|child| reduce(child, identifiers)),
        // normalize() has already removed these
        Expression::Optional(_) => true,
    }
}

/// Normalize, then reduce bottom-up in one pass.
pub fn evaluate_expression(expression: &Expression, identifiers: &IdentifierSet) -> bool {
    reduce(&normalize(expression), identifiers)
}

pub fn step_error(raw_step: &str, fault: StepFault) -> CompletenessError {
    match fault {
        StepFault::Malformed(reason) => CompletenessError::MalformedStep {
            step: raw_step.to_string(),
            reason,
        },
        StepFault::UnknownIdentifier(token) => CompletenessError::UnknownIdentifierToken {
            step: raw_step.to_string(),
            token,
        },
    }
}

/// Parse and evaluate a logical step against one organism's identifiers.
pub fn evaluate(raw_step: &str, identifiers: &IdentifierSet) -> Result<bool> {
    let expression = parse(raw_step).map_err(|fault| step_error(raw_step, fault))?;
    Ok(evaluate_expression(&expression, identifiers))
}
