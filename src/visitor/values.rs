//! Evaluation of enumerator value expressions.
//!
//! Covers C integer constant expressions: literals (decimal, hex, octal,
//! binary, character, with C suffixes), the unary, binary and conditional
//! operators, casts to integer types, parentheses and references to members
//! declared earlier in the same enum.

use std::collections::HashMap;

use crate::model::Primitive;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(i64),
    Ident(String),
    Op(&'static str),
    Open,
    Close,
}

const OPERATORS: &[&str] = &[
    "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "+", "-", "*", "/", "%", "&", "|", "^", "~",
    "!", "<", ">", "?", ":",
];

pub fn evaluate(expression: &str, known: &HashMap<String, i64>) -> Result<i64, String> {
    let tokens = tokenize(expression)?;
    let mut parser = ExprParser {
        tokens: &tokens,
        pos: 0,
        known,
    };

    let value = parser.conditional()?;
    if parser.pos != tokens.len() {
        return Err(format!("trailing tokens in `{}`", expression));
    }
    Ok(value)
}

/// Parse a C integer literal, keeping the bit pattern of values above i64::MAX
pub fn parse_literal(text: &str) -> Option<i64> {
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);

    let parsed = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2)
    } else if digits.len() > 1 && digits.starts_with('0') {
        u64::from_str_radix(&digits[1..], 8)
    } else {
        digits.parse::<u64>()
    };

    parsed.ok().map(|value| value as i64)
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut rest = text.trim_start();

    while let Some(c) = rest.chars().next() {
        if c.is_ascii_alphanumeric() || c == '_' {
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            let word = &rest[..end];
            if word.starts_with(|c: char| c.is_ascii_digit()) {
                let value =
                    parse_literal(word).ok_or_else(|| format!("invalid literal `{}`", word))?;
                tokens.push(Token::Number(value));
            } else {
                tokens.push(Token::Ident(word.to_string()));
            }
            rest = &rest[end..];
        } else if c == '\'' {
            let (value, len) = char_literal(rest)
                .ok_or_else(|| format!("invalid character literal in `{}`", text))?;
            tokens.push(Token::Number(value));
            rest = &rest[len..];
        } else if c == '(' {
            tokens.push(Token::Open);
            rest = &rest[1..];
        } else if c == ')' {
            tokens.push(Token::Close);
            rest = &rest[1..];
        } else if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(*op)) {
            tokens.push(Token::Op(*op));
            rest = &rest[op.len()..];
        } else {
            return Err(format!("unexpected `{}` in `{}`", c, text));
        }
        rest = rest.trim_start();
    }

    Ok(tokens)
}

/// `'a'` or a simple escape such as `'\n'`; returns the value and byte length
fn char_literal(text: &str) -> Option<(i64, usize)> {
    let mut chars = text.char_indices().skip(1);
    let (_, c) = chars.next()?;
    let value = if c == '\\' {
        match chars.next()?.1 {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            other => other,
        }
    } else {
        c
    };

    match chars.next()? {
        (end, '\'') => Some((value as i64, end + 1)),
        _ => None,
    }
}

/// Binding strength of a binary operator, loosest first
fn precedence(op: &str) -> Option<u8> {
    Some(match op {
        "||" => 1,
        "&&" => 2,
        "|" => 3,
        "^" => 4,
        "&" => 5,
        "==" | "!=" => 6,
        "<" | "<=" | ">" | ">=" => 7,
        "<<" | ">>" => 8,
        "+" | "-" => 9,
        "*" | "/" | "%" => 10,
        _ => return None,
    })
}

fn apply(op: &str, lhs: i64, rhs: i64) -> Result<i64, String> {
    let shift = |rhs: i64| {
        u32::try_from(rhs)
            .ok()
            .filter(|amount| *amount < 64)
            .ok_or_else(|| format!("shift by {} out of range", rhs))
    };

    Ok(match op {
        "||" => (lhs != 0 || rhs != 0) as i64,
        "&&" => (lhs != 0 && rhs != 0) as i64,
        "|" => lhs | rhs,
        "^" => lhs ^ rhs,
        "&" => lhs & rhs,
        "==" => (lhs == rhs) as i64,
        "!=" => (lhs != rhs) as i64,
        "<" => (lhs < rhs) as i64,
        "<=" => (lhs <= rhs) as i64,
        ">" => (lhs > rhs) as i64,
        ">=" => (lhs >= rhs) as i64,
        "<<" => lhs.wrapping_shl(shift(rhs)?),
        ">>" => lhs.wrapping_shr(shift(rhs)?),
        "+" => lhs.wrapping_add(rhs),
        "-" => lhs.wrapping_sub(rhs),
        "*" => lhs.wrapping_mul(rhs),
        "/" | "%" if rhs == 0 => return Err("division by zero".to_string()),
        "/" => lhs.wrapping_div(rhs),
        "%" => lhs.wrapping_rem(rhs),
        other => return Err(format!("unexpected operator `{}`", other)),
    })
}

/// Narrow a value the way a C cast to `type_name` would
fn cast(type_name: &str, value: i64) -> i64 {
    match Primitive::from_c_name(type_name) {
        Some(Primitive::Bool) => (value != 0) as i64,
        Some(Primitive::Char | Primitive::SChar | Primitive::I8) => value as i8 as i64,
        Some(Primitive::UChar | Primitive::U8) => value as u8 as i64,
        Some(Primitive::Short | Primitive::I16) => value as i16 as i64,
        Some(Primitive::UShort | Primitive::U16) => value as u16 as i64,
        Some(Primitive::Int | Primitive::I32) => value as i32 as i64,
        Some(Primitive::UInt | Primitive::U32) => value as u32 as i64,
        // 64-bit, platform-sized, or a typedef we cannot see through
        _ => value,
    }
}

struct ExprParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    known: &'a HashMap<String, i64>,
}

impl ExprParser<'_> {
    fn peek_op(&self) -> Option<&'static str> {
        match self.tokens.get(self.pos) {
            Some(Token::Op(op)) => Some(*op),
            _ => None,
        }
    }

    fn next(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn conditional(&mut self) -> Result<i64, String> {
        let condition = self.binary(1)?;
        if self.peek_op() != Some("?") {
            return Ok(condition);
        }

        self.pos += 1;
        let then = self.conditional()?;
        if self.peek_op() != Some(":") {
            return Err("`?` without `:`".to_string());
        }
        self.pos += 1;
        let otherwise = self.conditional()?;

        Ok(if condition != 0 { then } else { otherwise })
    }

    /// Precedence climbing over the left-associative binary operators
    fn binary(&mut self, min: u8) -> Result<i64, String> {
        let mut lhs = self.unary()?;

        while let Some(op) = self.peek_op() {
            let Some(strength) = precedence(op).filter(|s| *s >= min) else {
                break;
            };
            self.pos += 1;
            let rhs = self.binary(strength + 1)?;
            lhs = apply(op, lhs, rhs)?;
        }

        Ok(lhs)
    }

    fn unary(&mut self) -> Result<i64, String> {
        match self.next().cloned() {
            Some(Token::Op("-")) => Ok(self.unary()?.wrapping_neg()),
            Some(Token::Op("+")) => self.unary(),
            Some(Token::Op("~")) => Ok(!self.unary()?),
            Some(Token::Op("!")) => Ok((self.unary()? == 0) as i64),
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Ident(name)) => self
                .known
                .get(&name)
                .copied()
                .ok_or_else(|| format!("unknown member `{}`", name)),
            Some(Token::Open) => {
                if let Some(type_name) = self.cast_type() {
                    let value = self.unary()?;
                    return Ok(cast(&type_name, value));
                }

                let value = self.conditional()?;
                match self.next() {
                    Some(Token::Close) => Ok(value),
                    _ => Err("unbalanced parenthesis".to_string()),
                }
            }
            Some(other) => Err(format!("unexpected token {:?}", other)),
            None => Err("empty expression".to_string()),
        }
    }

    /// After `(`: consume `type-name )` when followed by an operand.
    ///
    /// A type name is one or more identifiers that are not enum members,
    /// optionally followed by `*`. Pointer casts keep the value unchanged.
    fn cast_type(&mut self) -> Option<String> {
        let mut words = Vec::new();
        let mut end = self.pos;
        while let Some(Token::Ident(word)) = self.tokens.get(end) {
            if self.known.contains_key(word) {
                return None;
            }
            words.push(word.as_str());
            end += 1;
        }

        let mut pointer = false;
        while let Some(Token::Op("*")) = self.tokens.get(end) {
            pointer = true;
            end += 1;
        }

        if words.is_empty() || self.tokens.get(end) != Some(&Token::Close) {
            return None;
        }

        let starts_operand = matches!(
            self.tokens.get(end + 1),
            Some(Token::Number(_) | Token::Ident(_) | Token::Open)
                | Some(Token::Op("-" | "+" | "~" | "!"))
        );
        if !starts_operand {
            return None;
        }

        self.pos = end + 1;
        let words: Vec<&str> = words
            .into_iter()
            .filter(|w| !matches!(*w, "const" | "volatile"))
            .collect();
        Some(if pointer {
            "void *".to_string()
        } else {
            words.join(" ")
        })
    }
}
