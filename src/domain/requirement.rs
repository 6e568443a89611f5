//! PEP 508 requirement strings as published in `requires_dist` metadata
//!
//! `numpy<2,>=1.21`, `pandas (>=1.2)`, `pytest ; extra == "dev"`,
//! `tomli>=1.1.0; python_version < "3.11"`

use super::{normalize_name, PinnedVersion, SpecifierSet};
use regex::Regex;
use std::sync::LazyLock;

static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<name>[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[(?P<extras>[^\]]*)\])?\s*(?P<spec>[^;]*?)\s*(?:;\s*(?P<marker>.*?))?\s*$",
    )
    .unwrap()
});

/// A dependency requirement published by a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub extras: Vec<String>,
    pub specifier: SpecifierSet,
    /// Direct reference (`name @ https://...`), never matched against pins
    pub url: Option<String>,
    pub marker: Option<Marker>,
    pub raw: String,
}

impl Requirement {
    /// Parse a requirement string, returning None if it is malformed
    pub fn parse(text: &str) -> Option<Self> {
        let caps = REQUIREMENT_RE.captures(text)?;
        let name = caps.name("name")?.as_str().to_string();
        let extras = caps
            .name("extras")
            .map(|m| {
                m.as_str()
                    .split(',')
                    .map(|e| e.trim().to_string())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let spec_text = caps.name("spec").map_or("", |m| m.as_str());
        let (specifier, url) = match spec_text.strip_prefix('@') {
            Some(url) => (SpecifierSet::default(), Some(url.trim().to_string())),
            None => (SpecifierSet::parse(spec_text)?, None),
        };

        let marker = match caps.name("marker").map(|m| m.as_str()) {
            Some(text) if !text.is_empty() => Some(Marker::parse(text)?),
            _ => None,
        };

        Some(Self {
            name,
            extras,
            specifier,
            url,
            marker,
            raw: text.trim().to_string(),
        })
    }

    /// PEP 503 normalized project name
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Returns true if the requirement applies in `env`
    pub fn applies_to(&self, env: &MarkerEnvironment) -> bool {
        self.marker
            .as_ref()
            .map_or(true, |marker| marker.evaluate(env))
    }
}

/// Values markers are evaluated against. Unset values make their clauses pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerEnvironment {
    pub python_version: Option<String>,
    pub python_full_version: Option<String>,
    pub sys_platform: Option<String>,
    pub platform_system: Option<String>,
    pub os_name: Option<String>,
    /// Extras enabled on the requiring declaration
    pub extras: Vec<String>,
}

impl MarkerEnvironment {
    /// Copy of this environment with `extras` enabled
    pub fn with_extras(&self, extras: &[String]) -> Self {
        Self {
            extras: extras.iter().map(|e| normalize_name(e)).collect(),
            ..self.clone()
        }
    }

    fn lookup(&self, variable: &str) -> Option<&str> {
        match variable {
            "python_version" => self.python_version.as_deref(),
            "python_full_version" => self.python_full_version.as_deref(),
            "sys_platform" => self.sys_platform.as_deref(),
            "platform_system" => self.platform_system.as_deref(),
            "os_name" => self.os_name.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    Op(String),
    LParen,
    RParen,
    And,
    Or,
}

fn tokenize(text: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            _ if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '\'' | '"' => {
                let end = chars[i + 1..].iter().position(|&ch| ch == c)? + i + 1;
                tokens.push(Token::Str(chars[i + 1..end].iter().collect()));
                i = end + 1;
            }
            '<' | '>' | '=' | '!' | '~' => {
                let start = i;
                while i < chars.len() && matches!(chars[i], '<' | '>' | '=' | '!' | '~') {
                    i += 1;
                }
                tokens.push(Token::Op(chars[start..i].iter().collect()));
            }
            _ if c.is_ascii_alphanumeric() || c == '_' || c == '.' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.')
                {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                match word.as_str() {
                    "and" => tokens.push(Token::And),
                    "or" => tokens.push(Token::Or),
                    "in" => tokens.push(Token::Op("in".to_string())),
                    "not" => {
                        // only valid as the first half of `not in`
                        let mut j = i;
                        while j < chars.len() && chars[j].is_whitespace() {
                            j += 1;
                        }
                        let is_in = chars.get(j) == Some(&'i')
                            && chars.get(j + 1) == Some(&'n')
                            && !chars.get(j + 2).is_some_and(|ch| ch.is_ascii_alphanumeric());
                        if !is_in {
                            return None;
                        }
                        i = j + 2;
                        tokens.push(Token::Op("not in".to_string()));
                    }
                    _ => tokens.push(Token::Ident(word)),
                }
            }
            _ => return None,
        }
    }

    Some(tokens)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Variable(String),
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Compare { lhs: Value, op: String, rhs: Value },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

/// Environment marker expression (`python_version < "3.11" and extra == "excel"`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    expr: Expr,
    raw: String,
}

struct MarkerParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl MarkerParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn or_expr(&mut self) -> Option<Expr> {
        let mut lhs = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let rhs = self.and_expr()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Some(lhs)
    }

    fn and_expr(&mut self) -> Option<Expr> {
        let mut lhs = self.atom()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let rhs = self.atom()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Some(lhs)
    }

    fn atom(&mut self) -> Option<Expr> {
        if self.peek() == Some(&Token::LParen) {
            self.pos += 1;
            let inner = self.or_expr()?;
            if self.next()? != Token::RParen {
                return None;
            }
            return Some(inner);
        }

        let lhs = self.value()?;
        let op = match self.next()? {
            Token::Op(op) => op,
            _ => return None,
        };
        let rhs = self.value()?;
        Some(Expr::Compare { lhs, op, rhs })
    }

    fn value(&mut self) -> Option<Value> {
        match self.next()? {
            Token::Ident(name) => Some(Value::Variable(name)),
            Token::Str(text) => Some(Value::Literal(text)),
            _ => None,
        }
    }
}

const VERSION_VARIABLES: &[&str] = &[
    "python_version",
    "python_full_version",
    "implementation_version",
    "platform_release",
];

impl Marker {
    /// Parse a marker expression, returning None if it is malformed
    pub fn parse(text: &str) -> Option<Self> {
        let tokens = tokenize(text)?;
        let mut parser = MarkerParser { tokens, pos: 0 };
        let expr = parser.or_expr()?;
        if parser.pos != parser.tokens.len() {
            return None;
        }
        Some(Self {
            expr,
            raw: text.trim().to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn evaluate(&self, env: &MarkerEnvironment) -> bool {
        Self::eval(&self.expr, env)
    }

    fn eval(expr: &Expr, env: &MarkerEnvironment) -> bool {
        match expr {
            Expr::And(a, b) => Self::eval(a, env) && Self::eval(b, env),
            Expr::Or(a, b) => Self::eval(a, env) || Self::eval(b, env),
            Expr::Compare { lhs, op, rhs } => Self::compare(lhs, op, rhs, env),
        }
    }

    fn compare(lhs: &Value, op: &str, rhs: &Value, env: &MarkerEnvironment) -> bool {
        let extra_side = [lhs, rhs]
            .iter()
            .any(|v| matches!(v, Value::Variable(name) if name == "extra"));

        if extra_side {
            let literal = match (lhs, rhs) {
                (Value::Literal(text), _) | (_, Value::Literal(text)) => normalize_name(text),
                _ => return false,
            };
            let enabled = env.extras.contains(&literal);
            return match op {
                "==" => enabled,
                "!=" => !enabled,
                _ => false,
            };
        }

        let resolve = |value: &Value| -> Option<String> {
            match value {
                Value::Literal(text) => Some(text.clone()),
                Value::Variable(name) => env.lookup(name).map(str::to_string),
            }
        };

        // Unknown variables do not constrain the target
        let (Some(left), Some(right)) = (resolve(lhs), resolve(rhs)) else {
            return true;
        };

        let is_version_compare = [lhs, rhs].iter().any(|v| {
            matches!(v, Value::Variable(name) if VERSION_VARIABLES.contains(&name.as_str()))
        });

        match op {
            "in" => right.contains(left.as_str()),
            "not in" => !right.contains(left.as_str()),
            _ if is_version_compare => match (
                PinnedVersion::parse(&left),
                SpecifierSet::parse(&format!("{}{}", op, right)),
            ) {
                (Some(version), Some(spec)) => spec.contains(&version),
                _ => Self::compare_strings(&left, op, &right),
            },
            _ => Self::compare_strings(&left, op, &right),
        }
    }

    fn compare_strings(left: &str, op: &str, right: &str) -> bool {
        match op {
            "==" | "===" => left == right,
            "!=" => left != right,
            "<" => left < right,
            "<=" => left <= right,
            ">" => left > right,
            ">=" => left >= right,
            _ => false,
        }
    }
}
