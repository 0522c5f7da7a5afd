//! Path and scheme-specific-part matchers used by intent filters and providers.
//!
//! Five pattern kinds are supported:
//! - `Literal`: exact string equality
//! - `Prefix` / `Suffix`: `starts_with` / `ends_with`
//! - `SimpleGlob`: `.` matches any character, `x*` matches zero or more `x`,
//!   `.*` matches anything, `\` escapes the next character
//! - `AdvancedGlob`: `.`, character sets (`[a-z]`, `[^0-9]`), `\` escapes and
//!   the quantifiers `*`, `+`, `{n}` and `{m,n}`

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Literal,
    Prefix,
    SimpleGlob,
    AdvancedGlob,
    Suffix,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Literal => "literal",
            PatternKind::Prefix => "prefix",
            PatternKind::SimpleGlob => "glob",
            PatternKind::AdvancedGlob => "advanced_glob",
            PatternKind::Suffix => "suffix",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternMatcher {
    pub path: String,
    pub kind: PatternKind,
    #[serde(skip)]
    tokens: Vec<Token>,
}

impl PatternMatcher {
    /// Build a matcher. Only advanced globs can fail, when the pattern is malformed.
    pub fn new(path: impl Into<String>, kind: PatternKind) -> Result<Self, String> {
        let path = path.into();
        let tokens = if kind == PatternKind::AdvancedGlob {
            parse_advanced(&path)?
        } else {
            Vec::new()
        };
        Ok(Self { path, kind, tokens })
    }

    pub fn literal(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: PatternKind::Literal,
            tokens: Vec::new(),
        }
    }

    pub fn matches(&self, input: &str) -> bool {
        match self.kind {
            PatternKind::Literal => self.path == input,
            PatternKind::Prefix => input.starts_with(&self.path),
            PatternKind::Suffix => input.ends_with(&self.path),
            PatternKind::SimpleGlob => match_simple_glob(&self.path, input),
            PatternKind::AdvancedGlob => {
                let chars: Vec<char> = input.chars().collect();
                match_tokens(&self.tokens, &chars)
            }
        }
    }
}

impl fmt::Display for PatternMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.path)
    }
}

fn match_simple_glob(pattern: &str, input: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let input: Vec<char> = input.chars().collect();
    let np = pattern.len();
    let nm = input.len();

    if np == 0 {
        return nm == 0;
    }

    let at = |i: usize| -> Option<char> { pattern.get(i).copied() };

    let mut ip = 0;
    let mut im = 0;
    let mut next = at(0);

    while ip < np && im < nm {
        let mut c = next;
        ip += 1;
        next = at(ip);

        let escaped = c == Some('\\');
        if escaped {
            c = next;
            ip += 1;
            next = at(ip);
        }

        if next == Some('*') {
            if !escaped && c == Some('.') {
                if ip >= np - 1 {
                    // trailing ".*" swallows the rest
                    return true;
                }
                ip += 1;
                next = at(ip);
                if next == Some('\\') {
                    ip += 1;
                    next = at(ip);
                }
                while im < nm && Some(input[im]) != next {
                    im += 1;
                }
                if im == nm {
                    return false;
                }
                ip += 1;
                next = at(ip);
                im += 1;
            } else {
                while im < nm && Some(input[im]) == c {
                    im += 1;
                }
                ip += 1;
                next = at(ip);
            }
        } else {
            if c != Some('.') && Some(input[im]) != c {
                return false;
            }
            im += 1;
        }
    }

    if ip >= np && im >= nm {
        return true;
    }

    // input exhausted with a dangling ".*"
    np >= 2 && ip == np - 2 && pattern[ip] == '.' && pattern[ip + 1] == '*'
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Literal(char),
    Any,
    Set { ranges: Vec<(char, char)>, inverse: bool },
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    min: usize,
    max: usize,
}

impl Token {
    fn accepts(&self, c: char) -> bool {
        match &self.kind {
            TokenKind::Literal(l) => *l == c,
            TokenKind::Any => true,
            TokenKind::Set { ranges, inverse } => {
                ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi) != *inverse
            }
        }
    }
}

fn parse_advanced(pattern: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens: Vec<Token> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let kind = match c {
            '.' => {
                i += 1;
                TokenKind::Any
            }
            '\\' => {
                if i + 1 >= chars.len() {
                    return Err(format!("Escape at end of pattern: {}", pattern));
                }
                i += 2;
                TokenKind::Literal(chars[i - 1])
            }
            '[' => {
                let (kind, consumed) = parse_set(&chars[i..], pattern)?;
                i += consumed;
                kind
            }
            '*' | '+' | '{' => {
                return Err(format!(
                    "Modifier '{}' without a preceding token in pattern: {}",
                    c, pattern
                ));
            }
            ']' | '}' => {
                return Err(format!("Unmatched '{}' in pattern: {}", c, pattern));
            }
            _ => {
                i += 1;
                TokenKind::Literal(c)
            }
        };

        let (min, max) = match chars.get(i) {
            Some('*') => {
                i += 1;
                (0, usize::MAX)
            }
            Some('+') => {
                i += 1;
                (1, usize::MAX)
            }
            Some('{') => {
                let close = chars[i..]
                    .iter()
                    .position(|&ch| ch == '}')
                    .ok_or_else(|| format!("Missing '}}' in pattern: {}", pattern))?;
                let body: String = chars[i + 1..i + close].iter().collect();
                i += close + 1;
                parse_range(&body, pattern)?
            }
            _ => (1, 1),
        };

        tokens.push(Token { kind, min, max });
    }

    Ok(tokens)
}

fn parse_set(chars: &[char], pattern: &str) -> Result<(TokenKind, usize), String> {
    // chars[0] == '['
    let mut i = 1;
    let inverse = chars.get(i) == Some(&'^');
    if inverse {
        i += 1;
    }

    let mut ranges = Vec::new();
    loop {
        let c = match chars.get(i) {
            Some(']') => break,
            Some('\\') => {
                i += 1;
                *chars
                    .get(i)
                    .ok_or_else(|| format!("Escape at end of pattern: {}", pattern))?
            }
            Some(&c) => c,
            None => return Err(format!("Missing ']' in pattern: {}", pattern)),
        };
        i += 1;

        if chars.get(i) == Some(&'-') && chars.get(i + 1).map_or(false, |&n| n != ']') {
            let hi = chars[i + 1];
            if hi < c {
                return Err(format!("Invalid range {}-{} in pattern: {}", c, hi, pattern));
            }
            ranges.push((c, hi));
            i += 2;
        } else {
            ranges.push((c, c));
        }
    }

    if ranges.is_empty() {
        return Err(format!("Empty character set in pattern: {}", pattern));
    }

    Ok((TokenKind::Set { ranges, inverse }, i + 1))
}

fn parse_range(body: &str, pattern: &str) -> Result<(usize, usize), String> {
    let parse = |s: &str| -> Result<usize, String> {
        s.trim()
            .parse::<usize>()
            .map_err(|_| format!("Invalid range {{{}}} in pattern: {}", body, pattern))
    };

    let (min, max) = match body.split_once(',') {
        Some((lo, hi)) => (parse(lo)?, parse(hi)?),
        None => {
            let n = parse(body)?;
            (n, n)
        }
    };

    if max < min {
        return Err(format!("Invalid range {{{}}} in pattern: {}", body, pattern));
    }
    Ok((min, max))
}

fn match_tokens(tokens: &[Token], input: &[char]) -> bool {
    let Some((token, rest)) = tokens.split_first() else {
        return input.is_empty();
    };

    let mut count = 0;
    while count < token.max && count < input.len() && token.accepts(input[count]) {
        count += 1;
    }
    if count < token.min {
        return false;
    }

    (token.min..=count).rev().any(|n| match_tokens(rest, &input[n..]))
}
