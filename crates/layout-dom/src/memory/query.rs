//! Minimal CSS selector matching for the in-memory document.
//!
//! Supports selector lists (`,`), descendant (whitespace) and child (`>`)
//! combinators, and compounds built from a tag or `*`, `#id`, `.class` and
//! `[name]`, `[name=value]`, `[name^=value]`, `[name*=value]` filters. Values
//! may be quoted and then hold spaces, commas and brackets.

use crate::errors::{LayoutError, LayoutResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
    Contains(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, AttrOp)>,
}

/// What the matcher needs to know about an element.
pub trait Subject: Sized {
    fn tag(&self) -> Option<String>;
    fn attr(&self, name: &str) -> Option<String>;
    /// Parent element, `None` at a document or fragment boundary.
    fn parent_element(&self) -> Option<Self>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    /// Compounds right to left; `combinators[i]` joins `parts[i]` to `parts[i + 1]`.
    parts: Vec<Compound>,
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    items: Vec<Complex>,
}

impl SelectorList {
    pub fn parse(source: &str) -> LayoutResult<Self> {
        let mut items = Vec::new();
        let mut current = Vec::new();
        for token in tokenize(source) {
            match token {
                Token::Comma => items.push(parse_complex(source, &std::mem::take(&mut current))?),
                other => current.push(other),
            }
        }
        items.push(parse_complex(source, &current)?);
        Ok(Self { items })
    }

    pub fn matches<S: Subject>(&self, subject: &S) -> bool {
        self.items
            .iter()
            .any(|complex| matches_from(complex, 0, subject))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Compound(&'a str),
    Child,
    Comma,
}

/// Splits on whitespace, `>` and `,`. Attribute brackets and the quoted
/// values inside them are kept whole.
fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_brackets = false;
    let mut quote: Option<char> = None;

    for (idx, c) in source.char_indices() {
        if let Some(open) = quote {
            if c == open {
                quote = None;
            }
            continue;
        }
        if in_brackets {
            match c {
                '"' | '\'' => quote = Some(c),
                ']' => in_brackets = false,
                _ => {}
            }
            continue;
        }
        let separator = match c {
            '>' => Some(Token::Child),
            ',' => Some(Token::Comma),
            c if c.is_whitespace() => None,
            _ => {
                in_brackets = c == '[';
                start.get_or_insert(idx);
                continue;
            }
        };
        if let Some(begin) = start.take() {
            tokens.push(Token::Compound(&source[begin..idx]));
        }
        tokens.extend(separator);
    }
    if let Some(begin) = start {
        tokens.push(Token::Compound(&source[begin..]));
    }
    tokens
}

fn parse_complex(source: &str, tokens: &[Token<'_>]) -> LayoutResult<Complex> {
    let mut parts = Vec::new();
    let mut combinators = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in tokens {
        let text = match token {
            Token::Compound(text) => text,
            Token::Child => {
                if parts.is_empty() || pending == Some(Combinator::Child) {
                    return Err(LayoutError::invalid_selector(source, "dangling combinator"));
                }
                pending = Some(Combinator::Child);
                continue;
            }
            Token::Comma => continue,
        };
        if !parts.is_empty() {
            combinators.push(pending.take().unwrap_or(Combinator::Descendant));
        }
        pending = None;
        parts.push(parse_compound(source, text)?);
    }

    if parts.is_empty() || pending.is_some() {
        return Err(LayoutError::invalid_selector(source, "empty selector"));
    }
    parts.reverse();
    combinators.reverse();
    Ok(Complex { parts, combinators })
}

fn parse_compound(source: &str, token: &str) -> LayoutResult<Compound> {
    let chars: Vec<char> = token.chars().collect();
    let mut compound = Compound::default();
    let mut idx = 0;

    if chars[0] == '*' {
        idx = 1;
    } else if is_ident_char(chars[0]) {
        let (tag, next) = read_ident(&chars, 0);
        compound.tag = Some(tag);
        idx = next;
    }

    while idx < chars.len() {
        match chars[idx] {
            '#' => {
                let (id, next) = read_ident(&chars, idx + 1);
                if id.is_empty() {
                    return Err(LayoutError::invalid_selector(source, "empty id"));
                }
                compound.id = Some(id);
                idx = next;
            }
            '.' => {
                let (class, next) = read_ident(&chars, idx + 1);
                if class.is_empty() {
                    return Err(LayoutError::invalid_selector(source, "empty class"));
                }
                compound.classes.push(class);
                idx = next;
            }
            '[' => {
                let close = closing_bracket(&chars, idx)
                    .ok_or_else(|| LayoutError::invalid_selector(source, "unclosed attribute"))?;
                let body: String = chars[idx + 1..close].iter().collect();
                compound.attrs.push(parse_attr(source, &body)?);
                idx = close + 1;
            }
            other => {
                return Err(LayoutError::invalid_selector(
                    source,
                    format!("unexpected character `{other}`"),
                ));
            }
        }
    }
    Ok(compound)
}

/// Index of the `]` closing the bracket opened at `open`, skipping quoted
/// values.
fn closing_bracket(chars: &[char], open: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (offset, c) in chars[open + 1..].iter().copied().enumerate() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == ']' => return Some(open + 1 + offset),
            None => {}
        }
    }
    None
}

fn parse_attr(source: &str, body: &str) -> LayoutResult<(String, AttrOp)> {
    // The operator is whatever precedes the first `=`; the value may hold
    // operator characters of its own.
    let (name, op) = match body.find('=') {
        None => (body, AttrOp::Exists),
        Some(eq) => {
            let head = &body[..eq];
            let value = unquote(&body[eq + 1..]);
            if let Some(name) = head.strip_suffix('^') {
                (name, AttrOp::Prefix(value))
            } else if let Some(name) = head.strip_suffix('*') {
                (name, AttrOp::Contains(value))
            } else {
                (head, AttrOp::Equals(value))
            }
        }
    };
    let name = name.trim();
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(LayoutError::invalid_selector(source, "bad attribute name"));
    }
    Ok((name.to_ascii_lowercase(), op))
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    if quoted {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &[char], start: usize) -> (String, usize) {
    let mut end = start;
    while end < chars.len() && is_ident_char(chars[end]) {
        end += 1;
    }
    (chars[start..end].iter().collect(), end)
}

fn matches_compound<S: Subject>(compound: &Compound, subject: &S) -> bool {
    let Some(tag) = subject.tag() else {
        return false;
    };
    if let Some(expected) = &compound.tag {
        if !expected.eq_ignore_ascii_case(&tag) {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if subject.attr("id").as_deref() != Some(id.as_str()) {
            return false;
        }
    }
    if !compound.classes.is_empty() {
        let class = subject.attr("class").unwrap_or_default();
        let names: Vec<&str> = class.split_whitespace().collect();
        if !compound.classes.iter().all(|c| names.contains(&c.as_str())) {
            return false;
        }
    }
    compound.attrs.iter().all(|(name, op)| {
        let value = subject.attr(name);
        match op {
            AttrOp::Exists => value.is_some(),
            AttrOp::Equals(expected) => value.as_deref() == Some(expected.as_str()),
            AttrOp::Prefix(prefix) => value.map(|v| v.starts_with(prefix.as_str())).unwrap_or(false),
            AttrOp::Contains(part) => value.map(|v| v.contains(part.as_str())).unwrap_or(false),
        }
    })
}

fn matches_from<S: Subject>(complex: &Complex, index: usize, subject: &S) -> bool {
    if !matches_compound(&complex.parts[index], subject) {
        return false;
    }
    let Some(combinator) = complex.combinators.get(index) else {
        return true;
    };
    match combinator {
        Combinator::Child => subject
            .parent_element()
            .map(|parent| matches_from(complex, index + 1, &parent))
            .unwrap_or(false),
        Combinator::Descendant => {
            let mut ancestor = subject.parent_element();
            while let Some(current) = ancestor {
                if matches_from(complex, index + 1, &current) {
                    return true;
                }
                ancestor = current.parent_element();
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_quoted_and_dangling_selectors() {
        assert!(SelectorList::parse("'#id'").is_err());
        assert!(SelectorList::parse("div >").is_err());
        assert!(SelectorList::parse("div,").is_err());
        assert!(SelectorList::parse("[=x]").is_err());
    }

    #[test]
    fn parses_compound_lists() {
        assert!(SelectorList::parse("input[type=password], .secret > span#a.b").is_ok());
        assert!(SelectorList::parse("img[src^='blob:']").is_ok());
    }

    #[test]
    fn quoted_attribute_values_keep_separators() {
        let list = SelectorList::parse(r#"a[title="a b, c > d"], [data-x='1]2']"#).unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(
            list.items[0].parts[0].attrs,
            vec![("title".to_string(), AttrOp::Equals("a b, c > d".into()))]
        );
        assert_eq!(
            list.items[1].parts[0].attrs,
            vec![("data-x".to_string(), AttrOp::Equals("1]2".into()))]
        );
    }

    #[test]
    fn operator_is_read_before_the_value() {
        let list = SelectorList::parse("[href='/a^=b']").unwrap();
        assert_eq!(
            list.items[0].parts[0].attrs,
            vec![("href".to_string(), AttrOp::Equals("/a^=b".into()))]
        );
    }
}
