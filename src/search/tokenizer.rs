//! Query tokenizer
//!
//! Splits a raw query into quoted phrases and whitespace-separated words.
//! Quotes are stripped and never escaped. A quote opening inside a word keeps
//! the word going until the closing quote, so `milestone:"Release 1"` is a
//! single word with the value `Release 1`. A quote with no closing partner is
//! an ordinary character and the word ends at the next whitespace.

/// One token of a raw query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawToken {
    /// A token that started with a quote; always free text
    Phrase(String),
    /// A bare word. `colon` is the byte offset of the first `:` outside quotes.
    Word { text: String, colon: Option<usize> },
}

impl RawToken {
    pub fn text(&self) -> &str {
        match self {
            RawToken::Phrase(text) => text,
            RawToken::Word { text, .. } => text,
        }
    }

    /// Split a word into `(keyword, value)` at its first unquoted colon
    pub fn keyword_pair(&self) -> Option<(&str, &str)> {
        match self {
            RawToken::Word {
                text,
                colon: Some(idx),
            } => Some((&text[..*idx], &text[*idx + 1..])),
            _ => None,
        }
    }
}

/// Tokenize a raw query string
pub fn tokenize(input: &str) -> Vec<RawToken> {
    let mut tokens = Vec::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        if let Some((phrase, after)) = quoted(rest) {
            if !phrase.is_empty() {
                tokens.push(RawToken::Phrase(phrase.to_string()));
            }
            rest = after.trim_start();
            continue;
        }

        let mut text = String::new();
        let mut colon = None;
        while let Some(c) = rest.chars().next() {
            if c.is_whitespace() {
                break;
            }
            if let Some((inner, after)) = quoted(rest) {
                text.push_str(inner);
                rest = after;
                continue;
            }
            if c == ':' && colon.is_none() {
                colon = Some(text.len());
            }
            text.push(c);
            rest = &rest[c.len_utf8()..];
        }
        if !text.is_empty() {
            tokens.push(RawToken::Word { text, colon });
        }
        rest = rest.trim_start();
    }

    tokens
}

/// Split `"inner"after` when `s` opens a quote that is closed later
fn quoted(s: &str) -> Option<(&str, &str)> {
    let body = s.strip_prefix('"')?;
    let close = body.find('"')?;
    Some((&body[..close], &body[close + 1..]))
}
