use thiserror::Error;

/// A genre field that could not be read as a list of records
#[derive(Debug, Error, PartialEq)]
pub enum MalformedFieldError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character '{found}' at offset {offset}")]
    UnexpectedChar { offset: usize, found: char },

    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("unexpected shape: {0}")]
    UnexpectedShape(&'static str),
}

/// Flattens a raw genre field into space-separated genre names.
///
/// TMDB exports store genres as a literal list of records, e.g.
/// `[{"id": 28, "name": "Action"}, {"id": 12, "name": "Adventure"}]`, with
/// both JSON and Python-literal quoting in the wild.
///
/// Missing fields, the empty list and malformed encodings all yield an empty
/// string; a dirty record only loses its genre signal.
pub fn genres_text(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    if raw.trim() == "[]" {
        return String::new();
    }

    match parse_genre_names(raw) {
        Ok(names) => names.join(" "),
        Err(e) => {
            tracing::debug!(error = %e, raw = %raw, "Malformed genre field, treating as empty");
            String::new()
        }
    }
}

/// Parses a raw genre field and extracts the `name` of every record element,
/// in source order. Elements that are not records, or records without a
/// `name`, are skipped.
pub fn parse_genre_names(raw: &str) -> Result<Vec<String>, MalformedFieldError> {
    let value = Literal::parse(raw)?;
    let Literal::List(items) = value else {
        return Err(MalformedFieldError::UnexpectedShape("top-level value is not a list"));
    };

    let mut names = Vec::new();
    for item in items {
        let Literal::Dict(entries) = item else {
            continue;
        };
        // Like a Python dict, a repeated key keeps its last value
        let name = entries
            .into_iter()
            .rev()
            .find(|(key, _)| matches!(key, Literal::Str(k) if k == "name"))
            .map(|(_, value)| value);
        match name {
            Some(Literal::Str(name)) => names.push(name),
            Some(_) => return Err(MalformedFieldError::UnexpectedShape("genre name is not a string")),
            None => {}
        }
    }
    Ok(names)
}

/// Literal values accepted in a genre field
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)] // scalar payloads are parsed but never inspected
enum Literal {
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    Dict(Vec<(Literal, Literal)>),
    Str(String),
    Bytes(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
}

impl Literal {
    fn parse(input: &str) -> Result<Self, MalformedFieldError> {
        let mut parser = Parser {
            chars: input.chars().collect(),
            pos: 0,
        };
        parser.skip_whitespace();
        let value = parser.value()?;
        parser.skip_whitespace();
        match parser.peek() {
            None => Ok(value),
            Some(found) => Err(MalformedFieldError::UnexpectedChar {
                offset: parser.pos,
                found,
            }),
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Result<char, MalformedFieldError> {
        let c = self.peek().ok_or(MalformedFieldError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(c)
    }

    fn expect(&mut self, expected: char) -> Result<(), MalformedFieldError> {
        let offset = self.pos;
        match self.bump()? {
            c if c == expected => Ok(()),
            found => Err(MalformedFieldError::UnexpectedChar { offset, found }),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn value(&mut self) -> Result<Literal, MalformedFieldError> {
        match self.peek() {
            None => Err(MalformedFieldError::UnexpectedEnd),
            Some('[') => self.sequence('[', ']').map(Literal::List),
            Some('(') => self.sequence('(', ')').map(Literal::Tuple),
            Some('{') => self.dict(),
            Some('"' | '\'') => self.string_literal(),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            Some(_) if self.at_string_start() => self.string_literal(),
            Some(c) if c.is_alphabetic() => self.keyword(),
            Some(found) => Err(MalformedFieldError::UnexpectedChar {
                offset: self.pos,
                found,
            }),
        }
    }

    fn sequence(&mut self, open: char, close: char) -> Result<Vec<Literal>, MalformedFieldError> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.value()?);
            self.skip_whitespace();
            let offset = self.pos;
            match self.bump()? {
                ',' => continue,
                c if c == close => return Ok(items),
                found => return Err(MalformedFieldError::UnexpectedChar { offset, found }),
            }
        }
    }

    fn dict(&mut self) -> Result<Literal, MalformedFieldError> {
        self.expect('{')?;
        let mut entries = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Literal::Dict(entries));
            }
            let key = self.value()?;
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            let value = self.value()?;
            entries.push((key, value));
            self.skip_whitespace();
            let offset = self.pos;
            match self.bump()? {
                ',' => continue,
                '}' => return Ok(Literal::Dict(entries)),
                found => return Err(MalformedFieldError::UnexpectedChar { offset, found }),
            }
        }
    }

    /// True when the cursor sits on a string literal, optionally prefixed
    /// with `u`, `r`, `b`, `rb` or `br` in either case
    fn at_string_start(&self) -> bool {
        let prefix_len = self.chars[self.pos..]
            .iter()
            .take_while(|c| matches!(**c, 'u' | 'U' | 'r' | 'R' | 'b' | 'B'))
            .count();
        prefix_len <= 2 && matches!(self.chars.get(self.pos + prefix_len), Some('"' | '\''))
    }

    /// One or more adjacent string literals, joined into one value
    fn string_literal(&mut self) -> Result<Literal, MalformedFieldError> {
        let (mut text, bytes) = self.string_piece()?;
        loop {
            let resume = self.pos;
            self.skip_whitespace();
            if !self.at_string_start() {
                self.pos = resume;
                break;
            }
            let (more, more_bytes) = self.string_piece()?;
            if more_bytes != bytes {
                return Err(MalformedFieldError::UnexpectedShape(
                    "cannot mix bytes and text literals",
                ));
            }
            text.push_str(&more);
        }
        Ok(if bytes {
            Literal::Bytes(text)
        } else {
            Literal::Str(text)
        })
    }

    /// A single quoted literal; returns its text and whether it was bytes
    fn string_piece(&mut self) -> Result<(String, bool), MalformedFieldError> {
        let start = self.pos;
        let mut prefix = String::new();
        while let Some(c @ ('u' | 'U' | 'r' | 'R' | 'b' | 'B')) = self.peek() {
            prefix.push(c.to_ascii_lowercase());
            self.pos += 1;
        }
        if !matches!(prefix.as_str(), "" | "u" | "r" | "b" | "rb" | "br") {
            return Err(MalformedFieldError::UnexpectedChar {
                offset: start,
                found: self.chars[start],
            });
        }
        let raw = prefix.contains('r');
        let bytes = prefix.contains('b');

        let offset = self.pos;
        let quote = match self.bump()? {
            q @ ('"' | '\'') => q,
            found => return Err(MalformedFieldError::UnexpectedChar { offset, found }),
        };
        let triple = self.chars.get(self.pos) == Some(&quote)
            && self.chars.get(self.pos + 1) == Some(&quote);
        if triple {
            self.pos += 2;
        }

        let mut out = String::new();
        loop {
            let offset = self.pos;
            match self.bump()? {
                c if c == quote => {
                    if !triple {
                        return Ok((out, bytes));
                    }
                    if self.chars.get(self.pos) == Some(&quote)
                        && self.chars.get(self.pos + 1) == Some(&quote)
                    {
                        self.pos += 2;
                        return Ok((out, bytes));
                    }
                    out.push(c);
                }
                '\n' if !triple => {
                    return Err(MalformedFieldError::UnexpectedChar { offset, found: '\n' })
                }
                '\\' if raw => {
                    // Raw strings keep the backslash and never end on an escaped quote
                    out.push('\\');
                    out.push(self.bump()?);
                }
                '\\' => self.escape(&mut out, bytes, offset)?,
                c => out.push(c),
            }
        }
    }

    /// Decodes the escape after a backslash. Unrecognized escapes are kept
    /// verbatim, backslash included.
    fn escape(&mut self, out: &mut String, bytes: bool, offset: usize) -> Result<(), MalformedFieldError> {
        let c = self.bump()?;
        let decoded = match c {
            '\n' => return Ok(()),
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{0b}',
            '0'..='7' => {
                let mut code = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            self.pos += 1;
                        }
                        None => break,
                    }
                }
                char::from_u32(code).ok_or(MalformedFieldError::InvalidEscape { offset })?
            }
            'x' => self.hex_escape(2, offset)?,
            'u' if !bytes => self.hex_escape(4, offset)?,
            'U' if !bytes => self.hex_escape(8, offset)?,
            'N' if !bytes => return Err(MalformedFieldError::InvalidEscape { offset }),
            other => {
                out.push('\\');
                other
            }
        };
        out.push(decoded);
        Ok(())
    }

    /// Exactly `digits` hex digits naming a code point
    fn hex_escape(&mut self, digits: usize, offset: usize) -> Result<char, MalformedFieldError> {
        let mut code = 0u32;
        for _ in 0..digits {
            let digit = self
                .peek()
                .and_then(|d| d.to_digit(16))
                .ok_or(MalformedFieldError::InvalidEscape { offset })?;
            code = code * 16 + digit;
            self.pos += 1;
        }
        char::from_u32(code).ok_or(MalformedFieldError::InvalidEscape { offset })
    }

    fn number(&mut self) -> Result<Literal, MalformedFieldError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => {}
                '.' | 'e' | 'E' => is_float = true,
                '-' | '+' if matches!(self.chars.get(self.pos - 1), Some('e' | 'E')) => {}
                _ => break,
            }
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        let invalid = || MalformedFieldError::InvalidNumber(text.clone());
        if is_float {
            text.parse().map(Literal::Float).map_err(|_| invalid())
        } else {
            text.parse().map(Literal::Int).map_err(|_| invalid())
        }
    }

    fn keyword(&mut self) -> Result<Literal, MalformedFieldError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            _ => Err(MalformedFieldError::UnexpectedChar {
                offset: start,
                found: self.chars[start],
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_encoded_genres() {
        let raw = r#"[{"id": 28, "name": "Action"}, {"id": 12, "name": "Adventure"}, {"id": 14, "name": "Fantasy"}]"#;
        assert_eq!(genres_text(Some(raw)), "Action Adventure Fantasy");
    }

    #[test]
    fn test_python_literal_genres() {
        let raw = "[{'id': 18, 'name': 'Drama'}, {'id': 10749, 'name': \"Romance\"}]";
        assert_eq!(genres_text(Some(raw)), "Drama Romance");
    }

    #[test]
    fn test_missing_and_empty_list() {
        assert_eq!(genres_text(None), "");
        assert_eq!(genres_text(Some("[]")), "");
        assert_eq!(genres_text(Some("  [ ]  ")), "");
    }

    #[test]
    fn test_malformed_field_is_empty() {
        assert_eq!(genres_text(Some("[{'id': 28, 'name': 'Action'")), "");
        assert_eq!(genres_text(Some("Action|Adventure")), "");
        assert_eq!(genres_text(Some("")), "");
    }

    #[test]
    fn test_malformed_field_reports_error() {
        assert_eq!(
            parse_genre_names("[{'name': 'Action'}"),
            Err(MalformedFieldError::UnexpectedEnd)
        );
        assert!(matches!(
            parse_genre_names("[{'name': 'Action'}] extra"),
            Err(MalformedFieldError::UnexpectedChar { found: 'e', .. })
        ));
    }

    #[test]
    fn test_non_list_top_level_is_rejected() {
        assert_eq!(
            parse_genre_names("{'name': 'Action'}"),
            Err(MalformedFieldError::UnexpectedShape("top-level value is not a list"))
        );
        assert_eq!(genres_text(Some("('Action',)")), "");
    }

    #[test]
    fn test_elements_without_name_are_skipped() {
        let raw = r#"[{"id": 1}, "Horror", 42, {"name": "Comedy", "extra": [1, 2.5, -3e2, true]}]"#;
        // `true` is not a Python literal
        assert_eq!(genres_text(Some(raw)), "");

        let raw = "[{'id': 1}, 'Horror', 42, None, {'name': 'Comedy', 'extra': (1, 2.5, -3e2, True)}]";
        assert_eq!(parse_genre_names(raw).unwrap(), vec!["Comedy".to_string()]);
    }

    #[test]
    fn test_non_string_name_is_malformed() {
        assert_eq!(genres_text(Some("[{'name': 28}]")), "");
    }

    #[test]
    fn test_escapes_and_unicode() {
        let raw = r#"[{"name": "Science \"Fiction\""}, {"name": "Comédie"}, {"name": "Ciência"}]"#;
        assert_eq!(
            parse_genre_names(raw).unwrap(),
            vec!["Science \"Fiction\"", "Comédie", "Ciência"]
        );
    }

    #[test]
    fn test_trailing_commas_allowed() {
        let raw = "[{'name': 'War',},]";
        assert_eq!(genres_text(Some(raw)), "War");
    }

    #[test]
    fn test_string_prefixes_accepted() {
        assert_eq!(genres_text(Some("[{u'name': u'Action'}]")), "Action");
        assert_eq!(
            parse_genre_names(r"[{'name': U'Drama' r'\d'}, {'name': R'Sci\'Fi'}]").unwrap(),
            vec![r"Drama\d", r"Sci\'Fi"]
        );
        assert!(parse_genre_names("[{'name': ur'Action'}]").is_err());
    }

    #[test]
    fn test_repeated_key_keeps_last_value() {
        assert_eq!(genres_text(Some("[{'name':'A','name':'B'}]")), "B");
    }

    #[test]
    fn test_unknown_escape_kept_verbatim() {
        assert_eq!(genres_text(Some(r"[{'name':'Sci\-Fi'}]")), r"Sci\-Fi");
        assert_eq!(genres_text(Some(r"[{'name':'Sci\/Fi'}]")), r"Sci\/Fi");
        assert_eq!(genres_text(Some(r"[{'name':'\101\x42'}]")), "AB");
        assert_eq!(genres_text(Some(r"[{'name':'Com\u00e9die'}]")), "Comédie");
        assert!(parse_genre_names(r"[{'name':'\x4'}]").is_err());
    }

    #[test]
    fn test_adjacent_strings_are_joined() {
        assert_eq!(genres_text(Some("[{'name':'Ac' 'tion'}]")), "Action");
        let raw = "[{'name': 'Film\\\ncd' '''\nNoir'''}]";
        assert_eq!(parse_genre_names(raw).unwrap(), vec!["Filmcd\nNoir"]);
    }

    #[test]
    fn test_bytes_name_is_malformed() {
        assert!(matches!(
            parse_genre_names("[{'name': b'Action'}]"),
            Err(MalformedFieldError::UnexpectedShape(_))
        ));
        assert!(parse_genre_names("[{'name': 'Ac' b'tion'}]").is_err());
        // Newlines only appear inside triple-quoted strings
        assert!(parse_genre_names("[{'name': 'Film\nNoir'}]").is_err());
    }
}
