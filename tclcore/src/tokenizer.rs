//! Tokenizer
//!
//! A cursor over the characters of a script, list, or expression string.  The script parser,
//! the list parser, and the expression parser all scan their input through a `Tokenizer`.

use std::str::Chars;

/// A cursor over an input string.  The tokenizer can be cloned to save a position, and
/// can return the text between a saved mark and the current position.
#[derive(Clone, Debug)]
pub(crate) struct Tokenizer<'a> {
    // The string being parsed.
    input: &'a str,

    // The starting index of the next character.
    index: usize,

    // The iterator over the remaining characters.
    chars: Chars<'a>,
}

impl<'a> Tokenizer<'a> {
    /// Creates a new tokenizer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            index: 0,
            chars: input.chars(),
        }
    }

    /// The byte index of the next character.
    pub fn mark(&self) -> usize {
        self.index
    }

    /// The remainder of the input.
    pub fn as_str(&self) -> &'a str {
        &self.input[self.index..]
    }

    /// The text from the given mark to the current position.
    pub fn token(&self, mark: usize) -> &'a str {
        &self.input[mark..self.index]
    }

    /// The whole input.
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Returns the next character and advances.
    pub fn next(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.index += ch.len_utf8();
        Some(ch)
    }

    /// Returns the next character without advancing.
    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// Returns the character after the next one without advancing.
    pub fn peek2(&self) -> Option<char> {
        let mut chars = self.chars.clone();
        chars.next();
        chars.next()
    }

    /// Skips the next character.
    pub fn skip(&mut self) {
        self.next();
    }

    /// Skips the next character if it is `ch`, returning whether it was.
    pub fn skip_char(&mut self, ch: char) -> bool {
        if self.is(ch) {
            self.skip();
            true
        } else {
            false
        }
    }

    /// Skips characters while the predicate holds.
    pub fn skip_while<P>(&mut self, predicate: P)
    where
        P: Fn(char) -> bool,
    {
        while let Some(ch) = self.peek() {
            if predicate(ch) {
                self.skip();
            } else {
                break;
            }
        }
    }

    /// Whether the next character is `ch`.
    pub fn is(&self, ch: char) -> bool {
        self.peek() == Some(ch)
    }

    /// Whether the next character satisfies the predicate.
    pub fn has<P>(&self, predicate: P) -> bool
    where
        P: Fn(char) -> bool,
    {
        self.peek().map_or(false, predicate)
    }

    /// Whether the input is exhausted.
    pub fn at_end(&self) -> bool {
        self.peek().is_none()
    }

    /// Whether the remaining input starts with `prefix`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.as_str().starts_with(prefix)
    }

    /// Skips the given number of bytes; `len` must end on a character boundary.
    pub fn skip_str(&mut self, len: usize) {
        let end = self.index + len;
        while self.index < end && self.next().is_some() {}
    }

    /// Parses a backslash escape at the current position, which must be a `\`.
    /// Returns the substituted character.  Backslash-newline and the whitespace that
    /// follows it become a single space.  An unknown escape yields the escaped character
    /// itself, and a trailing backslash yields a backslash.
    pub fn backslash_subst(&mut self) -> char {
        self.skip(); // the backslash

        let Some(ch) = self.next() else {
            return '\\';
        };

        match ch {
            'a' => '\x07',
            'b' => '\x08',
            'f' => '\x0c',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\x0b',
            '\n' => {
                self.skip_while(|c| c == ' ' || c == '\t');
                ' '
            }
            'x' => self.hex_escape(2).unwrap_or('x'),
            'u' => self.hex_escape(4).unwrap_or('u'),
            other => other,
        }
    }

    // Reads up to `max` hex digits and converts them to a character.
    fn hex_escape(&mut self, max: usize) -> Option<char> {
        let mark = self.index;
        let mut count = 0;

        while count < max && self.has(|c| c.is_ascii_hexdigit()) {
            self.skip();
            count += 1;
        }

        if count == 0 {
            return None;
        }

        u32::from_str_radix(self.token(mark), 16)
            .ok()
            .and_then(char::from_u32)
    }
}
