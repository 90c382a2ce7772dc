//! The Script Parser
//!
//! This module parses a script string into a [`Script`]: a sequence of commands, each of
//! which is a vector of [`Word`]s.  Words are resolved to values at evaluation time by the
//! interpreter, which performs variable and command substitution.
//!
//! The parser follows the standard Tcl rules:
//!
//! * Commands are separated by newlines and semicolons.
//! * Words are separated by spaces and tabs; a backslash-newline also separates words.
//! * A word beginning with `{` extends to the matching `}`; its contents are taken literally.
//! * A word beginning with `"` extends to the next unescaped `"`; its contents are subject to
//!   substitution.
//! * `$name` and `${name}` are variable references; `[script]` is a command substitution.
//! * A `#` where a command would begin starts a comment that runs to the end of the line.
//!
//! Command substitutions may nest, but no deeper than the given limit.

use crate::stack;
use crate::tokenizer::Tokenizer;
use crate::types::*;
use crate::value::Value;

/// A parsed script: a list of commands.
#[derive(Debug, PartialEq)]
pub struct Script {
    commands: Vec<WordVec>,
}

impl Script {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// The script's commands.
    pub fn commands(&self) -> &[WordVec] {
        &self.commands
    }
}

/// The words of a single command.
#[derive(Debug, PartialEq)]
pub struct WordVec {
    words: Vec<Word>,
}

impl WordVec {
    /// The command's words.
    pub fn words(&self) -> &[Word] {
        &self.words
    }
}

/// A single word, or a component of a word, awaiting substitution.
#[derive(Debug, PartialEq)]
pub enum Word {
    /// A literal value: a braced word, or a word with no substitutions.
    Value(Value),

    /// A variable reference.
    VarRef(String),

    /// A command substitution.
    Script(Script),

    /// A word built from several components, concatenated after substitution.
    Tokens(Vec<Word>),

    /// A literal component of a `Tokens` word.
    String(String),
}

/// Parses the input as a script, allowing command substitutions to nest at most `limit`
/// levels deep.
pub fn parse(input: &str, limit: usize) -> Result<Script, Exception> {
    let mut parser = Parser::new(input, limit);
    let script = parser.parse_script(false)?;

    // The top-level script ends only at the end of the input.
    debug_assert!(parser.tok.at_end());
    Ok(script)
}

// Accumulates the components of a word.
struct WordBuilder {
    tokens: Vec<Word>,
    text: String,
}

impl WordBuilder {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            text: String::new(),
        }
    }

    fn push_char(&mut self, ch: char) {
        self.text.push(ch);
    }

    fn push_word(&mut self, word: Word) {
        self.flush();
        self.tokens.push(word);
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.tokens.push(Word::String(text));
        }
    }

    fn finish(mut self) -> Word {
        self.flush();

        if self.tokens.len() > 1 {
            return Word::Tokens(self.tokens);
        }

        match self.tokens.pop() {
            None => Word::Value(Value::empty()),
            Some(Word::String(text)) => Word::Value(Value::from(text)),
            Some(word) => word,
        }
    }
}

/// The parser proper.  The expression parser borrows it to parse the variable references,
/// command substitutions, and quoted and braced strings that appear in expressions.
pub(crate) struct Parser<'a> {
    pub(crate) tok: Tokenizer<'a>,
    depth: usize,
    limit: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, limit: usize) -> Self {
        Self {
            tok: Tokenizer::new(input),
            depth: 0,
            limit,
        }
    }

    fn parse_script(&mut self, in_bracket: bool) -> Result<Script, Exception> {
        let mut script = Script::new();

        loop {
            // Skip command separators and blank space.
            self.tok
                .skip_while(|ch| ch.is_whitespace() || ch == ';');
            if self.tok.is('\\') && self.tok.peek2() == Some('\n') {
                self.tok.backslash_subst();
                continue;
            }

            if self.tok.at_end() || (in_bracket && self.tok.is(']')) {
                break;
            }

            if self.tok.is('#') {
                self.skip_comment();
                continue;
            }

            let cmd = self.parse_command(in_bracket)?;
            if !cmd.words.is_empty() {
                script.commands.push(cmd);
            }
        }

        Ok(script)
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.tok.next() {
            match ch {
                '\\' => self.tok.skip(),
                '\n' => break,
                _ => {}
            }
        }
    }

    fn parse_command(&mut self, in_bracket: bool) -> Result<WordVec, Exception> {
        let mut words = Vec::new();

        loop {
            self.skip_line_space();

            if self.at_command_end(in_bracket) {
                break;
            }

            words.push(self.parse_word(in_bracket)?);
        }

        Ok(WordVec { words })
    }

    // Skips spaces, tabs, and backslash-newlines within a command.
    fn skip_line_space(&mut self) {
        loop {
            self.tok.skip_while(is_line_space);
            if self.tok.is('\\') && self.tok.peek2() == Some('\n') {
                self.tok.backslash_subst();
            } else {
                break;
            }
        }
    }

    fn at_command_end(&self, in_bracket: bool) -> bool {
        match self.tok.peek() {
            None | Some('\n') | Some(';') => true,
            Some(']') => in_bracket,
            _ => false,
        }
    }

    fn at_word_end(&self, in_bracket: bool) -> bool {
        self.at_command_end(in_bracket) || self.tok.has(is_line_space) || self.at_continuation()
    }

    fn at_continuation(&self) -> bool {
        self.tok.is('\\') && self.tok.peek2() == Some('\n')
    }

    fn parse_word(&mut self, in_bracket: bool) -> Result<Word, Exception> {
        if self.tok.is('{') {
            let word = self.parse_braced_word()?;
            if !self.at_word_end(in_bracket) {
                return tcl_throw!(ErrorKind::SyntaxError, "extra characters after close-brace");
            }
            Ok(word)
        } else if self.tok.is('"') {
            let word = self.parse_quoted_word()?;
            if !self.at_word_end(in_bracket) {
                return tcl_throw!(ErrorKind::SyntaxError, "extra characters after close-quote");
            }
            Ok(word)
        } else {
            self.parse_bare_word(in_bracket)
        }
    }

    /// Parses a braced word at the current position, which must be a `{`.  The contents
    /// are taken literally, except that a backslash-newline and the whitespace following it
    /// become a single space.
    pub fn parse_braced_word(&mut self) -> Result<Word, Exception> {
        self.tok.skip(); // the open brace
        let mut text = String::new();
        let mut depth = 1;

        loop {
            match self.tok.peek() {
                None => return tcl_throw!(ErrorKind::SyntaxError, "missing close-brace"),
                Some('\\') => {
                    if self.at_continuation() {
                        text.push(self.tok.backslash_subst());
                    } else {
                        self.tok.skip();
                        text.push('\\');
                        if let Some(ch) = self.tok.next() {
                            text.push(ch);
                        }
                    }
                }
                Some('{') => {
                    depth += 1;
                    text.push('{');
                    self.tok.skip();
                }
                Some('}') => {
                    depth -= 1;
                    self.tok.skip();
                    if depth == 0 {
                        break;
                    }
                    text.push('}');
                }
                Some(ch) => {
                    text.push(ch);
                    self.tok.skip();
                }
            }
        }

        Ok(Word::Value(Value::from(text)))
    }

    /// Parses a quoted word at the current position, which must be a `"`.
    pub fn parse_quoted_word(&mut self) -> Result<Word, Exception> {
        self.tok.skip(); // the open quote
        let mut builder = WordBuilder::new();

        loop {
            match self.tok.peek() {
                None => return tcl_throw!(ErrorKind::SyntaxError, "missing \""),
                Some('"') => {
                    self.tok.skip();
                    break;
                }
                Some('$') => builder.push_word(self.parse_variable()?),
                Some('[') => builder.push_word(self.parse_bracket()?),
                Some('\\') => builder.push_char(self.tok.backslash_subst()),
                Some(ch) => {
                    builder.push_char(ch);
                    self.tok.skip();
                }
            }
        }

        Ok(builder.finish())
    }

    fn parse_bare_word(&mut self, in_bracket: bool) -> Result<Word, Exception> {
        let mut builder = WordBuilder::new();

        while !self.at_word_end(in_bracket) {
            match self.tok.peek() {
                Some('$') => builder.push_word(self.parse_variable()?),
                Some('[') => builder.push_word(self.parse_bracket()?),
                Some('\\') => builder.push_char(self.tok.backslash_subst()),
                Some(ch) => {
                    builder.push_char(ch);
                    self.tok.skip();
                }
                None => break,
            }
        }

        Ok(builder.finish())
    }

    /// Parses a variable reference at the current position, which must be a `$`.  A `$`
    /// that isn't followed by a variable name is a literal `$`.
    pub fn parse_variable(&mut self) -> Result<Word, Exception> {
        self.tok.skip(); // the dollar sign

        if self.tok.skip_char('{') {
            let mark = self.tok.mark();
            self.tok.skip_while(|ch| ch != '}');
            if self.tok.at_end() {
                return tcl_throw!(
                    ErrorKind::SyntaxError,
                    "missing close-brace for variable name"
                );
            }
            let name = self.tok.token(mark).to_string();
            self.tok.skip(); // the close brace
            return Ok(Word::VarRef(name));
        }

        let mark = self.tok.mark();
        loop {
            if self.tok.has(is_varname_char) {
                self.tok.skip();
            } else if self.tok.is(':') && self.tok.peek2() == Some(':') {
                self.tok.skip();
                self.tok.skip();
            } else {
                break;
            }
        }

        let name = self.tok.token(mark);
        if name.is_empty() {
            Ok(Word::String("$".into()))
        } else {
            Ok(Word::VarRef(name.to_string()))
        }
    }

    /// Parses a command substitution at the current position, which must be a `[`.
    pub fn parse_bracket(&mut self) -> Result<Word, Exception> {
        self.tok.skip(); // the open bracket

        self.depth += 1;
        if self.depth > self.limit {
            return tcl_throw!(
                ErrorKind::RecursionLimit,
                "too many nested command substitutions"
            );
        }

        let script = stack::ensure_sufficient_stack(|| self.parse_script(true))?;
        self.depth -= 1;

        if !self.tok.skip_char(']') {
            return tcl_throw!(ErrorKind::SyntaxError, "missing close-bracket");
        }

        Ok(Word::Script(script))
    }
}

fn is_line_space(ch: char) -> bool {
    ch == ' ' || ch == '\t' || ch == '\r'
}

fn is_varname_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(script: &Script, cmd: usize) -> &[Word] {
        script.commands()[cmd].words()
    }

    fn lit(text: &str) -> Word {
        Word::Value(Value::from(text))
    }

    fn err_kind(input: &str) -> ErrorKind {
        parse(input, 100).map(|_| ()).unwrap_err().kind()
    }

    #[test]
    fn test_empty_script() {
        assert!(parse("", 100).unwrap().commands().is_empty());
        assert!(parse("  \n ;; \n", 100).unwrap().commands().is_empty());
        assert!(parse("# just a comment\n", 100).unwrap().commands().is_empty());
    }

    #[test]
    fn test_simple_commands() {
        let script = parse("set a 1; set b 2\nputs hi", 100).unwrap();
        assert_eq!(script.commands().len(), 3);
        assert_eq!(words(&script, 0), &[lit("set"), lit("a"), lit("1")]);
        assert_eq!(words(&script, 2), &[lit("puts"), lit("hi")]);
    }

    #[test]
    fn test_braced_word() {
        let script = parse("set a {x $y [z] {nested}}", 100).unwrap();
        assert_eq!(words(&script, 0)[2], lit("x $y [z] {nested}"));

        let script = parse("set a {x \\{ y}", 100).unwrap();
        assert_eq!(words(&script, 0)[2], lit("x \\{ y"));
    }

    #[test]
    fn test_quoted_word() {
        let script = parse("set a \"x $y\\n\"", 100).unwrap();
        assert_eq!(
            words(&script, 0)[2],
            Word::Tokens(vec![
                Word::String("x ".into()),
                Word::VarRef("y".into()),
                Word::String("\n".into()),
            ])
        );

        let script = parse("puts \"a;b\nc\"", 100).unwrap();
        assert_eq!(words(&script, 0)[1], lit("a;b\nc"));
    }

    #[test]
    fn test_variables() {
        let script = parse("puts $a ${b c} $ x$y", 100).unwrap();
        let w = words(&script, 0);
        assert_eq!(w[1], Word::VarRef("a".into()));
        assert_eq!(w[2], Word::VarRef("b c".into()));
        assert_eq!(w[3], lit("$"));
        assert_eq!(
            w[4],
            Word::Tokens(vec![Word::String("x".into()), Word::VarRef("y".into())])
        );
    }

    #[test]
    fn test_brackets() {
        let script = parse("set a [llength [list 1 2]]", 100).unwrap();
        let Word::Script(inner) = &words(&script, 0)[2] else {
            panic!("expected a command substitution");
        };
        assert_eq!(inner.commands().len(), 1);
        assert_eq!(words(inner, 0)[0], lit("llength"));

        let script = parse("a]b", 100).unwrap();
        assert_eq!(words(&script, 0)[0], lit("a]b"));
    }

    #[test]
    fn test_continuation() {
        let script = parse("set a \\\n    1", 100).unwrap();
        assert_eq!(words(&script, 0), &[lit("set"), lit("a"), lit("1")]);
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(err_kind("foo {bar"), ErrorKind::SyntaxError);
        assert_eq!(err_kind("foo \"bar"), ErrorKind::SyntaxError);
        assert_eq!(err_kind("foo [bar"), ErrorKind::SyntaxError);
        assert_eq!(err_kind("foo {bar}x"), ErrorKind::SyntaxError);
        assert_eq!(err_kind("foo \"bar\"x"), ErrorKind::SyntaxError);
        assert_eq!(err_kind("puts ${abc"), ErrorKind::SyntaxError);

        assert_eq!(
            parse("foo {bar", 100).map(|_| ()),
            Err(Exception::new(
                ErrorKind::SyntaxError,
                Value::from("missing close-brace")
            ))
        );
    }

    #[test]
    fn test_nesting_limit() {
        assert!(parse("a [b [c [d]]]", 3).is_ok());
        assert_eq!(err_kind_limit("a [b [c [d [e]]]]", 3), ErrorKind::RecursionLimit);
    }

    fn err_kind_limit(input: &str, limit: usize) -> ErrorKind {
        parse(input, limit).map(|_| ()).unwrap_err().kind()
    }
}
