//! List formatting and parsing
//!
//! A list's string form is a sequence of whitespace-separated elements, each of which is
//! braced or backslash-quoted as needed so that parsing the string yields exactly the
//! original elements again.

use crate::tokenizer::Tokenizer;
use crate::types::*;
use crate::value::Value;

/// Formats a slice of values as a list string.
pub fn list_to_string(list: &[Value]) -> String {
    let elements: Vec<&str> = list.iter().map(|v| v.as_str()).collect();
    format_list(&elements)
}

/// Formats a slice of strings as a list string.
pub(crate) fn format_list<S: AsRef<str>>(elements: &[S]) -> String {
    let mut out = String::new();

    for (i, elem) in elements.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        format_element(&mut out, elem.as_ref());
    }

    out
}

fn format_element(out: &mut String, elem: &str) {
    if elem.is_empty() {
        out.push_str("{}");
        return;
    }

    if !needs_quoting(elem) {
        out.push_str(elem);
        return;
    }

    if can_brace(elem) {
        out.push('{');
        out.push_str(elem);
        out.push('}');
        return;
    }

    for ch in elem.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            ' ' | '{' | '}' | '[' | ']' | '$' | '"' | '\\' | ';' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
}

fn needs_quoting(elem: &str) -> bool {
    elem.starts_with('#')
        || elem.chars().any(|ch| {
            ch.is_whitespace() || matches!(ch, '{' | '}' | '[' | ']' | '$' | '"' | '\\' | ';')
        })
}

// An element can be braced if its braces balance and it doesn't end in a backslash.
fn can_brace(elem: &str) -> bool {
    if elem.ends_with('\\') {
        return false;
    }

    let mut depth = 0usize;
    let mut escaped = false;

    for ch in elem.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    depth == 0
}

/// Parses a list string into a vector of values.
pub fn get_list(input: &str) -> Result<TclList, Exception> {
    let mut tok = Tokenizer::new(input);
    let mut list = Vec::new();

    loop {
        tok.skip_while(|ch| ch.is_whitespace());

        if tok.at_end() {
            break;
        }

        let elem = if tok.is('{') {
            parse_braced_item(&mut tok)?
        } else if tok.is('"') {
            parse_quoted_item(&mut tok)?
        } else {
            parse_bare_item(&mut tok)
        };

        list.push(Value::from(elem));
    }

    Ok(list)
}

fn parse_braced_item(tok: &mut Tokenizer) -> Result<String, Exception> {
    tok.skip(); // the open brace
    let mark = tok.mark();
    let mut depth = 1;

    while let Some(ch) = tok.peek() {
        match ch {
            '\\' => {
                tok.skip();
                tok.skip();
            }
            '{' => {
                depth += 1;
                tok.skip();
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let item = tok.token(mark).to_string();
                    tok.skip();
                    if !tok.at_end() && !tok.has(|c| c.is_whitespace()) {
                        return tcl_err!(
                            "list element in braces followed by \"{}\" instead of space",
                            trailing(tok)
                        );
                    }
                    return Ok(item);
                }
                tok.skip();
            }
            _ => tok.skip(),
        }
    }

    tcl_err!("unmatched open brace in list")
}

fn parse_quoted_item(tok: &mut Tokenizer) -> Result<String, Exception> {
    tok.skip(); // the open quote
    let mut item = String::new();

    while let Some(ch) = tok.peek() {
        match ch {
            '\\' => item.push(tok.backslash_subst()),
            '"' => {
                tok.skip();
                if !tok.at_end() && !tok.has(|c| c.is_whitespace()) {
                    return tcl_err!(
                        "list element in quotes followed by \"{}\" instead of space",
                        trailing(tok)
                    );
                }
                return Ok(item);
            }
            _ => {
                item.push(ch);
                tok.skip();
            }
        }
    }

    tcl_err!("unmatched open quote in list")
}

fn parse_bare_item(tok: &mut Tokenizer) -> String {
    let mut item = String::new();

    while let Some(ch) = tok.peek() {
        if ch.is_whitespace() {
            break;
        }
        if ch == '\\' {
            item.push(tok.backslash_subst());
        } else {
            item.push(ch);
            tok.skip();
        }
    }

    item
}

fn trailing(tok: &Tokenizer) -> String {
    tok.as_str()
        .chars()
        .take_while(|c| !c.is_whitespace())
        .collect()
}
