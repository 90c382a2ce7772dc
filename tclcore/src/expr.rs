//! The Expression Evaluator
//!
//! This module implements the arithmetic sub-language used by the `expr` command.  An
//! expression is parsed into a small tree, which is then evaluated against the interpreter
//! (variable references and command substitutions in the expression are resolved as the
//! tree is evaluated, so `&&` and `||` short-circuit).
//!
//! # Numeric rules
//!
//! * Integer `+`, `-`, and `*` yield integers; overflow is an error.
//! * If either operand is a float, the operation is done in floating point.
//! * Integer `/` yields an integer when the division is exact, and a float otherwise:
//!   `6/3` is `2`, `7/2` is `3.5`.
//! * `%` takes integers only; the result has the sign of the divisor: `-7 % 3` is `2`.
//! * Division and remainder by zero are errors, as is a non-finite floating point result.
//! * Comparisons yield `1` or `0`.  They are numeric if both operands are numbers, and
//!   string comparisons otherwise; `eq` and `ne` always compare strings.

use crate::interp::Interp;
use crate::parser::Parser;
use crate::parser::Word;
use crate::stack;
use crate::types::*;
use crate::value::Value;
use crate::value::ValueKind;
use std::cmp::Ordering;

/// Evaluates an expression, returning an integer or float value (or a string value, for
/// an expression that is just a string operand).
pub(crate) fn expr(interp: &mut Interp, expr: &Value) -> TclResult {
    let tree = ExprParser::new(expr.as_str(), interp.recursion_limit()).parse()?;
    Ok(eval(interp, &tree)?.into_value())
}

/// An operand or result.
#[derive(Debug, Clone, PartialEq)]
enum Datum {
    Int(TclInt),
    Float(TclFloat),
    Str(String),
}

impl Datum {
    fn from_value(value: &Value) -> Datum {
        match value.kind() {
            ValueKind::Integer => {
                if let Ok(int) = value.as_int() {
                    return Datum::Int(int);
                }
            }
            ValueKind::Float => {
                if let Ok(flt) = value.as_float() {
                    return Datum::Float(flt);
                }
            }
            _ => {}
        }

        let text = value.as_str();
        if let Ok(int) = Value::get_int(text) {
            Datum::Int(int)
        } else if let Ok(flt) = Value::get_float(text) {
            Datum::Float(flt)
        } else {
            Datum::Str(text.to_string())
        }
    }

    fn into_value(self) -> Value {
        match self {
            Datum::Int(int) => Value::from(int),
            Datum::Float(flt) => Value::from(flt),
            Datum::Str(string) => Value::from(string),
        }
    }

    fn to_text(&self) -> String {
        match self {
            Datum::Int(int) => int.to_string(),
            Datum::Float(flt) => Value::fmt_float(*flt),
            Datum::Str(string) => string.clone(),
        }
    }

    fn is_numeric(&self) -> bool {
        !matches!(self, Datum::Str(_))
    }

    fn truth(&self) -> Result<bool, Exception> {
        match self {
            Datum::Int(int) => Ok(*int != 0),
            Datum::Float(flt) => Ok(*flt != 0.0),
            Datum::Str(string) => Value::get_bool(string),
        }
    }

    // Rejects non-numeric operands of the given operator.
    fn numeric(self, op: &str) -> Result<Datum, Exception> {
        match self {
            Datum::Str(string) => tcl_throw!(
                ErrorKind::ArithmeticError,
                "can't use non-numeric string \"{}\" as operand of \"{}\"",
                string,
                op
            ),
            num => Ok(num),
        }
    }

    fn as_float(&self) -> TclFloat {
        match self {
            Datum::Int(int) => *int as TclFloat,
            Datum::Float(flt) => *flt,
            Datum::Str(_) => TclFloat::NAN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    StrEq,
    StrNe,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinOp {
    fn symbol(&self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::StrEq => "eq",
            BinOp::StrNe => "ne",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
        }
    }
}

#[derive(Debug)]
enum Expr {
    Literal(Datum),
    Word(Word),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

// Binary operators by precedence level, lowest first.
const LEVELS: [&[BinOp]; 6] = [
    &[BinOp::Or],
    &[BinOp::And],
    &[BinOp::Eq, BinOp::Ne, BinOp::StrEq, BinOp::StrNe],
    &[BinOp::Lt, BinOp::Le, BinOp::Gt, BinOp::Ge],
    &[BinOp::Add, BinOp::Sub],
    &[BinOp::Mul, BinOp::Div, BinOp::Rem],
];

struct ExprParser<'a> {
    parser: Parser<'a>,
    depth: usize,
    limit: usize,
}

impl<'a> ExprParser<'a> {
    fn new(input: &'a str, limit: usize) -> Self {
        Self {
            parser: Parser::new(input, limit),
            depth: 0,
            limit,
        }
    }

    fn parse(mut self) -> Result<Expr, Exception> {
        self.skip_space();
        if self.parser.tok.at_end() {
            return tcl_throw!(ErrorKind::SyntaxError, "empty expression");
        }

        let tree = self.parse_level(0)?;

        self.skip_space();
        if !self.parser.tok.at_end() {
            return self.syntax_error("extra tokens at end of expression");
        }

        Ok(tree)
    }

    fn syntax_error<T>(&self, detail: &str) -> Result<T, Exception> {
        tcl_throw!(
            ErrorKind::SyntaxError,
            "syntax error in expression \"{}\": {}",
            self.parser.tok.input(),
            detail
        )
    }

    fn skip_space(&mut self) {
        self.parser.tok.skip_while(|ch| ch.is_whitespace());
    }

    fn nest(&mut self) -> Result<(), Exception> {
        self.depth += 1;
        if self.depth > self.limit {
            return tcl_throw!(ErrorKind::RecursionLimit, "expression nested too deeply");
        }
        Ok(())
    }

    fn parse_level(&mut self, level: usize) -> Result<Expr, Exception> {
        if level == LEVELS.len() {
            return self.parse_unary();
        }

        let mut left = self.parse_level(level + 1)?;

        while let Some(op) = self.next_op(LEVELS[level]) {
            let right = self.parse_level(level + 1)?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    // Consumes the next operator if it is one of `ops`.
    fn next_op(&mut self, ops: &[BinOp]) -> Option<BinOp> {
        self.skip_space();

        // Longer symbols first, so that "<=" isn't read as "<".
        let mut candidates: Vec<BinOp> = ops.to_vec();
        candidates.sort_by_key(|op| std::cmp::Reverse(op.symbol().len()));

        for op in candidates {
            let symbol = op.symbol();
            if !self.parser.tok.starts_with(symbol) {
                continue;
            }

            // Word operators must stand alone; "<" must not be the start of "<=".
            let rest = &self.parser.tok.as_str()[symbol.len()..];
            let next = rest.chars().next();
            let word_op = symbol.chars().all(|c| c.is_alphabetic());
            if word_op && next.map_or(false, |c| c.is_alphanumeric() || c == '_') {
                continue;
            }
            if matches!(op, BinOp::Lt | BinOp::Gt) && next == Some('=') {
                continue;
            }

            self.parser.tok.skip_str(symbol.len());
            return Some(op);
        }

        None
    }

    fn parse_unary(&mut self) -> Result<Expr, Exception> {
        stack::ensure_sufficient_stack(|| self.parse_unary_inner())
    }

    fn parse_unary_inner(&mut self) -> Result<Expr, Exception> {
        self.skip_space();

        let op = match self.parser.tok.peek() {
            Some('-') => UnaryOp::Neg,
            Some('+') => UnaryOp::Plus,
            Some('!') => UnaryOp::Not,
            _ => return self.parse_primary(),
        };

        self.parser.tok.skip();
        self.nest()?;
        let operand = self.parse_unary()?;
        self.depth -= 1;

        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn parse_primary(&mut self) -> Result<Expr, Exception> {
        self.skip_space();

        match self.parser.tok.peek() {
            None => self.syntax_error("premature end of expression"),
            Some('(') => {
                self.parser.tok.skip();
                self.nest()?;
                let inner = self.parse_level(0)?;
                self.depth -= 1;
                self.skip_space();
                if !self.parser.tok.skip_char(')') {
                    return self.syntax_error("missing close parenthesis");
                }
                Ok(inner)
            }
            Some('$') => match self.parser.parse_variable()? {
                Word::VarRef(name) => Ok(Expr::Word(Word::VarRef(name))),
                _ => self.syntax_error("invalid character \"$\""),
            },
            Some('[') => Ok(Expr::Word(self.parser.parse_bracket()?)),
            Some('"') => Ok(Expr::Word(self.parser.parse_quoted_word()?)),
            Some('{') => Ok(Expr::Word(self.parser.parse_braced_word()?)),
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.parse_number(),
            Some(ch) if ch.is_alphabetic() => self.parse_name(),
            Some(ch) => self.syntax_error(&format!("invalid character \"{}\"", ch)),
        }
    }

    fn parse_number(&mut self) -> Result<Expr, Exception> {
        let tok = &mut self.parser.tok;
        let mark = tok.mark();

        let radix_prefix = tok.is('0') && matches!(tok.peek2(), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B'));
        if radix_prefix {
            tok.skip();
            tok.skip();
            tok.skip_while(|c| c.is_ascii_hexdigit());
        } else {
            tok.skip_while(|c| c.is_ascii_digit());
            if tok.skip_char('.') {
                tok.skip_while(|c| c.is_ascii_digit());
            }
            if tok.has(|c| c == 'e' || c == 'E') {
                let mut exp = tok.clone();
                exp.skip();
                if exp.has(|c| c == '+' || c == '-') {
                    exp.skip();
                }
                if exp.has(|c| c.is_ascii_digit()) {
                    exp.skip_while(|c| c.is_ascii_digit());
                    *tok = exp;
                }
            }
        }

        let text = tok.token(mark).to_string();
        let is_float = !radix_prefix && text.contains(|c| c == '.' || c == 'e' || c == 'E');

        if is_float {
            match text.parse::<TclFloat>() {
                Ok(flt) => Ok(Expr::Literal(Datum::Float(flt))),
                Err(_) => self.syntax_error(&format!("malformed number \"{}\"", text)),
            }
        } else {
            match Value::get_int(&text) {
                Ok(int) => Ok(Expr::Literal(Datum::Int(int))),
                Err(_) => self.syntax_error(&format!("malformed number \"{}\"", text)),
            }
        }
    }

    fn parse_name(&mut self) -> Result<Expr, Exception> {
        let mark = self.parser.tok.mark();
        self.parser
            .tok
            .skip_while(|c| c.is_alphanumeric() || c == '_');
        let name = self.parser.tok.token(mark).to_string();

        self.skip_space();
        if self.parser.tok.skip_char('(') {
            return self.parse_call(name);
        }

        match name.to_ascii_lowercase().as_str() {
            "true" | "false" | "yes" | "no" | "on" | "off" => Ok(Expr::Literal(Datum::Str(name))),
            _ => self.syntax_error(&format!("invalid bareword \"{}\"", name)),
        }
    }

    // Parses a function's argument list; the open parenthesis has been consumed.
    fn parse_call(&mut self, name: String) -> Result<Expr, Exception> {
        self.nest()?;
        let mut args = Vec::new();

        self.skip_space();
        if !self.parser.tok.skip_char(')') {
            loop {
                args.push(self.parse_level(0)?);
                self.skip_space();
                if self.parser.tok.skip_char(',') {
                    continue;
                }
                if self.parser.tok.skip_char(')') {
                    break;
                }
                return self.syntax_error("missing close parenthesis");
            }
        }

        self.depth -= 1;
        Ok(Expr::Call(name, args))
    }
}

fn eval(interp: &mut Interp, tree: &Expr) -> Result<Datum, Exception> {
    stack::ensure_sufficient_stack(|| eval_node(interp, tree))
}

fn eval_node(interp: &mut Interp, tree: &Expr) -> Result<Datum, Exception> {
    match tree {
        Expr::Literal(datum) => Ok(datum.clone()),
        Expr::Word(word) => Ok(Datum::from_value(&interp.eval_word(word)?)),
        Expr::Unary(op, operand) => {
            let value = eval(interp, operand)?;
            unary(*op, value)
        }
        Expr::Binary(BinOp::And, left, right) => {
            if !eval(interp, left)?.truth()? {
                return Ok(Datum::Int(0));
            }
            Ok(Datum::Int(eval(interp, right)?.truth()? as TclInt))
        }
        Expr::Binary(BinOp::Or, left, right) => {
            if eval(interp, left)?.truth()? {
                return Ok(Datum::Int(1));
            }
            Ok(Datum::Int(eval(interp, right)?.truth()? as TclInt))
        }
        Expr::Binary(op, left, right) => {
            let left = eval(interp, left)?;
            let right = eval(interp, right)?;
            binary(*op, left, right)
        }
        Expr::Call(name, args) => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval(interp, arg)?);
            }
            call_func(name, values)
        }
    }
}

fn unary(op: UnaryOp, value: Datum) -> Result<Datum, Exception> {
    match op {
        UnaryOp::Not => Ok(Datum::Int(!value.truth()? as TclInt)),
        UnaryOp::Plus => value.numeric("+"),
        UnaryOp::Neg => match value.numeric("-")? {
            Datum::Int(int) => match int.checked_neg() {
                Some(neg) => Ok(Datum::Int(neg)),
                None => overflow(),
            },
            Datum::Float(flt) => Ok(Datum::Float(-flt)),
            Datum::Str(_) => unreachable!("numeric() rejects strings"),
        },
    }
}

fn binary(op: BinOp, left: Datum, right: Datum) -> Result<Datum, Exception> {
    match op {
        BinOp::StrEq => Ok(Datum::Int((left.to_text() == right.to_text()) as TclInt)),
        BinOp::StrNe => Ok(Datum::Int((left.to_text() != right.to_text()) as TclInt)),
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            Ok(Datum::Int(compare(op, &left, &right) as TclInt))
        }
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => {
            let left = left.numeric(op.symbol())?;
            let right = right.numeric(op.symbol())?;
            match (left, right) {
                (Datum::Int(a), Datum::Int(b)) => int_arith(op, a, b),
                (a, b) => float_arith(op, a.as_float(), b.as_float()),
            }
        }
        BinOp::And | BinOp::Or => unreachable!("logical operators short-circuit in eval()"),
    }
}

fn compare(op: BinOp, left: &Datum, right: &Datum) -> bool {
    let ordering = match (left, right) {
        (Datum::Int(a), Datum::Int(b)) => Some(a.cmp(b)),
        (a, b) if a.is_numeric() && b.is_numeric() => a.as_float().partial_cmp(&b.as_float()),
        (a, b) => Some(a.to_text().cmp(&b.to_text())),
    };

    // Comparisons involving NaN are false, except for "!=".
    let Some(ordering) = ordering else {
        return op == BinOp::Ne;
    };

    match op {
        BinOp::Eq => ordering == Ordering::Equal,
        BinOp::Ne => ordering != Ordering::Equal,
        BinOp::Lt => ordering == Ordering::Less,
        BinOp::Le => ordering != Ordering::Greater,
        BinOp::Gt => ordering == Ordering::Greater,
        BinOp::Ge => ordering != Ordering::Less,
        _ => unreachable!("not a comparison operator"),
    }
}

fn int_arith(op: BinOp, a: TclInt, b: TclInt) -> Result<Datum, Exception> {
    let result = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Sub => a.checked_sub(b),
        BinOp::Mul => a.checked_mul(b),
        BinOp::Div => {
            if b == 0 {
                return divide_by_zero();
            }
            match a.checked_rem(b) {
                Some(0) => a.checked_div(b),
                Some(_) => return float_arith(op, a as TclFloat, b as TclFloat),
                None => None,
            }
        }
        BinOp::Rem => {
            if b == 0 {
                return divide_by_zero();
            }
            a.checked_rem(b).map(|rem| {
                if rem != 0 && (rem < 0) != (b < 0) {
                    rem + b
                } else {
                    rem
                }
            })
        }
        _ => unreachable!("not an arithmetic operator"),
    };

    match result {
        Some(int) => Ok(Datum::Int(int)),
        None => overflow(),
    }
}

fn float_arith(op: BinOp, a: TclFloat, b: TclFloat) -> Result<Datum, Exception> {
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if b == 0.0 {
                return divide_by_zero();
            }
            a / b
        }
        BinOp::Rem => {
            return tcl_throw!(
                ErrorKind::ArithmeticError,
                "can't use floating-point value as operand of \"%\""
            )
        }
        _ => unreachable!("not an arithmetic operator"),
    };

    if !result.is_finite() && a.is_finite() && b.is_finite() {
        return tcl_throw!(
            ErrorKind::ArithmeticError,
            "floating-point value too large to represent"
        );
    }

    Ok(Datum::Float(result))
}

fn call_func(name: &str, args: Vec<Datum>) -> Result<Datum, Exception> {
    const FUNCS: [&str; 4] = ["abs", "double", "int", "round"];

    if !FUNCS.contains(&name) {
        return tcl_err!("unknown math function \"{}\"", name);
    }

    if args.len() != 1 {
        let problem = if args.is_empty() { "few" } else { "many" };
        return tcl_err!("too {} arguments for math function \"{}\"", problem, name);
    }

    let mut args = args;
    let arg = args.remove(0).numeric(name)?;

    match (name, arg) {
        ("abs", Datum::Int(int)) => match int.checked_abs() {
            Some(abs) => Ok(Datum::Int(abs)),
            None => overflow(),
        },
        ("abs", Datum::Float(flt)) => Ok(Datum::Float(flt.abs())),
        ("double", num) => Ok(Datum::Float(num.as_float())),
        ("int", Datum::Float(flt)) => float_to_int(flt.trunc()),
        ("round", Datum::Float(flt)) => float_to_int(flt.round()),
        (_, num) => Ok(num),
    }
}

fn float_to_int(flt: TclFloat) -> Result<Datum, Exception> {
    if flt.is_finite() && flt >= TclInt::MIN as TclFloat && flt < TclInt::MAX as TclFloat {
        Ok(Datum::Int(flt as TclInt))
    } else {
        overflow()
    }
}

fn divide_by_zero<T>() -> Result<T, Exception> {
    tcl_throw!(ErrorKind::ArithmeticError, "divide by zero")
}

fn overflow<T>() -> Result<T, Exception> {
    tcl_throw!(ErrorKind::ArithmeticError, "integer overflow")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_expr(text: &str) -> TclResult {
        let mut interp = Interp::new();
        expr(&mut interp, &Value::from(text))
    }

    fn kind_of(text: &str) -> ErrorKind {
        eval_expr(text).unwrap_err().kind()
    }

    #[test]
    fn test_integer_arithmetic() {
        let value = eval_expr("7*6").unwrap();
        assert_eq!(value, Value::from(42));
        assert_eq!(value.kind(), ValueKind::Integer);

        assert_eq!(eval_expr("1 + 2 * 3"), Ok(Value::from(7)));
        assert_eq!(eval_expr("(1 + 2) * 3"), Ok(Value::from(9)));
        assert_eq!(eval_expr("10 - 4 - 3"), Ok(Value::from(3)));
        assert_eq!(eval_expr("-3 + 5"), Ok(Value::from(2)));
        assert_eq!(eval_expr("0x10 + 1"), Ok(Value::from(17)));
    }

    #[test]
    fn test_division_promotion() {
        let exact = eval_expr("6/3").unwrap();
        assert_eq!(exact.kind(), ValueKind::Integer);
        assert_eq!(exact, Value::from(2));

        let inexact = eval_expr("7/2").unwrap();
        assert_eq!(inexact.kind(), ValueKind::Float);
        assert_eq!(inexact, Value::from(3.5));

        assert_eq!(eval_expr("-9/3"), Ok(Value::from(-3)));
        assert_eq!(eval_expr("1/4"), Ok(Value::from(0.25)));
    }

    #[test]
    fn test_float_promotion() {
        let value = eval_expr("1 + 2.0").unwrap();
        assert_eq!(value.kind(), ValueKind::Float);
        assert_eq!(value.as_str(), "3.0");

        assert_eq!(eval_expr("2.5 * 2"), Ok(Value::from(5.0)));
        assert_eq!(eval_expr("1e2 / 8"), Ok(Value::from(12.5)));
        assert_eq!(eval_expr("6.0 / 3"), Ok(Value::from(2.0)));
    }

    #[test]
    fn test_remainder() {
        assert_eq!(eval_expr("7 % 3"), Ok(Value::from(1)));
        assert_eq!(eval_expr("-7 % 3"), Ok(Value::from(2)));
        assert_eq!(eval_expr("7 % -3"), Ok(Value::from(-2)));
        assert_eq!(eval_expr("6 % 3"), Ok(Value::from(0)));
        assert_eq!(kind_of("7.5 % 2"), ErrorKind::ArithmeticError);
    }

    #[test]
    fn test_arithmetic_errors() {
        assert_eq!(
            eval_expr("1 / 0"),
            Err(Exception::new(
                ErrorKind::ArithmeticError,
                Value::from("divide by zero")
            ))
        );
        assert_eq!(kind_of("1 % 0"), ErrorKind::ArithmeticError);
        assert_eq!(kind_of("1.0 / 0"), ErrorKind::ArithmeticError);
        assert_eq!(kind_of("9223372036854775807 + 1"), ErrorKind::ArithmeticError);
        assert_eq!(kind_of("1e308 * 10"), ErrorKind::ArithmeticError);
        assert_eq!(kind_of("\"abc\" + 1"), ErrorKind::ArithmeticError);
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval_expr("1 < 2"), Ok(Value::from(1)));
        assert_eq!(eval_expr("2 <= 1"), Ok(Value::from(0)));
        assert_eq!(eval_expr("1 == 1.0"), Ok(Value::from(1)));
        assert_eq!(eval_expr("3 >= 3 && 4 > 3"), Ok(Value::from(1)));
        assert_eq!(eval_expr("\"abc\" < \"abd\""), Ok(Value::from(1)));
        assert_eq!(eval_expr("1 eq 1.0"), Ok(Value::from(0)));
        assert_eq!(eval_expr("{a b} ne {a b}"), Ok(Value::from(0)));
    }

    #[test]
    fn test_logic() {
        assert_eq!(eval_expr("!0"), Ok(Value::from(1)));
        assert_eq!(eval_expr("!true"), Ok(Value::from(0)));
        assert_eq!(eval_expr("0 || 2"), Ok(Value::from(1)));
        assert_eq!(eval_expr("0 && [error boom]"), Ok(Value::from(0)));
        assert_eq!(eval_expr("1 || [error boom]"), Ok(Value::from(1)));
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval_expr("abs(-4)"), Ok(Value::from(4)));
        assert_eq!(eval_expr("abs(-2.5)"), Ok(Value::from(2.5)));
        assert_eq!(eval_expr("int(7.9)"), Ok(Value::from(7)));
        assert_eq!(eval_expr("round(2.5)"), Ok(Value::from(3)));
        assert_eq!(eval_expr("round(-2.5)"), Ok(Value::from(-3)));
        assert_eq!(eval_expr("double(3)"), Ok(Value::from(3.0)));
        assert_eq!(
            eval_expr("sqrt(4)"),
            Err(Exception::tcl_err(Value::from("unknown math function \"sqrt\"")))
        );
        assert_eq!(kind_of("abs(1, 2)"), ErrorKind::ScriptError);
    }

    #[test]
    fn test_substitutions() {
        let mut interp = Interp::new();
        interp.set_var("x", Value::from("5"));
        assert_eq!(expr(&mut interp, &Value::from("$x * 2")), Ok(Value::from(10)));
        assert_eq!(
            expr(&mut interp, &Value::from("[llength {a b c}] + $x")),
            Ok(Value::from(8))
        );
        assert_eq!(expr(&mut interp, &Value::from("\"$x\" + 1")), Ok(Value::from(6)));
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(kind_of(""), ErrorKind::SyntaxError);
        assert_eq!(kind_of("1 +"), ErrorKind::SyntaxError);
        assert_eq!(kind_of("(1 + 2"), ErrorKind::SyntaxError);
        assert_eq!(kind_of("1 2"), ErrorKind::SyntaxError);
        assert_eq!(kind_of("a + b"), ErrorKind::SyntaxError);
        assert_eq!(
            eval_expr("1 +"),
            Err(Exception::new(
                ErrorKind::SyntaxError,
                Value::from("syntax error in expression \"1 +\": premature end of expression")
            ))
        );
    }

    #[test]
    fn test_nesting_limit() {
        let mut interp = Interp::new();
        interp.set_recursion_limit(5);
        assert_eq!(expr(&mut interp, &Value::from("((1))")), Ok(Value::from(1)));
        assert_eq!(
            expr(&mut interp, &Value::from("((((((1))))))"))
                .unwrap_err()
                .kind(),
            ErrorKind::RecursionLimit
        );
    }
}
