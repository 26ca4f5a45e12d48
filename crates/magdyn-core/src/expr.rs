//! Small complex-valued expression evaluator for magnetic form factors.
//!
//! Formulas such as `0.0163*exp(-35.88*(Q/(4*pi))^2) + 0.3916*exp(-13.22*(Q/(4*pi))^2)`
//! are parsed once into a tree and evaluated with the registered variables.

use std::collections::BTreeMap;

use nalgebra::{Complex, ComplexField};
use tracing::warn;

use crate::errors::{ErrorInfo, MagdynError};

fn expr_error(code: &str, message: impl Into<String>) -> MagdynError {
    MagdynError::Expr(ErrorInfo::new(code, message))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, MagdynError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < chars.len() {
        let ch = chars[pos];
        if ch.is_whitespace() {
            pos += 1;
            continue;
        }
        let start = pos;
        if ch.is_ascii_digit() || ch == '.' {
            while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                pos += 1;
            }
            if pos < chars.len() && (chars[pos] == 'e' || chars[pos] == 'E') {
                let mut look = pos + 1;
                if look < chars.len() && (chars[look] == '+' || chars[look] == '-') {
                    look += 1;
                }
                if look < chars.len() && chars[look].is_ascii_digit() {
                    pos = look;
                    while pos < chars.len() && chars[pos].is_ascii_digit() {
                        pos += 1;
                    }
                }
            }
            let text: String = chars[start..pos].iter().collect();
            let value = text.parse::<f64>().map_err(|_| {
                MagdynError::Expr(
                    ErrorInfo::new("invalid-number", format!("cannot parse number `{text}`"))
                        .with_context("position", start.to_string()),
                )
            })?;
            tokens.push((start, Token::Num(value)));
            continue;
        }
        if ch.is_alphabetic() || ch == '_' {
            while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            tokens.push((start, Token::Ident(chars[start..pos].iter().collect())));
            continue;
        }
        let token = match ch {
            '+' | '-' | '*' | '/' | '^' => Token::Op(ch),
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            other => {
                return Err(MagdynError::Expr(
                    ErrorInfo::new("unexpected-char", format!("unexpected character `{other}`"))
                        .with_context("position", start.to_string()),
                ))
            }
        };
        tokens.push((start, token));
        pos += 1;
    }
    Ok(tokens)
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Num(f64),
    Var(String),
    Neg(Box<Node>),
    Bin(char, Box<Node>, Box<Node>),
    Call(String, Vec<Node>),
}

/// Bound on both parser recursion and tree height.
const MAX_NESTING: usize = 256;

fn too_deep(at: usize) -> MagdynError {
    MagdynError::Expr(
        ErrorInfo::new(
            "nesting-too-deep",
            format!("expression nests deeper than {MAX_NESTING} levels"),
        )
        .with_context("position", at.to_string()),
    )
}

/// Parsed node together with the height of its tree.
type Parsed = (Node, usize);

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, token)| token)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(offset, _)| *offset)
            .unwrap_or_else(|| self.tokens.last().map(|(offset, _)| offset + 1).unwrap_or(0))
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(_, token)| token.clone());
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), MagdynError> {
        let at = self.position();
        match self.next() {
            Some(token) if token == expected => Ok(()),
            other => Err(MagdynError::Expr(
                ErrorInfo::new(
                    "unexpected-token",
                    format!("expected {expected:?}, found {other:?}"),
                )
                .with_context("position", at.to_string()),
            )),
        }
    }

    // evaluation and drop recurse over the tree, so long flat chains count too
    fn node(&self, node: Node, height: usize) -> Result<Parsed, MagdynError> {
        if height > MAX_NESTING {
            return Err(too_deep(self.position()));
        }
        Ok((node, height))
    }

    fn expression(&mut self) -> Result<Parsed, MagdynError> {
        let (mut lhs, mut height) = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek().cloned() {
            self.pos += 1;
            let (rhs, rhs_height) = self.term()?;
            (lhs, height) = self.node(
                Node::Bin(op, Box::new(lhs), Box::new(rhs)),
                height.max(rhs_height) + 1,
            )?;
        }
        Ok((lhs, height))
    }

    fn term(&mut self) -> Result<Parsed, MagdynError> {
        let (mut lhs, mut height) = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek().cloned() {
            self.pos += 1;
            let (rhs, rhs_height) = self.unary()?;
            (lhs, height) = self.node(
                Node::Bin(op, Box::new(lhs), Box::new(rhs)),
                height.max(rhs_height) + 1,
            )?;
        }
        Ok((lhs, height))
    }

    /// Every recursive path of the grammar passes through here.
    fn unary(&mut self) -> Result<Parsed, MagdynError> {
        if self.depth >= MAX_NESTING {
            return Err(too_deep(self.position()));
        }
        self.depth += 1;
        let parsed = self.signed();
        self.depth -= 1;
        parsed
    }

    fn signed(&mut self) -> Result<Parsed, MagdynError> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                let (inner, height) = self.unary()?;
                self.node(Node::Neg(Box::new(inner)), height + 1)
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Parsed, MagdynError> {
        let (base, base_height) = self.primary()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.pos += 1;
            // right associative, binds tighter than a leading minus on the base
            let (exponent, exp_height) = self.unary()?;
            return self.node(
                Node::Bin('^', Box::new(base), Box::new(exponent)),
                base_height.max(exp_height) + 1,
            );
        }
        Ok((base, base_height))
    }

    fn primary(&mut self) -> Result<Parsed, MagdynError> {
        let at = self.position();
        match self.next() {
            Some(Token::Num(value)) => Ok((Node::Num(value), 1)),
            Some(Token::Ident(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.pos += 1;
                    let mut args = Vec::new();
                    let mut height = 0;
                    if let Some(Token::RParen) = self.peek() {
                        self.pos += 1;
                        return Ok((Node::Call(name, args), 1));
                    }
                    loop {
                        let (arg, arg_height) = self.expression()?;
                        args.push(arg);
                        height = height.max(arg_height);
                        match self.peek() {
                            Some(Token::Comma) => self.pos += 1,
                            _ => break,
                        }
                    }
                    self.expect(Token::RParen)?;
                    self.node(Node::Call(name, args), height + 1)
                } else {
                    Ok((Node::Var(name), 1))
                }
            }
            Some(Token::LParen) => {
                let inner = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            other => Err(MagdynError::Expr(
                ErrorInfo::new("unexpected-token", format!("unexpected {other:?}"))
                    .with_context("position", at.to_string()),
            )),
        }
    }
}

fn apply_unary(name: &str, z: Complex<f64>) -> Option<Complex<f64>> {
    let value = match name {
        "sqrt" => ComplexField::sqrt(z),
        "exp" => ComplexField::exp(z),
        "log" | "ln" => ComplexField::ln(z),
        "log10" => ComplexField::log10(z),
        "sin" => ComplexField::sin(z),
        "cos" => ComplexField::cos(z),
        "tan" => ComplexField::tan(z),
        "asin" => ComplexField::asin(z),
        "acos" => ComplexField::acos(z),
        "atan" => ComplexField::atan(z),
        "sinh" => ComplexField::sinh(z),
        "cosh" => ComplexField::cosh(z),
        "tanh" => ComplexField::tanh(z),
        "abs" => Complex::new(ComplexField::modulus(z), 0.0),
        "re" | "real" => Complex::new(z.re, 0.0),
        "im" | "imag" => Complex::new(z.im, 0.0),
        "conj" => z.conj(),
        _ => return None,
    };
    Some(value)
}

fn complex_pow(base: Complex<f64>, exponent: Complex<f64>) -> Complex<f64> {
    if exponent.im == 0.0 && exponent.re.fract() == 0.0 && exponent.re.abs() <= i32::MAX as f64 {
        ComplexField::powi(base, exponent.re as i32)
    } else if base.im == 0.0 && base.re >= 0.0 && exponent.im == 0.0 {
        Complex::new(base.re.powf(exponent.re), 0.0)
    } else {
        ComplexField::powc(base, exponent)
    }
}

/// Parsed form-factor expression with its variable bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct FormFactorExpr {
    source: String,
    root: Node,
    vars: BTreeMap<String, Complex<f64>>,
}

impl FormFactorExpr {
    /// Parses an expression string.
    pub fn parse(source: &str) -> Result<Self, MagdynError> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(expr_error("empty-expression", "expression is empty"));
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let (root, _) = parser.expression()?;
        if parser.pos < parser.tokens.len() {
            let at = parser.position();
            return Err(MagdynError::Expr(
                ErrorInfo::new("trailing-input", "unexpected input after expression")
                    .with_context("position", at.to_string()),
            ));
        }
        Ok(Self {
            source: source.to_string(),
            root,
            vars: BTreeMap::new(),
        })
    }

    /// Source text the expression was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Binds a real variable, replacing a previous binding.
    pub fn register_var(&mut self, name: &str, value: f64) {
        self.vars.insert(name.to_string(), Complex::new(value, 0.0));
    }

    /// Binds a complex variable, replacing a previous binding.
    pub fn register_complex_var(&mut self, name: &str, value: Complex<f64>) {
        self.vars.insert(name.to_string(), value);
    }

    /// Evaluates the expression with the current bindings.
    pub fn eval(&self) -> Result<Complex<f64>, MagdynError> {
        self.eval_node(&self.root)
    }

    /// Evaluates the expression, yielding zero on any failure.
    ///
    /// Failures are reported as `warn!` events.
    pub fn eval_noexcept(&self) -> Complex<f64> {
        self.eval().unwrap_or_else(|err| {
            warn!(formula = %self.source, error = %err, "expression evaluation failed");
            Complex::new(0.0, 0.0)
        })
    }

    fn eval_node(&self, node: &Node) -> Result<Complex<f64>, MagdynError> {
        match node {
            Node::Num(value) => Ok(Complex::new(*value, 0.0)),
            Node::Var(name) => self.lookup(name),
            Node::Neg(inner) => Ok(-self.eval_node(inner)?),
            Node::Bin(op, lhs, rhs) => {
                let a = self.eval_node(lhs)?;
                let b = self.eval_node(rhs)?;
                Ok(match op {
                    '+' => a + b,
                    '-' => a - b,
                    '*' => a * b,
                    '/' => a / b,
                    _ => complex_pow(a, b),
                })
            }
            Node::Call(name, args) => {
                let values = args
                    .iter()
                    .map(|arg| self.eval_node(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                match (name.as_str(), values.as_slice()) {
                    ("pow", [base, exponent]) => Ok(complex_pow(*base, *exponent)),
                    (_, [z]) => apply_unary(name, *z).ok_or_else(|| {
                        MagdynError::Expr(
                            ErrorInfo::new("unknown-function", format!("unknown function `{name}`"))
                                .with_context("function", name.clone()),
                        )
                    }),
                    _ => Err(MagdynError::Expr(
                        ErrorInfo::new(
                            "invalid-arity",
                            format!("function `{name}` called with {} arguments", values.len()),
                        )
                        .with_context("function", name.clone()),
                    )),
                }
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Complex<f64>, MagdynError> {
        if let Some(value) = self.vars.get(name) {
            return Ok(*value);
        }
        match name {
            "pi" => Ok(Complex::new(std::f64::consts::PI, 0.0)),
            "e" => Ok(Complex::new(std::f64::consts::E, 0.0)),
            "i" | "imag_unit" => Ok(Complex::new(0.0, 1.0)),
            _ => Err(MagdynError::Expr(
                ErrorInfo::new("unknown-variable", format!("unknown variable `{name}`"))
                    .with_context("variable", name.to_string())
                    .with_hint("register the variable before evaluating"),
            )),
        }
    }
}
