//! Restricted arithmetic evaluator backing the calculator tool.
//!
//! Only numeric literals, arithmetic operators, parentheses and the names in
//! [`CONSTANTS`] and [`FUNCTIONS`] are understood. Every other identifier is
//! rejected while tokenizing, so nothing outside the math table is ever
//! reachable from an expression.
//!
//! Integers are 64-bit. Integer results outside `i64` (`2**100`,
//! `factorial(25)`, the literal `9223372036854775808`) fail with
//! [`EvalError::Overflow`] rather than growing without bound.

use regex::Regex;
use std::f64::consts;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

const MAX_DEPTH: usize = 64;

/// Reasons an expression cannot be evaluated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("invalid syntax")]
    Syntax,

    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("name '{0}' is not defined")]
    UnknownName(String),

    #[error("'{0}' is a function and must be called")]
    NotCalled(String),

    #[error("'{0}' is a constant and is not callable")]
    NotCallable(String),

    #[error("{name}() takes {expected} argument(s) ({given} given)")]
    Arity {
        name: &'static str,
        expected: &'static str,
        given: usize,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("math domain error")]
    Domain,

    #[error("math range error")]
    Range,

    #[error("integer overflow")]
    Overflow,

    #[error("{0}() only accepts integral values")]
    NotIntegral(&'static str),

    #[error("expression nested too deeply")]
    TooDeep,
}

/// Result of an evaluation, keeping integers distinct from floats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn as_int(self, func: &'static str) -> Result<i64, EvalError> {
        match self {
            Number::Int(i) => Ok(i),
            Number::Float(_) => Err(EvalError::NotIntegral(func)),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => f.write_str(&format_float(*x)),
        }
    }
}

/// Formats a float so it always reads as a float literal (`4.0`, `0.5`, `1e+20`)
fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = x.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{:e}", x);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => formatted,
        };
    }

    if x.fract() == 0.0 {
        format!("{:.1}", x)
    } else {
        format!("{}", x)
    }
}

/// Named constants an expression may reference
pub const CONSTANTS: &[(&str, f64)] = &[
    ("pi", consts::PI),
    ("e", consts::E),
    ("tau", consts::TAU),
    ("inf", f64::INFINITY),
    ("nan", f64::NAN),
];

pub type MathFn = fn(&[Number]) -> Result<Number, EvalError>;

/// Functions an expression may call
pub const FUNCTIONS: &[(&str, MathFn)] = &[
    ("sqrt", |args| unary("sqrt", args, |x| domain(x >= 0.0, x.sqrt()))),
    ("exp", |args| unary("exp", args, |x| range(x.exp()))),
    ("expm1", |args| unary("expm1", args, |x| range(x.exp_m1()))),
    ("log", log),
    ("log2", |args| unary("log2", args, |x| domain(x > 0.0, x.log2()))),
    ("log10", |args| unary("log10", args, |x| domain(x > 0.0, x.log10()))),
    ("log1p", |args| unary("log1p", args, |x| domain(x > -1.0, x.ln_1p()))),
    ("sin", |args| unary("sin", args, |x| domain(x.is_finite(), x.sin()))),
    ("cos", |args| unary("cos", args, |x| domain(x.is_finite(), x.cos()))),
    ("tan", |args| unary("tan", args, |x| domain(x.is_finite(), x.tan()))),
    ("asin", |args| unary("asin", args, |x| domain((-1.0..=1.0).contains(&x), x.asin()))),
    ("acos", |args| unary("acos", args, |x| domain((-1.0..=1.0).contains(&x), x.acos()))),
    ("atan", |args| unary("atan", args, |x| Ok(x.atan()))),
    ("atan2", |args| binary("atan2", args, |y, x| Ok(y.atan2(x)))),
    ("sinh", |args| unary("sinh", args, |x| range(x.sinh()))),
    ("cosh", |args| unary("cosh", args, |x| range(x.cosh()))),
    ("tanh", |args| unary("tanh", args, |x| Ok(x.tanh()))),
    ("asinh", |args| unary("asinh", args, |x| Ok(x.asinh()))),
    ("acosh", |args| unary("acosh", args, |x| domain(x >= 1.0, x.acosh()))),
    ("atanh", |args| unary("atanh", args, |x| domain(x > -1.0 && x < 1.0, x.atanh()))),
    ("fabs", |args| unary("fabs", args, |x| Ok(x.abs()))),
    ("degrees", |args| unary("degrees", args, |x| Ok(x.to_degrees()))),
    ("radians", |args| unary("radians", args, |x| Ok(x.to_radians()))),
    ("floor", |args| rounding("floor", args, f64::floor)),
    ("ceil", |args| rounding("ceil", args, f64::ceil)),
    ("trunc", |args| rounding("trunc", args, f64::trunc)),
    ("pow", |args| binary("pow", args, float_pow)),
    ("hypot", |args| binary("hypot", args, |x, y| range(x.hypot(y)))),
    ("fmod", |args| {
        binary("fmod", args, |x, y| domain(y != 0.0 && x.is_finite(), x % y))
    }),
    ("copysign", |args| binary("copysign", args, |x, y| Ok(x.copysign(y)))),
    ("cbrt", |args| unary("cbrt", args, |x| Ok(x.cbrt()))),
    ("exp2", |args| unary("exp2", args, |x| range(x.exp2()))),
    ("remainder", |args| binary("remainder", args, remainder)),
    ("erf", |args| unary("erf", args, |x| Ok(erf(x)))),
    ("erfc", |args| unary("erfc", args, |x| Ok(erfc(x)))),
    ("gamma", |args| unary("gamma", args, gamma)),
    ("lgamma", |args| unary("lgamma", args, lgamma)),
    ("factorial", factorial),
    ("gcd", gcd),
    ("lcm", lcm),
    ("comb", comb),
    ("perm", perm),
    ("isqrt", isqrt),
];

fn check_arity(
    name: &'static str,
    args: &[Number],
    expected: &'static str,
    ok: bool,
) -> Result<(), EvalError> {
    if ok {
        Ok(())
    } else {
        Err(EvalError::Arity {
            name,
            expected,
            given: args.len(),
        })
    }
}

fn unary(
    name: &'static str,
    args: &[Number],
    f: impl Fn(f64) -> Result<f64, EvalError>,
) -> Result<Number, EvalError> {
    check_arity(name, args, "exactly one", args.len() == 1)?;
    let x = args[0].as_f64();
    if x.is_nan() {
        return Ok(Number::Float(f64::NAN));
    }
    f(x).map(Number::Float)
}

fn binary(
    name: &'static str,
    args: &[Number],
    f: impl Fn(f64, f64) -> Result<f64, EvalError>,
) -> Result<Number, EvalError> {
    check_arity(name, args, "exactly two", args.len() == 2)?;
    f(args[0].as_f64(), args[1].as_f64()).map(Number::Float)
}

fn domain(valid: bool, value: f64) -> Result<f64, EvalError> {
    if valid { Ok(value) } else { Err(EvalError::Domain) }
}

fn range(value: f64) -> Result<f64, EvalError> {
    if value.is_infinite() { Err(EvalError::Range) } else { Ok(value) }
}

fn float_to_int(x: f64) -> Result<i64, EvalError> {
    if x.is_nan() {
        return Err(EvalError::Domain);
    }
    if x.is_infinite() || x < i64::MIN as f64 || x >= i64::MAX as f64 {
        return Err(EvalError::Overflow);
    }
    Ok(x as i64)
}

fn rounding(name: &'static str, args: &[Number], f: fn(f64) -> f64) -> Result<Number, EvalError> {
    check_arity(name, args, "exactly one", args.len() == 1)?;
    match args[0] {
        Number::Int(i) => Ok(Number::Int(i)),
        Number::Float(x) => float_to_int(f(x)).map(Number::Int),
    }
}

fn log(args: &[Number]) -> Result<Number, EvalError> {
    check_arity("log", args, "one or two", matches!(args.len(), 1 | 2))?;
    let x = args[0].as_f64();
    if x <= 0.0 {
        return Err(EvalError::Domain);
    }
    match args.get(1) {
        None => Ok(Number::Float(x.ln())),
        Some(base) => {
            let base = base.as_f64();
            if base <= 0.0 {
                return Err(EvalError::Domain);
            }
            if base == 1.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Number::Float(x.ln() / base.ln()))
        }
    }
}

fn float_pow(base: f64, exponent: f64) -> Result<f64, EvalError> {
    if base == 0.0 && exponent < 0.0 {
        return Err(EvalError::Domain);
    }
    if base < 0.0 && exponent.fract() != 0.0 && exponent.is_finite() {
        return Err(EvalError::Domain);
    }
    let value = base.powf(exponent);
    if value.is_infinite() && base.is_finite() && exponent.is_finite() {
        return Err(EvalError::Range);
    }
    Ok(value)
}

/// IEEE 754 remainder: `x - n*y` with `n` the quotient rounded half to even
fn remainder(x: f64, y: f64) -> Result<f64, EvalError> {
    if x.is_nan() || y.is_nan() {
        return Ok(f64::NAN);
    }
    if y == 0.0 || x.is_infinite() {
        return Err(EvalError::Domain);
    }
    if y.is_infinite() {
        return Ok(x);
    }
    Ok(x - (x / y).round_ties_even() * y)
}

const SQRT_PI: f64 = 1.772_453_850_905_516;
const ERF_SERIES_LIMIT: f64 = 2.5;

fn erf(x: f64) -> f64 {
    if x.abs() < ERF_SERIES_LIMIT {
        // Maclaurin series: 2/sqrt(pi) * sum (-1)^n x^(2n+1) / (n! (2n+1))
        let x2 = x * x;
        let mut term = x;
        let mut sum = x;
        for n in 1..200 {
            term *= -x2 / n as f64;
            let contribution = term / (2 * n + 1) as f64;
            sum += contribution;
            if contribution.abs() <= f64::EPSILON * sum.abs() {
                break;
            }
        }
        return sum * 2.0 / SQRT_PI;
    }
    let tail = erfc_continued_fraction(x.abs());
    if x > 0.0 { 1.0 - tail } else { tail - 1.0 }
}

fn erfc(x: f64) -> f64 {
    if x >= ERF_SERIES_LIMIT {
        erfc_continued_fraction(x)
    } else if x <= -ERF_SERIES_LIMIT {
        2.0 - erfc_continued_fraction(-x)
    } else {
        1.0 - erf(x)
    }
}

/// Laplace continued fraction for erfc, accurate for `x >= 2.5`
fn erfc_continued_fraction(x: f64) -> f64 {
    if x.is_infinite() {
        return 0.0;
    }
    let mut f = x;
    for k in (1..=200).rev() {
        f = x + (k as f64 / 2.0) / f;
    }
    (-x * x).exp() / (SQRT_PI * f)
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// ln(gamma(x)) for `x >= 0.5` via the Lanczos approximation
fn lanczos_ln_gamma(x: f64) -> f64 {
    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let series = LANCZOS_COEFFICIENTS[1..]
        .iter()
        .enumerate()
        .fold(LANCZOS_COEFFICIENTS[0], |acc, (i, c)| acc + c / (x + (i + 1) as f64));
    0.5 * (2.0 * consts::PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

fn is_non_positive_integer(x: f64) -> bool {
    x <= 0.0 && x.fract() == 0.0
}

fn gamma(x: f64) -> Result<f64, EvalError> {
    if is_non_positive_integer(x) || x == f64::NEG_INFINITY {
        return Err(EvalError::Domain);
    }
    if x == f64::INFINITY {
        return Ok(x);
    }
    // exact for small positive integers
    if x.fract() == 0.0 && x <= 23.0 {
        return Ok((2..x as u32).fold(1.0, |acc, k| acc * k as f64));
    }
    if x < 0.5 {
        let reflected = gamma(1.0 - x)?;
        return range(consts::PI / ((consts::PI * x).sin() * reflected));
    }
    range(lanczos_ln_gamma(x).exp())
}

fn lgamma(x: f64) -> Result<f64, EvalError> {
    if is_non_positive_integer(x) {
        return Err(EvalError::Domain);
    }
    if x.is_infinite() {
        return Ok(f64::INFINITY);
    }
    if x == 1.0 || x == 2.0 {
        return Ok(0.0);
    }
    if x < 0.5 {
        let reflected = lgamma(1.0 - x)?;
        return Ok((consts::PI / (consts::PI * x).sin().abs()).ln() - reflected);
    }
    Ok(lanczos_ln_gamma(x))
}

fn factorial(args: &[Number]) -> Result<Number, EvalError> {
    check_arity("factorial", args, "exactly one", args.len() == 1)?;
    let n = args[0].as_int("factorial")?;
    if n < 0 {
        return Err(EvalError::Domain);
    }
    (1..=n)
        .try_fold(1i64, |acc, k| acc.checked_mul(k))
        .map(Number::Int)
        .ok_or(EvalError::Overflow)
}

fn gcd(args: &[Number]) -> Result<Number, EvalError> {
    let mut acc: i64 = 0;
    for arg in args {
        let mut b = arg.as_int("gcd")?.checked_abs().ok_or(EvalError::Overflow)?;
        let mut a = acc;
        while b != 0 {
            let t = a % b;
            a = b;
            b = t;
        }
        acc = a;
    }
    Ok(Number::Int(acc))
}

fn lcm(args: &[Number]) -> Result<Number, EvalError> {
    let mut acc: i64 = 1;
    for arg in args {
        let b = arg.as_int("lcm")?.checked_abs().ok_or(EvalError::Overflow)?;
        if acc == 0 || b == 0 {
            acc = 0;
            continue;
        }
        let Number::Int(divisor) = gcd(&[Number::Int(acc), Number::Int(b)])? else {
            return Err(EvalError::Overflow);
        };
        acc = (acc / divisor).checked_mul(b).ok_or(EvalError::Overflow)?;
    }
    Ok(Number::Int(acc))
}

fn comb(args: &[Number]) -> Result<Number, EvalError> {
    check_arity("comb", args, "exactly two", args.len() == 2)?;
    let n = args[0].as_int("comb")?;
    let k = args[1].as_int("comb")?;
    if n < 0 || k < 0 {
        return Err(EvalError::Domain);
    }
    if k > n {
        return Ok(Number::Int(0));
    }
    let k = k.min(n - k);
    let mut acc: i128 = 1;
    for i in 0..k {
        acc = acc * i128::from(n - i) / i128::from(i + 1);
        if acc > i128::from(i64::MAX) {
            return Err(EvalError::Overflow);
        }
    }
    i64::try_from(acc).map(Number::Int).map_err(|_| EvalError::Overflow)
}

fn perm(args: &[Number]) -> Result<Number, EvalError> {
    check_arity("perm", args, "one or two", matches!(args.len(), 1 | 2))?;
    let n = args[0].as_int("perm")?;
    let k = match args.get(1) {
        Some(k) => k.as_int("perm")?,
        None => n,
    };
    if n < 0 || k < 0 {
        return Err(EvalError::Domain);
    }
    if k > n {
        return Ok(Number::Int(0));
    }
    ((n - k + 1)..=n)
        .try_fold(1i64, |acc, f| acc.checked_mul(f))
        .map(Number::Int)
        .ok_or(EvalError::Overflow)
}

fn isqrt(args: &[Number]) -> Result<Number, EvalError> {
    check_arity("isqrt", args, "exactly one", args.len() == 1)?;
    let n = args[0].as_int("isqrt")?;
    if n < 0 {
        return Err(EvalError::Domain);
    }
    let mut root = (n as f64).sqrt() as i64;
    while root.checked_mul(root).is_none_or(|sq| sq > n) {
        root -= 1;
    }
    while (root + 1).checked_mul(root + 1).is_some_and(|sq| sq <= n) {
        root += 1;
    }
    Ok(Number::Int(root))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    Power,
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone, Copy)]
enum Token {
    Number(Number),
    Constant(&'static str, f64),
    Function(&'static str, MathFn),
    Op(Op),
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:(?P<num>(?:\d+\.\d*|\.\d+|\d+)(?:[eE][+-]?\d+)?)|(?P<name>[A-Za-z_][A-Za-z0-9_]*)|(?P<op>\*\*|//|[-+*/%(),]))",
        )
        .expect("valid regex")
    })
}

fn tokenize(source: &str) -> Result<Vec<Token>, EvalError> {
    let re = token_re();
    let mut tokens = Vec::new();
    let mut rest = source.trim_start();

    while !rest.is_empty() {
        let caps = match re.captures(rest) {
            Some(caps) => caps,
            None => {
                let c = rest.chars().next().unwrap_or(' ');
                return Err(EvalError::UnexpectedChar(c));
            }
        };

        if let Some(num) = caps.name("num") {
            tokens.push(Token::Number(parse_number(num.as_str())?));
        } else if let Some(name) = caps.name("name") {
            tokens.push(resolve_name(name.as_str())?);
        } else if let Some(op) = caps.name("op") {
            tokens.push(Token::Op(match op.as_str() {
                "**" => Op::Power,
                "//" => Op::DoubleSlash,
                "+" => Op::Plus,
                "-" => Op::Minus,
                "*" => Op::Star,
                "/" => Op::Slash,
                "%" => Op::Percent,
                "(" => Op::LParen,
                ")" => Op::RParen,
                _ => Op::Comma,
            }));
        }

        let consumed = caps.get(0).map_or(0, |m| m.end());
        rest = rest[consumed..].trim_start();
    }

    Ok(tokens)
}

fn parse_number(literal: &str) -> Result<Number, EvalError> {
    if literal.contains(['.', 'e', 'E']) {
        literal
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| EvalError::Syntax)
    } else {
        literal
            .parse::<i64>()
            .map(Number::Int)
            .map_err(|_| EvalError::Overflow)
    }
}

fn resolve_name(name: &str) -> Result<Token, EvalError> {
    if let Some((constant, value)) = CONSTANTS.iter().find(|(n, _)| *n == name) {
        return Ok(Token::Constant(*constant, *value));
    }
    if let Some((function, f)) = FUNCTIONS.iter().find(|(n, _)| *n == name) {
        return Ok(Token::Function(*function, *f));
    }
    Err(EvalError::UnknownName(name.to_string()))
}

/// Recursive-descent evaluator; each grammar rule computes its value directly
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek_op(&self) -> Option<Op> {
        match self.tokens.get(self.pos) {
            Some(Token::Op(op)) => Some(*op),
            _ => None,
        }
    }

    fn eat(&mut self, op: Op) -> bool {
        if self.peek_op() == Some(op) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, op: Op) -> Result<(), EvalError> {
        if self.eat(op) { Ok(()) } else { Err(EvalError::Syntax) }
    }

    fn descend(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }
        Ok(())
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Number, EvalError> {
        self.descend()?;
        let mut value = self.term()?;
        loop {
            if self.eat(Op::Plus) {
                value = add(value, self.term()?)?;
            } else if self.eat(Op::Minus) {
                value = sub(value, self.term()?)?;
            } else {
                break;
            }
        }
        self.depth -= 1;
        Ok(value)
    }

    // term := unary (('*' | '/' | '//' | '%') unary)*
    fn term(&mut self) -> Result<Number, EvalError> {
        let mut value = self.unary()?;
        loop {
            if self.eat(Op::Star) {
                value = mul(value, self.unary()?)?;
            } else if self.eat(Op::Slash) {
                value = div(value, self.unary()?)?;
            } else if self.eat(Op::DoubleSlash) {
                value = floor_div(value, self.unary()?)?;
            } else if self.eat(Op::Percent) {
                value = modulo(value, self.unary()?)?;
            } else {
                break;
            }
        }
        Ok(value)
    }

    // unary := ('+' | '-') unary | power
    fn unary(&mut self) -> Result<Number, EvalError> {
        if self.eat(Op::Minus) {
            self.descend()?;
            let value = negate(self.unary()?)?;
            self.depth -= 1;
            Ok(value)
        } else if self.eat(Op::Plus) {
            self.descend()?;
            let value = self.unary()?;
            self.depth -= 1;
            Ok(value)
        } else {
            self.power()
        }
    }

    // power := primary ('**' unary)?
    fn power(&mut self) -> Result<Number, EvalError> {
        let base = self.primary()?;
        if self.eat(Op::Power) {
            self.descend()?;
            let exponent = self.unary()?;
            self.depth -= 1;
            pow(base, exponent)
        } else {
            Ok(base)
        }
    }

    // primary := number | constant | function '(' args ')' | '(' expr ')'
    fn primary(&mut self) -> Result<Number, EvalError> {
        let token = *self.tokens.get(self.pos).ok_or(EvalError::Syntax)?;
        self.pos += 1;

        match token {
            Token::Number(n) => Ok(n),
            Token::Constant(name, value) => {
                if self.peek_op() == Some(Op::LParen) {
                    return Err(EvalError::NotCallable(name.to_string()));
                }
                Ok(Number::Float(value))
            }
            Token::Function(name, f) => {
                if !self.eat(Op::LParen) {
                    return Err(EvalError::NotCalled(name.to_string()));
                }
                let mut args = Vec::new();
                if !self.eat(Op::RParen) {
                    loop {
                        args.push(self.expr()?);
                        if self.eat(Op::RParen) {
                            break;
                        }
                        self.expect(Op::Comma)?;
                    }
                }
                f(&args)
            }
            Token::Op(Op::LParen) => {
                let value = self.expr()?;
                self.expect(Op::RParen)?;
                Ok(value)
            }
            Token::Op(_) => Err(EvalError::Syntax),
        }
    }
}

fn add(a: Number, b: Number) -> Result<Number, EvalError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x.checked_add(y).map(Number::Int).ok_or(EvalError::Overflow),
        _ => Ok(Number::Float(a.as_f64() + b.as_f64())),
    }
}

fn sub(a: Number, b: Number) -> Result<Number, EvalError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x.checked_sub(y).map(Number::Int).ok_or(EvalError::Overflow),
        _ => Ok(Number::Float(a.as_f64() - b.as_f64())),
    }
}

fn mul(a: Number, b: Number) -> Result<Number, EvalError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x.checked_mul(y).map(Number::Int).ok_or(EvalError::Overflow),
        _ => Ok(Number::Float(a.as_f64() * b.as_f64())),
    }
}

fn div(a: Number, b: Number) -> Result<Number, EvalError> {
    let divisor = b.as_f64();
    if divisor == 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    Ok(Number::Float(a.as_f64() / divisor))
}

fn floor_div(a: Number, b: Number) -> Result<Number, EvalError> {
    match (a, b) {
        (Number::Int(_), Number::Int(0)) => Err(EvalError::DivisionByZero),
        (Number::Int(x), Number::Int(y)) => {
            let quotient = x.checked_div(y).ok_or(EvalError::Overflow)?;
            if x % y != 0 && ((x < 0) != (y < 0)) {
                Ok(Number::Int(quotient - 1))
            } else {
                Ok(Number::Int(quotient))
            }
        }
        _ => {
            let divisor = b.as_f64();
            if divisor == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Number::Float((a.as_f64() / divisor).floor()))
        }
    }
}

fn modulo(a: Number, b: Number) -> Result<Number, EvalError> {
    match (a, b) {
        (Number::Int(_), Number::Int(0)) => Err(EvalError::DivisionByZero),
        (Number::Int(x), Number::Int(y)) => {
            let remainder = x.checked_rem(y).ok_or(EvalError::Overflow)?;
            if remainder != 0 && ((remainder < 0) != (y < 0)) {
                Ok(Number::Int(remainder + y))
            } else {
                Ok(Number::Int(remainder))
            }
        }
        _ => {
            let divisor = b.as_f64();
            if divisor == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            let remainder = a.as_f64() % divisor;
            if remainder != 0.0 && ((remainder < 0.0) != (divisor < 0.0)) {
                Ok(Number::Float(remainder + divisor))
            } else {
                Ok(Number::Float(remainder))
            }
        }
    }
}

fn pow(base: Number, exponent: Number) -> Result<Number, EvalError> {
    match (base, exponent) {
        (Number::Int(b), Number::Int(e)) if e >= 0 => {
            let e = u32::try_from(e).map_err(|_| EvalError::Overflow)?;
            b.checked_pow(e).map(Number::Int).ok_or(EvalError::Overflow)
        }
        (Number::Int(0), Number::Int(_)) => Err(EvalError::DivisionByZero),
        _ => {
            let (b, e) = (base.as_f64(), exponent.as_f64());
            if b == 0.0 && e < 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            float_pow(b, e).map(Number::Float)
        }
    }
}

fn negate(value: Number) -> Result<Number, EvalError> {
    match value {
        Number::Int(i) => i.checked_neg().map(Number::Int).ok_or(EvalError::Overflow),
        Number::Float(f) => Ok(Number::Float(-f)),
    }
}

/// Evaluates an arithmetic expression against the allow-listed math table
pub fn evaluate(source: &str) -> Result<Number, EvalError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(EvalError::Syntax);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(EvalError::Syntax);
    }
    Ok(value)
}
