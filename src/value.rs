use std::{collections::HashMap, fmt, rc::Rc};

use regex::{Regex, RegexBuilder};

use crate::evaluator::EvalError;

/// Signature of host functions callable from expressions.
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value, EvalError>;

/// A host function bound into the environment.
#[derive(Clone)]
pub struct Function(Rc<NativeFn>);

impl Function {
    pub fn new(f: impl Fn(&[Value]) -> Result<Value, EvalError> + 'static) -> Self {
        Function(Rc::new(f))
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        (self.0)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Function")
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A compiled regular expression together with its source.
#[derive(Debug, Clone)]
pub struct RegExp {
    pub pattern: String,
    pub flags: String,
    regex: Regex,
}

impl RegExp {
    /// Compiles `pattern` with the given flags.
    ///
    /// `i` and `m` switch on case-insensitive and multi-line matching;
    /// `g`, `u` and `y` are accepted but do not change a single test.
    pub fn new(pattern: &str, flags: &str) -> Result<Self, regex::Error> {
        // `\/` only exists to keep a slash from closing the literal.
        let source = pattern.replace("\\/", "/");
        let regex = RegexBuilder::new(&source)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .build()?;
        Ok(RegExp {
            pattern: pattern.to_string(),
            flags: flags.to_string(),
            regex,
        })
    }

    pub fn test(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

impl PartialEq for RegExp {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.flags == other.flags
    }
}

/// A runtime value.
///
/// Values are what expressions compute and what the host binds into the
/// environment. There is a single number type; arithmetic follows IEEE
/// floating point, so `1 / 0` is infinity rather than an error.
///
/// # Examples
///
/// ```
/// use brace_lang::Value;
/// use std::collections::HashMap;
///
/// let number = Value::Number(42.0);
/// let text = Value::from("hello");
///
/// let mut obj = HashMap::new();
/// obj.insert("key".to_string(), Value::from("value"));
/// let object = Value::Object(obj);
///
/// assert!(number.is_truthy());
/// assert_eq!(text.to_display_string(), "hello");
/// assert_eq!(object.get_member(&Value::from("key")), Value::from("value"));
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,

    Boolean(bool),

    Number(f64),

    String(String),

    Array(Vec<Value>),

    /// String-keyed map; key order is not significant
    Object(HashMap<String, Value>),

    RegExp(RegExp),

    /// Host function
    Function(Function),
}

impl PartialEq for Value {
    /// Strict equality: same kind and same contents. Numbers follow IEEE
    /// comparison (`NaN` is unequal to itself), functions compare by
    /// identity.
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Number(a), Number(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Object(a), Object(b)) => a == b,
            (RegExp(a), RegExp(b)) => a == b,
            (Function(a), Function(b)) => a == b,
            _ => false,
        }
    }
}

/// Formats a number the way the language prints it: integral values
/// without a fractional part, negative zero as `0`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl Value {
    pub fn function(f: impl Fn(&[Value]) -> Result<Value, EvalError> + 'static) -> Self {
        Value::Function(Function::new(f))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `null`, `false`, `0`, `NaN` and `""` are falsy; everything else,
    /// including empty arrays and objects, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::RegExp(_) | Value::Function(_) => true,
        }
    }

    /// Numeric coercion used by arithmetic, comparison and unary `+`/`-`.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::String(s) => parse_numeric_text(s),
            Value::Array(_) | Value::Object(_) | Value::RegExp(_) | Value::Function(_) => f64::NAN,
        }
    }

    /// General string conversion, used for concatenation, regex subjects
    /// and object keys.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Null => String::new(),
                    other => other.to_display_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::RegExp(re) => format!("/{}/{}", re.pattern, re.flags),
            Value::Function(_) => "function".to_string(),
        }
    }

    /// Conversion applied to template interpolations: strings as they are,
    /// finite numbers as decimal text, everything else as empty text.
    pub fn to_template_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Number(n) if n.is_finite() => format_number(*n),
            _ => String::new(),
        }
    }

    /// Looks up `property` on this value. Objects are indexed by key,
    /// arrays and strings by integral position or `length`. Every other
    /// combination yields `null`.
    pub fn get_member(&self, property: &Value) -> Value {
        match (self, property) {
            (Value::Object(map), key) => map
                .get(&key.to_display_string())
                .cloned()
                .unwrap_or(Value::Null),
            (Value::Array(items), Value::String(key)) if key == "length" => {
                Value::Number(items.len() as f64)
            }
            (Value::Array(items), index) => index_of(index)
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or(Value::Null),
            (Value::String(s), Value::String(key)) if key == "length" => {
                Value::Number(s.chars().count() as f64)
            }
            (Value::String(s), index) => index_of(index)
                .and_then(|i| s.chars().nth(i))
                .map(|ch| Value::String(ch.to_string()))
                .unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// Converts to JSON. Functions have no JSON form and become `null`;
    /// regular expressions become their source text.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Function(_) => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::RegExp(re) => serde_json::Value::String(format!("/{}/{}", re.pattern, re.flags)),
        }
    }
}

/// Array/string position for a member lookup: a non-negative integral
/// number, or a string spelling one.
fn index_of(property: &Value) -> Option<usize> {
    let n = match property {
        Value::Number(n) => *n,
        Value::String(s) => s.parse::<f64>().ok()?,
        _ => return None,
    };
    if n >= 0.0 && n.fract() == 0.0 && n <= usize::MAX as f64 {
        Some(n as usize)
    } else {
        None
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

/// Numeric value of a string, following the host-language `Number(text)`
/// grammar: surrounding whitespace is ignored, empty text is `0`, decimal
/// literals may carry a sign and exponent, `0x`/`0o`/`0b` prefixes select a
/// radix, and `Infinity` is the only spelled-out number. Anything else,
/// including `inf` and `nan`, is `NaN`.
fn parse_numeric_text(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }

    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &text[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        return digits
            .chars()
            .try_fold(0.0, |acc, ch| {
                ch.to_digit(radix)
                    .map(|d| acc * f64::from(radix) + f64::from(d))
            })
            .unwrap_or(f64::NAN);
    }

    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned == "Infinity" {
        return if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    if is_decimal_literal(unsigned) {
        text.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// `digits [. digits] [e [sign] digits]`, where either side of the dot may
/// be empty but not both.
fn is_decimal_literal(text: &str) -> bool {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(i) => (&text[..i], Some(&text[i + 1..])),
        None => (text, None),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    let mantissa_ok = all_digits(int) && all_digits(frac) && !(int.is_empty() && frac.is_empty());
    let exponent_ok = exponent.is_none_or(|exp| {
        let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        !digits.is_empty() && all_digits(digits)
    });
    mantissa_ok && exponent_ok
}
