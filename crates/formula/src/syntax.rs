//! Lexical configuration: delimiters, literal spellings, radix and the
//! date/time formatters used to read and write temporal literals.

use crate::error::FormatError;
use crate::member::ValueMember;
use crate::types::{FormulaType, Value};
use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt::{self, Write};
use std::sync::Arc;

/// Reads and writes one kind of temporal value.
///
/// Parsing must consume the whole text; trailing characters are a mismatch.
pub trait DateFormatter: fmt::Debug + Send + Sync {
    fn format(&self, value: &Value) -> Option<String>;
    fn parse(&self, text: &str) -> Option<Value>;
}

/// A chrono strftime pattern bound to one temporal type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternFormat {
    kind: FormulaType,
    pattern: String,
}

impl PatternFormat {
    pub fn date(pattern: impl Into<String>) -> Self {
        PatternFormat {
            kind: FormulaType::Date,
            pattern: pattern.into(),
        }
    }

    pub fn time(pattern: impl Into<String>) -> Self {
        PatternFormat {
            kind: FormulaType::Time,
            pattern: pattern.into(),
        }
    }

    pub fn datetime(pattern: impl Into<String>) -> Self {
        PatternFormat {
            kind: FormulaType::DateTime,
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether every strftime specifier in the pattern is understood.
    pub fn is_valid(&self) -> bool {
        !self.pattern.is_empty() && !StrftimeItems::new(&self.pattern).any(|item| matches!(item, Item::Error))
    }
}

impl DateFormatter for PatternFormat {
    fn format(&self, value: &Value) -> Option<String> {
        let mut out = String::new();
        let written = match (self.kind, value) {
            (FormulaType::Date, Value::Date(d)) => write!(out, "{}", d.format(&self.pattern)),
            (FormulaType::Time, Value::Time(t)) => write!(out, "{}", t.format(&self.pattern)),
            (FormulaType::DateTime, Value::DateTime(dt)) => write!(out, "{}", dt.format(&self.pattern)),
            _ => return None,
        };
        written.ok().map(|_| out)
    }

    fn parse(&self, text: &str) -> Option<Value> {
        match self.kind {
            FormulaType::Date => NaiveDate::parse_from_str(text, &self.pattern).ok().map(Value::Date),
            FormulaType::Time => NaiveTime::parse_from_str(text, &self.pattern).ok().map(Value::Time),
            FormulaType::DateTime => NaiveDateTime::parse_from_str(text, &self.pattern)
                .ok()
                .map(Value::DateTime),
            _ => None,
        }
    }
}

pub const DEFAULT_DATE_PATTERN: &str = "%d.%m.%Y";
pub const DEFAULT_TIME_PATTERN: &str = "%H:%M:%S";
pub const DEFAULT_DATETIME_PATTERN: &str = "%d.%m.%Y %H:%M:%S";

#[derive(Debug, Clone)]
pub struct SyntaxConfiguration {
    pub block_open: char,
    pub block_close: char,
    pub string_open: char,
    pub string_close: char,
    pub function_open: char,
    pub function_close: char,
    pub separator: char,
    pub radix: u32,
    pub null_literal: String,
    pub true_literal: String,
    pub false_literal: String,
    pub date_format: Arc<dyn DateFormatter>,
    pub time_format: Arc<dyn DateFormatter>,
    pub datetime_format: Arc<dyn DateFormatter>,
}

impl Default for SyntaxConfiguration {
    fn default() -> Self {
        SyntaxConfiguration {
            block_open: '(',
            block_close: ')',
            string_open: '"',
            string_close: '"',
            function_open: '(',
            function_close: ')',
            separator: ',',
            radix: 10,
            null_literal: "null".to_string(),
            true_literal: "true".to_string(),
            false_literal: "false".to_string(),
            date_format: Arc::new(PatternFormat::date(DEFAULT_DATE_PATTERN)),
            time_format: Arc::new(PatternFormat::time(DEFAULT_TIME_PATTERN)),
            datetime_format: Arc::new(PatternFormat::datetime(DEFAULT_DATETIME_PATTERN)),
        }
    }
}

impl SyntaxConfiguration {
    /// Recognizes a literal. Tried in order: boolean and null spellings,
    /// datetime, date, time, integer in the configured radix, float, quoted
    /// string.
    pub fn parse_literal(&self, text: &str) -> Option<ValueMember> {
        if text.eq_ignore_ascii_case(&self.true_literal) {
            return Some(ValueMember::new(FormulaType::Boolean, Value::Boolean(true)));
        }
        if text.eq_ignore_ascii_case(&self.false_literal) {
            return Some(ValueMember::new(FormulaType::Boolean, Value::Boolean(false)));
        }
        if text.eq_ignore_ascii_case(&self.null_literal) {
            return Some(ValueMember::new(FormulaType::Null, Value::Null));
        }
        let temporal = [
            (&self.datetime_format, FormulaType::DateTime),
            (&self.date_format, FormulaType::Date),
            (&self.time_format, FormulaType::Time),
        ];
        for (format, ty) in temporal {
            if let Some(value) = format.parse(text) {
                return Some(ValueMember::new(ty, value));
            }
        }
        if let Ok(n) = i64::from_str_radix(text, usable_radix(self.radix)) {
            return Some(ValueMember::new(FormulaType::Long, Value::Long(n)));
        }
        if let Ok(n) = text.parse::<f64>() {
            return Some(ValueMember::new(FormulaType::Double, Value::Double(n)));
        }
        self.parse_string(text)
            .map(|s| ValueMember::new(FormulaType::String, Value::String(s.to_string())))
    }

    fn parse_string<'t>(&self, text: &'t str) -> Option<&'t str> {
        let inner = text.strip_prefix(self.string_open)?.strip_suffix(self.string_close)?;
        if inner.contains(self.string_close) {
            return None;
        }
        Some(inner)
    }

    /// Renders a literal so that [`parse_literal`](Self::parse_literal)
    /// reads it back. Null always renders as the null spelling.
    pub fn format_literal(&self, value: &Value, ty: FormulaType) -> Result<String, FormatError> {
        let coerced;
        let value = if FormulaType::of(value) == ty || ty == FormulaType::Null {
            value
        } else {
            coerced = ty.coerce(value.clone()).unwrap_or_else(|_| value.clone());
            &coerced
        };
        match value {
            Value::Null => Ok(self.null_literal.clone()),
            Value::Boolean(true) => Ok(self.true_literal.clone()),
            Value::Boolean(false) => Ok(self.false_literal.clone()),
            Value::Long(n) => Ok(format_radix(*n, self.radix)),
            Value::Double(n) => Ok(format_double(*n)),
            Value::Date(_) => self.format_temporal(&self.date_format, value, FormulaType::Date),
            Value::Time(_) => self.format_temporal(&self.time_format, value, FormulaType::Time),
            Value::DateTime(_) => {
                self.format_temporal(&self.datetime_format, value, FormulaType::DateTime)
            }
            Value::String(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push(self.string_open);
                out.push_str(s);
                out.push(self.string_close);
                Ok(out)
            }
        }
    }

    fn format_temporal(
        &self,
        format: &Arc<dyn DateFormatter>,
        value: &Value,
        ty: FormulaType,
    ) -> Result<String, FormatError> {
        format.format(value).ok_or(FormatError::Literal(ty))
    }
}

/// `radix` when it lies in `2..=36`, else 10.
fn usable_radix(radix: u32) -> u32 {
    if (2..=36).contains(&radix) {
        radix
    } else {
        10
    }
}

/// Upper-case digits in `radix`, with a leading `-` for negatives. A radix
/// outside `2..=36` renders decimal.
pub fn format_radix(n: i64, radix: u32) -> String {
    let radix = usable_radix(radix);
    if radix == 10 {
        return n.to_string();
    }
    let mut magnitude = n.unsigned_abs();
    if magnitude == 0 {
        return "0".to_string();
    }
    let radix64 = u64::from(radix);
    let mut digits = Vec::new();
    while magnitude > 0 {
        let d = (magnitude % radix64) as u32;
        digits.push(char::from_digit(d, radix).unwrap_or('?').to_ascii_uppercase());
        magnitude /= radix64;
    }
    if n < 0 {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

/// Shortest round-trip rendering that always reads back as a float.
pub fn format_double(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let mut s = n.to_string();
    if !s.contains(['.', 'e', 'E']) {
        s.push_str(".0");
    }
    s
}
