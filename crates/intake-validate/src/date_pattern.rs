//! Date patterns in `dd/MM/yyyy` token syntax, compiled to chrono.
//!
//! Parsing is strict: the whole value must match and calendar fields must
//! form a real date, so `32/01/2024` and `31/02/2024` both fail.

use chrono::format::{Parsed, StrftimeItems, parse};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatePatternError {
    #[error("unsupported pattern letter '{0}'")]
    UnsupportedLetter(char),
    #[error("unsupported fractional-second width {0} (only SSS)")]
    UnsupportedFraction(usize),
    #[error("unterminated quoted literal")]
    UnterminatedQuote,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Fields {
    year: bool,
    month: bool,
    day: bool,
    hour: bool,
    hour12: bool,
    ampm: bool,
    minute: bool,
}

impl Fields {
    fn has_date(self) -> bool {
        self.year || self.month || self.day
    }

    fn has_time(self) -> bool {
        self.hour || self.hour12 || self.minute
    }
}

/// A compiled date pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    source: String,
    strftime: String,
    fields: Fields,
}

impl DatePattern {
    /// Translate a pattern such as `dd/MM/yyyy` or `yyyy-MM-dd HH:mm`.
    ///
    /// Supported letters: `y M d H h m s S a E`; text in single quotes is
    /// literal and `''` is a quote.
    pub fn compile(pattern: &str) -> Result<Self, DatePatternError> {
        let mut strftime = String::with_capacity(pattern.len() * 2);
        let mut fields = Fields::default();
        let chars: Vec<char> = pattern.chars().collect();
        let mut index = 0;

        while index < chars.len() {
            let ch = chars[index];
            if ch == '\'' {
                index = push_quoted(&chars, index, &mut strftime)?;
                continue;
            }
            if !ch.is_ascii_alphabetic() {
                push_literal(ch, &mut strftime);
                index += 1;
                continue;
            }

            let run = chars[index..].iter().take_while(|&&c| c == ch).count();
            let directive = match (ch, run) {
                ('y', 2) => {
                    fields.year = true;
                    "%y"
                }
                ('y', _) => {
                    fields.year = true;
                    "%Y"
                }
                ('M', 1 | 2) => {
                    fields.month = true;
                    "%m"
                }
                ('M', 3) => {
                    fields.month = true;
                    "%b"
                }
                ('M', _) => {
                    fields.month = true;
                    "%B"
                }
                ('d', 1 | 2) => {
                    fields.day = true;
                    "%d"
                }
                ('H', 1 | 2) => {
                    fields.hour = true;
                    "%H"
                }
                ('h', 1 | 2) => {
                    fields.hour12 = true;
                    "%I"
                }
                ('m', 1 | 2) => {
                    fields.minute = true;
                    "%M"
                }
                ('s', 1 | 2) => "%S",
                ('S', 3) => "%3f",
                ('S', width) => return Err(DatePatternError::UnsupportedFraction(width)),
                ('a', 1) => {
                    fields.ampm = true;
                    "%p"
                }
                ('E', 1..=3) => "%a",
                ('E', _) => "%A",
                (other, _) => return Err(DatePatternError::UnsupportedLetter(other)),
            };
            strftime.push_str(directive);
            index += run;
        }

        Ok(Self {
            source: pattern.to_string(),
            strftime,
            fields,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The chrono strftime string this pattern compiled to.
    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    /// True when the whole of `value` is a valid date in this pattern.
    pub fn matches(&self, value: &str) -> bool {
        let mut parsed = Parsed::new();
        if parse(&mut parsed, value, StrftimeItems::new(&self.strftime)).is_err() {
            return false;
        }
        if self.fields.has_date() {
            if !self.fields.day && parsed.set_day(1).is_err() {
                return false;
            }
            if !self.fields.year && parsed.set_year(2000).is_err() {
                return false;
            }
            if !self.fields.month && parsed.set_month(1).is_err() {
                return false;
            }
            if parsed.to_naive_date().is_err() {
                return false;
            }
        }
        if self.fields.has_time() {
            if self.fields.hour12 && !self.fields.ampm && parsed.set_ampm(false).is_err() {
                return false;
            }
            if !self.fields.hour && !self.fields.hour12 && parsed.set_hour(0).is_err() {
                return false;
            }
            if !self.fields.minute && parsed.set_minute(0).is_err() {
                return false;
            }
            if parsed.to_naive_time().is_err() {
                return false;
            }
        }
        true
    }
}

fn push_literal(ch: char, out: &mut String) {
    if ch == '%' {
        out.push_str("%%");
    } else {
        out.push(ch);
    }
}

/// Copy a quoted literal starting at `start`; returns the index after it.
fn push_quoted(chars: &[char], start: usize, out: &mut String) -> Result<usize, DatePatternError> {
    if chars.get(start + 1) == Some(&'\'') {
        out.push('\'');
        return Ok(start + 2);
    }
    let mut index = start + 1;
    loop {
        match chars.get(index) {
            None => return Err(DatePatternError::UnterminatedQuote),
            Some('\'') if chars.get(index + 1) == Some(&'\'') => {
                out.push('\'');
                index += 2;
            }
            Some('\'') => return Ok(index + 1),
            Some(&ch) => {
                push_literal(ch, out);
                index += 1;
            }
        }
    }
}
