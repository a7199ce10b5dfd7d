//! Display text for cell values, driven by the cell's number format.
//!
//! Covers what intake data actually uses: `General`, fixed decimals,
//! thousands grouping, percentages, literal prefixes/suffixes (`$`, `"kg"`)
//! and date/time formats. Anything else falls back to the general form.

use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use intake_model::CellValue;

/// Text a spreadsheet user would see for `value` under `number_format`.
pub fn display_text(value: &CellValue, number_format: Option<&str>) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Text(text) | CellValue::Error(text) => text.clone(),
        CellValue::Bool(true) => "TRUE".to_string(),
        CellValue::Bool(false) => "FALSE".to_string(),
        CellValue::Number(number) => match classify(number_format) {
            FormatKind::General | FormatKind::Text => format_general(*number),
            FormatKind::Number(pattern) => pattern.render(*number),
            FormatKind::Date(pattern) => serial_to_datetime(*number)
                .and_then(|datetime| format_datetime(datetime, &pattern))
                .unwrap_or_else(|| format_general(*number)),
        },
        CellValue::DateTime(datetime) => match classify(number_format) {
            FormatKind::Date(pattern) => {
                format_datetime(*datetime, &pattern).unwrap_or_else(|| format_iso(*datetime))
            }
            _ => format_iso(*datetime),
        },
    }
}

/// Excel serial day number to a timestamp (1900 date system).
///
/// Serial 60 is Excel's fictitious 1900-02-29 and has no date; serials
/// before it count from 1899-12-31 so that serial 1 is 1900-01-01.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || (60.0..61.0).contains(&serial) {
        return None;
    }
    let epoch = if (1.0..60.0).contains(&serial) {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    }
    .and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round();
    if seconds.abs() > 1e12 {
        return None;
    }
    epoch.checked_add_signed(TimeDelta::try_seconds(seconds as i64)?)
}

/// `General`: integral values without a fraction, others to at most ten
/// decimals with trailing zeros dropped.
pub fn format_general(number: f64) -> String {
    if number == 0.0 {
        return "0".to_string();
    }
    if number.fract() == 0.0 && number.abs() < 1e15 {
        return format!("{number:.0}");
    }
    if !number.is_finite() || number.abs() >= 1e15 {
        return number.to_string();
    }
    let fixed = format!("{number:.10}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn format_iso(datetime: NaiveDateTime) -> String {
    if datetime.time() == chrono::NaiveTime::MIN {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn format_datetime(datetime: NaiveDateTime, pattern: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", datetime.format(pattern)).ok()?;
    Some(out)
}

#[derive(Debug, Clone, PartialEq)]
enum FormatKind {
    General,
    Text,
    Number(NumberPattern),
    /// chrono strftime string.
    Date(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct NumberPattern {
    prefix: String,
    suffix: String,
    decimals: usize,
    grouping: bool,
    percent: bool,
}

impl NumberPattern {
    fn render(&self, number: f64) -> String {
        if !number.is_finite() {
            return number.to_string();
        }
        let scaled = if self.percent { number * 100.0 } else { number };
        let fixed = format!("{:.*}", self.decimals, scaled.abs());
        let (integer, fraction) = match fixed.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (fixed.as_str(), None),
        };
        let negative = scaled < 0.0 && fixed.chars().any(|ch| ch.is_ascii_digit() && ch != '0');

        let mut out = String::with_capacity(fixed.len() + self.prefix.len() + self.suffix.len() + 4);
        if negative {
            out.push('-');
        }
        out.push_str(&self.prefix);
        if self.grouping {
            push_grouped(integer, &mut out);
        } else {
            out.push_str(integer);
        }
        if let Some(fraction) = fraction {
            out.push('.');
            out.push_str(fraction);
        }
        out.push_str(&self.suffix);
        out
    }
}

fn push_grouped(digits: &str, out: &mut String) {
    let len = digits.len();
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
}

/// One lexical piece of a format section.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    /// Run of a date/time letter, lowercased, with its length.
    Letter(char, usize),
    AmPm,
    /// `[h]`, `[mm]`, `[ss]` elapsed-time fields.
    Elapsed(char),
    /// Digit placeholder or separator used by numeric formats.
    Placeholder(char),
}

fn classify(number_format: Option<&str>) -> FormatKind {
    let Some(code) = number_format else {
        return FormatKind::General;
    };
    let section = first_section(code).trim();
    if section.is_empty() || section.eq_ignore_ascii_case("general") {
        return FormatKind::General;
    }
    if section == "@" {
        return FormatKind::Text;
    }
    let tokens = tokenize(section);
    let is_date = tokens
        .iter()
        .any(|token| matches!(token, Token::Letter(..) | Token::AmPm | Token::Elapsed(_)));
    if is_date {
        return FormatKind::Date(date_pattern(&tokens));
    }
    if tokens
        .iter()
        .any(|token| matches!(token, Token::Placeholder('0' | '#' | '?')))
    {
        return FormatKind::Number(number_pattern(&tokens));
    }
    FormatKind::General
}

/// The positive-number section: everything before the first unquoted `;`.
fn first_section(code: &str) -> &str {
    let mut quoted = false;
    let mut escaped = false;
    for (index, ch) in code.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => return &code[..index],
            _ => {}
        }
    }
    code
}

fn tokenize(section: &str) -> Vec<Token> {
    let chars: Vec<char> = section.chars().collect();
    let mut tokens = Vec::new();
    let mut index = 0;
    while index < chars.len() {
        let ch = chars[index];
        match ch {
            '"' => {
                let mut text = String::new();
                index += 1;
                while index < chars.len() && chars[index] != '"' {
                    text.push(chars[index]);
                    index += 1;
                }
                tokens.push(Token::Literal(text));
                index += 1;
            }
            '\\' => {
                if let Some(&next) = chars.get(index + 1) {
                    tokens.push(Token::Literal(next.to_string()));
                }
                index += 2;
            }
            '_' | '*' => index += 2,
            '[' => {
                let mut inner = String::new();
                index += 1;
                while index < chars.len() && chars[index] != ']' {
                    inner.push(chars[index]);
                    index += 1;
                }
                index += 1;
                let lower = inner.to_ascii_lowercase();
                if let Some(first) = lower.chars().next()
                    && matches!(first, 'h' | 'm' | 's')
                    && lower.chars().all(|c| c == first)
                {
                    tokens.push(Token::Elapsed(first));
                }
            }
            '0' | '#' | '?' | '.' | ',' => {
                tokens.push(Token::Placeholder(ch));
                index += 1;
            }
            _ if starts_with_ignore_case(&chars[index..], "am/pm") => {
                tokens.push(Token::AmPm);
                index += 5;
            }
            _ if starts_with_ignore_case(&chars[index..], "a/p") => {
                tokens.push(Token::AmPm);
                index += 3;
            }
            _ if matches!(ch.to_ascii_lowercase(), 'y' | 'm' | 'd' | 'h' | 's') => {
                let lower = ch.to_ascii_lowercase();
                let run = chars[index..]
                    .iter()
                    .take_while(|c| c.to_ascii_lowercase() == lower)
                    .count();
                tokens.push(Token::Letter(lower, run));
                index += run;
            }
            _ => {
                tokens.push(Token::Literal(ch.to_string()));
                index += 1;
            }
        }
    }
    tokens
}

fn starts_with_ignore_case(chars: &[char], needle: &str) -> bool {
    let needle: Vec<char> = needle.chars().collect();
    chars.len() >= needle.len()
        && chars
            .iter()
            .zip(&needle)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}

fn push_escaped(text: &str, out: &mut String) {
    for ch in text.chars() {
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
    }
}

fn date_pattern(tokens: &[Token]) -> String {
    let twelve_hour = tokens.contains(&Token::AmPm);
    let fields: Vec<(usize, &Token)> = tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| !matches!(token, Token::Literal(_) | Token::Placeholder(_)))
        .collect();

    let mut out = String::new();
    let mut field_position: usize = 0;
    for token in tokens {
        match token {
            Token::Literal(text) => push_escaped(text, &mut out),
            Token::Placeholder(ch) => push_escaped(&ch.to_string(), &mut out),
            Token::AmPm => {
                out.push_str("%p");
                field_position += 1;
            }
            Token::Elapsed(unit) => {
                out.push_str(match unit {
                    'h' => "%H",
                    'm' => "%M",
                    _ => "%S",
                });
                field_position += 1;
            }
            Token::Letter(letter, run) => {
                let previous = field_position
                    .checked_sub(1)
                    .and_then(|position| fields.get(position))
                    .map(|(_, token)| *token);
                let next = fields.get(field_position + 1).map(|(_, token)| *token);
                out.push_str(letter_directive(*letter, *run, twelve_hour, previous, next));
                field_position += 1;
            }
        }
    }
    out
}

fn letter_directive(
    letter: char,
    run: usize,
    twelve_hour: bool,
    previous: Option<&Token>,
    next: Option<&Token>,
) -> &'static str {
    match (letter, run) {
        ('y', 1 | 2) => "%y",
        ('y', _) => "%Y",
        ('d', 1) => "%-d",
        ('d', 2) => "%d",
        ('d', 3) => "%a",
        ('d', _) => "%A",
        ('h', 1) if twelve_hour => "%-I",
        ('h', _) if twelve_hour => "%I",
        ('h', 1) => "%-H",
        ('h', _) => "%H",
        ('s', 1) => "%-S",
        ('s', _) => "%S",
        ('m', 1 | 2) => {
            let after_hour = matches!(previous, Some(Token::Letter('h', _) | Token::Elapsed('h')));
            let before_second = matches!(next, Some(Token::Letter('s', _) | Token::Elapsed('s')));
            match (after_hour || before_second, run) {
                (true, 1) => "%-M",
                (true, _) => "%M",
                (false, 1) => "%-m",
                (false, _) => "%m",
            }
        }
        ('m', 3) => "%b",
        ('m', _) => "%B",
        _ => "",
    }
}

fn number_pattern(tokens: &[Token]) -> NumberPattern {
    let first = tokens
        .iter()
        .position(|token| matches!(token, Token::Placeholder('0' | '#' | '?' | '.')));
    let last = tokens
        .iter()
        .rposition(|token| matches!(token, Token::Placeholder('0' | '#' | '?')));
    let (Some(first), Some(last)) = (first, last) else {
        return NumberPattern::default();
    };

    let mut pattern = NumberPattern::default();
    for token in &tokens[..first] {
        if let Token::Literal(text) = token {
            pattern.prefix.push_str(text);
        }
    }
    for token in &tokens[last + 1..] {
        match token {
            Token::Literal(text) => pattern.suffix.push_str(text),
            Token::Placeholder(ch) if *ch != ',' => pattern.suffix.push(*ch),
            _ => {}
        }
    }

    let body = &tokens[first..=last];
    let mut seen_point = false;
    for (index, token) in body.iter().enumerate() {
        match token {
            Token::Placeholder('.') => seen_point = true,
            Token::Placeholder('0' | '#' | '?') if seen_point => pattern.decimals += 1,
            Token::Placeholder(',') if !seen_point => {
                let digit_follows = body[index + 1..]
                    .iter()
                    .any(|token| matches!(token, Token::Placeholder('0' | '#' | '?')));
                pattern.grouping |= digit_follows;
            }
            _ => {}
        }
    }
    pattern.percent = tokens
        .iter()
        .any(|token| matches!(token, Token::Literal(text) if text == "%"));
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(value: f64, format: &str) -> String {
        display_text(&CellValue::Number(value), Some(format))
    }

    #[test]
    fn general_numbers() {
        assert_eq!(format_general(25.0), "25");
        assert_eq!(format_general(25.5), "25.5");
        assert_eq!(format_general(-0.1), "-0.1");
        assert_eq!(format_general(1.0 / 3.0), "0.3333333333");
        assert_eq!(number(86_000_000.0, "General"), "86000000");
        assert_eq!(display_text(&CellValue::Number(7.0), None), "7");
    }

    #[test]
    fn fixed_and_grouped_numbers() {
        assert_eq!(number(1234.5, "0.00"), "1234.50");
        assert_eq!(number(86_000_000.0, "#,##0.00"), "86,000,000.00");
        assert_eq!(number(-1234.0, "#,##0"), "-1,234");
        assert_eq!(number(-0.001, "0.00"), "0.00");
        assert_eq!(number(12.5, "$#,##0.00;($#,##0.00)"), "$12.50");
        assert_eq!(number(3.0, "0 \"kg\""), "3 kg");
    }

    #[test]
    fn percentages_scale_by_hundred() {
        assert_eq!(number(0.12, "0.00%"), "12.00%");
        assert_eq!(number(1.5, "0%"), "150%");
    }

    #[test]
    fn date_formats_render_serials() {
        // 45322 is 2024-01-31.
        assert_eq!(number(45322.0, "dd/mm/yyyy"), "31/01/2024");
        assert_eq!(number(45322.0, "m/d/yy"), "1/31/24");
        assert_eq!(number(45322.0, "yyyy-mm-dd"), "2024-01-31");
        assert_eq!(number(45322.5, "yyyy-mm-dd hh:mm"), "2024-01-31 12:00");
        assert_eq!(number(45322.75, "h:mm AM/PM"), "6:00 PM");
        assert_eq!(number(45322.0, "d mmm yyyy"), "31 Jan 2024");
        assert_eq!(number(45322.0, "[$-409]mmmm d, yyyy"), "January 31, 2024");
    }

    #[test]
    fn early_serials_skip_the_phantom_leap_day() {
        assert_eq!(number(1.0, "yyyy-mm-dd"), "1900-01-01");
        assert_eq!(number(59.0, "yyyy-mm-dd"), "1900-02-28");
        assert_eq!(number(61.0, "yyyy-mm-dd"), "1900-03-01");
        assert_eq!(number(0.5, "hh:mm"), "12:00");
        assert!(serial_to_datetime(60.0).is_none());
        assert_eq!(number(60.0, "yyyy-mm-dd"), "60");
    }

    #[test]
    fn datetime_values_fall_back_to_iso() {
        let datetime = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(display_text(&CellValue::DateTime(datetime), None), "2024-01-31");
        assert_eq!(
            display_text(&CellValue::DateTime(datetime), Some("dd/mm/yyyy")),
            "31/01/2024"
        );
    }

    #[test]
    fn text_and_booleans_pass_through() {
        assert_eq!(display_text(&CellValue::Text(" a ".into()), Some("0.00")), " a ");
        assert_eq!(display_text(&CellValue::Bool(true), None), "TRUE");
        assert_eq!(display_text(&CellValue::Error("#DIV/0!".into()), None), "#DIV/0!");
        assert_eq!(number(5.0, "@"), "5");
    }
}
