//! Display formatting for dashboard numbers.

/// Compact count: `2.5M`, `1.5K`, otherwise en-US grouping (`999`, `12.5`).
pub fn format_number(n: f64) -> String {
    if n >= 1_000_000.0 {
        format!("{}M", to_fixed(n / 1_000_000.0, 1))
    } else if n >= 1_000.0 {
        format!("{}K", to_fixed(n / 1_000.0, 1))
    } else {
        group_thousands(n)
    }
}

/// [`format_number`] with a currency symbol prefix.
pub fn format_currency(n: f64, currency: &str) -> String {
    format!("{currency}{}", format_number(n))
}

/// Milliseconds to `45s`, `2m 5s` or `1h 30m`.
pub fn format_duration(ms: f64) -> String {
    let total_seconds = (ms / 1000.0).round() as i64;
    if total_seconds < 60 {
        return format!("{total_seconds}s");
    }
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    if minutes < 60 {
        return format!("{minutes}m {seconds}s");
    }
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Fraction digits needed to print any `f64` exactly (2^-1074 is the smallest
/// subnormal).
const EXACT_FRACTION_DIGITS: usize = 1074;

/// Fixed-point rounding on the exact decimal value of the float, with exact
/// ties going away from zero. `1.15` is stored as `1.1499…` and so gives
/// `"1.1"`, while `41.25` is exact and gives `"41.3"`. Never renders `-0`.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));

    let mut kept: Vec<char> = int_part
        .chars()
        .chain(frac_part.chars().chain(std::iter::repeat('0')).take(digits))
        .collect();
    let round_up = frac_part.chars().nth(digits).is_some_and(|d| d >= '5');
    if round_up {
        carry(&mut kept);
    }

    let split = kept.len() - digits;
    let int_digits: String = kept[..split].iter().collect();
    let frac_digits: String = kept[split..].iter().collect();
    let is_zero = kept.iter().all(|c| *c == '0');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    if digits == 0 {
        format!("{sign}{int_digits}")
    } else {
        format!("{sign}{int_digits}.{frac_digits}")
    }
}

/// Add one unit in the last place of a decimal digit string.
fn carry(digits: &mut Vec<char>) {
    for d in digits.iter_mut().rev() {
        if *d == '9' {
            *d = '0';
        } else {
            *d = char::from(*d as u8 + 1);
            return;
        }
    }
    digits.insert(0, '1');
}

/// en-US style grouping with at most three fraction digits.
pub fn group_thousands(n: f64) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }
    let fixed = to_fixed(n.abs(), 3);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let negative = n < 0.0 && (grouped != "0" || !frac_part.is_empty());
    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}
