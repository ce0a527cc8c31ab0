/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    // -0.001 formats as "0.00"; don't print "-$0.00"
    let sign = if val < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{dec_part}")
}

pub fn percent(val: f64) -> String {
    format!("{val:.1}%")
}

/// Average that is 0 for an empty set instead of NaN.
pub fn safe_avg(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Share of `part` in `whole` as a percentage, 0 when `whole` is zero.
pub fn share(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}
