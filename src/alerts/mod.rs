pub mod display;
pub mod webhook;

/// Thousands separators for a non-negative integer.
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, ch);
    }
    result
}

/// Cents as dollars: 123456 -> "$1,234.56".
pub fn format_usd(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, format_number(abs / 100), abs % 100)
}

/// Contract price; anything above 99 is assumed to already be a dollar amount in cents.
pub fn format_price(cents: i64) -> String {
    if cents > 99 {
        format!("${:.2}", cents as f64 / 100.0)
    } else {
        format!("{}¢", cents)
    }
}

/// Fractional cents keep one decimal only when needed: 52.0 -> "52¢", 52.5 -> "52.5¢".
pub fn format_cents(cents: f64) -> String {
    if (cents - cents.round()).abs() < 0.05 {
        format!("{:.0}¢", cents)
    } else {
        format!("{:.1}¢", cents)
    }
}

pub fn format_bid(bid: Option<i64>) -> String {
    match bid {
        Some(b) => format!("{}¢", b),
        None => "-".to_string(),
    }
}
