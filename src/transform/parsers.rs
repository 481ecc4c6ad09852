use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

// ── Amounts ───────────────────────────────────────────────────────────────────

/// Parse a funding amount with optional magnitude suffix.
/// "$9.5m" → 9,500,000 | "1.2B" → 1,200,000,000 | "$250,000" → 250,000
pub fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    if cleaned.is_empty() {
        return None;
    }

    let (num_str, multiplier) = [
        ("billion", 1e9),
        ("million", 1e6),
        ("thousand", 1e3),
        ("b", 1e9),
        ("m", 1e6),
        ("k", 1e3),
    ]
    .iter()
    .find_map(|(suffix, mult)| cleaned.strip_suffix(suffix).map(|n| (n, *mult)))
    .unwrap_or((cleaned.as_str(), 1.0));

    // Digits and at most one dot; rejects dates like "01Jan2025" outright
    if num_str.is_empty()
        || !num_str.chars().all(|c| c.is_ascii_digit() || c == '.')
        || num_str.matches('.').count() > 1
    {
        return None;
    }

    // Overlong digit runs parse to infinity
    let num: f64 = num_str.parse().ok()?;
    Some(num * multiplier).filter(|n| n.is_finite())
}

/// "$5M", "$1.2B", "$750K", "$900". Rounds half away from zero; a value that
/// rounds up to 1000 of a unit is shown in the next unit ("$1M", not "$1000K").
pub fn format_amount(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let abs = amount.abs();

    if abs >= 1e9 || (abs / 1e6).round() >= 1000.0 {
        let billions = (abs / 1e9 * 10.0).round() / 10.0;
        let text = format!("{:.1}", billions);
        format!("{}${}B", sign, text.trim_end_matches(".0"))
    } else if abs >= 1e6 || (abs / 1e3).round() >= 1000.0 {
        format!("{}${}M", sign, (abs / 1e6).round() as i64)
    } else if abs >= 1e3 || abs.round() >= 1000.0 {
        format!("{}${}K", sign, (abs / 1e3).round() as i64)
    } else {
        format!("{}${}", sign, abs.round() as i64)
    }
}

/// Price with precision scaled to magnitude so sub-cent tokens stay readable.
pub fn format_price(price: Option<f64>) -> String {
    match price {
        None => "—".to_string(),
        Some(p) if p.abs() >= 1.0 => format!("${:.2}", p),
        Some(p) if p.abs() >= 0.01 => format!("${:.4}", p),
        Some(p) => format!("${:.8}", p),
    }
}

/// "+12.3%", "-4.0%", "—" for missing values.
pub fn format_pct(pct: Option<f64>) -> String {
    match pct {
        None => "—".to_string(),
        Some(p) if p > 0.0 => format!("+{:.1}%", p),
        Some(p) => format!("{:.1}%", p),
    }
}

// ── Dates ─────────────────────────────────────────────────────────────────────

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%m/%d/%Y",
];

/// Parse dates: RFC 3339, ISO, "01 Jan 2025", "Jan 01, 2025", US slashes.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a point in time; bare dates land on midnight UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    parse_date(s)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ── Text ──────────────────────────────────────────────────────────────────────

/// Comma-separated names → trimmed, non-empty entries.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn normalise_ticker(s: &str) -> String {
    s.trim().to_uppercase()
}

/// Percentage of `part` in `whole`, 0 for an empty whole.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 { 0.0 } else { part / whole * 100.0 }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
