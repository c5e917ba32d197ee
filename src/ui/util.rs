use rust_decimal::Decimal;

/// Money with thousands separators and two decimals, e.g. `-$1,234.50`.
pub(crate) fn format_amount(val: Decimal) -> String {
    let fixed = format!("{:.2}", val.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if val < Decimal::ZERO { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

/// A statistic or rule measure, four decimals; `None` shows as `inf`.
pub(crate) fn format_measure(val: Option<f64>) -> String {
    match val {
        Some(v) if v.is_finite() => format!("{v:.4}"),
        Some(v) if v < 0.0 => "-inf".into(),
        _ => "inf".into(),
    }
}

/// Truncate to `max` characters, ending in "…" when cut.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    match max {
        0 => String::new(),
        _ => {
            let mut cut: String = s.chars().take(max - 1).collect();
            cut.push('…');
            cut
        }
    }
}

/// Move a list cursor down one row, scrolling so it stays in a `page`-row window.
pub(crate) fn scroll_down(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if *index + 1 >= len {
        return;
    }
    *index += 1;
    let page = page.max(1);
    if *index >= *scroll + page {
        *scroll = *index + 1 - page;
    }
}

pub(crate) fn scroll_up(index: &mut usize, scroll: &mut usize) {
    *index = index.saturating_sub(1);
    *scroll = (*scroll).min(*index);
}

pub(crate) fn scroll_to_top(index: &mut usize, scroll: &mut usize) {
    *index = 0;
    *scroll = 0;
}

pub(crate) fn scroll_to_bottom(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if len == 0 {
        return;
    }
    *index = len - 1;
    *scroll = len.saturating_sub(page.max(1));
}
