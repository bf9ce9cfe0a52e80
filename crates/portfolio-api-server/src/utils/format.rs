//! pt-BR labels shared by the AI prompt, the reminder email, and the
//! public form. Founders and investors read everything in Portuguese.

use chrono::{Datelike, NaiveDate};

const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// "março de 2026" — month is 1-based. Out-of-range months fall back to
/// the raw number so a bad row never panics a prompt build.
pub fn month_label(month: u32, year: i32) -> String {
    match MONTHS.get(month.wrapping_sub(1) as usize) {
        Some(name) => format!("{} de {}", name, year),
        None => format!("{}/{}", month, year),
    }
}

/// "07 de agosto de 2026" — the meeting-note date format.
pub fn long_date_label(date: NaiveDate) -> String {
    format!(
        "{:02} de {} de {}",
        date.day(),
        MONTHS
            .get(date.month().wrapping_sub(1) as usize)
            .copied()
            .unwrap_or(""),
        date.year()
    )
}

/// pt-BR number formatting: thousands separated by '.', decimals by ','.
/// Whole values render without decimals, fractional ones with two.
pub fn format_brl(value: f64) -> String {
    let negative = value < 0.0;
    let abs = value.abs();
    let whole = abs.trunc() as u64;
    let cents = ((abs - abs.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if cents > 0 {
        out.push_str(&format!(",{:02}", cents));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_label_renders_portuguese_month() {
        assert_eq!(month_label(3, 2026), "março de 2026");
        assert_eq!(month_label(1, 2025), "janeiro de 2025");
    }

    #[test]
    fn month_label_tolerates_out_of_range() {
        assert_eq!(month_label(0, 2026), "0/2026");
        assert_eq!(month_label(13, 2026), "13/2026");
    }

    #[test]
    fn long_date_label_matches_meeting_format() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(long_date_label(date), "07 de agosto de 2026");
    }

    #[test]
    fn format_brl_groups_thousands() {
        assert_eq!(format_brl(50_000.0), "50.000");
        assert_eq!(format_brl(1_234_567.0), "1.234.567");
        assert_eq!(format_brl(999.0), "999");
    }

    #[test]
    fn format_brl_renders_cents_and_sign() {
        assert_eq!(format_brl(1500.5), "1.500,50");
        assert_eq!(format_brl(-320.25), "-320,25");
        assert_eq!(format_brl(0.0), "0");
    }
}
