use chrono::NaiveDate;
use regex::Regex;

/// Short Portuguese month names, title-cased, indexed by month - 1.
pub const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Format a float as a pt-BR amount with thousands separators: 1.234,56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let parts: Vec<&str> = cents.split('.').collect();
    let int_part = parts[0];
    let dec_part = parts[1];

    let mut with_dots = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_dots.push('.');
        }
        with_dots.push(c);
    }
    let with_dots: String = with_dots.chars().rev().collect();

    if negative {
        format!("-{with_dots},{dec_part}")
    } else {
        format!("{with_dots},{dec_part}")
    }
}

/// Parse a pt-BR currency string ("2.069,08") to a float. Absent or
/// malformed input yields 0.0, never an error.
pub fn parse_currency(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else { return 0.0 };
    let cleaned = raw.trim().replace('.', "").replace(',', ".");
    cleaned.parse().unwrap_or(0.0)
}

/// Extract the first embedded number from an info annotation
/// ("200.00", "200.00h", "40 HORAS"). Unmatched input yields 0.0.
pub fn parse_info(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else { return 0.0 };
    let re = Regex::new(r"(\d+(?:\.\d+)?)").unwrap();
    re.captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

/// Parse a competency label, `MM/YYYY` or `Mon/YYYY` (3-letter Portuguese
/// month, case-insensitive), to the first day of that month.
pub fn parse_mes_ano(mes_ano: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = mes_ano.trim().split('/').collect();
    if parts.len() != 2 {
        return None;
    }
    let year: i32 = parts[1].trim().parse().ok()?;

    let month: u32 = match parts[0].trim().parse::<u32>() {
        Ok(m) => m,
        Err(_) => {
            let prefix: String = parts[0].trim().chars().take(3).collect::<String>().to_lowercase();
            let idx = MONTHS_SHORT
                .iter()
                .position(|m| m.to_lowercase() == prefix)?;
            idx as u32 + 1
        }
    };

    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Render a first-of-month date back as a `Mon/YYYY` label.
pub fn competencia_label(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!("{}/{}", MONTHS_SHORT[date.month0() as usize], date.year())
}

/// Walk month-by-month between the earliest and latest parseable labels,
/// reporting every month with no matching record. Needs at least two valid
/// periods; fewer yields no gaps.
pub fn missing_competencias(labels: &[String]) -> Vec<String> {
    use chrono::Datelike;

    let mut dates: Vec<NaiveDate> = labels.iter().filter_map(|l| parse_mes_ano(l)).collect();
    dates.sort();
    if dates.len() < 2 {
        return Vec::new();
    }

    let last = *dates.last().unwrap();
    let mut missing = Vec::new();
    let mut current = next_month(dates[0]);

    while current < last {
        let found = dates
            .iter()
            .any(|d| d.month() == current.month() && d.year() == current.year());
        if !found {
            missing.push(competencia_label(current));
        }
        current = next_month(current);
    }

    missing
}

/// First day of the following month.
pub fn next_month(date: NaiveDate) -> NaiveDate {
    use chrono::Datelike;
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

/// Increment a competency label by one month, preserving its textual or
/// numeric form. Unparseable labels come back unchanged.
pub fn increment_mes_ano(mes_ano: &str) -> String {
    let parts: Vec<&str> = mes_ano.split('/').collect();
    if parts.len() != 2 {
        return mes_ano.to_string();
    }
    let Ok(year) = parts[1].trim().parse::<i32>() else {
        return mes_ano.to_string();
    };

    if let Ok(month) = parts[0].trim().parse::<u32>() {
        if (1..=12).contains(&month) {
            let (m, y) = if month == 12 { (1, year + 1) } else { (month + 1, year) };
            return format!("{m:02}/{y}");
        }
        return mes_ano.to_string();
    }

    let lower = parts[0].trim().to_lowercase();
    if let Some(idx) = MONTHS_SHORT.iter().position(|m| m.to_lowercase() == lower) {
        let (next_idx, y) = if idx == 11 { (0, year + 1) } else { (idx + 1, year) };
        return format!("{}/{}", MONTHS_SHORT[next_idx], y);
    }
    mes_ano.to_string()
}

/// `YYYY-MM-DD` to `DD/MM/YYYY` for report display; anything else passes
/// through untouched.
pub fn format_date_br(date: &str) -> String {
    let parts: Vec<&str> = date.split('-').collect();
    if parts.len() == 3 {
        format!("{}/{}/{}", parts[2], parts[1], parts[0])
    } else {
        date.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(2069.08), "2.069,08");
        assert_eq!(money(-500.00), "-500,00");
        assert_eq!(money(0.0), "0,00");
        assert_eq!(money(1000000.99), "1.000.000,99");
        assert_eq!(money(42.10), "42,10");
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency(Some("2.069,08")), 2069.08);
        assert_eq!(parse_currency(Some("620,72")), 620.72);
        assert_eq!(parse_currency(Some("1.000.000,99")), 1000000.99);
        assert_eq!(parse_currency(None), 0.0);
        assert_eq!(parse_currency(Some("")), 0.0);
        assert_eq!(parse_currency(Some("abc")), 0.0);
    }

    #[test]
    fn test_money_parse_round_trip() {
        for s in ["2.069,08", "0,00", "123,45", "12.345.678,90"] {
            assert_eq!(money(parse_currency(Some(s))), s);
        }
    }

    #[test]
    fn test_parse_info() {
        assert_eq!(parse_info(Some("200.00")), 200.0);
        assert_eq!(parse_info(Some("200.00h")), 200.0);
        assert_eq!(parse_info(Some("40 HORAS")), 40.0);
        assert_eq!(parse_info(Some("sem aulas")), 0.0);
        assert_eq!(parse_info(None), 0.0);
    }

    #[test]
    fn test_parse_mes_ano_numeric() {
        assert_eq!(
            parse_mes_ano("01/2021"),
            NaiveDate::from_ymd_opt(2021, 1, 1)
        );
        assert_eq!(
            parse_mes_ano("12/2023"),
            NaiveDate::from_ymd_opt(2023, 12, 1)
        );
        assert_eq!(parse_mes_ano("13/2023"), None);
        assert_eq!(parse_mes_ano("2023"), None);
    }

    #[test]
    fn test_parse_mes_ano_textual() {
        assert_eq!(
            parse_mes_ano("Jan/2021"),
            NaiveDate::from_ymd_opt(2021, 1, 1)
        );
        assert_eq!(
            parse_mes_ano("FEV/2022"),
            NaiveDate::from_ymd_opt(2022, 2, 1)
        );
        assert_eq!(
            parse_mes_ano("dez/2020"),
            NaiveDate::from_ymd_opt(2020, 12, 1)
        );
        assert_eq!(parse_mes_ano("xyz/2021"), None);
    }

    #[test]
    fn test_missing_competencias_reports_gap() {
        let labels = vec!["01/2021".to_string(), "03/2021".to_string()];
        assert_eq!(missing_competencias(&labels), vec!["Fev/2021"]);
    }

    #[test]
    fn test_missing_competencias_across_year_boundary() {
        let labels = vec!["11/2021".to_string(), "02/2022".to_string()];
        assert_eq!(missing_competencias(&labels), vec!["Dez/2021", "Jan/2022"]);
    }

    #[test]
    fn test_missing_competencias_needs_two_periods() {
        assert!(missing_competencias(&["01/2021".to_string()]).is_empty());
        assert!(missing_competencias(&[]).is_empty());
        // Unparseable labels don't count toward the minimum
        let labels = vec!["01/2021".to_string(), "???".to_string()];
        assert!(missing_competencias(&labels).is_empty());
    }

    #[test]
    fn test_missing_competencias_contiguous() {
        let labels = vec![
            "01/2021".to_string(),
            "02/2021".to_string(),
            "03/2021".to_string(),
        ];
        assert!(missing_competencias(&labels).is_empty());
    }

    #[test]
    fn test_increment_mes_ano() {
        assert_eq!(increment_mes_ano("01/2021"), "02/2021");
        assert_eq!(increment_mes_ano("12/2021"), "01/2022");
        assert_eq!(increment_mes_ano("Jan/2021"), "Fev/2021");
        assert_eq!(increment_mes_ano("Dez/2021"), "Jan/2022");
        assert_eq!(increment_mes_ano("garbage"), "garbage");
    }

    #[test]
    fn test_format_date_br() {
        assert_eq!(format_date_br("2023-06-15"), "15/06/2023");
        assert_eq!(format_date_br("junk"), "junk");
    }
}
