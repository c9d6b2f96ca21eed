use chrono::{Datelike, NaiveDate};

use crate::error::{Result, VerbaError};
use crate::fmt::next_month;

// ---------------------------------------------------------------------------
// Index and interest selectors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Selic,
    IpcaE,
    Inpc,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Selic => "SELIC",
            Self::IpcaE => "IPCA-E",
            Self::Inpc => "INPC",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_uppercase().as_str() {
            "SELIC" => Ok(Self::Selic),
            "IPCA-E" | "IPCA" => Ok(Self::IpcaE),
            "INPC" => Ok(Self::Inpc),
            _ => Err(VerbaError::UnknownIndex(raw.to_string())),
        }
    }

    /// Rate applied for months absent from the table.
    pub fn fallback_rate(&self) -> f64 {
        match self {
            Self::Selic => 0.5,
            Self::IpcaE | Self::Inpc => 0.3,
        }
    }

    /// Monthly rate (%) for a `YYYY-MM` key.
    pub fn monthly_rate(&self, key: &str) -> f64 {
        let table = match self {
            Self::Selic => SELIC_TABLE,
            // INPC shares the IPCA-E sample table; both families fall back
            // to the same rate when a month is absent.
            Self::IpcaE | Self::Inpc => IPCA_TABLE,
        };
        table
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, rate)| *rate)
            .unwrap_or_else(|| self.fallback_rate())
    }

    /// Number of months present in the underlying table.
    pub fn table_len(&self) -> usize {
        match self {
            Self::Selic => SELIC_TABLE.len(),
            Self::IpcaE | Self::Inpc => IPCA_TABLE.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterestKind {
    None,
    OnePctSimple,
    HalfPctSimple,
}

impl InterestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::OnePctSimple => "1%_SIMPLE",
            Self::HalfPctSimple => "0.5%_SIMPLE",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_uppercase().as_str() {
            "NONE" | "NENHUM" => Ok(Self::None),
            "1%_SIMPLE" | "1%" => Ok(Self::OnePctSimple),
            "0.5%_SIMPLE" | "0.5%" => Ok(Self::HalfPctSimple),
            _ => Err(VerbaError::UnknownInterest(raw.to_string())),
        }
    }

    fn monthly_rate(&self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::OnePctSimple => 1.0,
            Self::HalfPctSimple => 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Monthly index tables (%, accumulated monthly)
// ---------------------------------------------------------------------------

const SELIC_TABLE: &[(&str, f64)] = &[
    ("2025-02", 0.85),
    ("2025-01", 0.90),
    ("2024-12", 0.88),
    ("2024-11", 0.80),
    ("2024-10", 0.93),
    ("2024-09", 0.84),
    ("2024-08", 0.87),
    ("2024-07", 0.91),
    ("2024-06", 0.79),
    ("2024-05", 0.83),
    ("2024-04", 0.89),
    ("2024-03", 0.83),
    ("2024-02", 0.80),
    ("2024-01", 0.97),
    ("2023-12", 0.89),
    ("2023-11", 0.92),
    ("2023-10", 1.00),
    ("2023-09", 0.97),
    ("2023-08", 1.14),
    ("2023-07", 1.07),
    ("2023-06", 1.07),
    ("2023-05", 1.12),
    ("2023-04", 0.92),
    ("2023-03", 1.17),
    ("2023-02", 0.92),
    ("2023-01", 1.12),
    ("2022-12", 1.12),
    ("2022-11", 1.02),
    ("2022-10", 1.02),
    ("2022-09", 1.07),
    ("2022-08", 1.17),
    ("2022-07", 1.03),
    ("2022-06", 1.02),
    ("2022-05", 1.03),
    ("2022-04", 0.83),
    ("2022-03", 0.93),
    ("2022-02", 0.76),
    ("2022-01", 0.73),
    ("2021-12", 0.77),
    ("2021-11", 0.59),
    ("2021-10", 0.49),
    ("2021-09", 0.44),
    ("2021-08", 0.43),
    ("2021-07", 0.36),
    ("2021-06", 0.31),
    ("2021-05", 0.27),
    ("2021-04", 0.21),
    ("2021-03", 0.20),
    ("2021-02", 0.13),
    ("2021-01", 0.15),
    ("2020-12", 0.16),
    ("2020-11", 0.15),
    ("2020-10", 0.16),
    ("2020-09", 0.16),
    ("2020-08", 0.16),
    ("2020-07", 0.19),
    ("2020-06", 0.21),
    ("2020-05", 0.24),
    ("2020-04", 0.28),
    ("2020-03", 0.34),
    ("2020-02", 0.29),
    ("2020-01", 0.38),
];

const IPCA_TABLE: &[(&str, f64)] = &[
    ("2024-12", 0.50),
    ("2024-11", 0.30),
    ("2024-10", 0.50),
    ("2024-09", 0.40),
    ("2024-08", 0.20),
    ("2024-07", 0.40),
    ("2024-06", 0.21),
    ("2024-05", 0.46),
    ("2024-04", 0.38),
    ("2024-03", 0.16),
];

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CorrectionDetails {
    pub index: IndexKind,
    pub interest: InterestKind,
    pub days_elapsed: i64,
}

#[derive(Debug, Clone)]
pub struct CorrectionResult {
    pub original_value: f64,
    /// Principal plus index correction.
    pub corrected_value: f64,
    pub correction_amount: f64,
    pub interest_amount: f64,
    /// Corrected principal plus interest.
    pub total_value: f64,
    /// Accumulated index, in percent.
    pub correction_factor: f64,
    /// Accumulated interest, in percent.
    pub interest_factor: f64,
    pub details: CorrectionDetails,
}

impl CorrectionResult {
    pub fn zero(index: IndexKind, interest: InterestKind) -> Self {
        Self {
            original_value: 0.0,
            corrected_value: 0.0,
            correction_amount: 0.0,
            interest_amount: 0.0,
            total_value: 0.0,
            correction_factor: 0.0,
            interest_factor: 0.0,
            details: CorrectionDetails {
                index,
                interest,
                days_elapsed: 0,
            },
        }
    }
}

/// Apply monetary correction and simple interest to one principal.
///
/// Correction accrues monthly starting the month after the due date through
/// the reference month inclusive. Interest accrues per elapsed day on a
/// 30-day commercial month, over the corrected principal (interest follows
/// correction, not the other way around). Degenerate input never errors; it
/// yields an all-zero result.
pub fn calculate(
    principal: f64,
    due_date: Option<NaiveDate>,
    index: IndexKind,
    interest: InterestKind,
    reference: NaiveDate,
) -> CorrectionResult {
    let Some(due_date) = due_date else {
        return CorrectionResult::zero(index, interest);
    };
    if principal == 0.0 {
        return CorrectionResult::zero(index, interest);
    }

    // Index accumulation, month after due through reference month
    let mut accumulated = 0.0f64;
    let end = NaiveDate::from_ymd_opt(reference.year(), reference.month(), 1).unwrap();
    let mut current = next_month(
        NaiveDate::from_ymd_opt(due_date.year(), due_date.month(), 1).unwrap(),
    );
    while current <= end {
        let key = format!("{:04}-{:02}", current.year(), current.month());
        accumulated += index.monthly_rate(&key);
        current = next_month(current);
    }

    let correction_amount = principal * (accumulated / 100.0);
    let corrected_value = principal + correction_amount;

    // Simple interest on the corrected principal, only for elapsed time
    let mut interest_amount = 0.0;
    let mut interest_factor = 0.0;
    let mut days_elapsed = 0i64;
    if interest != InterestKind::None && reference > due_date {
        days_elapsed = (reference - due_date).num_days();
        let daily_rate = interest.monthly_rate() / 30.0;
        interest_factor = days_elapsed as f64 * daily_rate;
        interest_amount = corrected_value * (interest_factor / 100.0);
    }

    CorrectionResult {
        original_value: principal,
        corrected_value,
        correction_amount,
        interest_amount,
        total_value: corrected_value + interest_amount,
        correction_factor: accumulated,
        interest_factor,
        details: CorrectionDetails {
            index,
            interest,
            days_elapsed,
        },
    }
}

/// Statutory due date on a fixed day of the month following a competency.
pub fn due_next_month(period_first: NaiveDate, day: u32) -> NaiveDate {
    let first = next_month(period_first);
    NaiveDate::from_ymd_opt(first.year(), first.month(), day).unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_selic_accumulation_known_months() {
        // Feb/2021 (0.13) + Mar/2021 (0.20) = 0.33%
        let result = calculate(
            1000.0,
            Some(date(2021, 1, 10)),
            IndexKind::Selic,
            InterestKind::None,
            date(2021, 3, 15),
        );
        assert!((result.correction_factor - 0.33).abs() < 1e-9);
        assert!((result.correction_amount - 3.30).abs() < 1e-9);
        assert!((result.corrected_value - 1003.30).abs() < 1e-9);
        assert_eq!(result.interest_amount, 0.0);
    }

    #[test]
    fn test_interest_on_corrected_principal() {
        let result = calculate(
            1000.0,
            Some(date(2021, 1, 10)),
            IndexKind::Selic,
            InterestKind::OnePctSimple,
            date(2021, 3, 15),
        );
        // 64 elapsed days at 1%/30 per day, over 1003.30
        assert_eq!(result.details.days_elapsed, 64);
        let expected_factor = 64.0 / 30.0;
        assert!((result.interest_factor - expected_factor).abs() < 1e-9);
        let expected_interest = 1003.30 * expected_factor / 100.0;
        assert!((result.interest_amount - expected_interest).abs() < 1e-9);
    }

    #[test]
    fn test_invariants_hold() {
        let result = calculate(
            2500.0,
            Some(date(2022, 6, 10)),
            IndexKind::Selic,
            InterestKind::HalfPctSimple,
            date(2024, 1, 20),
        );
        assert!(
            (result.total_value - (result.corrected_value + result.interest_amount)).abs() < 1e-6
        );
        assert!(
            (result.corrected_value - (result.original_value + result.correction_amount)).abs()
                < 1e-6
        );
        assert!(
            (result.total_value
                - (result.original_value + result.correction_amount + result.interest_amount))
                .abs()
                < 1e-6
        );
    }

    #[test]
    fn test_fallback_rate_for_missing_months() {
        // 2019 predates the SELIC table entirely: 12 months at 0.5%
        let result = calculate(
            1000.0,
            Some(date(2018, 12, 31)),
            IndexKind::Selic,
            InterestKind::None,
            date(2019, 12, 1),
        );
        assert!((result.correction_factor - 6.0).abs() < 1e-9);

        // IPCA family falls back at 0.3%
        let result = calculate(
            1000.0,
            Some(date(2018, 12, 31)),
            IndexKind::IpcaE,
            InterestKind::None,
            date(2019, 12, 1),
        );
        assert!((result.correction_factor - 3.6).abs() < 1e-9);
    }

    #[test]
    fn test_inpc_shares_ipca_table() {
        let a = calculate(
            1000.0,
            Some(date(2024, 3, 10)),
            IndexKind::IpcaE,
            InterestKind::None,
            date(2024, 6, 1),
        );
        let b = calculate(
            1000.0,
            Some(date(2024, 3, 10)),
            IndexKind::Inpc,
            InterestKind::None,
            date(2024, 6, 1),
        );
        assert_eq!(a.correction_factor, b.correction_factor);
    }

    #[test]
    fn test_zero_principal_yields_zero_result() {
        let result = calculate(
            0.0,
            Some(date(2021, 1, 10)),
            IndexKind::Selic,
            InterestKind::OnePctSimple,
            date(2022, 1, 10),
        );
        assert_eq!(result.total_value, 0.0);
        assert_eq!(result.correction_amount, 0.0);
        assert_eq!(result.interest_amount, 0.0);
    }

    #[test]
    fn test_missing_due_date_yields_zero_result() {
        let result = calculate(
            1000.0,
            None,
            IndexKind::Selic,
            InterestKind::OnePctSimple,
            date(2022, 1, 10),
        );
        assert_eq!(result.total_value, 0.0);
    }

    #[test]
    fn test_reference_before_due_no_interest_no_correction() {
        let result = calculate(
            1000.0,
            Some(date(2021, 3, 10)),
            IndexKind::Selic,
            InterestKind::OnePctSimple,
            date(2021, 3, 5),
        );
        assert_eq!(result.interest_amount, 0.0);
        assert_eq!(result.correction_amount, 0.0);
        assert_eq!(result.corrected_value, 1000.0);
    }

    #[test]
    fn test_correction_and_interest_run_on_independent_clocks() {
        // Reference a few days past due: interest accrues for those days,
        // but no correction month has opened yet.
        let result = calculate(
            1000.0,
            Some(date(2021, 3, 10)),
            IndexKind::Selic,
            InterestKind::OnePctSimple,
            date(2021, 3, 20),
        );
        assert_eq!(result.correction_amount, 0.0);
        assert!(result.interest_amount > 0.0);
        assert_eq!(result.details.days_elapsed, 10);
    }

    #[test]
    fn test_monotonic_in_reference_date() {
        let due = date(2021, 1, 10);
        let mut last_correction = -1.0;
        let mut last_interest = -1.0;
        for reference in [
            date(2021, 2, 1),
            date(2021, 6, 15),
            date(2022, 3, 1),
            date(2023, 8, 20),
            date(2025, 1, 2),
        ] {
            let r = calculate(
                1000.0,
                Some(due),
                IndexKind::Selic,
                InterestKind::OnePctSimple,
                reference,
            );
            assert!(r.correction_amount >= last_correction);
            assert!(r.interest_amount >= last_interest);
            last_correction = r.correction_amount;
            last_interest = r.interest_amount;
        }
    }

    #[test]
    fn test_disabled_interest_is_unconditionally_zero() {
        let result = calculate(
            1000.0,
            Some(date(2020, 1, 10)),
            IndexKind::Selic,
            InterestKind::None,
            date(2024, 1, 10),
        );
        assert_eq!(result.interest_amount, 0.0);
        assert_eq!(result.interest_factor, 0.0);
        assert!(result.correction_amount > 0.0);
    }

    #[test]
    fn test_selectors_round_trip() {
        for index in [IndexKind::Selic, IndexKind::IpcaE, IndexKind::Inpc] {
            assert_eq!(IndexKind::parse(index.as_str()).unwrap(), index);
        }
        for interest in [
            InterestKind::None,
            InterestKind::OnePctSimple,
            InterestKind::HalfPctSimple,
        ] {
            assert_eq!(InterestKind::parse(interest.as_str()).unwrap(), interest);
        }
        assert!(IndexKind::parse("IGPM").is_err());
        assert!(InterestKind::parse("2%").is_err());
    }

    #[test]
    fn test_due_next_month() {
        assert_eq!(due_next_month(date(2021, 3, 1), 10), date(2021, 4, 10));
        assert_eq!(due_next_month(date(2021, 12, 1), 5), date(2022, 1, 5));
    }
}
