use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::amortization::compute_amortization;
use super::rate_policy::monthly_rate;
use crate::error::TermsError;
use crate::types::*;
use crate::TermsResult;

/// A single month in the repayment schedule, at cent precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePeriod {
    pub period: u32,
    pub opening_balance: Money,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub closing_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub monthly_payment: Money,
    pub periods: Vec<SchedulePeriod>,
    pub total_interest: Money,
    pub total_paid: Money,
}

/// Build a month-by-month repayment schedule. Interest is charged on the
/// opening balance and rounded to cents each month; the final payment
/// absorbs rounding drift so the loan closes at exactly zero.
pub fn build_schedule(
    principal: Money,
    annual_rate_pct: Percent,
    duration_months: u32,
) -> TermsResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let terms = compute_amortization(principal, annual_rate_pct, duration_months)?.to_cents();
    if terms.degenerate {
        return Err(TermsError::invalid(
            "principal",
            "Loan terms exceed decimal precision; no schedule can be built",
        ));
    }

    let rate = monthly_rate(annual_rate_pct);
    let mut periods = Vec::with_capacity(duration_months as usize);
    let mut balance = principal;
    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;

    for period in 1..=duration_months {
        let opening = balance;
        let interest = to_cents(opening * rate);

        let scheduled_principal = terms.monthly_payment - interest;
        let principal_part = if period == duration_months {
            opening
        } else {
            scheduled_principal.min(opening).max(Decimal::ZERO)
        };
        let payment = principal_part + interest;

        balance = opening - principal_part;
        total_interest += interest;
        total_paid += payment;

        periods.push(SchedulePeriod {
            period,
            opening_balance: opening,
            payment,
            interest,
            principal: principal_part,
            closing_balance: balance,
        });
    }

    if let Some(last) = periods.last() {
        let drift = (last.payment - terms.monthly_payment).abs();
        if drift >= Decimal::ONE {
            warnings.push(format!(
                "Final payment differs from the scheduled payment by {drift}"
            ));
        }
    }

    let output = AmortizationSchedule {
        monthly_payment: terms.monthly_payment,
        periods,
        total_interest,
        total_paid,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "principal": principal.to_string(),
        "annual_rate_pct": annual_rate_pct.to_string(),
        "duration_months": duration_months,
    });

    Ok(with_metadata(
        "Fixed-Payment Amortization Schedule (monthly, cent rounding)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_schedule_closes_at_zero() {
        let out = build_schedule(dec!(5000), dec!(3.0), 24).unwrap();
        let s = &out.result;
        assert_eq!(s.periods.len(), 24);
        assert_eq!(s.periods.last().unwrap().closing_balance, Decimal::ZERO);
        let repaid: Decimal = s.periods.iter().map(|p| p.principal).sum();
        assert_eq!(repaid, dec!(5000));
        assert_eq!(s.total_paid, s.total_interest + dec!(5000));
    }

    #[test]
    fn test_first_period_interest() {
        let out = build_schedule(dec!(5000), dec!(3.0), 24).unwrap();
        let first = &out.result.periods[0];
        // 5000 * 0.0025
        assert_eq!(first.interest, dec!(12.50));
        assert_eq!(first.payment, dec!(214.91));
        assert_eq!(first.principal, dec!(202.41));
        assert_eq!(first.closing_balance, dec!(4797.59));
    }

    #[test]
    fn test_balances_chain() {
        let out = build_schedule(dec!(12000), dec!(3.5), 12).unwrap();
        for pair in out.result.periods.windows(2) {
            assert_eq!(pair[0].closing_balance, pair[1].opening_balance);
        }
    }

    #[test]
    fn test_zero_rate_schedule_has_no_interest() {
        let out = build_schedule(dec!(1000), Decimal::ZERO, 3).unwrap();
        let s = &out.result;
        assert_eq!(s.total_interest, Decimal::ZERO);
        assert_eq!(s.periods[0].payment, dec!(333.33));
        assert_eq!(s.periods[2].payment, dec!(333.34));
        assert_eq!(s.total_paid, dec!(1000));
    }

    #[test]
    fn test_invalid_schedule_inputs() {
        assert!(build_schedule(dec!(0), dec!(3), 12).is_err());
        assert!(build_schedule(dec!(1000), dec!(3), 0).is_err());
    }

    #[test]
    fn test_oversized_term_is_rejected_before_allocating() {
        let err = build_schedule(dec!(1000), Decimal::ZERO, 2_000_000_000).unwrap_err();
        assert!(matches!(err, TermsError::InvalidInput { ref field, .. } if field == "duration_months"));
        let out = build_schedule(dec!(1000), Decimal::ZERO, 600).unwrap();
        assert_eq!(out.result.periods.len(), 600);
    }
}
