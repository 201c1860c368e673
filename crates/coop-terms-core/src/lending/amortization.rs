use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};

use super::rate_policy::monthly_rate;
use crate::config::MAX_LOAN_TERM_MONTHS;
use crate::error::TermsError;
use crate::types::{to_cents, Money, Percent};
use crate::TermsResult;

/// Fixed-payment terms for a fully amortizing loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amortization {
    pub principal: Money,
    pub duration_months: u32,
    pub annual_rate_pct: Percent,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_payable: Money,
    /// Set when decimal arithmetic overflowed or a denominator vanished and
    /// the figures above were clamped to zero. Unreachable for validated
    /// inputs; callers should treat it as a bug, not a quote.
    pub degenerate: bool,
}

impl Amortization {
    /// Round the payment to cents and rebuild the totals from the rounded
    /// payment, so `total_payable == monthly_payment * duration_months`
    /// holds exactly on the figures a member sees.
    pub fn to_cents(&self) -> Amortization {
        if self.degenerate {
            return self.clone();
        }
        let monthly_payment = to_cents(self.monthly_payment);
        let total_payable = monthly_payment * Decimal::from(self.duration_months);
        Amortization {
            monthly_payment,
            total_payable,
            total_interest: total_payable - self.principal,
            ..self.clone()
        }
    }
}

/// Compute the fixed monthly payment, total payable and total interest.
///
/// A zero rate amortizes straight-line (`principal / duration_months`).
/// Otherwise the standard annuity formula is used:
///
/// ```text
/// payment = P * r(1+r)^n / ((1+r)^n - 1),   r = annual_rate_pct / 100 / 12
/// ```
pub fn compute_amortization(
    principal: Money,
    annual_rate_pct: Percent,
    duration_months: u32,
) -> TermsResult<Amortization> {
    check_terms(principal, annual_rate_pct, duration_months)?;

    let n = Decimal::from(duration_months);
    let rate = monthly_rate(annual_rate_pct);

    let payment = if rate.is_zero() {
        principal.checked_div(n)
    } else {
        annuity_payment(principal, rate, duration_months)
    };
    let totals = payment.and_then(|p| p.checked_mul(n).map(|total| (p, total)));

    match totals {
        Some((monthly_payment, total_payable)) => Ok(Amortization {
            principal,
            duration_months,
            annual_rate_pct,
            monthly_payment,
            total_interest: total_payable - principal,
            total_payable,
            degenerate: false,
        }),
        None => {
            tracing::warn!(
                %principal,
                %annual_rate_pct,
                duration_months,
                "amortization overflowed decimal range; clamping to zero"
            );
            Ok(Amortization {
                principal,
                duration_months,
                annual_rate_pct,
                monthly_payment: Decimal::ZERO,
                total_interest: Decimal::ZERO,
                total_payable: Decimal::ZERO,
                degenerate: true,
            })
        }
    }
}

/// `None` on overflow or a zero denominator. The payment factor is formed
/// before scaling by the principal, so large principals only overflow when
/// the payment itself does.
fn annuity_payment(principal: Money, rate: Decimal, periods: u32) -> Option<Money> {
    let growth = (Decimal::ONE + rate).checked_powu(u64::from(periods))?;
    let denominator = growth.checked_sub(Decimal::ONE)?;
    if denominator.is_zero() {
        return None;
    }
    let factor = rate.checked_mul(growth)?.checked_div(denominator)?;
    principal.checked_mul(factor)
}

fn check_terms(
    principal: Money,
    annual_rate_pct: Percent,
    duration_months: u32,
) -> TermsResult<()> {
    if principal <= Decimal::ZERO {
        return Err(TermsError::invalid("principal", "Principal must be positive"));
    }
    if duration_months == 0 {
        return Err(TermsError::invalid(
            "duration_months",
            "Duration must be at least 1 month",
        ));
    }
    if duration_months > MAX_LOAN_TERM_MONTHS {
        return Err(TermsError::invalid(
            "duration_months",
            format!("Duration cannot exceed {MAX_LOAN_TERM_MONTHS} months"),
        ));
    }
    if annual_rate_pct < Decimal::ZERO {
        return Err(TermsError::invalid(
            "annual_rate_pct",
            "Interest rate cannot be negative",
        ));
    }
    Ok(())
}
