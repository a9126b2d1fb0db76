use bigdecimal::{rounding::RoundingMode, BigDecimal};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::error::{AppError, Result};

/// Seasonal pricing rule for a property. The commission the agency
/// keeps is expressed in basis points of the stay total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRule {
    pub id: i64,
    pub account_id: i64,
    pub property_id: i64,
    pub label: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub nightly_rate: BigDecimal,
    pub commission_bps: i64,
    pub min_nights: i64,
    pub created_at: DateTime<Utc>,
}

impl PricingRule {
    pub fn covers(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.starts_on <= check_in && check_out <= self.ends_on
    }

    /// Window width in days, used to prefer the most specific rule.
    pub fn window_days(&self) -> i64 {
        (self.ends_on - self.starts_on).num_days()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PricingRuleInput {
    pub property_id: i64,
    #[validate(length(min = 1, max = 120))]
    pub label: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub nightly_rate: BigDecimal,
    #[validate(range(min = 0, max = 10000))]
    pub commission_bps: i64,
    #[validate(range(min = 1, max = 365))]
    pub min_nights: i64,
}

/// Price breakdown for one stay under one pricing rule.
#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub rule_id: i64,
    pub rule_label: String,
    pub nights: i64,
    pub nightly_rate: BigDecimal,
    pub total: BigDecimal,
    pub commission: BigDecimal,
    pub owner_payout: BigDecimal,
}

impl Quote {
    /// Compute the stay total and commission split.
    ///
    /// Commission is rounded half-up to 2 decimal places; the owner
    /// payout is the exact difference, so payout + commission always
    /// equals the total.
    pub fn compute(rule: &PricingRule, check_in: NaiveDate, check_out: NaiveDate) -> Result<Self> {
        let nights = (check_out - check_in).num_days();
        if nights < 1 {
            return Err(AppError::ValidationError(
                "Check-out must be after check-in".to_string(),
            ));
        }
        if nights < rule.min_nights {
            return Err(AppError::ValidationError(format!(
                "Stay of {} nights is below the {}-night minimum for '{}'",
                nights, rule.min_nights, rule.label
            )));
        }

        let total = &rule.nightly_rate * BigDecimal::from(nights);
        let raw_commission =
            &total * BigDecimal::from(rule.commission_bps) / BigDecimal::from(10_000);
        let commission = raw_commission.with_scale_round(2, RoundingMode::HalfUp);
        let owner_payout = &total - &commission;

        Ok(Self {
            rule_id: rule.id,
            rule_label: rule.label.clone(),
            nights,
            nightly_rate: rule.nightly_rate.clone(),
            total,
            commission,
            owner_payout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn rule(rate: &str, bps: i64, min_nights: i64) -> PricingRule {
        PricingRule {
            id: 1,
            account_id: 1,
            property_id: 1,
            label: "High season".to_string(),
            starts_on: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            ends_on: NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
            nightly_rate: BigDecimal::from_str(rate).unwrap(),
            commission_bps: bps,
            min_nights,
            created_at: Utc::now(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_quote_splits_total_exactly() {
        let rule = rule("150.00", 1500, 1);
        let quote = Quote::compute(&rule, d(2026, 7, 1), d(2026, 7, 8)).unwrap();

        assert_eq!(quote.nights, 7);
        assert_eq!(quote.total, BigDecimal::from_str("1050.00").unwrap());
        assert_eq!(quote.commission, BigDecimal::from_str("157.50").unwrap());
        assert_eq!(quote.owner_payout, BigDecimal::from_str("892.50").unwrap());
        assert_eq!(&quote.owner_payout + &quote.commission, quote.total);
    }

    #[test]
    fn test_commission_rounds_half_up() {
        // 3 nights * 99.99 = 299.97; 12.5% = 37.49625 -> 37.50
        let rule = rule("99.99", 1250, 1);
        let quote = Quote::compute(&rule, d(2026, 7, 1), d(2026, 7, 4)).unwrap();

        assert_eq!(quote.commission, BigDecimal::from_str("37.50").unwrap());
        assert_eq!(&quote.owner_payout + &quote.commission, quote.total);
    }

    #[test]
    fn test_min_nights_enforced() {
        let rule = rule("150.00", 1500, 5);
        let err = Quote::compute(&rule, d(2026, 7, 1), d(2026, 7, 3)).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_inverted_dates_rejected() {
        let rule = rule("150.00", 1500, 1);
        assert!(Quote::compute(&rule, d(2026, 7, 8), d(2026, 7, 1)).is_err());
        assert!(Quote::compute(&rule, d(2026, 7, 1), d(2026, 7, 1)).is_err());
    }

    #[test]
    fn test_rule_coverage() {
        let rule = rule("150.00", 1500, 1);
        assert!(rule.covers(d(2026, 6, 1), d(2026, 6, 10)));
        assert!(!rule.covers(d(2026, 5, 28), d(2026, 6, 10)));
        assert!(!rule.covers(d(2026, 9, 25), d(2026, 10, 2)));
    }
}
