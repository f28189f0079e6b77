//! Pure pricing rules: delivery surcharge window, loyalty spend tiers and
//! the grand-total formula. All currency amounts are integer cents; the
//! percentage arithmetic goes through `rust_decimal` so money never touches
//! floating point.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::PricingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub delivery_charge: i64,
    pub loyalty_discount: i32,
    pub grand_total: i64,
}

#[derive(Clone)]
pub struct PricingPolicy {
    config: PricingConfig,
}

impl PricingPolicy {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// Flat surcharge during the evening/early-morning window; the window
    /// wraps midnight, so either bound alone is enough.
    pub fn delivery_charge(&self, hour: u32) -> i64 {
        if hour >= self.config.evening_start_hour || hour <= self.config.early_morning_end_hour {
            self.config.delivery_charge
        } else {
            0
        }
    }

    /// Discount percent for the highest tier the subtotal has reached.
    /// Tiers are inclusive at the lower bound, the top tier is unbounded.
    pub fn loyalty_discount_percent(&self, subtotal: i64) -> i32 {
        self.config
            .loyalty_tiers
            .iter()
            .rev()
            .find(|tier| subtotal >= tier.min_subtotal)
            .map(|tier| tier.percent)
            .unwrap_or(0)
    }

    /// `subtotal + delivery_charge - (percent/100) * subtotal`, rounded to
    /// the cent.
    pub fn grand_total(&self, subtotal: i64, delivery_charge: i64, percent: i32) -> i64 {
        let discount =
            (Decimal::from(subtotal) * Decimal::from(percent) / Decimal::from(100)).round_dp(0);
        let total = Decimal::from(subtotal) + Decimal::from(delivery_charge) - discount;
        total.to_i64().unwrap_or(i64::MAX)
    }

    pub fn quote(&self, subtotal: i64, hour: u32) -> PriceQuote {
        let delivery_charge = self.delivery_charge(hour);
        let loyalty_discount = self.loyalty_discount_percent(subtotal);
        let grand_total = self.grand_total(subtotal, delivery_charge, loyalty_discount);
        PriceQuote {
            delivery_charge,
            loyalty_discount,
            grand_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PricingPolicy {
        PricingPolicy::new(PricingConfig::default())
    }

    #[test]
    fn test_delivery_charge_window_wraps_midnight() {
        let p = policy();
        assert_eq!(p.delivery_charge(19), 5_000);
        assert_eq!(p.delivery_charge(23), 5_000);
        assert_eq!(p.delivery_charge(0), 5_000);
        assert_eq!(p.delivery_charge(5), 5_000);
        assert_eq!(p.delivery_charge(6), 0);
        assert_eq!(p.delivery_charge(12), 0);
        assert_eq!(p.delivery_charge(18), 0);
    }

    #[test]
    fn test_loyalty_tiers_step_at_thresholds() {
        let p = policy();
        assert_eq!(p.loyalty_discount_percent(0), 0);
        assert_eq!(p.loyalty_discount_percent(99_999), 0);
        assert_eq!(p.loyalty_discount_percent(100_000), 10);
        assert_eq!(p.loyalty_discount_percent(149_999), 10);
        assert_eq!(p.loyalty_discount_percent(150_000), 12);
        assert_eq!(p.loyalty_discount_percent(199_999), 12);
        assert_eq!(p.loyalty_discount_percent(200_000), 13);
        assert_eq!(p.loyalty_discount_percent(299_999), 13);
        assert_eq!(p.loyalty_discount_percent(300_000), 15);
        assert_eq!(p.loyalty_discount_percent(10_000_000), 15);
    }

    #[test]
    fn test_loyalty_tiers_are_non_decreasing() {
        let p = policy();
        let mut last = 0;
        for subtotal in (0..400_000).step_by(1_000) {
            let percent = p.loyalty_discount_percent(subtotal);
            assert!(percent >= last, "discount dropped at subtotal {subtotal}");
            last = percent;
        }
    }

    #[test]
    fn test_grand_total_formula() {
        let p = policy();
        // 250.00 + 50.00 - 10% of 250.00 = 275.00
        assert_eq!(p.grand_total(25_000, 5_000, 10), 27_500);
        // no charge, no discount
        assert_eq!(p.grand_total(25_000, 0, 0), 25_000);
        // 333.33 at 13%: discount rounds to 43.33
        assert_eq!(p.grand_total(33_333, 0, 13), 29_000);
        // 1500.00 + 50.00 - 12% of 1500.00 = 1370.00
        assert_eq!(p.grand_total(150_000, 5_000, 12), 137_000);
    }

    #[test]
    fn test_quote_combines_all_three() {
        let p = policy();
        let q = p.quote(150_000, 20);
        assert_eq!(q.delivery_charge, 5_000);
        assert_eq!(q.loyalty_discount, 12);
        assert_eq!(q.grand_total, 137_000);

        let q = p.quote(50_000, 12);
        assert_eq!(q.delivery_charge, 0);
        assert_eq!(q.loyalty_discount, 0);
        assert_eq!(q.grand_total, 50_000);
    }
}
