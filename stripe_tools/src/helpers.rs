use mpg_common::Money;

/// The platform's cut of every payment, taken off the top by the payment function.
pub const PLATFORM_FEE_PERCENT: i64 = 1;

/// The platform fee withheld for a payment of `amount`: 1% of the amount in minor units, rounded half-up. This
/// mirrors the arithmetic the deployed function applies; it is not charged client-side.
pub fn platform_fee(amount: Money) -> Money {
    Money::from_cents((amount.value() * PLATFORM_FEE_PERCENT + 50) / 100)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fee_is_one_percent_rounded_half_up() {
        assert_eq!(platform_fee(Money::from_cents(1098)), Money::from_cents(11));
        assert_eq!(platform_fee(Money::from_cents(10_000)), Money::from_cents(100));
        assert_eq!(platform_fee(Money::from_cents(99)), Money::from_cents(1));
        assert_eq!(platform_fee(Money::from_cents(49)), Money::from_cents(0));
        assert_eq!(platform_fee(Money::from_cents(50)), Money::from_cents(1));
    }
}
