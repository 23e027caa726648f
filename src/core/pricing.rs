//! Karat-adjusted gold pricing

use super::error::PricingError;

/// Karat value of pure gold.
pub const FULL_PURITY_KARAT: u8 = 24;

/// Per-gram and total price of an item in the target currency, rounded for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBreakdown {
    pub per_gram_target: f64,
    pub total: f64,
}

/// Parses a karat given as `18` or `18k`.
pub fn parse_karat(raw: &str) -> Result<u8, PricingError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_suffix('k')
        .or_else(|| trimmed.strip_suffix('K'))
        .unwrap_or(trimmed);
    let karat: u8 = digits
        .parse()
        .map_err(|_| PricingError::validation(format!("invalid karat: {raw}")))?;
    validate_karat(karat)?;
    Ok(karat)
}

/// Accepts a whole-number karat given as a JSON number, such as `18` or `18.0`.
pub fn karat_from_number(value: f64) -> Result<u8, PricingError> {
    if value.fract() != 0.0 || !(1.0..=f64::from(FULL_PURITY_KARAT)).contains(&value) {
        return Err(PricingError::validation(format!(
            "karat must be a whole number between 1 and {FULL_PURITY_KARAT}, got {value}"
        )));
    }
    Ok(value as u8)
}

pub fn validate_karat(karat: u8) -> Result<(), PricingError> {
    if karat == 0 || karat > FULL_PURITY_KARAT {
        return Err(PricingError::validation(format!(
            "karat must be between 1 and {FULL_PURITY_KARAT}, got {karat}"
        )));
    }
    Ok(())
}

/// Checks the fields a product price is computed from.
pub fn validate_item(karat: u8, weight_grams: f64, making_charges: f64) -> Result<(), PricingError> {
    validate_karat(karat)?;
    if !weight_grams.is_finite() || weight_grams <= 0.0 {
        return Err(PricingError::validation(format!(
            "weight must be a positive number of grams, got {weight_grams}"
        )));
    }
    if !making_charges.is_finite() || making_charges < 0.0 {
        return Err(PricingError::validation(format!(
            "making charges must not be negative, got {making_charges}"
        )));
    }
    Ok(())
}

pub fn karat_fraction(karat: u8) -> f64 {
    f64::from(karat) / f64::from(FULL_PURITY_KARAT)
}

/// Per-gram price of gold at the given purity, in the currency of `per_gram_price`.
pub fn purity_adjusted(per_gram_price: f64, karat: u8) -> f64 {
    per_gram_price * karat_fraction(karat)
}

/// Computes an item's price in the target currency.
///
/// `per_gram_source_price` is the price of one gram of pure gold in the
/// source currency and `exchange_rate` converts source to target. Only the
/// returned values are rounded.
pub fn compute_price(
    karat: u8,
    weight_grams: f64,
    making_charges: f64,
    per_gram_source_price: f64,
    exchange_rate: f64,
) -> Result<PriceBreakdown, PricingError> {
    validate_item(karat, weight_grams, making_charges)?;

    let per_gram_target = purity_adjusted(per_gram_source_price, karat) * exchange_rate;
    let total = per_gram_target * weight_grams + making_charges;

    Ok(PriceBreakdown {
        per_gram_target: round2(per_gram_target),
        total: round2(total),
    })
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
