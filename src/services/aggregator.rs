//! Aggregator service for finding the best price per coverage plan

use crate::types::{CoveragePlan, Insurer, PlanValues, PriceInfo};

/// Aggregator for comparing insurer prices
pub struct Aggregator;

impl Aggregator {
    /// Lowest price for a plan among quoted insurers.
    ///
    /// Ties keep the first insurer encountered.
    pub fn lowest_price(insurers: &[Insurer], plan: CoveragePlan) -> Option<PriceInfo> {
        let mut best: Option<(f64, &Insurer)> = None;

        for insurer in insurers.iter().filter(|i| i.is_available()) {
            let Some(price) = insurer.plan_price(plan) else {
                continue;
            };
            match best {
                Some((min, _)) if price >= min => {}
                _ => best = Some((price, insurer)),
            }
        }

        best.map(|(price, insurer)| PriceInfo {
            price: format_mxn(price),
            insurer: insurer.name.clone(),
            logo: insurer.logo.clone(),
        })
    }

    /// Lowest price for every plan
    pub fn lowest_prices(insurers: &[Insurer]) -> PlanValues<Option<PriceInfo>> {
        PlanValues::from_fn(|plan| Self::lowest_price(insurers, plan))
    }

    /// Mark the cheapest insurer for `plan`, clearing any previous highlight
    pub fn highlight_lowest(insurers: &mut [Insurer], plan: CoveragePlan) {
        let winner = Self::lowest_price(insurers, plan).map(|p| p.insurer);
        for insurer in insurers.iter_mut() {
            insurer.is_highlighted = winner.as_deref() == Some(insurer.name.as_str());
        }
    }
}

/// Format an amount as es-MX currency: "$8,320", "$1,234.5".
/// Up to three fraction digits, trailing zeros dropped.
pub fn format_mxn(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.3}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut result = format!("${}{}", sign, group_thousands(int_part));
    if !frac.is_empty() {
        result.push('.');
        result.push_str(frac);
    }
    result
}

/// Insert "," every three digits
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut result = String::with_capacity(len + len / 3);

    // Digits are ASCII, so byte indexing is safe
    for (i, ch) in digits.bytes().enumerate() {
        if i > 0 && (len - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(ch as char);
    }
    result
}
