use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::types::{Money, Multiple, Rate};

/// Integer power of a Decimal via exponentiation by squaring.
///
/// Used instead of `powd` for whole-year compounding so that results stay
/// exact for the decimal inputs the calculators work with.
pub fn pow_int(base: Decimal, exp: u32) -> Decimal {
    if exp == 0 {
        return Decimal::ONE;
    }
    let mut result = Decimal::ONE;
    let mut b = base;
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            result *= b;
        }
        e >>= 1;
        if e > 0 {
            b *= b;
        }
    }
    result
}

/// Growth factor `(1 + rate)^periods`.
pub fn compound_factor(rate: Rate, periods: u32) -> Decimal {
    pow_int(Decimal::ONE + rate, periods)
}

/// Future value of `present` compounded annually at `rate` for `periods` years.
pub fn future_value(present: Money, rate: Rate, periods: u32) -> Money {
    present * compound_factor(rate, periods)
}

/// Compound growth earned on `principal`, i.e. `principal·((1+rate)^periods − 1)`.
pub fn compound_growth(principal: Money, rate: Rate, periods: u32) -> Money {
    principal * (compound_factor(rate, periods) - Decimal::ONE)
}

/// Annualised return implied by turning `invested` into `realised` over
/// `years`: `(realised / invested)^(1/years) − 1`.
///
/// A zero (or negative) realised amount is a total loss and reports −100%.
/// Returns `None` only when the inputs leave the ratio undefined.
pub fn annualized_return(realised: Money, invested: Money, years: u32) -> Option<Rate> {
    if realised <= Decimal::ZERO {
        return Some(dec!(-1));
    }
    if invested <= Decimal::ZERO || years == 0 {
        return None;
    }
    let multiple: Multiple = realised / invested;
    if years == 1 {
        return Some(multiple - Decimal::ONE);
    }
    let exponent = Decimal::ONE / Decimal::from(years);
    multiple
        .checked_powd(exponent)
        .map(|growth| growth - Decimal::ONE)
}
