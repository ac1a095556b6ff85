//! Oracle NUMBER values as exact decimals.
//!
//! NUMBER columns are fetched through a decimal buffer and may carry up to 40
//! significant digits with exponents far outside `rust_decimal`'s 96-bit
//! range, so the value is kept as a sign, a digit string and a base-10
//! exponent. The textual form follows the usual decimal "to scientific
//! string" rules:
//!
//! - `123.45`, `0.00`, `-7` print as written;
//! - positive exponents and very small magnitudes switch to `E` notation,
//!   e.g. `1E+2`, `1.5E-8`.

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Error parsing a decimal string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid Oracle NUMBER: {0:?}")]
pub struct NumberParseError(pub String);

/// An exact decimal: `(-1)^negative * coefficient * 10^exponent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleNumber {
    negative: bool,
    /// Decimal digits without leading zeros; `"0"` for zero
    coefficient: String,
    exponent: i64,
}

impl OracleNumber {
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient == "0"
    }

    /// Strip trailing zeros from the coefficient, moving them into the
    /// exponent. Zero normalizes to `0` (keeping its sign).
    pub fn normalize(&self) -> OracleNumber {
        if self.is_zero() {
            return OracleNumber {
                negative: self.negative,
                coefficient: "0".to_string(),
                exponent: 0,
            };
        }
        let trimmed = self.coefficient.trim_end_matches('0');
        let stripped = (self.coefficient.len() - trimmed.len()) as i64;
        OracleNumber {
            negative: self.negative,
            coefficient: trimmed.to_string(),
            exponent: self.exponent + stripped,
        }
    }

    /// Whether the value is numerically equal to one (`1`, `1.0`, `1.000`).
    pub fn is_one(&self) -> bool {
        let normalized = self.normalize();
        !normalized.negative && normalized.coefficient == "1" && normalized.exponent == 0
    }

    /// Integer part, truncating toward zero. `None` when it does not fit.
    pub fn trunc_to_i128(&self) -> Option<i128> {
        if self.is_zero() {
            return Some(0);
        }
        let len = self.coefficient.len() as i64;
        let digits = if self.exponent >= 0 {
            // i128 holds at most 39 digits
            if len + self.exponent > 39 {
                return None;
            }
            let mut digits = self.coefficient.clone();
            digits.extend(std::iter::repeat('0').take(self.exponent as usize));
            digits
        } else {
            let keep = len + self.exponent;
            if keep <= 0 {
                return Some(0);
            }
            self.coefficient[..keep as usize].to_string()
        };
        let magnitude: i128 = digits.parse().ok()?;
        if self.negative {
            magnitude.checked_neg()
        } else {
            Some(magnitude)
        }
    }

    /// Nearest `f64`, or `None` when the magnitude overflows.
    pub fn to_f64(&self) -> Option<f64> {
        self.to_string().parse::<f64>().ok().filter(|f| f.is_finite())
    }

    /// Convert to a `rust_decimal::Decimal` when the value fits.
    pub fn to_decimal(&self) -> Option<Decimal> {
        let mut mantissa: i128 = self.coefficient.parse().ok()?;
        let mut exponent = self.exponent;
        while exponent > 0 {
            mantissa = mantissa.checked_mul(10)?;
            exponent -= 1;
        }
        if self.negative {
            mantissa = -mantissa;
        }
        let scale = u32::try_from(-exponent).ok()?;
        Decimal::try_from_i128_with_scale(mantissa, scale).ok()
    }
}

impl FromStr for OracleNumber {
    type Err = NumberParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || NumberParseError(s.to_string());
        let text = s.trim();

        let (negative, unsigned) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };

        let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
            Some(pos) => {
                let exp_text = &unsigned[pos + 1..];
                let exp: i64 = exp_text.parse().map_err(|_| err())?;
                (&unsigned[..pos], exp)
            }
            None => (unsigned, 0),
        };

        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((i, f)) => (i, f),
            None => (mantissa, ""),
        };
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if int_part.is_empty() && frac_part.is_empty()
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(err());
        }

        let mut coefficient = format!("{int_part}{frac_part}")
            .trim_start_matches('0')
            .to_string();
        if coefficient.is_empty() {
            coefficient.push('0');
        }

        // `exponent + coefficient.len()` must stay in range for display and
        // normalization
        let exponent = exponent
            .checked_sub(frac_part.len() as i64)
            .filter(|e| e.checked_add(coefficient.len() as i64).is_some())
            .ok_or_else(err)?;

        Ok(OracleNumber {
            negative,
            coefficient,
            exponent,
        })
    }
}

impl fmt::Display for OracleNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let coeff = self.coefficient.as_str();
        let len = coeff.len() as i64;
        let left_digits = self.exponent + len;

        // Position of the decimal point relative to the coefficient
        let dot = if self.exponent <= 0 && left_digits > -6 {
            left_digits
        } else {
            1
        };

        if self.negative {
            f.write_str("-")?;
        }
        if dot <= 0 {
            write!(f, "0.{}{coeff}", "0".repeat((-dot) as usize))?;
        } else if dot >= len {
            write!(f, "{coeff}{}", "0".repeat((dot - len) as usize))?;
        } else {
            let (int_part, frac_part) = coeff.split_at(dot as usize);
            write!(f, "{int_part}.{frac_part}")?;
        }
        if left_digits != dot {
            write!(f, "E{:+}", left_digits - dot)?;
        }
        Ok(())
    }
}

impl From<Decimal> for OracleNumber {
    fn from(d: Decimal) -> Self {
        OracleNumber {
            negative: d.is_sign_negative(),
            coefficient: d.mantissa().unsigned_abs().to_string(),
            exponent: -(d.scale() as i64),
        }
    }
}

impl From<i64> for OracleNumber {
    fn from(i: i64) -> Self {
        OracleNumber {
            negative: i < 0,
            coefficient: i.unsigned_abs().to_string(),
            exponent: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> OracleNumber {
        s.parse().unwrap()
    }

    #[test]
    fn test_display_keeps_written_form() {
        for s in ["0", "123.45", "-7", "0.00", "0.000001", "100", "-0.5"] {
            assert_eq!(num(s).to_string(), s);
        }
        assert_eq!(num("007.50").to_string(), "7.50");
        assert_eq!(num("+3").to_string(), "3");
        assert_eq!(num(".5").to_string(), "0.5");
    }

    #[test]
    fn test_display_switches_to_exponent_notation() {
        assert_eq!(num("1e3").to_string(), "1E+3");
        assert_eq!(num("0.0000001").to_string(), "1E-7");
        assert_eq!(num("1.5E-8").to_string(), "1.5E-8");
        assert_eq!(num("12.5e10").to_string(), "1.25E+11");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(num("100").normalize().to_string(), "1E+2");
        assert_eq!(num("1.500").normalize().to_string(), "1.5");
        assert_eq!(num("0.000").normalize().to_string(), "0");
        assert_eq!(num("-120.0").normalize().to_string(), "-1.2E+2");
    }

    #[test]
    fn test_invalid_input() {
        for s in ["", "-", ".", "abc", "1.2.3", "1e", "1e+x", "NaN", "1 2"] {
            assert!(s.parse::<OracleNumber>().is_err(), "{s:?} should not parse");
        }
    }

    #[test]
    fn test_trunc_to_i128() {
        assert_eq!(num("3.9").trunc_to_i128(), Some(3));
        assert_eq!(num("-3.9").trunc_to_i128(), Some(-3));
        assert_eq!(num("0.5").trunc_to_i128(), Some(0));
        assert_eq!(num("1E+3").trunc_to_i128(), Some(1000));
        assert_eq!(
            num("99999999999999999999999999999999999999").trunc_to_i128(),
            Some(99999999999999999999999999999999999999)
        );
        assert_eq!(num("1E+40").trunc_to_i128(), None);
        assert_eq!(num("0E+50").trunc_to_i128(), Some(0));
        assert_eq!(num("0E+100000000000").trunc_to_i128(), Some(0));
        assert_eq!(num("-0.000E+9000000000000000000").trunc_to_i128(), Some(0));
    }

    #[test]
    fn test_exponent_out_of_range() {
        let min = format!("1.5E{}", i64::MIN);
        let max = format!("15E{}", i64::MAX);
        assert!(min.parse::<OracleNumber>().is_err());
        assert!(max.parse::<OracleNumber>().is_err());

        let near_max = format!("1E{}", i64::MAX - 1);
        let n: OracleNumber = near_max.parse().unwrap();
        assert_eq!(n.trunc_to_i128(), None);
        assert_eq!(n.to_string(), format!("1E+{}", i64::MAX - 1));
    }

    #[test]
    fn test_is_one() {
        assert!(num("1").is_one());
        assert!(num("1.000").is_one());
        assert!(num("0.1E+1").is_one());
        assert!(!num("-1").is_one());
        assert!(!num("0").is_one());
        assert!(!num("10").is_one());
        assert!(!num("1.01").is_one());
    }

    #[test]
    fn test_rust_decimal_conversions() {
        let d = Decimal::from_str_exact("-123.450").unwrap();
        let n = OracleNumber::from(d);
        assert_eq!(n.to_string(), "-123.450");
        assert_eq!(n.to_decimal(), Some(d));
        assert_eq!(num("1E+2").to_decimal(), Some(Decimal::from(100)));
        assert_eq!(num("1E+40").to_decimal(), None);
        assert_eq!(OracleNumber::from(-42i64).to_string(), "-42");
    }
}
