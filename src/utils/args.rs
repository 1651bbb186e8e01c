//! Utilities related to the parsing of arguments.

use std::ops::RangeInclusive;

use anyhow::bail;

/// Ensures a value falls within an inclusive range, returning the value if
/// so.
pub fn arg_in_range(arg: f64, range: RangeInclusive<f64>) -> anyhow::Result<f64> {
    match range.contains(&arg) {
        true => Ok(arg),
        false => bail!(
            "Value must be between {} and {}, but {} was provided.",
            range.start(),
            range.end(),
            arg
        ),
    }
}

/// Clap value parser for a fraction within [0.0, 1.0] (identity and
/// coverage thresholds).
pub fn fraction(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("{} isn't a float", raw))?;

    arg_in_range(value, 0.0..=1.0).map_err(|e| e.to_string())
}

/// Clap value parser for a positive, non-zero thread count.
pub fn positive_usize(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err(String::from("value must be greater than zero")),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("{} isn't a positive integer", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_accepts_bounds() {
        assert_eq!(fraction("0").unwrap(), 0.0);
        assert_eq!(fraction("1.0").unwrap(), 1.0);
        assert_eq!(fraction("0.5").unwrap(), 0.5);
    }

    #[test]
    fn test_fraction_rejects_out_of_range_and_garbage() {
        assert!(fraction("1.01").is_err());
        assert!(fraction("-0.1").is_err());
        assert_eq!(fraction("abc").unwrap_err(), "abc isn't a float");
    }

    #[test]
    fn test_positive_usize() {
        assert_eq!(positive_usize("4").unwrap(), 4);
        assert!(positive_usize("0").is_err());
        assert!(positive_usize("-2").is_err());
    }
}
