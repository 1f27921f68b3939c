use std::{
    cmp,
    fmt,
    fmt::Display,
    ops::Mul,
    str::FromStr,
};

use anyhow::{
    Context,
    Error,
};
use num::Integer;
use serde::{
    Deserialize,
    Serialize,
    Serializer,
    de::{
        Unexpected,
        Visitor,
    },
};

/// A non-negative fraction, usable in calculations.
///
/// Serializable as a fraction string (`"1/2"`), an integer (`2`), a percentage string (`"60%"`),
/// or a two-length array (`[2, 5]`).
#[derive(Debug, Clone, Copy)]
pub struct Fraction {
    num: u64,
    den: u64,
}

impl Fraction {
    /// Creates a new fraction.
    pub fn new(num: u64, den: u64) -> Self {
        Self { num, den }
    }

    /// Creates a new percentage as a fraction.
    pub fn percentage(n: u64) -> Self {
        Self::new(n, 100).simplify()
    }

    /// The numerator of the fraction.
    pub fn numerator(&self) -> u64 {
        self.num
    }

    /// The denominator of the fraction.
    pub fn denominator(&self) -> u64 {
        self.den
    }

    /// Is the fraction exactly zero?
    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Is the fraction whole?
    pub fn is_whole(&self) -> bool {
        self.den == 1
    }

    /// Simplifies the fraction.
    pub fn simplify(&self) -> Self {
        let gcd = self.num.gcd(&self.den);
        if gcd == 0 {
            return *self;
        }
        Self::new(self.num / gcd, self.den / gcd)
    }

    /// Returns the integer part of the fraction, truncating.
    pub fn integer(&self) -> u64 {
        self.num / self.den
    }

    /// Multiplies an integer by this fraction, truncating the result.
    pub fn apply(&self, value: u64) -> u64 {
        value * self.num / self.den
    }

    /// The reciprocal of the fraction.
    pub fn inverse(&self) -> Self {
        Self::new(self.den, self.num)
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl From<u64> for Fraction {
    fn from(value: u64) -> Self {
        Self::new(value, 1)
    }
}

impl FromStr for Fraction {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((n, d)) = s.split_once('/') {
            let n = n
                .trim()
                .parse()
                .with_context(|| format!("invalid numerator: {n}"))?;
            let d = d
                .trim()
                .parse()
                .with_context(|| format!("invalid denominator: {d}"))?;
            Ok(Self::new(n, d))
        } else if let Some(s) = s.strip_suffix('%') {
            Ok(Self::percentage(
                s.trim()
                    .parse()
                    .with_context(|| format!("invalid percentage: {s}"))?,
            ))
        } else {
            Ok(Self::from(
                s.trim()
                    .parse::<u64>()
                    .with_context(|| format!("invalid integer: {s}"))?,
            ))
        }
    }
}

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == cmp::Ordering::Equal
    }
}

impl Eq for Fraction {}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        (self.num as u128 * other.den as u128).cmp(&(other.num as u128 * self.den as u128))
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Mul<Fraction> for Fraction {
    type Output = Self;
    fn mul(self, rhs: Fraction) -> Self::Output {
        Self::new(self.num * rhs.num, self.den * rhs.den).simplify()
    }
}

impl Mul<u64> for Fraction {
    type Output = Self;
    fn mul(self, rhs: u64) -> Self::Output {
        Self::new(self.num * rhs, self.den).simplify()
    }
}

impl Serialize for Fraction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.is_whole() {
            serializer.serialize_u64(self.num)
        } else {
            serializer.collect_str(self)
        }
    }
}

struct FractionVisitor;

impl<'de> Visitor<'de> for FractionVisitor {
    type Value = Fraction;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(
            formatter,
            "an integer, a fraction string, a percentage string, or an array of 2 integers"
        )
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Fraction::from(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Fraction::from_str(v).map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let num = match seq.next_element()? {
            Some(v) => v,
            None => return Err(serde::de::Error::invalid_length(0, &self)),
        };
        let den = match seq.next_element()? {
            Some(v) => v,
            None => return Err(serde::de::Error::invalid_length(1, &self)),
        };
        if seq.next_element::<u64>()?.is_some() {
            return Err(serde::de::Error::invalid_length(3, &self));
        }
        Ok(Fraction::new(num, den))
    }
}

impl<'de> Deserialize<'de> for Fraction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(FractionVisitor)
    }
}

#[cfg(test)]
mod fraction_test {
    use crate::{
        Fraction,
        test_util::{
            test_deserialization,
            test_serialization,
        },
    };

    #[test]
    fn serializes_whole_numbers_as_integers() {
        test_serialization(Fraction::percentage(100), "1");
        test_serialization(Fraction::new(1, 2), "\"1/2\"");
        test_serialization(Fraction::percentage(25), "\"1/4\"");
    }

    #[test]
    fn deserializes_all_forms() {
        test_deserialization("25", Fraction::new(25, 1));
        test_deserialization("\"3/4\"", Fraction::new(3, 4));
        test_deserialization("\"30%\"", Fraction::new(3, 10));
        test_deserialization("[1, 16]", Fraction::new(1, 16));
    }

    #[test]
    fn compares_by_value() {
        assert_eq!(Fraction::new(2, 4), Fraction::new(1, 2));
        assert!(Fraction::new(1, 3) < Fraction::new(1, 2));
        assert!(Fraction::new(3, 2) > Fraction::from(1));
    }

    #[test]
    fn multiplication_simplifies() {
        let product = Fraction::new(1, 2) * Fraction::new(1, 2);
        assert_eq!(product.numerator(), 1);
        assert_eq!(product.denominator(), 4);
        assert_eq!((Fraction::new(3, 2) * 2).integer(), 3);
    }

    #[test]
    fn applies_with_truncation() {
        assert_eq!(Fraction::new(3, 2).apply(25), 37);
        assert_eq!(Fraction::percentage(85).apply(50), 42);
        assert_eq!(Fraction::new(0, 1).apply(100), 0);
    }
}
