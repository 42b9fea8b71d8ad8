//! Width-preserving integer representation.
//!
//! RSN integer literals may carry an explicit width suffix (`5u8`, `-3i16`,
//! `7usize`). [`Integer`] keeps track of that width so a parsed value can be
//! handed back to the caller exactly as written, while still comparing by
//! mathematical value.
//!
//! ## Examples
//!
//! ```rust
//! use serde_rsn::Integer;
//!
//! let small = Integer::from(5_u8);
//! let wide = Integer::from(5_i64);
//!
//! // Equality compares the numeric value, not the width.
//! assert_eq!(small, wide);
//! assert_eq!(small.as_u8(), Some(5));
//!
//! // Narrowing only succeeds when the value fits.
//! assert_eq!(Integer::from(300_u16).as_u8(), None);
//! assert_eq!(u8::try_from(&Integer::from(255_u32)), Ok(255));
//! ```

use num_bigint::BigInt;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// An integer of any native width, or an arbitrary-precision fallback for
/// unsuffixed literals that exceed 128 bits.
#[derive(Clone, Debug)]
pub enum Integer {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Usize(usize),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    Isize(isize),
    Big(BigInt),
}

/// Returned when an [`Integer`] does not fit in the requested type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("integer out of range for `{target}`")]
pub struct IntegerRangeError {
    pub target: &'static str,
}

/// The mathematical value of an integer, independent of its width.
#[derive(PartialEq, Eq, Hash)]
enum Magnitude<'a> {
    Negative(i128),
    NonNegative(u128),
    Big(&'a BigInt),
}

impl Integer {
    /// Returns the suffix that selects this variant's width, or `None` for
    /// [`Integer::Big`].
    ///
    /// ```rust
    /// use serde_rsn::Integer;
    ///
    /// assert_eq!(Integer::from(1_i16).suffix(), Some("i16"));
    /// ```
    #[must_use]
    pub const fn suffix(&self) -> Option<&'static str> {
        Some(match self {
            Integer::U8(_) => "u8",
            Integer::U16(_) => "u16",
            Integer::U32(_) => "u32",
            Integer::U64(_) => "u64",
            Integer::U128(_) => "u128",
            Integer::Usize(_) => "usize",
            Integer::I8(_) => "i8",
            Integer::I16(_) => "i16",
            Integer::I32(_) => "i32",
            Integer::I64(_) => "i64",
            Integer::I128(_) => "i128",
            Integer::Isize(_) => "isize",
            Integer::Big(_) => return None,
        })
    }

    /// Returns `true` for the variants an unsuffixed literal parses into.
    #[inline]
    #[must_use]
    pub const fn is_default_width(&self) -> bool {
        matches!(
            self,
            Integer::U64(_) | Integer::U128(_) | Integer::I64(_) | Integer::I128(_) | Integer::Big(_)
        )
    }

    /// Returns `true` if the value is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        matches!(self.magnitude(), Magnitude::Negative(_))
            || matches!(self, Integer::Big(big) if big.sign() == num_bigint::Sign::Minus)
    }

    fn magnitude(&self) -> Magnitude<'_> {
        match self {
            Integer::U8(v) => Magnitude::NonNegative(u128::from(*v)),
            Integer::U16(v) => Magnitude::NonNegative(u128::from(*v)),
            Integer::U32(v) => Magnitude::NonNegative(u128::from(*v)),
            Integer::U64(v) => Magnitude::NonNegative(u128::from(*v)),
            Integer::U128(v) => Magnitude::NonNegative(*v),
            Integer::Usize(v) => Magnitude::NonNegative(*v as u128),
            Integer::I8(v) => signed_magnitude(i128::from(*v)),
            Integer::I16(v) => signed_magnitude(i128::from(*v)),
            Integer::I32(v) => signed_magnitude(i128::from(*v)),
            Integer::I64(v) => signed_magnitude(i128::from(*v)),
            Integer::I128(v) => signed_magnitude(*v),
            Integer::Isize(v) => signed_magnitude(*v as i128),
            Integer::Big(big) => {
                if let Ok(v) = u128::try_from(big) {
                    Magnitude::NonNegative(v)
                } else if let Ok(v) = i128::try_from(big) {
                    Magnitude::Negative(v)
                } else {
                    Magnitude::Big(big)
                }
            }
        }
    }

    /// Converts to a [`BigInt`], which always succeeds.
    #[must_use]
    pub fn to_bigint(&self) -> BigInt {
        match self.magnitude() {
            Magnitude::Negative(v) => BigInt::from(v),
            Magnitude::NonNegative(v) => BigInt::from(v),
            Magnitude::Big(big) => big.clone(),
        }
    }

    /// Converts to an `f64`, rounding when the value has no exact representation.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        match self.magnitude() {
            Magnitude::Negative(v) => v as f64,
            Magnitude::NonNegative(v) => v as f64,
            Magnitude::Big(big) => big.to_string().parse().unwrap_or(f64::NAN),
        }
    }
}

fn signed_magnitude(value: i128) -> Magnitude<'static> {
    if value < 0 {
        Magnitude::Negative(value)
    } else {
        Magnitude::NonNegative(value as u128)
    }
}

impl PartialEq for Integer {
    fn eq(&self, other: &Self) -> bool {
        self.magnitude() == other.magnitude()
    }
}

impl Eq for Integer {}

impl Hash for Integer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.magnitude().hash(state);
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Integer::U8(v) => write!(f, "{v}"),
            Integer::U16(v) => write!(f, "{v}"),
            Integer::U32(v) => write!(f, "{v}"),
            Integer::U64(v) => write!(f, "{v}"),
            Integer::U128(v) => write!(f, "{v}"),
            Integer::Usize(v) => write!(f, "{v}"),
            Integer::I8(v) => write!(f, "{v}"),
            Integer::I16(v) => write!(f, "{v}"),
            Integer::I32(v) => write!(f, "{v}"),
            Integer::I64(v) => write!(f, "{v}"),
            Integer::I128(v) => write!(f, "{v}"),
            Integer::Isize(v) => write!(f, "{v}"),
            Integer::Big(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! impl_integer_conversions {
    ($($ty:ident => $variant:ident, $as_fn:ident;)+) => {
        $(
            impl From<$ty> for Integer {
                fn from(value: $ty) -> Self {
                    Integer::$variant(value)
                }
            }

            impl TryFrom<&Integer> for $ty {
                type Error = IntegerRangeError;

                fn try_from(value: &Integer) -> Result<Self, Self::Error> {
                    let out_of_range = IntegerRangeError { target: stringify!($ty) };
                    match value.magnitude() {
                        Magnitude::Negative(v) => $ty::try_from(v).map_err(|_| out_of_range),
                        Magnitude::NonNegative(v) => $ty::try_from(v).map_err(|_| out_of_range),
                        Magnitude::Big(_) => Err(out_of_range),
                    }
                }
            }

            impl TryFrom<Integer> for $ty {
                type Error = IntegerRangeError;

                fn try_from(value: Integer) -> Result<Self, Self::Error> {
                    $ty::try_from(&value)
                }
            }

            impl Integer {
                #[doc = concat!("Returns the value as `", stringify!($ty), "` if it fits.")]
                #[inline]
                #[must_use]
                pub fn $as_fn(&self) -> Option<$ty> {
                    $ty::try_from(self).ok()
                }
            }
        )+
    };
}

impl_integer_conversions! {
    u8 => U8, as_u8;
    u16 => U16, as_u16;
    u32 => U32, as_u32;
    u64 => U64, as_u64;
    u128 => U128, as_u128;
    usize => Usize, as_usize;
    i8 => I8, as_i8;
    i16 => I16, as_i16;
    i32 => I32, as_i32;
    i64 => I64, as_i64;
    i128 => I128, as_i128;
    isize => Isize, as_isize;
}

impl From<BigInt> for Integer {
    fn from(value: BigInt) -> Self {
        Integer::Big(value)
    }
}
