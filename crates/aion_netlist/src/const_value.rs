//! Compile-time constants stored in parameter slots.

use aion_common::Number;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fully evaluated parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstValue {
    /// An integral four-state value.
    Logic(Number),
    /// A real value.
    Real(f64),
}

impl ConstValue {
    /// Returns the integral value, if this is not a real.
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            ConstValue::Logic(n) => Some(n),
            ConstValue::Real(_) => None,
        }
    }

    /// Converts to an integral value, rounding reals to the nearest integer.
    pub fn to_number(&self) -> Number {
        match self {
            ConstValue::Logic(n) => n.clone(),
            ConstValue::Real(v) => Number::from_f64(*v),
        }
    }

    /// Converts to `f64`; `None` for values with undefined bits.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConstValue::Logic(n) => n.as_f64(),
            ConstValue::Real(v) => Some(*v),
        }
    }

    /// Returns `true` for real values.
    pub fn is_real(&self) -> bool {
        matches!(self, ConstValue::Real(_))
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Logic(n) => write!(f, "{n}"),
            ConstValue::Real(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        let real = ConstValue::Real(2.5);
        assert!(real.is_real());
        assert_eq!(real.to_number().as_i64(), Some(3));
        assert!(real.as_number().is_none());
        let logic = ConstValue::Logic(Number::from_u64(5, 4));
        assert_eq!(logic.as_f64(), Some(5.0));
        assert_eq!(logic.to_string(), "4'd5");
    }

    #[test]
    fn serde_roundtrip() {
        let vals = vec![
            ConstValue::Real(9.81),
            ConstValue::Logic(Number::from_binary_str("10xz").unwrap()),
        ];
        for val in vals {
            let json = serde_json::to_string(&val).unwrap();
            let restored: ConstValue = serde_json::from_str(&json).unwrap();
            assert_eq!(val, restored);
        }
    }
}
