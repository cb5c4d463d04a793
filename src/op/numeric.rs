//! Numeric Operations

use crate::error::Error;

/// Convert a number to a negative
pub fn negative(value: f64) -> f64 {
    -value
}

pub fn add(lhs: f64, rhs: f64) -> Result<f64, Error> {
    Ok(lhs + rhs)
}

pub fn subtract(lhs: f64, rhs: f64) -> Result<f64, Error> {
    Ok(lhs - rhs)
}

pub fn multiply(lhs: f64, rhs: f64) -> Result<f64, Error> {
    Ok(lhs * rhs)
}

/// Divide, refusing a divisor of exactly zero
pub fn divide(lhs: f64, rhs: f64) -> Result<f64, Error> {
    if rhs == 0.0 {
        return Err(Error::DivideByZero { operator: '/' });
    }
    Ok(lhs / rhs)
}

/// Floating point remainder, keeping the sign of the dividend
pub fn modulo(lhs: f64, rhs: f64) -> Result<f64, Error> {
    if rhs == 0.0 {
        return Err(Error::DivideByZero { operator: '%' });
    }
    Ok(lhs % rhs)
}

/// Real-valued exponentiation. Invalid combinations yield NaN, not an error.
pub fn power(lhs: f64, rhs: f64) -> Result<f64, Error> {
    Ok(lhs.powf(rhs))
}
