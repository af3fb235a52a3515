//! Total coercions from cell text to typed values.
//!
//! None of these functions fail. Every input that cannot be represented maps
//! to `None`:
//!
//! | input                         | `parse_value` | `parse_integer` |
//! |-------------------------------|---------------|-----------------|
//! | missing cell / blank text     | `None`        | `None`          |
//! | `"12"`, `" 12 "`              | `Some(12.0)`  | `Some(12)`      |
//! | `"12.5"`                      | `Some(12.5)`  | `None`          |
//! | `"2016.0"`                    | `Some(2016.0)`| `Some(2016)`    |
//! | `"NaN"`, `"inf"`              | `None`        | `None`          |
//! | `"N/D"`, `"12a"`              | `None`        | `None`          |

/// Measured value of a day cell
pub fn parse_value(cell: Option<&str>) -> Option<f64> {
    let text = cell?.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Integer field such as a year or month
pub fn parse_integer(cell: Option<&str>) -> Option<i64> {
    let text = cell?.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(number) = text.parse::<i64>() {
        return Some(number);
    }
    let value = text.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// Year field, `None` outside the `i32` range
pub fn parse_year(cell: Option<&str>) -> Option<i32> {
    parse_integer(cell).and_then(|year| i32::try_from(year).ok())
}

/// Month field; range checking is left to date synthesis
pub fn parse_month(cell: Option<&str>) -> Option<u32> {
    parse_integer(cell).and_then(|month| u32::try_from(month).ok())
}
