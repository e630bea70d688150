//! Arithmetic and comparison opcodes (`add`/`sub`/`mul`/`div`/`rem`/`neg`,
//! `ceq`/`cgt`/`clt`/`cge`/`cle`/`cne`).
//!
//! Binary arithmetic pops the right operand first, then the left (LIFO),
//! and pushes a result tagged with the *left* operand's type. The two
//! operand tags must match exactly — this crate does not coerce across
//! numeric widths, so `INT32 + DOUBLE` is a type error rather than a
//! silent widen. Integer overflow wraps at the operand's declared width;
//! it does not panic and does not promote to a wider type.
//!
//! Comparisons always push `BOOL`. `ceq`/`cne`, like the ordering
//! comparisons below, tolerate cross-width numeric operands (`ldc.i4 5;
//! ldc.i8 5; ceq` is `true`) by coercing any numeric-like pair (any of
//! `Int32`/`Int64`/`Float`/`Double`/`Bool`) through the same numeric
//! comparison `cgt`/`clt`/`cge`/`cle` use; a pair of strings compares by
//! value, and anything else falls back to payload equality. Ordering
//! comparisons accept numeric-like pairs or a pair of strings; any other
//! pair resolves to `false` rather than raising, since an ordering
//! comparison between incompatible types is not otherwise a named fatal
//! condition.

use crate::error::RuntimeError;
use crate::frame::ExecutionFrame;
use crate::value::{Value, ValueData, ValueType};

fn type_mismatch(op: &str, a: ValueType, b: ValueType) -> RuntimeError {
    RuntimeError::TypeError(format!(
        "`{}` requires matching operand types, got {:?} and {:?}",
        op, a, b
    ))
}

fn not_numeric(op: &str, ty: ValueType) -> RuntimeError {
    RuntimeError::TypeError(format!("`{}` requires a numeric operand, got {:?}", op, ty))
}

pub(super) fn handle_add(frame: &mut ExecutionFrame) -> Result<(), RuntimeError> {
    let b = frame.pop()?;
    let a = frame.pop()?;
    if a.type_ != b.type_ {
        return Err(type_mismatch("add", a.type_, b.type_));
    }
    let data = match (&a.data, &b.data) {
        (ValueData::Int32(x), ValueData::Int32(y)) => ValueData::Int32(x.wrapping_add(*y)),
        (ValueData::Int64(x), ValueData::Int64(y)) => ValueData::Int64(x.wrapping_add(*y)),
        (ValueData::Float(x), ValueData::Float(y)) => ValueData::Float(x + y),
        (ValueData::Double(x), ValueData::Double(y)) => ValueData::Double(x + y),
        _ => return Err(not_numeric("add", a.type_)),
    };
    frame.push(Value { data, type_: a.type_ });
    Ok(())
}

pub(super) fn handle_sub(frame: &mut ExecutionFrame) -> Result<(), RuntimeError> {
    let b = frame.pop()?;
    let a = frame.pop()?;
    if a.type_ != b.type_ {
        return Err(type_mismatch("sub", a.type_, b.type_));
    }
    let data = match (&a.data, &b.data) {
        (ValueData::Int32(x), ValueData::Int32(y)) => ValueData::Int32(x.wrapping_sub(*y)),
        (ValueData::Int64(x), ValueData::Int64(y)) => ValueData::Int64(x.wrapping_sub(*y)),
        (ValueData::Float(x), ValueData::Float(y)) => ValueData::Float(x - y),
        (ValueData::Double(x), ValueData::Double(y)) => ValueData::Double(x - y),
        _ => return Err(not_numeric("sub", a.type_)),
    };
    frame.push(Value { data, type_: a.type_ });
    Ok(())
}

pub(super) fn handle_mul(frame: &mut ExecutionFrame) -> Result<(), RuntimeError> {
    let b = frame.pop()?;
    let a = frame.pop()?;
    if a.type_ != b.type_ {
        return Err(type_mismatch("mul", a.type_, b.type_));
    }
    let data = match (&a.data, &b.data) {
        (ValueData::Int32(x), ValueData::Int32(y)) => ValueData::Int32(x.wrapping_mul(*y)),
        (ValueData::Int64(x), ValueData::Int64(y)) => ValueData::Int64(x.wrapping_mul(*y)),
        (ValueData::Float(x), ValueData::Float(y)) => ValueData::Float(x * y),
        (ValueData::Double(x), ValueData::Double(y)) => ValueData::Double(x * y),
        _ => return Err(not_numeric("mul", a.type_)),
    };
    frame.push(Value { data, type_: a.type_ });
    Ok(())
}

/// Integer division truncates toward zero (Rust's `/` already does this
/// for signed integers); floating division is plain IEEE-754 `/`, so
/// `x / 0.0` yields `inf`/`-inf`/`NaN` rather than erroring.
pub(super) fn handle_div(frame: &mut ExecutionFrame) -> Result<(), RuntimeError> {
    let b = frame.pop()?;
    let a = frame.pop()?;
    if a.type_ != b.type_ {
        return Err(type_mismatch("div", a.type_, b.type_));
    }
    let data = match (&a.data, &b.data) {
        (ValueData::Int32(x), ValueData::Int32(y)) => {
            if *y == 0 {
                return Err(RuntimeError::ZeroDivisionError);
            }
            ValueData::Int32(x.wrapping_div(*y))
        }
        (ValueData::Int64(x), ValueData::Int64(y)) => {
            if *y == 0 {
                return Err(RuntimeError::ZeroDivisionError);
            }
            ValueData::Int64(x.wrapping_div(*y))
        }
        (ValueData::Float(x), ValueData::Float(y)) => ValueData::Float(x / y),
        (ValueData::Double(x), ValueData::Double(y)) => ValueData::Double(x / y),
        _ => return Err(not_numeric("div", a.type_)),
    };
    frame.push(Value { data, type_: a.type_ });
    Ok(())
}

pub(super) fn handle_rem(frame: &mut ExecutionFrame) -> Result<(), RuntimeError> {
    let b = frame.pop()?;
    let a = frame.pop()?;
    if a.type_ != b.type_ {
        return Err(type_mismatch("rem", a.type_, b.type_));
    }
    let data = match (&a.data, &b.data) {
        (ValueData::Int32(x), ValueData::Int32(y)) => {
            if *y == 0 {
                return Err(RuntimeError::ZeroDivisionError);
            }
            ValueData::Int32(x.wrapping_rem(*y))
        }
        (ValueData::Int64(x), ValueData::Int64(y)) => {
            if *y == 0 {
                return Err(RuntimeError::ZeroDivisionError);
            }
            ValueData::Int64(x.wrapping_rem(*y))
        }
        (ValueData::Float(x), ValueData::Float(y)) => ValueData::Float(x % y),
        (ValueData::Double(x), ValueData::Double(y)) => ValueData::Double(x % y),
        _ => return Err(not_numeric("rem", a.type_)),
    };
    frame.push(Value { data, type_: a.type_ });
    Ok(())
}

pub(super) fn handle_neg(frame: &mut ExecutionFrame) -> Result<(), RuntimeError> {
    let v = frame.pop()?;
    let data = match v.data {
        ValueData::Int32(x) => ValueData::Int32(x.wrapping_neg()),
        ValueData::Int64(x) => ValueData::Int64(x.wrapping_neg()),
        ValueData::Float(x) => ValueData::Float(-x),
        ValueData::Double(x) => ValueData::Double(-x),
        _ => return Err(not_numeric("neg", v.type_)),
    };
    frame.push(Value { data, type_: v.type_ });
    Ok(())
}

/// Payload equality, tolerating cross-width numeric pairs the same way
/// `ordering` does (so `ceq`/`cne` agree with `cgt`/`clt`/`cge`/`cle` on
/// which pairs count as comparable). Tag equality is not required: a
/// `ldc.i4 5; ldc.i8 5; ceq` should push `true`, not `false`.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (&a.data, &b.data) {
        (ValueData::Str(x), ValueData::Str(y)) => x == y,
        _ if is_numeric_like(a) && is_numeric_like(b) => a.as_compare_num() == b.as_compare_num(),
        _ => a.data == b.data,
    }
}

fn is_numeric_like(v: &Value) -> bool {
    matches!(
        v.data,
        ValueData::Int32(_) | ValueData::Int64(_) | ValueData::Float(_) | ValueData::Double(_) | ValueData::Bool(_)
    )
}

fn ordering(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (&a.data, &b.data) {
        (ValueData::Str(x), ValueData::Str(y)) => Some(x.cmp(y)),
        _ if is_numeric_like(a) && is_numeric_like(b) => {
            a.as_compare_num().partial_cmp(&b.as_compare_num())
        }
        _ => None,
    }
}

pub(super) fn handle_ceq(frame: &mut ExecutionFrame) -> Result<(), RuntimeError> {
    let b = frame.pop()?;
    let a = frame.pop()?;
    frame.push(Value::bool(values_equal(&a, &b)));
    Ok(())
}

pub(super) fn handle_cne(frame: &mut ExecutionFrame) -> Result<(), RuntimeError> {
    let b = frame.pop()?;
    let a = frame.pop()?;
    frame.push(Value::bool(!values_equal(&a, &b)));
    Ok(())
}

pub(super) fn handle_cgt(frame: &mut ExecutionFrame) -> Result<(), RuntimeError> {
    let b = frame.pop()?;
    let a = frame.pop()?;
    let result = ordering(&a, &b).map(|o| o == std::cmp::Ordering::Greater).unwrap_or(false);
    frame.push(Value::bool(result));
    Ok(())
}

pub(super) fn handle_clt(frame: &mut ExecutionFrame) -> Result<(), RuntimeError> {
    let b = frame.pop()?;
    let a = frame.pop()?;
    let result = ordering(&a, &b).map(|o| o == std::cmp::Ordering::Less).unwrap_or(false);
    frame.push(Value::bool(result));
    Ok(())
}

pub(super) fn handle_cge(frame: &mut ExecutionFrame) -> Result<(), RuntimeError> {
    let b = frame.pop()?;
    let a = frame.pop()?;
    let result = ordering(&a, &b).map(|o| o != std::cmp::Ordering::Less).unwrap_or(false);
    frame.push(Value::bool(result));
    Ok(())
}

pub(super) fn handle_cle(frame: &mut ExecutionFrame) -> Result<(), RuntimeError> {
    let b = frame.pop()?;
    let a = frame.pop()?;
    let result = ordering(&a, &b).map(|o| o != std::cmp::Ordering::Greater).unwrap_or(false);
    frame.push(Value::bool(result));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_preserves_left_operand_tag() {
        let mut frame = ExecutionFrame::new("M");
        frame.push(Value::int32(2));
        frame.push(Value::int32(3));
        handle_add(&mut frame).unwrap();
        assert_eq!(frame.pop().unwrap(), Value::int32(5));
    }

    #[test]
    fn add_rejects_mismatched_tags() {
        let mut frame = ExecutionFrame::new("M");
        frame.push(Value::int32(2));
        frame.push(Value::double(3.0));
        assert!(handle_add(&mut frame).is_err());
    }

    #[test]
    fn int32_add_wraps_on_overflow() {
        let mut frame = ExecutionFrame::new("M");
        frame.push(Value::int32(i32::MAX));
        frame.push(Value::int32(1));
        handle_add(&mut frame).unwrap();
        assert_eq!(frame.pop().unwrap(), Value::int32(i32::MIN));
    }

    #[test]
    fn integer_div_truncates_toward_zero() {
        let mut frame = ExecutionFrame::new("M");
        frame.push(Value::int32(-7));
        frame.push(Value::int32(2));
        handle_div(&mut frame).unwrap();
        assert_eq!(frame.pop().unwrap(), Value::int32(-3));
    }

    #[test]
    fn integer_div_by_zero_is_fatal() {
        let mut frame = ExecutionFrame::new("M");
        frame.push(Value::int32(1));
        frame.push(Value::int32(0));
        assert_eq!(handle_div(&mut frame), Err(RuntimeError::ZeroDivisionError));
    }

    #[test]
    fn float_div_by_zero_is_infinity_not_an_error() {
        let mut frame = ExecutionFrame::new("M");
        frame.push(Value::double(1.0));
        frame.push(Value::double(0.0));
        handle_div(&mut frame).unwrap();
        assert_eq!(frame.pop().unwrap(), Value::double(f64::INFINITY));
    }

    #[test]
    fn ceq_tolerates_cross_width_numeric_operands() {
        let mut frame = ExecutionFrame::new("M");
        frame.push(Value::int32(5));
        frame.push(Value::int64(5));
        handle_ceq(&mut frame).unwrap();
        assert_eq!(frame.pop().unwrap(), Value::bool(true));
    }

    #[test]
    fn comparisons_always_push_bool() {
        let mut frame = ExecutionFrame::new("M");
        frame.push(Value::int32(10));
        frame.push(Value::int32(20));
        handle_cne(&mut frame).unwrap();
        let result = frame.pop().unwrap();
        assert_eq!(result, Value::bool(true));
    }

    #[test]
    fn neg_preserves_tag() {
        let mut frame = ExecutionFrame::new("M");
        frame.push(Value::int32(5));
        handle_neg(&mut frame).unwrap();
        assert_eq!(frame.pop().unwrap(), Value::int32(-5));
    }

    #[test]
    fn ordering_on_incomparable_pair_is_false_not_an_error() {
        let mut frame = ExecutionFrame::new("M");
        frame.push(Value::string("a"));
        frame.push(Value::int32(1));
        handle_cgt(&mut frame).unwrap();
        assert_eq!(frame.pop().unwrap(), Value::bool(false));
    }
}
