//! Operations asm.js expressed with JavaScript semantics, which asm2wasm
//! imports instead of emitting the trapping wasm instructions.
//!
//! Integer division and remainder never trap: dividing by zero yields 0 and
//! `i32::MIN / -1` wraps, the way `(x / y) | 0` behaves in JavaScript.

use crate::unexpected_arguments;
use sandbox_linker_types::Value;
use sandbox_linker_vm::{Caller, Trap};

const TWO_POW_32: f64 = 4_294_967_296.0;

fn binary_i32(name: &str, args: &[Value]) -> Result<(i32, i32), Trap> {
    match *args {
        [Value::I32(x), Value::I32(y)] => Ok((x, y)),
        _ => Err(unexpected_arguments(name, args)),
    }
}

/// asm2wasm: f64-rem
pub fn f64_rem(_caller: &mut Caller<'_>, args: &[Value]) -> Result<Vec<Value>, Trap> {
    let &[Value::F64(x), Value::F64(y)] = args else {
        return Err(unexpected_arguments("f64-rem", args));
    };
    tracing::debug!("emscripten::f64-rem");
    Ok(vec![Value::F64(x % y)])
}

/// asm2wasm: f64-to-int
///
/// JavaScript's `ToInt32`: NaN and infinities become 0, everything else is
/// truncated and wrapped modulo 2^32.
pub fn f64_to_int(_caller: &mut Caller<'_>, args: &[Value]) -> Result<Vec<Value>, Trap> {
    let &[Value::F64(x)] = args else {
        return Err(unexpected_arguments("f64-to-int", args));
    };
    let result = if x.is_finite() {
        x.trunc().rem_euclid(TWO_POW_32) as u32 as i32
    } else {
        0
    };
    Ok(vec![Value::I32(result)])
}

/// asm2wasm: i32s-div
pub fn i32s_div(_caller: &mut Caller<'_>, args: &[Value]) -> Result<Vec<Value>, Trap> {
    let (x, y) = binary_i32("i32s-div", args)?;
    let result = if y == 0 { 0 } else { x.wrapping_div(y) };
    Ok(vec![Value::I32(result)])
}

/// asm2wasm: i32u-div
pub fn i32u_div(_caller: &mut Caller<'_>, args: &[Value]) -> Result<Vec<Value>, Trap> {
    let (x, y) = binary_i32("i32u-div", args)?;
    let result = (x as u32).checked_div(y as u32).unwrap_or(0);
    Ok(vec![Value::I32(result as i32)])
}

/// asm2wasm: i32s-rem
pub fn i32s_rem(_caller: &mut Caller<'_>, args: &[Value]) -> Result<Vec<Value>, Trap> {
    let (x, y) = binary_i32("i32s-rem", args)?;
    let result = if y == 0 { 0 } else { x.wrapping_rem(y) };
    Ok(vec![Value::I32(result)])
}

/// asm2wasm: i32u-rem
pub fn i32u_rem(_caller: &mut Caller<'_>, args: &[Value]) -> Result<Vec<Value>, Trap> {
    let (x, y) = binary_i32("i32u-rem", args)?;
    let result = (x as u32).checked_rem(y as u32).unwrap_or(0);
    Ok(vec![Value::I32(result as i32)])
}

/// asm2wasm: debugger
pub fn debugger(_caller: &mut Caller<'_>, _args: &[Value]) -> Result<Vec<Value>, Trap> {
    tracing::debug!("emscripten::debugger");
    Ok(vec![])
}

#[cfg(test)]
mod tests {
    use crate::{emscripten, test_utils::Harness};
    use pretty_assertions::assert_eq;
    use sandbox_linker_types::Value;

    fn call_i32(harness: &mut Harness, name: &str, args: &[Value]) -> i32 {
        let results = harness.call(name, args).unwrap();
        results[0].i32().unwrap()
    }

    #[test]
    fn integer_division_never_traps() {
        let mut harness = Harness::new(&emscripten::asm2wasm());
        let args = |x: i32, y: i32| [Value::I32(x), Value::I32(y)];

        assert_eq!(call_i32(&mut harness, "i32s-div", &args(7, -2)), -3);
        assert_eq!(call_i32(&mut harness, "i32s-div", &args(7, 0)), 0);
        assert_eq!(call_i32(&mut harness, "i32s-div", &args(i32::MIN, -1)), i32::MIN);
        assert_eq!(call_i32(&mut harness, "i32s-rem", &args(-7, 2)), -1);
        assert_eq!(call_i32(&mut harness, "i32s-rem", &args(i32::MIN, -1)), 0);
        assert_eq!(call_i32(&mut harness, "i32u-div", &args(-1, 2)), i32::MAX);
        assert_eq!(call_i32(&mut harness, "i32u-div", &args(-1, 0)), 0);
        assert_eq!(call_i32(&mut harness, "i32u-rem", &args(-1, 16)), 15);
        assert_eq!(call_i32(&mut harness, "i32u-rem", &args(5, 0)), 0);
    }

    #[test]
    fn float_helpers() {
        let mut harness = Harness::new(&emscripten::asm2wasm());
        assert_eq!(
            harness
                .call("f64-rem", &[Value::F64(7.5), Value::F64(2.0)])
                .unwrap(),
            vec![Value::F64(1.5)]
        );

        let to_int = |harness: &mut Harness, x: f64| call_i32(harness, "f64-to-int", &[Value::F64(x)]);
        assert_eq!(to_int(&mut harness, -3.7), -3);
        assert_eq!(to_int(&mut harness, f64::NAN), 0);
        assert_eq!(to_int(&mut harness, f64::INFINITY), 0);
        assert_eq!(to_int(&mut harness, 4_294_967_297.0), 1);
        assert_eq!(to_int(&mut harness, 2_147_483_648.0), i32::MIN);
    }
}
