use crate::unexpected_arguments;
use sandbox_linker_types::Value;
use sandbox_linker_vm::{Caller, Trap};

macro_rules! unary_f64 {
    ($($(#[$attr:meta])* $name:ident => $op:ident,)*) => {
        $(
            $(#[$attr])*
            pub fn $name(_caller: &mut Caller<'_>, args: &[Value]) -> Result<Vec<Value>, Trap> {
                let &[Value::F64(x)] = args else {
                    return Err(unexpected_arguments(stringify!($name), args));
                };
                Ok(vec![Value::F64(x.$op())])
            }
        )*
    };
}

unary_f64! {
    /// global.Math: exp
    exp => exp,
    /// global.Math: log
    log => ln,
    /// global.Math: sqrt
    sqrt => sqrt,
    /// global.Math: floor
    floor => floor,
    /// global.Math: ceil
    ceil => ceil,
    /// global.Math: abs
    abs => abs,
    /// emscripten: _llvm_log10_f64
    llvm_log10_f64 => log10,
    /// emscripten: _llvm_log2_f64
    llvm_log2_f64 => log2,
}

/// global.Math: pow
pub fn pow(_caller: &mut Caller<'_>, args: &[Value]) -> Result<Vec<Value>, Trap> {
    let &[Value::F64(x), Value::F64(y)] = args else {
        return Err(unexpected_arguments("pow", args));
    };
    Ok(vec![Value::F64(x.powf(y))])
}
