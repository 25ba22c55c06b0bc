// Basic library (_G global functions)
// Implements the raw table primitives: next, pairs, rawget, rawset, rawlen, rawequal

use crate::lib_registry::{LibraryModule, check_table, get_arg, require_arg};
use crate::lua_value::{LuaValue, LuaValueKind};
use crate::lua_vm::{LuaResult, LuaState};

pub fn create_basic_lib() -> LibraryModule {
    crate::lib_module!("_G", {
        "next" => lua_next,
        "pairs" => lua_pairs,
        "rawget" => lua_rawget,
        "rawset" => lua_rawset,
        "rawlen" => lua_rawlen,
        "rawequal" => lua_rawequal,
    })
}

/// next(table [, index]) - Next key-value pair, or a single nil at the end
///
/// The key passed in may have been removed since it was returned.
pub fn lua_next(l: &mut LuaState) -> LuaResult<usize> {
    let table = check_table(l, 1, "next")?;
    let index = get_arg(l, 2).unwrap_or_default();

    let result = table.borrow().next(&index);
    match result {
        Some((k, v)) => {
            l.push_value(k)?;
            l.push_value(v)?;
            Ok(2)
        }
        None => {
            l.push_value(LuaValue::nil())?;
            Ok(1)
        }
    }
}

/// pairs(t) - Returns next, t, nil
fn lua_pairs(l: &mut LuaState) -> LuaResult<usize> {
    let table = check_table(l, 1, "pairs")?;

    l.push_value(LuaValue::cfunction(lua_next))?;
    l.push_value(LuaValue::Table(table))?;
    l.push_value(LuaValue::nil())?;
    Ok(3)
}

/// rawget(table, index) - Get without metamethods
fn lua_rawget(l: &mut LuaState) -> LuaResult<usize> {
    let table = check_table(l, 1, "rawget")?;
    let key = require_arg(l, 2, "rawget")?;

    let value = table.borrow().raw_get(&key);
    l.push_value(value)?;
    Ok(1)
}

/// rawset(table, index, value) - Set without metamethods, returns table
fn lua_rawset(l: &mut LuaState) -> LuaResult<usize> {
    let table = check_table(l, 1, "rawset")?;
    let key = require_arg(l, 2, "rawset")?;
    let value = require_arg(l, 3, "rawset")?;

    table.borrow_mut().raw_set(&key, value)?;
    l.push_value(LuaValue::Table(table))?;
    Ok(1)
}

/// rawlen(v) - Length without metamethods
fn lua_rawlen(l: &mut LuaState) -> LuaResult<usize> {
    let value = require_arg(l, 1, "rawlen")?;

    let len = match value.kind() {
        LuaValueKind::Table => value.as_table().map_or(0, |t| t.borrow().len()),
        LuaValueKind::String => value.as_str().map_or(0, str::len),
        _ => {
            return Err(l.error(
                "bad argument #1 to 'rawlen' (table or string expected)".to_string(),
            ));
        }
    };

    l.push_value(LuaValue::integer(len as i64))?;
    Ok(1)
}

/// rawequal(v1, v2) - Primitive equality
fn lua_rawequal(l: &mut LuaState) -> LuaResult<usize> {
    let v1 = require_arg(l, 1, "rawequal")?;
    let v2 = require_arg(l, 2, "rawequal")?;

    l.push_value(LuaValue::boolean(v1 == v2))?;
    Ok(1)
}
