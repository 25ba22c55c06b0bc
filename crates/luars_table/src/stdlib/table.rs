// Table library
// Implements: concat, insert, pack, remove, sort, unpack

use crate::lib_registry::{LibraryModule, arg_count, check_integer, check_table, get_arg, opt_integer};
use crate::lua_value::{LuaTable, LuaValue};
use crate::lua_vm::{LuaResult, LuaState};

use super::sort_table::table_sort;

pub fn create_table_lib() -> LibraryModule {
    crate::lib_module!("table", {
        "concat" => table_concat,
        "insert" => table_insert,
        "pack" => table_pack,
        "remove" => table_remove,
        "sort" => table_sort,
        "unpack" => table_unpack,
    })
}

/// table.concat(list [, sep [, i [, j]]]) - Concatenate table elements
fn table_concat(l: &mut LuaState) -> LuaResult<usize> {
    let table = check_table(l, 1, "concat")?;

    let sep = match get_arg(l, 2) {
        None | Some(LuaValue::Nil) => String::new(),
        Some(LuaValue::String(s)) => s.to_string(),
        Some(v) if v.is_number() => v.to_string(),
        Some(v) => {
            let msg = format!(
                "bad argument #2 to 'concat' (string expected, got {})",
                v.type_name()
            );
            return Err(l.error(msg));
        }
    };

    let len = table.borrow().len() as i64;
    let i = opt_integer(l, 3, "concat", 1)?;
    let j = opt_integer(l, 4, "concat", len)?;

    let mut result = String::new();
    let mut buffer = itoa::Buffer::new();
    let mut idx = i;
    while idx <= j {
        let value = table.borrow().raw_get_int(idx);
        match &value {
            LuaValue::String(s) => result.push_str(s),
            LuaValue::Integer(n) => result.push_str(buffer.format(*n)),
            LuaValue::Float(_) => result.push_str(&value.to_string()),
            _ => {
                let msg = format!(
                    "invalid value (at index {}) in table for 'concat'",
                    idx
                );
                return Err(l.error(msg));
            }
        }
        if idx < j {
            result.push_str(&sep);
        }
        // j may be i64::MAX
        match idx.checked_add(1) {
            Some(next) => idx = next,
            None => break,
        }
    }

    l.push_value(LuaValue::string(result))?;
    Ok(1)
}

/// table.insert(list, [pos,] value) - Insert element
fn table_insert(l: &mut LuaState) -> LuaResult<usize> {
    let table = check_table(l, 1, "insert")?;
    let e = table.borrow().len() as i64 + 1;

    match arg_count(l) {
        2 => {
            let value = get_arg(l, 2).unwrap_or_default();
            table.borrow_mut().append(value);
        }
        3 => {
            let pos = check_integer(l, 2, "insert")?;
            // check 1 <= pos <= e
            if (pos as u64).wrapping_sub(1) >= e as u64 {
                return Err(l.error(
                    "bad argument #2 to 'insert' (position out of bounds)".to_string(),
                ));
            }
            let value = get_arg(l, 3).unwrap_or_default();
            table.borrow_mut().insert(pos, value);
        }
        _ => {
            return Err(l.error("wrong number of arguments to 'insert'".to_string()));
        }
    }
    Ok(0)
}

/// table.remove(list [, pos]) - Remove element
fn table_remove(l: &mut LuaState) -> LuaResult<usize> {
    let table = check_table(l, 1, "remove")?;
    let size = table.borrow().len() as i64;
    let pos = opt_integer(l, 2, "remove", size)?;

    // size + 1 is allowed, as is 0 on an empty list
    if pos != size && (pos as u64).wrapping_sub(1) > size as u64 {
        return Err(l.error(
            "bad argument #2 to 'remove' (position out of bounds)".to_string(),
        ));
    }

    let removed = {
        let mut t = table.borrow_mut();
        if pos >= 1 && pos <= size {
            t.remove(pos)
        } else {
            let old = t.raw_get_int(pos);
            t.raw_set_int(pos, LuaValue::nil());
            old
        }
    };

    l.push_value(removed)?;
    Ok(1)
}

/// table.pack(...) - Pack arguments into a table with field `n`
fn table_pack(l: &mut LuaState) -> LuaResult<usize> {
    let args = l.get_args();
    let n = args.len();

    let mut table = LuaTable::new(n, 1);
    for (i, value) in args.into_iter().enumerate() {
        table.raw_set_int(i as i64 + 1, value);
    }
    table.raw_set_string("n", LuaValue::integer(n as i64));

    l.push_value(LuaValue::table(table))?;
    Ok(1)
}

/// table.unpack(list [, i [, j]]) - Unpack table elements
fn table_unpack(l: &mut LuaState) -> LuaResult<usize> {
    let table = check_table(l, 1, "unpack")?;
    let len = table.borrow().len() as i64;
    let i = opt_integer(l, 2, "unpack", 1)?;
    let j = opt_integer(l, 3, "unpack", len)?;

    if i > j {
        return Ok(0);
    }

    // number of elements minus one, without overflow
    let n = (j as u64).wrapping_sub(i as u64);
    let room = l.safe_option().max_stack_size.saturating_sub(l.get_top()) as u64;
    if n >= i32::MAX as u64 || n + 1 > room {
        return Err(l.error("too many results to unpack".to_string()));
    }

    let values: Vec<LuaValue> = {
        let t = table.borrow();
        (0..=n).map(|k| t.raw_get_int(i.wrapping_add(k as i64))).collect()
    };
    for value in values {
        l.push_value(value)?;
    }
    Ok(n as usize + 1)
}
