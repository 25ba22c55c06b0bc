pub mod test_stdlib;

use tracing_subscriber::EnvFilter;

use crate::*;

/// Route `tracing` output through the test harness; `RUST_LOG` selects what shows.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// State with every library loaded
pub(crate) fn new_state() -> LuaState {
    init_tracing();
    let mut l = LuaState::new(SafeOption::default());
    l.open_stdlib(Stdlib::All).unwrap();
    l
}

/// Call `lib.name(args...)`, or the global `name` when `lib` is `_G`
pub(crate) fn call_lib(
    l: &mut LuaState,
    lib: &str,
    name: &str,
    args: &[LuaValue],
) -> LuaResult<Vec<LuaValue>> {
    let func = if lib == "_G" {
        l.get_global(name)
    } else {
        let lib_table = l.get_global(lib);
        let lib_table = lib_table.as_table().unwrap();
        let func = lib_table.borrow().raw_get_string(name);
        func
    };
    l.call_function(func, args)
}

/// Table holding `values` at keys 1..n
pub(crate) fn int_list(values: &[i64]) -> LuaValue {
    let mut table = LuaTable::new(values.len(), 0);
    for &v in values {
        table.append(LuaValue::integer(v));
    }
    LuaValue::table(table)
}

/// Values at keys 1..#t
pub(crate) fn list_contents(t: &LuaValue) -> Vec<LuaValue> {
    let t = t.as_table().unwrap().borrow();
    (1..=t.len() as i64).map(|i| t.raw_get_int(i)).collect()
}

pub(crate) fn ints(values: &[i64]) -> Vec<LuaValue> {
    values.iter().map(|&v| LuaValue::integer(v)).collect()
}
