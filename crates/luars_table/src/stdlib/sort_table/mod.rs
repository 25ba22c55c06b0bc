use crate::lib_registry::check_table;
use crate::lua_vm::lua_limits::{MAX_SORT_LEN, SORT_RANDOM_LIMIT};
use crate::{LuaError, LuaResult, LuaState, LuaValue};

/// table.sort(list [, comp]) - Sort table in place
///
/// Sorts a detached copy of `list[1..#list]` and writes it back afterwards, so
/// a comparator that touches `list` cannot corrupt the sort itself.
pub fn table_sort(l: &mut LuaState) -> LuaResult<usize> {
    let table = check_table(l, 1, "sort")?;
    let comp = l.get_arg(2).filter(|v| !v.is_nil());
    if let Some(c) = &comp {
        if !c.is_function() {
            let msg = format!(
                "bad argument #2 to 'sort' (function expected, got {})",
                c.type_name()
            );
            return Err(l.error(msg));
        }
    }

    let len = table.borrow().len();
    if len <= 1 {
        return Ok(0);
    }
    if len >= MAX_SORT_LEN {
        return Err(l.error("bad argument #1 to 'sort' (array too big)".to_string()));
    }

    let mut values: Vec<LuaValue> = {
        let t = table.borrow();
        (1..=len as i64).map(|i| t.raw_get_int(i)).collect()
    };

    sort_values(l, &mut values, comp.as_ref())?;

    let mut t = table.borrow_mut();
    for (i, v) in values.into_iter().enumerate() {
        t.raw_set_int(i as i64 + 1, v);
    }
    Ok(0)
}

/// Sort `values` in place.
///
/// Without `comp` (or with a nil one) the default order applies: numbers
/// numerically, strings bytewise, anything else is an error. With `comp`, each
/// comparison calls `comp(a, b)` through `l` and takes the truthiness of its
/// first result as "a before b". Any error aborts the sort and is returned as-is.
pub fn sort_values(
    l: &mut LuaState,
    values: &mut [LuaValue],
    comp: Option<&LuaValue>,
) -> LuaResult<()> {
    let comp = comp.filter(|c| !c.is_nil());
    if values.len() > 1 {
        let up = values.len() - 1;
        auxsort(l, values, 0, up, comp)?;
    }
    Ok(())
}

/// Default `<` for sorting: numbers and strings only
pub fn lua_less_than(l: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<bool> {
    match (a, b) {
        (LuaValue::Integer(x), LuaValue::Integer(y)) => Ok(x < y),
        (LuaValue::Float(x), LuaValue::Float(y)) => Ok(x < y),
        (LuaValue::Integer(x), LuaValue::Float(y)) => Ok(lt_int_float(*x, *y)),
        (LuaValue::Float(x), LuaValue::Integer(y)) => Ok(lt_float_int(*x, *y)),
        (LuaValue::String(x), LuaValue::String(y)) => Ok(x.as_bytes() < y.as_bytes()),
        _ => Err(compare_error(l, a, b)),
    }
}

// 2^63 as a float; every finite float below it and >= -2^63 truncates into i64
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

/// i < f without rounding i to a float
fn lt_int_float(i: i64, f: f64) -> bool {
    if f.is_nan() {
        false
    } else if f >= TWO_POW_63 {
        true
    } else if f > -TWO_POW_63 {
        // for integer i: i < f  <=>  i < ceil(f)
        i < f.ceil() as i64
    } else {
        false
    }
}

/// f < i without rounding i to a float
fn lt_float_int(f: f64, i: i64) -> bool {
    if f.is_nan() {
        false
    } else if f >= TWO_POW_63 {
        false
    } else if f >= -TWO_POW_63 {
        // for integer i: f < i  <=>  floor(f) < i
        (f.floor() as i64) < i
    } else {
        true
    }
}

fn compare_error(l: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaError {
    let (t1, t2) = (a.type_name(), b.type_name());
    if t1 == t2 {
        l.error(format!("attempt to compare two {} values", t1))
    } else {
        l.error(format!("attempt to compare {} with {}", t1, t2))
    }
}

fn sort_comp(
    l: &mut LuaState,
    comp: Option<&LuaValue>,
    a: &LuaValue,
    b: &LuaValue,
) -> LuaResult<bool> {
    let Some(comp) = comp else {
        return lua_less_than(l, a, b);
    };

    let func_idx = l.get_top();
    let pushed = l
        .push_value(comp.clone())
        .and_then(|_| l.push_value(a.clone()))
        .and_then(|_| l.push_value(b.clone()));
    if let Err(e) = pushed {
        l.set_top(func_idx);
        return Err(e);
    }

    let nresults = l.call(func_idx)?;
    let result = if nresults > 0 {
        l.stack_get(func_idx).unwrap_or_default()
    } else {
        LuaValue::nil()
    };
    l.set_top(func_idx);
    Ok(result.is_truthy())
}

fn invalid_order(l: &mut LuaState) -> LuaError {
    tracing::debug!("sort aborted: comparator is not a consistent order");
    l.error("invalid order function for sorting".to_string())
}

/// Pivot somewhere in the middle half of `lo..=up`
fn choose_pivot(lo: usize, up: usize) -> usize {
    let r4 = (up - lo) / 4;
    rand::random::<usize>() % (r4 * 2) + lo + r4
}

/// Quicksort over `a[lo..=up]`: median of three, recurse into the smaller
/// half, loop on the larger one.
fn auxsort(
    l: &mut LuaState,
    a: &mut [LuaValue],
    mut lo: usize,
    mut up: usize,
    comp: Option<&LuaValue>,
) -> LuaResult<()> {
    while lo < up {
        if sort_comp(l, comp, &a[up], &a[lo])? {
            a.swap(lo, up);
        }
        if up - lo == 1 {
            break;
        }

        let p = if up - lo < SORT_RANDOM_LIMIT {
            lo + (up - lo) / 2
        } else {
            choose_pivot(lo, up)
        };
        if sort_comp(l, comp, &a[p], &a[lo])? {
            a.swap(p, lo);
        } else if sort_comp(l, comp, &a[up], &a[p])? {
            a.swap(p, up);
        }
        if up - lo == 2 {
            break;
        }

        let pivot = a[p].clone();
        // a[lo] <= pivot == a[up - 1] <= a[up]
        a.swap(p, up - 1);
        let p = partition(l, a, lo, up, &pivot, comp)?;

        if p - lo < up - p {
            auxsort(l, a, lo, p - 1, comp)?;
            lo = p + 1;
        } else {
            auxsort(l, a, p + 1, up, comp)?;
            up = p - 1;
        }
    }
    Ok(())
}

/// Partition `a[lo..=up]` around `pivot` (stored at `a[up - 1]`), returning the
/// pivot's final index. Runs off either end only if `comp` is inconsistent,
/// which is reported instead.
fn partition(
    l: &mut LuaState,
    a: &mut [LuaValue],
    lo: usize,
    up: usize,
    pivot: &LuaValue,
    comp: Option<&LuaValue>,
) -> LuaResult<usize> {
    let mut i = lo;
    let mut j = up - 1;
    loop {
        // repeat ++i while a[i] < P
        i += 1;
        while sort_comp(l, comp, &a[i], pivot)? {
            if i == up - 1 {
                return Err(invalid_order(l));
            }
            i += 1;
        }
        // repeat --j while P < a[j]
        j -= 1;
        while sort_comp(l, comp, pivot, &a[j])? {
            if j < i {
                return Err(invalid_order(l));
            }
            j -= 1;
        }
        if j < i {
            a.swap(up - 1, i);
            return Ok(i);
        }
        a.swap(i, j);
    }
}
