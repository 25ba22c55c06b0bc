// Tests for the table and basic library functions
use crate::test::{call_lib, int_list, ints, list_contents, new_state};
use crate::*;

fn int(i: i64) -> LuaValue {
    LuaValue::integer(i)
}

fn str(s: &str) -> LuaValue {
    LuaValue::string(s)
}

#[test]
fn test_open_stdlib_registers_functions() {
    let l = new_state();
    for name in ["next", "pairs", "rawget", "rawset", "rawlen", "rawequal"] {
        assert!(l.get_global(name).is_function(), "{name}");
    }
    let table_lib = l.get_global("table");
    let table_lib = table_lib.as_table().unwrap().borrow();
    for name in ["concat", "insert", "pack", "remove", "sort", "unpack"] {
        assert!(table_lib.raw_get_string(name).is_function(), "table.{name}");
    }
}

#[test]
fn test_open_single_library() {
    let mut l = LuaState::default();
    l.open_stdlib(Stdlib::Basic).unwrap();
    assert!(l.get_global("next").is_function());
    assert!(l.get_global("table").is_nil());
}

#[test]
fn test_table_insert() {
    let mut l = new_state();
    let t = int_list(&[1, 2, 3]);

    call_lib(&mut l, "table", "insert", &[t.clone(), int(4)]).unwrap();
    assert_eq!(list_contents(&t), ints(&[1, 2, 3, 4]));

    call_lib(&mut l, "table", "insert", &[t.clone(), int(2), int(99)]).unwrap();
    assert_eq!(list_contents(&t), ints(&[1, 99, 2, 3, 4]));

    call_lib(&mut l, "table", "insert", &[t.clone(), int(6), int(5)]).unwrap();
    assert_eq!(list_contents(&t), ints(&[1, 99, 2, 3, 4, 5]));
}

#[test]
fn test_table_insert_errors() {
    let mut l = new_state();
    let t = int_list(&[1, 2]);

    let err = call_lib(&mut l, "table", "insert", &[t.clone(), int(5), int(0)]).unwrap_err();
    assert_eq!(
        l.get_error_msg(err),
        "bad argument #2 to 'insert' (position out of bounds)"
    );

    let err = call_lib(&mut l, "table", "insert", &[t.clone(), int(0), int(0)]).unwrap_err();
    assert_eq!(
        l.get_error_msg(err),
        "bad argument #2 to 'insert' (position out of bounds)"
    );

    let err = call_lib(&mut l, "table", "insert", &[t.clone()]).unwrap_err();
    assert_eq!(l.get_error_msg(err), "wrong number of arguments to 'insert'");

    let err = call_lib(&mut l, "table", "insert", &[int(1), int(1)]).unwrap_err();
    assert_eq!(
        l.get_error_msg(err),
        "bad argument #1 to 'insert' (table expected, got number)"
    );
    assert_eq!(list_contents(&t), ints(&[1, 2]));
}

#[test]
fn test_table_remove() {
    let mut l = new_state();
    let t = int_list(&[10, 20, 30, 40]);

    let v = call_lib(&mut l, "table", "remove", &[t.clone(), int(2)]).unwrap();
    assert_eq!(v, vec![int(20)]);
    assert_eq!(list_contents(&t), ints(&[10, 30, 40]));

    let v = call_lib(&mut l, "table", "remove", &[t.clone()]).unwrap();
    assert_eq!(v, vec![int(40)]);
    assert_eq!(list_contents(&t), ints(&[10, 30]));
}

#[test]
fn test_table_remove_edges() {
    let mut l = new_state();
    let empty = int_list(&[]);
    let v = call_lib(&mut l, "table", "remove", &[empty.clone()]).unwrap();
    assert_eq!(v, vec![LuaValue::nil()]);
    let v = call_lib(&mut l, "table", "remove", &[empty.clone(), int(0)]).unwrap();
    assert_eq!(v, vec![LuaValue::nil()]);

    let t = int_list(&[1, 2]);
    // #t + 1 is a valid position
    let v = call_lib(&mut l, "table", "remove", &[t.clone(), int(3)]).unwrap();
    assert_eq!(v, vec![LuaValue::nil()]);

    let err = call_lib(&mut l, "table", "remove", &[t.clone(), int(4)]).unwrap_err();
    assert_eq!(
        l.get_error_msg(err),
        "bad argument #2 to 'remove' (position out of bounds)"
    );
    assert_eq!(list_contents(&t), ints(&[1, 2]));
}

#[test]
fn test_table_concat() {
    let mut l = new_state();
    let mut table = LuaTable::new(0, 0);
    table.append(str("a"));
    table.append(int(1));
    table.append(LuaValue::float(2.5));
    table.append(str("b"));
    let t = LuaValue::table(table);

    let r = call_lib(&mut l, "table", "concat", &[t.clone()]).unwrap();
    assert_eq!(r, vec![str("a12.5b")]);

    let r = call_lib(&mut l, "table", "concat", &[t.clone(), str(", ")]).unwrap();
    assert_eq!(r, vec![str("a, 1, 2.5, b")]);

    let r = call_lib(&mut l, "table", "concat", &[t.clone(), str("-"), int(2), int(3)]).unwrap();
    assert_eq!(r, vec![str("1-2.5")]);

    let r = call_lib(&mut l, "table", "concat", &[t.clone(), str("-"), int(3), int(2)]).unwrap();
    assert_eq!(r, vec![str("")]);
}

#[test]
fn test_table_concat_invalid_value() {
    let mut l = new_state();
    let mut table = LuaTable::new(0, 0);
    table.append(str("a"));
    table.append(LuaValue::boolean(true));
    let t = LuaValue::table(table);

    let err = call_lib(&mut l, "table", "concat", &[t]).unwrap_err();
    assert_eq!(
        l.get_error_msg(err),
        "invalid value (at index 2) in table for 'concat'"
    );
}

#[test]
fn test_table_pack_unpack() {
    let mut l = new_state();
    let packed = call_lib(
        &mut l,
        "table",
        "pack",
        &[int(1), LuaValue::nil(), int(3)],
    )
    .unwrap();
    let t = packed[0].clone();
    {
        let table = t.as_table().unwrap().borrow();
        assert_eq!(table.raw_get_string("n"), int(3));
        assert_eq!(table.raw_get_int(1), int(1));
        assert_eq!(table.raw_get_int(2), LuaValue::nil());
        assert_eq!(table.raw_get_int(3), int(3));
    }

    let values = call_lib(&mut l, "table", "unpack", &[t.clone(), int(1), int(3)]).unwrap();
    assert_eq!(values, vec![int(1), LuaValue::nil(), int(3)]);

    let list = int_list(&[5, 6, 7]);
    let values = call_lib(&mut l, "table", "unpack", &[list.clone()]).unwrap();
    assert_eq!(values, ints(&[5, 6, 7]));
    let values = call_lib(&mut l, "table", "unpack", &[list.clone(), int(2)]).unwrap();
    assert_eq!(values, ints(&[6, 7]));
    let values = call_lib(&mut l, "table", "unpack", &[list, int(3), int(1)]).unwrap();
    assert!(values.is_empty());
}

#[test]
fn test_table_unpack_too_many() {
    let mut l = new_state();
    let t = int_list(&[]);
    let err = call_lib(&mut l, "table", "unpack", &[t, int(1), int(i64::MAX)]).unwrap_err();
    assert_eq!(l.get_error_msg(err), "too many results to unpack");

    let t = int_list(&[]);
    let err = call_lib(&mut l, "table", "unpack", &[t, int(i64::MIN), int(i64::MAX)]).unwrap_err();
    assert_eq!(l.get_error_msg(err), "too many results to unpack");
}

#[test]
fn test_next_and_pairs() {
    let mut l = new_state();
    let mut table = LuaTable::new(0, 0);
    table.append(str("one"));
    table.raw_set_string("key", str("value"));
    let t = LuaValue::table(table);

    let iter = call_lib(&mut l, "_G", "pairs", &[t.clone()]).unwrap();
    assert_eq!(iter.len(), 3);
    assert!(iter[0].is_function());
    assert_eq!(iter[1], t);
    assert!(iter[2].is_nil());

    let mut seen = Vec::new();
    let mut key = LuaValue::nil();
    loop {
        let r = l.call_function(iter[0].clone(), &[t.clone(), key.clone()]).unwrap();
        if r[0].is_nil() {
            assert_eq!(r.len(), 1);
            break;
        }
        seen.push((r[0].clone(), r[1].clone()));
        key = r[0].clone();
    }
    assert_eq!(seen, vec![(int(1), str("one")), (str("key"), str("value"))]);

    let err = call_lib(&mut l, "_G", "next", &[int(1)]).unwrap_err();
    assert_eq!(
        l.get_error_msg(err),
        "bad argument #1 to 'next' (table expected, got number)"
    );
}

#[test]
fn test_rawget_rawset() {
    let mut l = new_state();
    let t = LuaValue::new_table();

    let r = call_lib(&mut l, "_G", "rawset", &[t.clone(), str("k"), int(5)]).unwrap();
    assert_eq!(r, vec![t.clone()]);
    let r = call_lib(&mut l, "_G", "rawget", &[t.clone(), str("k")]).unwrap();
    assert_eq!(r, vec![int(5)]);

    call_lib(&mut l, "_G", "rawset", &[t.clone(), LuaValue::float(1.0), str("x")]).unwrap();
    let r = call_lib(&mut l, "_G", "rawget", &[t.clone(), int(1)]).unwrap();
    assert_eq!(r, vec![str("x")]);

    let err = call_lib(&mut l, "_G", "rawset", &[t.clone(), LuaValue::nil(), int(1)]).unwrap_err();
    assert_eq!(err, LuaError::IndexIsNil);
    assert_eq!(l.get_error_msg(err), "table index is nil");

    let err = call_lib(&mut l, "_G", "rawset", &[t, LuaValue::float(f64::NAN), int(1)]).unwrap_err();
    assert_eq!(l.get_error_msg(err), "table index is NaN");
}

#[test]
fn test_rawlen_rawequal() {
    let mut l = new_state();
    let r = call_lib(&mut l, "_G", "rawlen", &[int_list(&[1, 2, 3])]).unwrap();
    assert_eq!(r, vec![int(3)]);
    let r = call_lib(&mut l, "_G", "rawlen", &[str("hello")]).unwrap();
    assert_eq!(r, vec![int(5)]);
    let err = call_lib(&mut l, "_G", "rawlen", &[int(1)]).unwrap_err();
    assert_eq!(
        l.get_error_msg(err),
        "bad argument #1 to 'rawlen' (table or string expected)"
    );

    let t = LuaValue::new_table();
    let r = call_lib(&mut l, "_G", "rawequal", &[t.clone(), t]).unwrap();
    assert_eq!(r, vec![LuaValue::boolean(true)]);
    let r = call_lib(&mut l, "_G", "rawequal", &[LuaValue::new_table(), LuaValue::new_table()]).unwrap();
    assert_eq!(r, vec![LuaValue::boolean(false)]);
    let r = call_lib(&mut l, "_G", "rawequal", &[int(1), LuaValue::float(1.0)]).unwrap();
    assert_eq!(r, vec![LuaValue::boolean(true)]);
}
