// Library registration system for the standard library consumers of the table core
// Provides a clean way to register Rust functions as Lua libraries

use crate::lua_value::{CFunction, LuaValue, TablePtr};
use crate::lua_vm::{LuaResult, LuaState};
use crate::stdlib;

/// Entry in a library module
pub enum LibraryEntry {
    Function(CFunction),
}

/// A library module: a named set of native functions
pub struct LibraryModule {
    pub name: &'static str,
    pub entries: Vec<(&'static str, LibraryEntry)>,
}

impl LibraryModule {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }

    pub fn with_function(mut self, name: &'static str, func: CFunction) -> Self {
        self.entries.push((name, LibraryEntry::Function(func)));
        self
    }
}

/// Builder for creating library modules with functions
#[macro_export]
macro_rules! lib_module {
    ($name:expr, {
        $($item_name:expr => $item:expr),* $(,)?
    }) => {{
        let mut module = $crate::lib_registry::LibraryModule::new($name);
        $(
            module.entries.push(($item_name, $crate::lib_registry::LibraryEntry::Function($item)));
        )*
        module
    }};
}

/// Registry of library modules, loaded in registration order
pub struct LibraryRegistry {
    modules: Vec<LibraryModule>,
}

impl LibraryRegistry {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    pub fn register(&mut self, module: LibraryModule) {
        self.modules.push(module);
    }

    pub fn load_all(&self, l: &mut LuaState) -> LuaResult<()> {
        for module in &self.modules {
            self.load_module(l, module)?;
        }
        Ok(())
    }

    /// Load one module: `_G` entries become globals, any other module becomes
    /// a global table named after it.
    pub fn load_module(&self, l: &mut LuaState, module: &LibraryModule) -> LuaResult<()> {
        if module.name == "_G" {
            for (name, entry) in &module.entries {
                l.set_global(name, entry_value(entry));
            }
            return Ok(());
        }

        let lib_table = l.create_table(0, module.entries.len());
        if let Some(table) = lib_table.as_table() {
            let mut table = table.borrow_mut();
            for (name, entry) in &module.entries {
                table.raw_set_string(name, entry_value(entry));
            }
        }
        l.set_global(module.name, lib_table);
        Ok(())
    }

    pub fn get_module(&self, name: &str) -> Option<&LibraryModule> {
        self.modules.iter().find(|m| m.name == name)
    }
}

impl Default for LibraryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn entry_value(entry: &LibraryEntry) -> LuaValue {
    match entry {
        LibraryEntry::Function(func) => LuaValue::cfunction(*func),
    }
}

/// Registry holding every library this crate ships
pub fn create_standard_registry() -> LibraryRegistry {
    let mut registry = LibraryRegistry::new();
    registry.register(stdlib::basic::create_basic_lib());
    registry.register(stdlib::table::create_table_lib());
    registry
}

/// Helper to get a specific argument
/// 1 based index
#[inline(always)]
pub fn get_arg(l: &LuaState, index: usize) -> Option<LuaValue> {
    l.get_arg(index)
}

/// Helper to require an argument
/// 1 based index
#[inline]
pub fn require_arg(l: &mut LuaState, index: usize, func_name: &str) -> LuaResult<LuaValue> {
    let Some(arg) = l.get_arg(index) else {
        return Err(l.error(format!(
            "bad argument #{} to '{}' (value expected)",
            index, func_name
        )));
    };
    Ok(arg)
}

/// Argument `index` as a table, or the usual "table expected" error
pub fn check_table(l: &mut LuaState, index: usize, func_name: &str) -> LuaResult<TablePtr> {
    match l.get_arg(index) {
        Some(LuaValue::Table(t)) => Ok(t),
        other => {
            let got = other.as_ref().map_or("no value", LuaValue::type_name);
            Err(l.error(format!(
                "bad argument #{} to '{}' (table expected, got {})",
                index, func_name, got
            )))
        }
    }
}

/// Argument `index` as an integer. Floats with an integral value are accepted.
pub fn check_integer(l: &mut LuaState, index: usize, func_name: &str) -> LuaResult<i64> {
    match l.get_arg(index) {
        Some(v) => match v.as_integer() {
            Some(i) => Ok(i),
            None if v.is_number() => Err(l.error(format!(
                "bad argument #{} to '{}' (number has no integer representation)",
                index, func_name
            ))),
            None => Err(l.error(format!(
                "bad argument #{} to '{}' (number expected, got {})",
                index,
                func_name,
                v.type_name()
            ))),
        },
        None => Err(l.error(format!(
            "bad argument #{} to '{}' (number expected, got no value)",
            index, func_name
        ))),
    }
}

/// Like `check_integer`, but a missing or nil argument yields `default`
pub fn opt_integer(l: &mut LuaState, index: usize, func_name: &str, default: i64) -> LuaResult<i64> {
    match l.get_arg(index) {
        None | Some(LuaValue::Nil) => Ok(default),
        Some(_) => check_integer(l, index, func_name),
    }
}

/// Helper to get argument count
#[inline(always)]
pub fn arg_count(l: &LuaState) -> usize {
    l.arg_count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(l: &mut LuaState) -> LuaResult<usize> {
        l.push_value(LuaValue::integer(42))?;
        Ok(1)
    }

    #[test]
    fn test_custom_module() {
        let mut registry = LibraryRegistry::default();
        registry.register(LibraryModule::new("util").with_function("answer", answer));
        registry.register(LibraryModule::new("_G").with_function("answer", answer));

        let mut l = LuaState::default();
        registry.load_all(&mut l).unwrap();

        let util = l.get_global("util");
        let func = util.as_table().unwrap().borrow().raw_get_string("answer");
        assert_eq!(l.call_function(func, &[]).unwrap(), vec![LuaValue::integer(42)]);
        assert!(l.get_global("answer").is_function());
        assert!(registry.get_module("missing").is_none());
    }

    #[test]
    fn test_argument_checks() {
        let mut l = LuaState::default();
        let checker = LuaValue::function(|l: &mut LuaState| {
            assert_eq!(arg_count(l), 2);
            assert_eq!(check_integer(l, 1, "check")?, 3);
            assert_eq!(opt_integer(l, 3, "check", 7)?, 7);
            let err = check_integer(l, 2, "check").unwrap_err();
            assert_eq!(
                l.get_error_msg(err),
                "bad argument #2 to 'check' (number has no integer representation)"
            );
            let err = check_table(l, 1, "check").unwrap_err();
            assert_eq!(
                l.get_error_msg(err),
                "bad argument #1 to 'check' (table expected, got number)"
            );
            let err = require_arg(l, 3, "check").unwrap_err();
            assert_eq!(
                l.get_error_msg(err),
                "bad argument #3 to 'check' (value expected)"
            );
            Ok(0)
        });
        l.call_function(checker, &[LuaValue::float(3.0), LuaValue::float(0.5)])
            .unwrap();
    }
}
