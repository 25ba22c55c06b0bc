// Lua table core
// Hybrid array + insertion-ordered hash tables, the re-entrant state their
// comparator-driven sort calls back into, and the table/basic library functions
// built on top.

#[cfg(test)]
mod test;

pub mod lib_registry;
pub mod lua_value;
pub mod lua_vm;
pub mod stdlib;

pub use lib_registry::LibraryRegistry;
pub use lua_value::{CFunction, LuaFunction, LuaTable, LuaValue, LuaValueKind, TablePtr};
pub use lua_vm::{LuaError, LuaResult, LuaState, SafeOption};
pub use stdlib::{Stdlib, lua_less_than, sort_values};
