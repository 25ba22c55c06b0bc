// Lua value model
// Values are a tagged union; tables are the hybrid array + ordered hash structure.
mod lua_table;
mod lua_value;

pub use lua_table::{LuaHashTable, LuaTable, LuaValueArray};
pub use lua_value::{CFunction, LuaFunction, LuaValue, LuaValueKind, TablePtr, float_to_integer};
