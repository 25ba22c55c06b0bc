// Execution context consumed by the table core
// Only what re-entrant calls need: a value stack, native calls, limits and errors.
mod lua_error;
pub mod lua_limits;
mod lua_state;
mod safe_option;

pub use lua_error::LuaError;
pub use lua_state::LuaState;
pub use safe_option::SafeOption;

pub type LuaResult<T> = Result<T, LuaError>;
