use crate::lua_vm::lua_limits::{LUAI_MAXCCALLS, LUAI_MAXSTACK};

/// Resource limits for a `LuaState`
#[derive(Debug, Clone)]
pub struct SafeOption {
    /// Maximum number of value stack slots
    pub max_stack_size: usize,
    /// Maximum nesting of native calls, including comparator re-entry from `table.sort`
    pub max_call_depth: usize,
}

impl Default for SafeOption {
    fn default() -> Self {
        Self {
            max_stack_size: LUAI_MAXSTACK,
            max_call_depth: LUAI_MAXCCALLS,
        }
    }
}
