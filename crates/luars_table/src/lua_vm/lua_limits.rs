//! Centralized limits and tuning constants.
//!
//! Values follow Lua's `luaconf.h` / `llimits.h` where one exists.

// ===== Stack =====

/// Initial stack capacity for new states.
pub const BASIC_STACK_SIZE: usize = 2 * LUA_MINSTACK;

/// Minimum guaranteed stack slots available to native functions.
pub const LUA_MINSTACK: usize = 20;

/// Default maximum stack size (number of slots).
pub const LUAI_MAXSTACK: usize = 1_000_000;

/// Default maximum nesting of native calls.
pub const LUAI_MAXCCALLS: usize = 200;

// ===== Table library =====

/// Ranges longer than this get a randomized pivot in `table.sort`.
pub const SORT_RANDOM_LIMIT: usize = 100;

/// Largest sequence `table.sort` accepts.
pub const MAX_SORT_LEN: usize = i32::MAX as usize;
