use thiserror::Error;

/// Lightweight error enum - only 1 byte!
/// Message text for `RuntimeError` lives in `LuaState` (see `LuaState::error`)
/// so results stay small.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LuaError {
    /// Runtime error - message stored in the state's error message
    #[error("Runtime Error")]
    RuntimeError,
    /// Value stack or call depth limit exceeded
    #[error("Stack Overflow")]
    StackOverflow,
    #[error("table index is nil")]
    IndexIsNil,
    #[error("table index is NaN")]
    IndexIsNaN,
}
