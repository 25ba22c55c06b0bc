// Lua execution state (equivalent to lua_State in the C API)
// Owns the value stack that native functions read arguments from and push
// results onto. Re-entrant calls (e.g. a sort comparator) go through `call`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::lua_value::{LuaTable, LuaValue, TablePtr};
use crate::lua_vm::lua_limits::BASIC_STACK_SIZE;
use crate::lua_vm::safe_option::SafeOption;
use crate::lua_vm::{LuaError, LuaResult};
use crate::stdlib::{self, Stdlib};

pub struct LuaState {
    /// Data stack - function slots, arguments and results
    pub(crate) stack: Vec<LuaValue>,

    /// Base index (first argument slot) of each active native call
    frames: Vec<usize>,

    safe_option: SafeOption,

    globals: TablePtr,

    /// Error message storage (lightweight error handling)
    pub(crate) error_msg: String,
}

impl LuaState {
    pub fn new(safe_option: SafeOption) -> Self {
        Self {
            stack: Vec::with_capacity(BASIC_STACK_SIZE),
            frames: Vec::new(),
            safe_option,
            globals: Rc::new(RefCell::new(LuaTable::new(0, 0))),
            error_msg: String::new(),
        }
    }

    pub fn safe_option(&self) -> &SafeOption {
        &self.safe_option
    }

    /// Load standard library modules into the globals table
    pub fn open_stdlib(&mut self, lib: Stdlib) -> LuaResult<()> {
        stdlib::open_lib(self, lib)
    }

    // ============ Stack ============

    #[inline(always)]
    pub fn get_top(&self) -> usize {
        self.stack.len()
    }

    /// Truncate, or pad with nil, to `new_top`
    pub fn set_top(&mut self, new_top: usize) {
        self.stack.resize(new_top, LuaValue::nil());
    }

    pub fn stack_get(&self, index: usize) -> Option<LuaValue> {
        self.stack.get(index).cloned()
    }

    pub fn push_value(&mut self, value: LuaValue) -> LuaResult<()> {
        if self.stack.len() >= self.safe_option.max_stack_size {
            return Err(self.stack_overflow("stack overflow"));
        }
        self.stack.push(value);
        Ok(())
    }

    /// Current frame base; the outermost "frame" starts at slot 0
    #[inline(always)]
    fn base(&self) -> usize {
        self.frames.last().copied().unwrap_or(0)
    }

    /// Argument of the running native function, 1-based
    pub fn get_arg(&self, index: usize) -> Option<LuaValue> {
        if index == 0 {
            return None;
        }
        self.stack.get(self.base() + index - 1).cloned()
    }

    pub fn get_args(&self) -> Vec<LuaValue> {
        self.stack[self.base()..].to_vec()
    }

    pub fn arg_count(&self) -> usize {
        self.stack.len() - self.base()
    }

    // ============ Calls ============

    /// Call the function at `func_idx` with every value above it as an argument.
    /// On success its results replace the function slot and the arguments, and
    /// the result count is returned. On failure the stack is cut back to
    /// `func_idx` and the error propagates unchanged.
    pub fn call(&mut self, func_idx: usize) -> LuaResult<usize> {
        let func = match self.stack.get(func_idx) {
            Some(LuaValue::Function(f)) => f.clone(),
            other => {
                let type_name = other.map_or("nil", LuaValue::type_name);
                let msg = format!("attempt to call a {} value", type_name);
                self.stack.truncate(func_idx);
                return Err(self.error(msg));
            }
        };

        if self.frames.len() >= self.safe_option.max_call_depth {
            self.stack.truncate(func_idx);
            return Err(self.stack_overflow("stack overflow (too many nested calls)"));
        }

        let base = func_idx + 1;
        self.frames.push(base);
        let result = func.call(self);
        self.frames.pop();

        match result {
            Ok(nresults) => {
                let top = self.stack.len();
                let nresults = nresults.min(top.saturating_sub(base));
                if nresults == 0 {
                    self.stack.truncate(func_idx);
                } else {
                    self.stack.drain(func_idx..top - nresults);
                }
                Ok(nresults)
            }
            Err(e) => {
                self.stack.truncate(func_idx);
                Err(e)
            }
        }
    }

    /// Convenience wrapper: push `func` and `args`, call, collect the results
    pub fn call_function(&mut self, func: LuaValue, args: &[LuaValue]) -> LuaResult<Vec<LuaValue>> {
        let func_idx = self.get_top();
        self.push_value(func)?;
        for arg in args {
            self.push_value(arg.clone())?;
        }
        let nresults = self.call(func_idx)?;
        Ok(self.stack.drain(func_idx..func_idx + nresults).collect())
    }

    // ============ Globals ============

    pub fn globals(&self) -> TablePtr {
        self.globals.clone()
    }

    pub fn get_global(&self, name: &str) -> LuaValue {
        self.globals.borrow().raw_get_string(name)
    }

    pub fn set_global(&mut self, name: &str, value: LuaValue) {
        self.globals.borrow_mut().raw_set_string(name, value);
    }

    pub fn create_table(&mut self, narr: usize, nrec: usize) -> LuaValue {
        LuaValue::table(LuaTable::new(narr, nrec))
    }

    // ============ Errors ============

    /// Record `msg` and return the matching error
    pub fn error(&mut self, msg: String) -> LuaError {
        self.error_msg = msg;
        LuaError::RuntimeError
    }

    fn stack_overflow(&mut self, msg: &str) -> LuaError {
        tracing::debug!(depth = self.frames.len(), top = self.stack.len(), "{msg}");
        self.error_msg = msg.to_string();
        LuaError::StackOverflow
    }

    /// Human-readable text for `e`
    pub fn get_error_msg(&self, e: LuaError) -> String {
        match e {
            LuaError::RuntimeError | LuaError::StackOverflow if !self.error_msg.is_empty() => {
                self.error_msg.clone()
            }
            _ => e.to_string(),
        }
    }

    pub fn clear_error(&mut self) {
        self.error_msg.clear();
    }
}

impl Default for LuaState {
    fn default() -> Self {
        Self::new(SafeOption::default())
    }
}
