// Standard library functions built on the table core

pub mod basic;
mod sort_table;
pub mod table;

pub use sort_table::{lua_less_than, sort_values};

use crate::lib_registry::{LibraryRegistry, create_standard_registry};
use crate::lua_vm::{LuaResult, LuaState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stdlib {
    Basic,
    Table,

    All,
}

pub(crate) fn open_lib(l: &mut LuaState, lib: Stdlib) -> LuaResult<()> {
    let registry = create_standard_registry();
    let name = match lib {
        Stdlib::All => return registry.load_all(l),
        Stdlib::Basic => "_G",
        Stdlib::Table => "table",
    };
    load_by_name(&registry, l, name)
}

fn load_by_name(registry: &LibraryRegistry, l: &mut LuaState, name: &str) -> LuaResult<()> {
    match registry.get_module(name) {
        Some(module) => registry.load_module(l, module),
        None => Ok(()),
    }
}
