// Lua value representation
// Tagged union over the language's value domain. Primitives compare structurally,
// tables and functions by identity.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use smol_str::SmolStr;

use crate::lua_value::LuaTable;
use crate::lua_vm::{LuaResult, LuaState};

/// Shared handle to a table. Lifetime is governed by reachability, not by this crate.
pub type TablePtr = Rc<RefCell<LuaTable>>;

/// Native function signature: reads arguments from the state, pushes results,
/// returns how many it pushed.
pub type CFunction = fn(&mut LuaState) -> LuaResult<usize>;

/// A callable value. Wraps both plain `CFunction`s and capturing closures.
#[derive(Clone)]
pub struct LuaFunction(Rc<dyn Fn(&mut LuaState) -> LuaResult<usize>>);

impl LuaFunction {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut LuaState) -> LuaResult<usize> + 'static,
    {
        LuaFunction(Rc::new(f))
    }

    #[inline(always)]
    pub fn call(&self, l: &mut LuaState) -> LuaResult<usize> {
        (self.0)(l)
    }

    #[inline(always)]
    fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

#[derive(Clone, Default)]
pub enum LuaValue {
    #[default]
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(SmolStr),
    Table(TablePtr),
    Function(LuaFunction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LuaValueKind {
    Nil,
    Boolean,
    Integer,
    Float,
    String,
    Table,
    Function,
}

/// Exact float -> integer conversion; `None` for NaN, infinities, fractions and
/// values outside the i64 range.
#[inline]
pub fn float_to_integer(n: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX is not
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if n.fract() == 0.0 && n >= -TWO_POW_63 && n < TWO_POW_63 {
        Some(n as i64)
    } else {
        None
    }
}

impl LuaValue {
    // ============ Constructors ============

    #[inline(always)]
    pub const fn nil() -> Self {
        LuaValue::Nil
    }

    #[inline(always)]
    pub const fn boolean(b: bool) -> Self {
        LuaValue::Boolean(b)
    }

    #[inline(always)]
    pub const fn integer(i: i64) -> Self {
        LuaValue::Integer(i)
    }

    #[inline(always)]
    pub const fn float(n: f64) -> Self {
        LuaValue::Float(n)
    }

    pub fn string(s: impl AsRef<str>) -> Self {
        LuaValue::String(SmolStr::new(s))
    }

    pub fn table(table: LuaTable) -> Self {
        LuaValue::Table(Rc::new(RefCell::new(table)))
    }

    pub fn new_table() -> Self {
        Self::table(LuaTable::new(0, 0))
    }

    pub fn cfunction(f: CFunction) -> Self {
        LuaValue::Function(LuaFunction::new(f))
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&mut LuaState) -> LuaResult<usize> + 'static,
    {
        LuaValue::Function(LuaFunction::new(f))
    }

    // ============ Predicates ============

    #[inline(always)]
    pub fn is_nil(&self) -> bool {
        matches!(self, LuaValue::Nil)
    }

    #[inline(always)]
    pub fn is_boolean(&self) -> bool {
        matches!(self, LuaValue::Boolean(_))
    }

    #[inline(always)]
    pub fn is_integer(&self) -> bool {
        matches!(self, LuaValue::Integer(_))
    }

    #[inline(always)]
    pub fn is_float(&self) -> bool {
        matches!(self, LuaValue::Float(_))
    }

    #[inline(always)]
    pub fn is_number(&self) -> bool {
        matches!(self, LuaValue::Integer(_) | LuaValue::Float(_))
    }

    #[inline(always)]
    pub fn is_string(&self) -> bool {
        matches!(self, LuaValue::String(_))
    }

    #[inline(always)]
    pub fn is_table(&self) -> bool {
        matches!(self, LuaValue::Table(_))
    }

    #[inline(always)]
    pub fn is_function(&self) -> bool {
        matches!(self, LuaValue::Function(_))
    }

    /// Lua truthiness: only nil and false are falsy
    #[inline(always)]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, LuaValue::Nil | LuaValue::Boolean(false))
    }

    #[inline(always)]
    pub fn is_falsy(&self) -> bool {
        !self.is_truthy()
    }

    // ============ Accessors ============

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            LuaValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer without float conversion
    pub fn as_integer_strict(&self) -> Option<i64> {
        match self {
            LuaValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integer, also accepting floats with an exact integer value
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            LuaValue::Integer(i) => Some(*i),
            LuaValue::Float(n) => float_to_integer(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            LuaValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            LuaValue::Integer(i) => Some(*i as f64),
            LuaValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LuaValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TablePtr> {
        match self {
            LuaValue::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&LuaFunction> {
        match self {
            LuaValue::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn kind(&self) -> LuaValueKind {
        match self {
            LuaValue::Nil => LuaValueKind::Nil,
            LuaValue::Boolean(_) => LuaValueKind::Boolean,
            LuaValue::Integer(_) => LuaValueKind::Integer,
            LuaValue::Float(_) => LuaValueKind::Float,
            LuaValue::String(_) => LuaValueKind::String,
            LuaValue::Table(_) => LuaValueKind::Table,
            LuaValue::Function(_) => LuaValueKind::Function,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind() {
            LuaValueKind::Nil => "nil",
            LuaValueKind::Boolean => "boolean",
            LuaValueKind::Integer | LuaValueKind::Float => "number",
            LuaValueKind::String => "string",
            LuaValueKind::Table => "table",
            LuaValueKind::Function => "function",
        }
    }

    /// Identity address for reference kinds, 0 otherwise
    pub fn raw_ptr_repr(&self) -> usize {
        match self {
            LuaValue::Table(t) => Rc::as_ptr(t) as *const () as usize,
            LuaValue::Function(f) => f.addr(),
            _ => 0,
        }
    }
}

// ============ Traits ============

impl PartialEq for LuaValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LuaValue::Nil, LuaValue::Nil) => true,
            (LuaValue::Boolean(a), LuaValue::Boolean(b)) => a == b,
            (LuaValue::Integer(a), LuaValue::Integer(b)) => a == b,
            (LuaValue::Float(a), LuaValue::Float(b)) => a == b,
            (LuaValue::Integer(i), LuaValue::Float(n)) | (LuaValue::Float(n), LuaValue::Integer(i)) => {
                float_to_integer(*n) == Some(*i)
            }
            (LuaValue::String(a), LuaValue::String(b)) => a == b,
            (LuaValue::Table(a), LuaValue::Table(b)) => Rc::ptr_eq(a, b),
            (LuaValue::Function(a), LuaValue::Function(b)) => a.addr() == b.addr(),
            _ => false,
        }
    }
}

// NaN breaks reflexivity, but NaN is rejected as a table key before it can reach a map
impl Eq for LuaValue {}

impl Hash for LuaValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            LuaValue::Nil => 0u8.hash(state),
            LuaValue::Boolean(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            // integral floats must hash like the integer they equal
            LuaValue::Integer(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            LuaValue::Float(n) => match float_to_integer(*n) {
                Some(i) => {
                    2u8.hash(state);
                    i.hash(state);
                }
                None => {
                    3u8.hash(state);
                    n.to_bits().hash(state);
                }
            },
            LuaValue::String(s) => {
                4u8.hash(state);
                s.hash(state);
            }
            LuaValue::Table(_) | LuaValue::Function(_) => {
                5u8.hash(state);
                self.raw_ptr_repr().hash(state);
            }
        }
    }
}

impl From<bool> for LuaValue {
    fn from(b: bool) -> Self {
        LuaValue::Boolean(b)
    }
}

impl From<i64> for LuaValue {
    fn from(i: i64) -> Self {
        LuaValue::Integer(i)
    }
}

impl From<f64> for LuaValue {
    fn from(n: f64) -> Self {
        LuaValue::Float(n)
    }
}

impl From<&str> for LuaValue {
    fn from(s: &str) -> Self {
        LuaValue::string(s)
    }
}

impl fmt::Debug for LuaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LuaValue::Nil => write!(f, "nil"),
            LuaValue::Boolean(b) => write!(f, "{}", b),
            LuaValue::Integer(i) => write!(f, "{}", i),
            LuaValue::Float(n) => write!(f, "{:?}", n),
            LuaValue::String(s) => write!(f, "\"{}\"", s),
            LuaValue::Table(_) => write!(f, "table(0x{:x})", self.raw_ptr_repr()),
            LuaValue::Function(_) => write!(f, "function(0x{:x})", self.raw_ptr_repr()),
        }
    }
}

impl fmt::Display for LuaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LuaValue::Nil => write!(f, "nil"),
            LuaValue::Boolean(b) => write!(f, "{}", b),
            LuaValue::Integer(i) => write!(f, "{}", i),
            LuaValue::Float(n) => {
                if n.floor() == *n && n.abs() < 1e16 {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            LuaValue::String(s) => write!(f, "{}", s),
            LuaValue::Table(_) => write!(f, "table: 0x{:x}", self.raw_ptr_repr()),
            LuaValue::Function(_) => write!(f, "function: 0x{:x}", self.raw_ptr_repr()),
        }
    }
}
