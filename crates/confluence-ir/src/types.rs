//! Declared variable types

use serde::{Deserialize, Serialize};

/// Declared type of a variable in the analyzed unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarType {
    Byte,
    Short,
    Int,
    Char,
    Boolean,
    Long,
    Float,
    Double,
    /// Reference types (objects, arrays).
    Ref,
}

impl VarType {
    /// Whether values of this type fit the engine's 32-bit integer value
    /// domain.
    ///
    /// Constant propagation tracks a variable only when this holds;
    /// variables of any other type never receive a fact entry.
    pub fn can_hold_int(self) -> bool {
        matches!(
            self,
            VarType::Byte | VarType::Short | VarType::Int | VarType::Char | VarType::Boolean
        )
    }
}
