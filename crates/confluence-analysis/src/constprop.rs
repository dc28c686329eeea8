//! Constant propagation over a flat integer value lattice
//!
//! Forward analysis. Each trackable variable maps to a [`Value`] from
//! the flat lattice `Undef < Const(i) < Nac`; the meet of two different
//! constants is `Nac`. Folding uses 32-bit wrapping semantics, and a
//! division or remainder by a constant zero divisor folds to `Nac`
//! instead of faulting the solve.

use crate::solver::{DataflowAnalysis, Direction};
use confluence_ir::{
    ArithOp, BinaryOp, BitwiseOp, Cfg, ConditionOp, Exp, LValue, ShiftOp, Stmt, VarType,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Element of the flat constant lattice.
///
/// `Undef` is bottom, `Nac` ("not a constant") is top, and the integer
/// constants sit pairwise incomparable between them. Height 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// No definition seen yet.
    Undef,
    /// Statically known to be exactly this constant.
    Const(i32),
    /// Not statically a single constant.
    Nac,
}

impl Value {
    pub fn is_undef(self) -> bool {
        matches!(self, Value::Undef)
    }

    pub fn is_const(self) -> bool {
        matches!(self, Value::Const(_))
    }

    pub fn is_nac(self) -> bool {
        matches!(self, Value::Nac)
    }

    pub fn as_const(self) -> Option<i32> {
        match self {
            Value::Const(value) => Some(value),
            Value::Undef | Value::Nac => None,
        }
    }

    /// Meet of two lattice values: `Undef` is the identity, `Nac`
    /// absorbs, and two constants agree or collapse to `Nac`.
    pub fn meet(self, other: Value) -> Value {
        match (self, other) {
            (Value::Undef, v) | (v, Value::Undef) => v,
            (Value::Nac, _) | (_, Value::Nac) => Value::Nac,
            (Value::Const(a), Value::Const(b)) => {
                if a == b {
                    Value::Const(a)
                } else {
                    Value::Nac
                }
            }
        }
    }
}

/// Map from variable name to lattice value; an absent key reads as
/// [`Value::Undef`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstFact {
    values: HashMap<String, Value>,
}

impl ConstFact {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, var: &str) -> Value {
        self.values.get(var).copied().unwrap_or(Value::Undef)
    }

    /// Bind `var` to `value`; returns whether the fact changed.
    ///
    /// `Undef` bindings are never stored, so two facts compare equal
    /// regardless of how many absent variables were written.
    pub fn update(&mut self, var: &str, value: Value) -> bool {
        if value == Value::Undef {
            return self.values.remove(var).is_some();
        }
        self.values.insert(var.to_string(), value) != Some(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.values.iter().map(|(var, value)| (var.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Evaluate an expression against `fact`.
///
/// Only integer literals and variable lookups produce precise values;
/// every other expression kind is conservatively [`Value::Nac`].
pub fn evaluate(exp: &Exp, fact: &ConstFact) -> Value {
    match exp {
        Exp::IntLiteral(value) => Value::Const(*value),
        Exp::Var(name) => fact.get(name),
        Exp::Binary(_) | Exp::Unary(_) | Exp::Opaque => Value::Nac,
    }
}

/// Fold `l op r` with 32-bit wrapping semantics.
///
/// Shift amounts are masked to the low five bits, comparisons yield the
/// integers 1 and 0, and a zero divisor folds to `Nac`. Operator
/// dispatch is exhaustive; a new operator variant fails to compile here
/// instead of silently falling through.
fn fold_binary(op: BinaryOp, l: i32, r: i32) -> Value {
    let folded = match op {
        BinaryOp::Shift(op) => match op {
            ShiftOp::Shl => l.wrapping_shl(r as u32),
            ShiftOp::Shr => l.wrapping_shr(r as u32),
            ShiftOp::Ushr => ((l as u32).wrapping_shr(r as u32)) as i32,
        },
        BinaryOp::Condition(op) => {
            let holds = match op {
                ConditionOp::Eq => l == r,
                ConditionOp::Ne => l != r,
                ConditionOp::Lt => l < r,
                ConditionOp::Gt => l > r,
                ConditionOp::Le => l <= r,
                ConditionOp::Ge => l >= r,
            };
            i32::from(holds)
        }
        BinaryOp::Bitwise(op) => match op {
            BitwiseOp::Or => l | r,
            BitwiseOp::And => l & r,
            BitwiseOp::Xor => l ^ r,
        },
        BinaryOp::Arithmetic(op) => match op {
            ArithOp::Add => l.wrapping_add(r),
            ArithOp::Sub => l.wrapping_sub(r),
            ArithOp::Mul => l.wrapping_mul(r),
            ArithOp::Div => {
                if r == 0 {
                    return Value::Nac;
                }
                l.wrapping_div(r)
            }
            ArithOp::Rem => {
                if r == 0 {
                    return Value::Nac;
                }
                l.wrapping_rem(r)
            }
        },
    };
    Value::Const(folded)
}

/// Forward constant propagation over trackable integer variables.
pub struct ConstantPropagation {
    /// Declared types of the analyzed unit's variables. A variable with
    /// no entry here is not trackable.
    var_types: HashMap<String, VarType>,
}

impl ConstantPropagation {
    pub fn new(var_types: HashMap<String, VarType>) -> Self {
        Self { var_types }
    }

    fn is_trackable(&self, var: &str) -> bool {
        self.var_types
            .get(var)
            .copied()
            .is_some_and(VarType::can_hold_int)
    }

    /// The statement's target when it is a trackable simple variable.
    fn tracked_target<'a>(&self, target: &'a LValue) -> Option<&'a str> {
        target.as_var().filter(|name| self.is_trackable(name))
    }
}

impl DataflowAnalysis for ConstantPropagation {
    type Fact = ConstFact;

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn boundary_fact(&self, cfg: &Cfg) -> ConstFact {
        // Parameters carry unknown external input.
        let mut fact = ConstFact::new();
        for param in cfg.params() {
            if self.is_trackable(param) {
                fact.update(param, Value::Nac);
            }
        }
        fact
    }

    fn initial_fact(&self) -> ConstFact {
        ConstFact::new()
    }

    fn meet_into(&self, source: &ConstFact, target: &mut ConstFact) {
        for (var, value) in source.iter() {
            let merged = value.meet(target.get(var));
            target.update(var, merged);
        }
    }

    fn transfer(&self, stmt: &Stmt, input: &ConstFact) -> ConstFact {
        let mut out = input.clone();
        match stmt {
            Stmt::Call { target, .. } => {
                // Call results are opaque.
                if let Some(name) = target.as_ref().and_then(|t| self.tracked_target(t)) {
                    out.update(name, Value::Nac);
                }
            }
            Stmt::Copy { target, source } => {
                if let Some(name) = self.tracked_target(target) {
                    out.update(name, evaluate(source, input));
                }
            }
            Stmt::AssignLiteral { target, value } => {
                if let Some(name) = self.tracked_target(target) {
                    out.update(name, Value::Const(*value));
                }
            }
            Stmt::Binary { target, exp } => {
                if let Some(name) = self.tracked_target(target) {
                    let lhs = evaluate(&exp.lhs, input);
                    let rhs = evaluate(&exp.rhs, input);
                    let value = match (lhs.as_const(), rhs.as_const()) {
                        (Some(l), Some(r)) => fold_binary(exp.op, l, r),
                        _ => Value::Nac,
                    };
                    out.update(name, value);
                }
            }
            Stmt::Unary { target, exp } => {
                if let Some(name) = self.tracked_target(target) {
                    let value = match evaluate(&exp.operand, input) {
                        Value::Const(c) => Value::Const(c.wrapping_neg()),
                        other => other,
                    };
                    out.update(name, value);
                }
            }
            Stmt::Branch { .. } | Stmt::Return(_) | Stmt::Nop => {}
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_meet_table() {
        assert_eq!(Value::Undef.meet(Value::Const(5)), Value::Const(5));
        assert_eq!(Value::Undef.meet(Value::Nac), Value::Nac);
        assert_eq!(Value::Undef.meet(Value::Undef), Value::Undef);
        assert_eq!(Value::Nac.meet(Value::Const(5)), Value::Nac);
        assert_eq!(Value::Const(5).meet(Value::Const(5)), Value::Const(5));
        assert_eq!(Value::Const(5).meet(Value::Const(6)), Value::Nac);
        assert_eq!(Value::Const(5).meet(Value::Undef), Value::Const(5));
    }

    #[test]
    fn test_fact_absent_key_reads_undef() {
        let fact = ConstFact::new();
        assert_eq!(fact.get("x"), Value::Undef);
    }

    #[test]
    fn test_fact_never_stores_undef() {
        let mut a = ConstFact::new();
        assert!(!a.update("x", Value::Undef));
        assert!(a.is_empty());

        let mut b = ConstFact::new();
        assert!(b.update("x", Value::Const(1)));
        assert!(b.update("x", Value::Undef));
        assert_eq!(a, b);
    }

    #[test]
    fn test_fact_update_reports_change() {
        let mut fact = ConstFact::new();
        assert!(fact.update("x", Value::Const(1)));
        assert!(!fact.update("x", Value::Const(1)));
        assert!(fact.update("x", Value::Nac));
    }

    #[test]
    fn test_evaluate_atoms() {
        let mut fact = ConstFact::new();
        fact.update("x", Value::Const(4));
        assert_eq!(evaluate(&Exp::IntLiteral(7), &fact), Value::Const(7));
        assert_eq!(evaluate(&Exp::var("x"), &fact), Value::Const(4));
        assert_eq!(evaluate(&Exp::var("y"), &fact), Value::Undef);
        assert_eq!(evaluate(&Exp::Opaque, &fact), Value::Nac);
    }

    #[test]
    fn test_fold_arithmetic() {
        let add = BinaryOp::Arithmetic(ArithOp::Add);
        assert_eq!(fold_binary(add, 1, 2), Value::Const(3));
        assert_eq!(
            fold_binary(BinaryOp::Arithmetic(ArithOp::Mul), i32::MAX, 2),
            Value::Const(i32::MAX.wrapping_mul(2))
        );
        assert_eq!(
            fold_binary(BinaryOp::Arithmetic(ArithOp::Div), 7, 2),
            Value::Const(3)
        );
        assert_eq!(
            fold_binary(BinaryOp::Arithmetic(ArithOp::Rem), 7, 2),
            Value::Const(1)
        );
    }

    #[test]
    fn test_fold_zero_divisor_is_nac() {
        assert_eq!(
            fold_binary(BinaryOp::Arithmetic(ArithOp::Div), 1, 0),
            Value::Nac
        );
        assert_eq!(
            fold_binary(BinaryOp::Arithmetic(ArithOp::Rem), 1, 0),
            Value::Nac
        );
    }

    #[test]
    fn test_fold_min_div_minus_one_wraps() {
        assert_eq!(
            fold_binary(BinaryOp::Arithmetic(ArithOp::Div), i32::MIN, -1),
            Value::Const(i32::MIN)
        );
    }

    #[test]
    fn test_fold_shifts() {
        assert_eq!(
            fold_binary(BinaryOp::Shift(ShiftOp::Shl), 1, 4),
            Value::Const(16)
        );
        assert_eq!(
            fold_binary(BinaryOp::Shift(ShiftOp::Shr), -8, 1),
            Value::Const(-4)
        );
        // Logical shift fills with zero bits.
        assert_eq!(
            fold_binary(BinaryOp::Shift(ShiftOp::Ushr), -1, 1),
            Value::Const(i32::MAX)
        );
        // Shift amounts mask to the low five bits.
        assert_eq!(
            fold_binary(BinaryOp::Shift(ShiftOp::Shl), 1, 33),
            Value::Const(2)
        );
    }

    #[test]
    fn test_fold_conditions_and_bitwise() {
        assert_eq!(
            fold_binary(BinaryOp::Condition(ConditionOp::Lt), 1, 2),
            Value::Const(1)
        );
        assert_eq!(
            fold_binary(BinaryOp::Condition(ConditionOp::Ge), 1, 2),
            Value::Const(0)
        );
        assert_eq!(
            fold_binary(BinaryOp::Bitwise(BitwiseOp::Xor), 0b1100, 0b1010),
            Value::Const(0b0110)
        );
        assert_eq!(
            fold_binary(BinaryOp::Bitwise(BitwiseOp::And), 0b1100, 0b1010),
            Value::Const(0b1000)
        );
        assert_eq!(
            fold_binary(BinaryOp::Bitwise(BitwiseOp::Or), 0b1100, 0b1010),
            Value::Const(0b1110)
        );
    }

    fn value_strategy() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Undef),
            (-4i32..=4).prop_map(Value::Const),
            Just(Value::Nac),
        ]
    }

    fn fact_strategy() -> impl Strategy<Value = ConstFact> {
        proptest::collection::hash_map("[abc]", value_strategy(), 0..4).prop_map(|entries| {
            let mut fact = ConstFact::new();
            for (var, value) in entries {
                fact.update(&var, value);
            }
            fact
        })
    }

    fn meet_facts(analysis: &ConstantPropagation, a: &ConstFact, b: &ConstFact) -> ConstFact {
        let mut target = a.clone();
        analysis.meet_into(b, &mut target);
        target
    }

    proptest! {
        #[test]
        fn prop_value_meet_commutative(a in value_strategy(), b in value_strategy()) {
            prop_assert_eq!(a.meet(b), b.meet(a));
        }

        #[test]
        fn prop_value_meet_associative(
            a in value_strategy(),
            b in value_strategy(),
            c in value_strategy(),
        ) {
            prop_assert_eq!(a.meet(b).meet(c), a.meet(b.meet(c)));
        }

        #[test]
        fn prop_value_meet_idempotent(a in value_strategy()) {
            prop_assert_eq!(a.meet(a), a);
        }

        #[test]
        fn prop_fact_meet_commutative(a in fact_strategy(), b in fact_strategy()) {
            let analysis = ConstantPropagation::new(HashMap::new());
            prop_assert_eq!(
                meet_facts(&analysis, &a, &b),
                meet_facts(&analysis, &b, &a)
            );
        }

        #[test]
        fn prop_fact_meet_associative(
            a in fact_strategy(),
            b in fact_strategy(),
            c in fact_strategy(),
        ) {
            let analysis = ConstantPropagation::new(HashMap::new());
            let left = meet_facts(&analysis, &meet_facts(&analysis, &a, &b), &c);
            let right = meet_facts(&analysis, &a, &meet_facts(&analysis, &b, &c));
            prop_assert_eq!(left, right);
        }

        #[test]
        fn prop_fact_meet_idempotent(a in fact_strategy()) {
            let analysis = ConstantPropagation::new(HashMap::new());
            prop_assert_eq!(meet_facts(&analysis, &a, &a), a);
        }
    }
}
