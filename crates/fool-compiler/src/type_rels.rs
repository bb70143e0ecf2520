//! The subtype relation and least upper bounds.
//!
//! `Bool <: Int`, `null` is below every reference type, references follow the
//! class hierarchy and arrows are covariant in the result and contravariant
//! in the parameters. Nothing else is related.

use fool_core::Type;

use crate::class_table::ClassTable;

/// Whether `sub` may be used where `sup` is expected.
pub fn is_subtype(sub: &Type, sup: &Type, classes: &ClassTable) -> bool {
    match (sub, sup) {
        (Type::Int, Type::Int) | (Type::Bool, Type::Bool) | (Type::Bool, Type::Int) => true,
        (Type::Empty, Type::Empty) | (Type::Empty, Type::Ref(_)) => true,
        (Type::Ref(a), Type::Ref(b)) => {
            a == b || classes.get(*a).is_some_and(|class| class.is_descendant_of(*b))
        }
        (Type::Class(a), Type::Class(b)) => a == b,
        (Type::Arrow(a), Type::Arrow(b)) => {
            a.arity() == b.arity()
                && is_subtype(&a.ret, &b.ret, classes)
                && a.params
                    .iter()
                    .zip(&b.params)
                    .all(|(pa, pb)| is_subtype(pb, pa, classes))
        }
        _ => false,
    }
}

/// The least type both `a` and `b` are subtypes of, if there is one.
///
/// Two references meet at their nearest common ancestor. Otherwise one of
/// the two must already be a supertype of the other.
pub fn lowest_common_ancestor(a: &Type, b: &Type, classes: &ClassTable) -> Option<Type> {
    if is_subtype(a, b, classes) {
        return Some(b.clone());
    }
    if is_subtype(b, a, classes) {
        return Some(a.clone());
    }
    match (a, b) {
        (Type::Ref(a), Type::Ref(_)) => classes.get(*a).and_then(|class| {
            class
                .lineage()
                .map(Type::Ref)
                .find(|candidate| is_subtype(b, candidate, classes))
        }),
        _ => None,
    }
}
