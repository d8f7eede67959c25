//! Structural signature comparison across the contract and implementation
//! namespaces.
//!
//! Inside the contract module its own types are unqualified (`*Todo`); an
//! implementation file refers to them through the contract package alias
//! (`*gql.Todo`). Comparison projects the implementation side back into
//! the contract namespace, then compares by plain equality.
//!
//! The alias is `None` when the file dot-imports the contract package, so
//! contract types are written unqualified on both sides.

use resync_core::types::{MethodSignature, Param, TypeExpr};

/// Project an implementation-side type into the contract namespace:
/// `alias.Name` becomes `Name`, everything else is unchanged.
pub fn normalize(ty: &TypeExpr, contract_alias: Option<&str>) -> TypeExpr {
    ty.map_named(&|namespace, name| match namespace {
        Some(ns) if Some(ns) == contract_alias => TypeExpr::local(name),
        Some(ns) => TypeExpr::qualified(ns, name),
        None => TypeExpr::local(name),
    })
}

/// Same length and, position by position, the same type under namespace
/// projection. Parameter and result names are ignored, including the ones
/// inside function types.
pub fn is_structurally_equal(
    impl_sig: &MethodSignature,
    contract_sig: &MethodSignature,
    contract_alias: Option<&str>,
) -> bool {
    lists_equal(&impl_sig.params, &contract_sig.params, contract_alias)
        && lists_equal(&impl_sig.results, &contract_sig.results, contract_alias)
}

fn lists_equal(impl_list: &[Param], contract_list: &[Param], contract_alias: Option<&str>) -> bool {
    impl_list.len() == contract_list.len()
        && impl_list.iter().zip(contract_list).all(|(i, c)| {
            normalize(&i.ty, contract_alias).erase_param_names() == c.ty.erase_param_names()
        })
}

/// Contract signature as it must be written in the implementation: local
/// contract types gain the alias, names are kept.
pub fn translate(contract_sig: &MethodSignature, contract_alias: Option<&str>) -> MethodSignature {
    match contract_alias {
        Some(alias) => contract_sig.qualify(alias),
        None => contract_sig.clone(),
    }
}
