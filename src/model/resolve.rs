use std::collections::HashMap;

use super::{NamedTarget, Scope, Symbol, TypeReference};
use crate::scraper::ScrapeError;

/// Every named type reference must land on exactly one enum, struct or
/// typedef, searching the referencing scope and then each enclosing scope.
pub(super) fn check_references(symbols: &[Symbol]) -> Result<(), ScrapeError> {
    let mut declared: HashMap<(Scope, &str), usize> = HashMap::new();
    for symbol in symbols
        .iter()
        .filter(|s| s.kind().declares_type() && !is_tag_alias(s))
    {
        *declared
            .entry((symbol.scope().clone(), symbol.name()))
            .or_default() += 1;
    }

    for symbol in symbols {
        for reference in symbol.type_references() {
            let Some(target) = reference.named_target() else {
                continue;
            };

            let candidates = lookup(&declared, target);
            if candidates != 1 {
                return Err(ScrapeError::UnresolvedReference {
                    name: qualified_name(target),
                    referenced_by: symbol.name().to_string(),
                    candidates,
                });
            }
        }
    }

    Ok(())
}

/// `typedef struct Foo Foo;` names the tag it aliases, so it is not a
/// second candidate for `Foo`
fn is_tag_alias(symbol: &Symbol) -> bool {
    let Symbol::Typedef(typedef) = symbol else {
        return false;
    };

    matches!(
        &typedef.target,
        TypeReference::Named { name, qualifier, .. }
            if name == &typedef.name && qualifier.is_global()
    )
}

/// Candidate count at the innermost scope declaring the target, 0 if none does
fn lookup(declared: &HashMap<(Scope, &str), usize>, target: NamedTarget<'_>) -> usize {
    let mut current = Some(target.scope.clone());
    while let Some(scope) = current {
        if let Some(&count) = declared.get(&(scope.join(target.qualifier), target.name)) {
            return count;
        }
        current = scope.parent();
    }
    0
}

fn qualified_name(target: NamedTarget<'_>) -> String {
    if target.qualifier.is_global() {
        target.name.to_string()
    } else {
        format!("{}::{}", target.qualifier, target.name)
    }
}
