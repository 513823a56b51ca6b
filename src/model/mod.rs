mod resolve;
mod symbol;
mod types;


pub use symbol::{
    CallingConvention, Direction, EnumMember, EnumSymbol, Field, FunctionSymbol, Location,
    MacroBody, MacroSymbol, Parameter, Scope, Shape, StructSymbol, Symbol, SymbolIdentity,
    SymbolKind, TypedefSymbol,
};
pub use types::{NamedTarget, Primitive, TypeReference};

use crate::scraper::ScrapeError;
use serde::{Deserialize, Serialize};

/// Complete, immutable output of one scrape
///
/// Deserializing goes through [`SymbolModel::new`], so a loaded model holds
/// the same resolution guarantee as a scraped one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedModel")]
pub struct SymbolModel {
    symbols: Vec<Symbol>,
}

#[derive(Deserialize)]
struct UncheckedModel {
    symbols: Vec<Symbol>,
}

impl TryFrom<UncheckedModel> for SymbolModel {
    type Error = ScrapeError;

    fn try_from(unchecked: UncheckedModel) -> Result<Self, Self::Error> {
        Self::new(unchecked.symbols)
    }
}

impl SymbolModel {
    /// Build a model and check that every named type reference resolves
    pub fn new(symbols: Vec<Symbol>) -> Result<Self, ScrapeError> {
        let model = Self { symbols };
        resolve::check_references(&model.symbols)?;
        Ok(model)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// All symbols declared under the given name
    pub fn find<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Symbol> + 'a {
        self.symbols.iter().filter(move |s| s.name() == name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionSymbol> {
        self.symbols.iter().filter_map(|s| match s {
            Symbol::Function(f) => Some(f),
            _ => None,
        })
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumSymbol> {
        self.symbols.iter().filter_map(|s| match s {
            Symbol::Enum(e) => Some(e),
            _ => None,
        })
    }

    /// Every function sharing the given native entry point
    pub fn entry_point_overloads<'a>(
        &'a self,
        entry_point: &'a str,
    ) -> impl Iterator<Item = &'a FunctionSymbol> + 'a {
        self.functions().filter(move |f| f.entry_point == entry_point)
    }

    /// Symbols sharing one (name, kind, scope) identity
    pub fn overloads<'a>(
        &'a self,
        identity: &'a SymbolIdentity,
    ) -> impl Iterator<Item = &'a Symbol> + 'a {
        self.symbols.iter().filter(move |s| {
            s.kind() == identity.kind && s.name() == identity.name && s.scope() == &identity.scope
        })
    }

    /// Serialize for hand-off to a code generator
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl IntoIterator for SymbolModel {
    type Item = Symbol;
    type IntoIter = std::vec::IntoIter<Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.into_iter()
    }
}
