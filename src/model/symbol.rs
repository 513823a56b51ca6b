use serde::{Deserialize, Serialize};
use std::fmt;

use super::TypeReference;

/// Declaring scope of a symbol, outermost segment first
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(Vec<String>);

impl Scope {
    /// The global scope
    pub fn global() -> Self {
        Self(Vec::new())
    }

    /// Build a scope from `::`-separated text (empty text is global)
    pub fn parse(text: &str) -> Self {
        Self(
            text.split("::")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_global(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Nested scope one level below this one
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    /// `other` nested below this scope
    pub fn join(&self, other: &Scope) -> Self {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Self(segments)
    }

    /// Enclosing scope, or None at global scope
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<global>")
        } else {
            write!(f, "{}", self.0.join("::"))
        }
    }
}

/// Originating header and line of a declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Classification of symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Function,
    Enum,
    Struct,
    Typedef,
    Macro,
}

impl SymbolKind {
    /// Whether symbols of this kind can be the target of a named type reference
    pub fn declares_type(self) -> bool {
        matches!(self, SymbolKind::Enum | SymbolKind::Struct | SymbolKind::Typedef)
    }
}

/// Identity used to group overloads: (name, kind, declaring scope)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolIdentity {
    pub name: String,
    pub kind: SymbolKind,
    pub scope: Scope,
}

/// One extracted native declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Symbol {
    Function(FunctionSymbol),
    Enum(EnumSymbol),
    Struct(StructSymbol),
    Typedef(TypedefSymbol),
    Macro(MacroSymbol),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Function(s) => &s.name,
            Symbol::Enum(s) => &s.name,
            Symbol::Struct(s) => &s.name,
            Symbol::Typedef(s) => &s.name,
            Symbol::Macro(s) => &s.name,
        }
    }

    pub fn native_name(&self) -> &str {
        match self {
            Symbol::Function(s) => &s.native_name,
            Symbol::Enum(s) => &s.native_name,
            Symbol::Struct(s) => &s.native_name,
            Symbol::Typedef(s) => &s.native_name,
            Symbol::Macro(s) => &s.native_name,
        }
    }

    pub fn scope(&self) -> &Scope {
        match self {
            Symbol::Function(s) => &s.scope,
            Symbol::Enum(s) => &s.scope,
            Symbol::Struct(s) => &s.scope,
            Symbol::Typedef(s) => &s.scope,
            Symbol::Macro(s) => &s.scope,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            Symbol::Function(s) => &s.location,
            Symbol::Enum(s) => &s.location,
            Symbol::Struct(s) => &s.location,
            Symbol::Typedef(s) => &s.location,
            Symbol::Macro(s) => &s.location,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Function(_) => SymbolKind::Function,
            Symbol::Enum(_) => SymbolKind::Enum,
            Symbol::Struct(_) => SymbolKind::Struct,
            Symbol::Typedef(_) => SymbolKind::Typedef,
            Symbol::Macro(_) => SymbolKind::Macro,
        }
    }

    pub fn identity(&self) -> SymbolIdentity {
        SymbolIdentity {
            name: self.name().to_string(),
            kind: self.kind(),
            scope: self.scope().clone(),
        }
    }

    /// Every type reference carried by this symbol, in declaration order
    pub fn type_references(&self) -> Vec<&TypeReference> {
        match self {
            Symbol::Function(f) => std::iter::once(&f.return_type)
                .chain(f.parameters.iter().map(|p| &p.ty))
                .collect(),
            Symbol::Enum(e) => vec![&e.underlying],
            Symbol::Struct(s) => s.fields.iter().map(|f| &f.ty).collect(),
            Symbol::Typedef(t) => vec![&t.target],
            Symbol::Macro(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CallingConvention {
    #[default]
    Cdecl,
    StdCall,
    FastCall,
    ThisCall,
    VectorCall,
    /// Platform default (StdCall on 32-bit Windows, Cdecl elsewhere)
    Winapi,
}

impl CallingConvention {
    /// Parse the frontend's spelling, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "cdecl" | "c" => Some(Self::Cdecl),
            "stdcall" => Some(Self::StdCall),
            "fastcall" => Some(Self::FastCall),
            "thiscall" => Some(Self::ThisCall),
            "vectorcall" => Some(Self::VectorCall),
            "winapi" => Some(Self::Winapi),
            _ => None,
        }
    }
}

/// Data flow direction of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    In,
    Out,
    InOut,
}

impl Direction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            "inout" | "in-out" | "ref" => Some(Self::InOut),
            _ => None,
        }
    }
}

/// Pointer/array shape of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    /// Pointer with the given indirection depth
    Pointer(usize),
    Array(Option<u64>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeReference,
    pub direction: Direction,
}

impl Parameter {
    pub fn shape(&self) -> Shape {
        match &self.ty {
            TypeReference::Pointer(_) => Shape::Pointer(self.ty.pointer_depth()),
            TypeReference::Array { length, .. } => Shape::Array(*length),
            _ => Shape::Scalar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSymbol {
    pub name: String,
    pub native_name: String,
    pub scope: Scope,
    pub location: Location,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeReference,
    pub calling_convention: CallingConvention,
    /// Identifier used for dynamic-linking lookup
    pub entry_point: String,
    pub is_variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    /// Raw value; literals wider than i64 keep their bit pattern
    pub value: i64,
    pub deprecated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumSymbol {
    pub name: String,
    pub native_name: String,
    pub scope: Scope,
    pub location: Location,
    pub underlying: TypeReference,
    pub members: Vec<EnumMember>,
    pub is_flags: bool,
}

impl EnumSymbol {
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: TypeReference,
    pub array_length: Option<u64>,
    pub bit_width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructSymbol {
    pub name: String,
    pub native_name: String,
    pub scope: Scope,
    pub location: Location,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedefSymbol {
    pub name: String,
    pub native_name: String,
    pub scope: Scope,
    pub location: Location,
    pub target: TypeReference,
}

/// Macro body; function-like macros are kept verbatim and never evaluated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MacroBody {
    Constant(String),
    Function {
        parameters: Vec<String>,
        expansion: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroSymbol {
    pub name: String,
    pub native_name: String,
    pub scope: Scope,
    pub location: Location,
    pub body: MacroBody,
}
