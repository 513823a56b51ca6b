use serde::{Deserialize, Serialize};

use super::Scope;

/// Builtin C/C++ types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Void,
    Bool,
    Char,
    SChar,
    UChar,
    WChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
    LongDouble,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    /// intptr_t, ptrdiff_t, ssize_t
    ISize,
    /// uintptr_t, size_t
    USize,
}

impl Primitive {
    /// Look up a primitive by its normalized C spelling
    pub fn from_c_name(name: &str) -> Option<Self> {
        Some(match name {
            "void" => Self::Void,
            "bool" | "_Bool" => Self::Bool,
            "char" => Self::Char,
            "signed char" => Self::SChar,
            "unsigned char" => Self::UChar,
            "wchar_t" => Self::WChar,
            "short" | "short int" | "signed short" | "signed short int" => Self::Short,
            "unsigned short" | "unsigned short int" => Self::UShort,
            "int" | "signed" | "signed int" => Self::Int,
            "unsigned" | "unsigned int" => Self::UInt,
            "long" | "long int" | "signed long" | "signed long int" => Self::Long,
            "unsigned long" | "unsigned long int" => Self::ULong,
            "long long" | "long long int" | "signed long long" | "signed long long int" => {
                Self::LongLong
            }
            "unsigned long long" | "unsigned long long int" => Self::ULongLong,
            "float" => Self::Float,
            "double" => Self::Double,
            "long double" => Self::LongDouble,
            "int8_t" => Self::I8,
            "uint8_t" => Self::U8,
            "int16_t" => Self::I16,
            "uint16_t" => Self::U16,
            "int32_t" => Self::I32,
            "uint32_t" => Self::U32,
            "int64_t" => Self::I64,
            "uint64_t" => Self::U64,
            "intptr_t" | "ptrdiff_t" | "ssize_t" => Self::ISize,
            "uintptr_t" | "size_t" => Self::USize,
            _ => return None,
        })
    }
}

/// Resolvable reference to a type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeReference {
    Primitive(Primitive),
    /// Reference to an enum, struct or typedef, looked up from `scope` outward.
    ///
    /// A qualified spelling such as `gfx::Color` keeps `gfx` as the qualifier,
    /// resolved relative to each scope searched.
    Named {
        name: String,
        scope: Scope,
        #[serde(default, skip_serializing_if = "Scope::is_global")]
        qualifier: Scope,
    },
    Pointer(Box<TypeReference>),
    /// Fixed (`Some`) or unbounded (`None`) array
    Array {
        element: Box<TypeReference>,
        length: Option<u64>,
    },
}

/// Borrowed view of a named reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedTarget<'a> {
    pub name: &'a str,
    /// Scope the lookup starts from
    pub scope: &'a Scope,
    /// Path below each searched scope
    pub qualifier: &'a Scope,
}

const QUALIFIERS: &[&str] = &[
    "const", "volatile", "restrict", "__restrict", "struct", "enum", "union", "class",
];

impl TypeReference {
    pub fn void() -> Self {
        TypeReference::Primitive(Primitive::Void)
    }

    pub fn named(name: impl Into<String>, scope: Scope) -> Self {
        TypeReference::Named {
            name: name.into(),
            scope,
            qualifier: Scope::global(),
        }
    }

    /// Parse a C type spelling such as `const Color *` or `int[4]`.
    ///
    /// Function pointer spellings have no structural representation and
    /// collapse to `void *`.
    pub fn parse(text: &str, scope: &Scope) -> Self {
        let text = text.trim();

        if text.contains('(') {
            return TypeReference::Pointer(Box::new(Self::void()));
        }

        if let Some(open) = text.find('[') {
            let element = Self::parse(&text[..open], scope);
            let lengths: Vec<Option<u64>> = text[open..]
                .split('[')
                .filter_map(|dim| dim.split(']').next())
                .skip(1)
                .map(|dim| dim.trim().parse().ok())
                .collect();
            // int[2][3] is an array of 2 arrays of 3
            return lengths
                .into_iter()
                .rev()
                .fold(element, |inner, length| TypeReference::Array {
                    element: Box::new(inner),
                    length,
                });
        }

        let spaced = text.replace('*', " * ").replace('&', " & ");
        let mut words: Vec<&str> = spaced
            .split_whitespace()
            .filter(|word| !QUALIFIERS.contains(word))
            .collect();

        // qualifiers are gone, so every indirection token is trailing
        let mut depth = 0;
        while matches!(words.last(), Some(&"*") | Some(&"&")) {
            words.pop();
            depth += 1;
        }

        let normalized = words.join(" ");
        let base = match Primitive::from_c_name(&normalized) {
            Some(primitive) => TypeReference::Primitive(primitive),
            None if normalized.is_empty() => Self::void(),
            None => Self::qualified(&normalized, scope),
        };

        (0..depth).fold(base, |inner, _| TypeReference::Pointer(Box::new(inner)))
    }

    /// Split `a::b::Name` into qualifier and name; a leading `::` anchors the
    /// lookup at global scope
    fn qualified(spelling: &str, scope: &Scope) -> Self {
        let (scope, spelling) = match spelling.strip_prefix("::") {
            Some(rest) => (Scope::global(), rest),
            None => (scope.clone(), spelling),
        };

        match spelling.rsplit_once("::") {
            Some((qualifier, name)) => TypeReference::Named {
                name: name.trim().to_string(),
                scope,
                qualifier: Scope::parse(qualifier),
            },
            None => TypeReference::Named {
                name: spelling.to_string(),
                scope,
                qualifier: Scope::global(),
            },
        }
    }

    /// Innermost named type, looking through pointers and arrays
    pub fn named_target(&self) -> Option<NamedTarget<'_>> {
        match self {
            TypeReference::Named {
                name,
                scope,
                qualifier,
            } => Some(NamedTarget {
                name: name.as_str(),
                scope,
                qualifier,
            }),
            TypeReference::Pointer(inner) => inner.named_target(),
            TypeReference::Array { element, .. } => element.named_target(),
            TypeReference::Primitive(_) => None,
        }
    }

    pub fn pointer_depth(&self) -> usize {
        match self {
            TypeReference::Pointer(inner) => 1 + inner.pointer_depth(),
            _ => 0,
        }
    }

    pub fn is_named(&self, expected: &str) -> bool {
        matches!(self, TypeReference::Named { name, .. } if name == expected)
    }
}
