mod values;

#[cfg(test)]
mod tests;

pub use values::{evaluate, parse_literal};

use log::{debug, warn};
use std::collections::HashMap;

use crate::capture::Element;
use crate::frontend::LIBRARY_NAMESPACE_PLACEHOLDER;
use crate::model::{
    CallingConvention, Direction, EnumMember, EnumSymbol, Field, FunctionSymbol, Location,
    MacroBody, MacroSymbol, Parameter, Primitive, Scope, StructSymbol, Symbol, TypeReference,
    TypedefSymbol,
};
use crate::scraper::ScrapeError;

/// Element kinds the visitor understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Namespace,
    Class,
    Enumeration,
    Function,
    Struct,
    Typedef,
    Constant,
    Macro,
    Unknown(String),
}

impl ElementKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "namespace" => Self::Namespace,
            "class" => Self::Class,
            "enumeration" => Self::Enumeration,
            "function" => Self::Function,
            "struct" => Self::Struct,
            "typedef" => Self::Typedef,
            "constant" => Self::Constant,
            "macro" => Self::Macro,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Lazy walk over a bindings document producing symbols in document order
///
/// Stops after the first error. Re-creating the visitor over the same
/// document restarts the walk.
pub struct SymbolVisitor<'a> {
    stack: Vec<(&'a Element, Scope)>,
    pending: Vec<Symbol>,
    header: String,
    log_target: String,
}

impl<'a> SymbolVisitor<'a> {
    /// Visit the declarations below `root`
    ///
    /// # Arguments
    /// * `root` - The document's root element (e.g. `<bindings>`)
    /// * `header` - Location reported for declarations without one
    pub fn new(root: &'a Element, header: impl Into<String>, log_target: impl Into<String>) -> Self {
        let mut visitor = Self::empty(header, log_target);
        visitor.push_children(root, &Scope::global());
        visitor
    }

    /// A visitor that yields nothing
    pub fn empty(header: impl Into<String>, log_target: impl Into<String>) -> Self {
        Self {
            stack: Vec::new(),
            pending: Vec::new(),
            header: header.into(),
            log_target: log_target.into(),
        }
    }

    fn push_children(&mut self, element: &'a Element, scope: &Scope) {
        // reversed so the stack pops in document order
        for child in element.children.iter().rev() {
            self.stack.push((child, scope.clone()));
        }
    }

    fn visit(&mut self, element: &'a Element, scope: Scope) -> Result<(), ScrapeError> {
        match ElementKind::from_tag(&element.name) {
            ElementKind::Namespace => {
                let inner = match element.attr("name") {
                    Some(name) if name != LIBRARY_NAMESPACE_PLACEHOLDER => scope.child(name),
                    _ => scope,
                };
                self.push_children(element, &inner);
            }
            ElementKind::Class => {
                // static holder classes such as `Methods` only group functions
                let inner = match element.attr("name") {
                    Some(name) if !element.flag("static") => scope.child(name),
                    _ => scope,
                };
                self.push_children(element, &inner);
            }
            ElementKind::Enumeration => {
                let symbol = self.visit_enum(element, scope)?;
                self.pending.push(symbol);
            }
            ElementKind::Function => {
                let overloads = self.visit_function(element, scope)?;
                // drained from the back
                self.pending.extend(overloads.into_iter().rev());
            }
            ElementKind::Struct => {
                if element.flag("incomplete") {
                    debug!(
                        target: self.log_target.as_str(),
                        "Skipping forward declaration of {}",
                        element.attr("name").unwrap_or("<anonymous>")
                    );
                } else {
                    let symbol = self.visit_struct(element, scope)?;
                    self.pending.push(symbol);
                }
            }
            ElementKind::Typedef => {
                let name = required_name(element)?;
                let target = type_of(element, &scope);
                self.pending.push(Symbol::Typedef(TypedefSymbol {
                    native_name: native_name(element, name),
                    name: name.to_string(),
                    location: self.location(element),
                    scope,
                    target,
                }));
            }
            ElementKind::Constant if element.attr("kind") == Some("macro") => {
                let name = required_name(element)?;
                self.pending.push(Symbol::Macro(MacroSymbol {
                    native_name: native_name(element, name),
                    name: name.to_string(),
                    location: self.location(element),
                    scope,
                    body: MacroBody::Constant(code_of(element).to_string()),
                }));
            }
            ElementKind::Macro => {
                let name = required_name(element)?;
                let parameters = element
                    .attr("parameters")
                    .map(|list| {
                        list.split(',')
                            .map(str::trim)
                            .filter(|p| !p.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                self.pending.push(Symbol::Macro(MacroSymbol {
                    native_name: native_name(element, name),
                    name: name.to_string(),
                    location: self.location(element),
                    scope,
                    body: MacroBody::Function {
                        parameters,
                        expansion: code_of(element).to_string(),
                    },
                }));
            }
            ElementKind::Constant | ElementKind::Unknown(_) => {
                warn!(
                    target: self.log_target.as_str(),
                    "Skipping unrecognized element <{}> {}",
                    element.name,
                    element.attr("name").unwrap_or_default()
                );
            }
        }

        Ok(())
    }

    fn visit_enum(&self, element: &Element, scope: Scope) -> Result<Symbol, ScrapeError> {
        let name = required_name(element)?;
        let underlying = element
            .child("type")
            .map(|ty| TypeReference::parse(ty.text(), &scope))
            .unwrap_or(TypeReference::Primitive(Primitive::Int));

        let mut known = HashMap::new();
        let mut members = Vec::new();
        let mut next_value = 0i64;

        for enumerator in element.children_named("enumerator") {
            let member = required_name(enumerator)?;
            let code = code_of(enumerator);

            let value = if code.is_empty() {
                next_value
            } else {
                evaluate(code, &known).map_err(|reason| {
                    ScrapeError::MalformedDocument(format!("{}::{}: {}", name, member, reason))
                })?
            };

            known.insert(member.to_string(), value);
            next_value = value.wrapping_add(1);
            members.push(EnumMember {
                name: member.to_string(),
                value,
                deprecated: enumerator.flag("deprecated"),
            });
        }

        Ok(Symbol::Enum(EnumSymbol {
            native_name: native_name(element, name),
            name: name.to_string(),
            location: self.location(element),
            scope,
            underlying,
            members,
            is_flags: element.flag("flags"),
        }))
    }

    /// One symbol per combination of parameter type alternatives
    fn visit_function(&self, element: &Element, scope: Scope) -> Result<Vec<Symbol>, ScrapeError> {
        let name = required_name(element)?;
        let entry_point = element.attr("entrypoint").unwrap_or(name);
        let return_type = type_of(element, &scope);

        let calling_convention = match element.attr("convention") {
            None => CallingConvention::default(),
            Some(text) => CallingConvention::from_name(text).unwrap_or_else(|| {
                warn!(
                    target: self.log_target.as_str(),
                    "Unknown calling convention {} on {}, assuming Cdecl", text, name
                );
                CallingConvention::default()
            }),
        };

        let mut signatures: Vec<Vec<Parameter>> = vec![Vec::new()];
        for (index, param) in element.children_named("param").enumerate() {
            let param_name = param
                .attr("name")
                .map(str::to_string)
                .unwrap_or_else(|| format!("arg{}", index));
            let direction = param
                .attr("direction")
                .and_then(Direction::from_name)
                .unwrap_or_default();

            let alternatives = parameter_types(param, &scope);
            let param_name = &param_name;
            signatures = signatures
                .into_iter()
                .flat_map(|signature| {
                    alternatives.iter().map(move |ty| {
                        let mut signature = signature.clone();
                        signature.push(Parameter {
                            name: param_name.clone(),
                            ty: ty.clone(),
                            direction,
                        });
                        signature
                    })
                })
                .collect();
        }

        let location = self.location(element);
        Ok(signatures
            .into_iter()
            .map(|parameters| {
                Symbol::Function(FunctionSymbol {
                    name: name.to_string(),
                    native_name: native_name(element, entry_point),
                    scope: scope.clone(),
                    location: location.clone(),
                    parameters,
                    return_type: return_type.clone(),
                    calling_convention,
                    entry_point: entry_point.to_string(),
                    is_variadic: element.flag("variadic"),
                })
            })
            .collect())
    }

    fn visit_struct(&self, element: &Element, scope: Scope) -> Result<Symbol, ScrapeError> {
        let name = required_name(element)?;

        let mut fields = Vec::new();
        for field in element.children_named("field") {
            let ty = type_of(field, &scope);
            let array_length = field
                .attr("count")
                .and_then(|count| count.trim().parse().ok())
                .or(match &ty {
                    TypeReference::Array { length, .. } => *length,
                    _ => None,
                });

            fields.push(Field {
                name: required_name(field)?.to_string(),
                array_length,
                bit_width: field.attr("bits").and_then(|bits| bits.trim().parse().ok()),
                ty,
            });
        }

        Ok(Symbol::Struct(StructSymbol {
            native_name: native_name(element, name),
            name: name.to_string(),
            location: self.location(element),
            scope,
            fields,
        }))
    }

    /// `location="file:line"`, defaulting to the scraped header
    fn location(&self, element: &Element) -> Location {
        element
            .attr("location")
            .and_then(|text| text.rsplit_once(':'))
            .and_then(|(file, line)| Some(Location::new(file, line.trim().parse().ok()?)))
            .unwrap_or_else(|| Location::new(self.header.as_str(), 0))
    }
}

impl Iterator for SymbolVisitor<'_> {
    type Item = Result<Symbol, ScrapeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(symbol) = self.pending.pop() {
                return Some(Ok(symbol));
            }

            let (element, scope) = self.stack.pop()?;
            if let Err(e) = self.visit(element, scope) {
                self.stack.clear();
                self.pending.clear();
                return Some(Err(e));
            }
        }
    }
}

fn required_name(element: &Element) -> Result<&str, ScrapeError> {
    element.attr("name").ok_or_else(|| {
        ScrapeError::MalformedDocument(format!("<{}> without a name", element.name))
    })
}

fn native_name(element: &Element, fallback: &str) -> String {
    element.attr("nativeName").unwrap_or(fallback).to_string()
}

/// The element's `<type>` child, `void` when absent
fn type_of(element: &Element, scope: &Scope) -> TypeReference {
    element
        .child("type")
        .map(|ty| TypeReference::parse(ty.text(), scope))
        .unwrap_or_else(TypeReference::void)
}

/// `<value><code>..</code></value>`, `<code>..</code>` or bare text
fn code_of(element: &Element) -> &str {
    let holder = element.child("value").unwrap_or(element);
    holder.child("code").unwrap_or(holder).text()
}

/// A `native` spelling that differs from the mapped type fans out into the
/// raw native type first, then the mapped type.
fn parameter_types(param: &Element, scope: &Scope) -> Vec<TypeReference> {
    let Some(ty) = param.child("type") else {
        return vec![TypeReference::void()];
    };

    let mapped = TypeReference::parse(ty.text(), scope);
    match ty.attr("native").map(|native| TypeReference::parse(native, scope)) {
        Some(native) if native != mapped => vec![native, mapped],
        _ => vec![mapped],
    }
}
