use super::*;
use crate::capture::Document;
use crate::model::Shape;

const TARGET: &str = "header_scraper::tests";

fn visit(xml: &str) -> Result<Vec<Symbol>, ScrapeError> {
    let document = Document::from_xml(xml)?;
    let root = document.root().expect("document has a root");
    SymbolVisitor::new(root, "test.h", TARGET).collect()
}

fn only_enum(symbols: &[Symbol]) -> &EnumSymbol {
    match symbols {
        [Symbol::Enum(e)] => e,
        other => panic!("expected a single enum, got {:?}", other),
    }
}

// ========================================================================
// Enumerations
// ========================================================================

#[test]
fn test_flags_enum_keeps_raw_values() {
    let symbols = visit(
        r#"<bindings>
  <enumeration name="Color" flags="true">
    <type>int</type>
    <enumerator name="RED"><value><code>1</code></value></enumerator>
    <enumerator name="GREEN"><value><code>2</code></value></enumerator>
    <enumerator name="BLUE"><value><code>4</code></value></enumerator>
    <enumerator name="WHITE"><value><code>RED | GREEN | BLUE</code></value></enumerator>
  </enumeration>
</bindings>"#,
    )
    .unwrap();

    let color = only_enum(&symbols);
    assert!(color.is_flags);
    let values: Vec<i64> = color.members.iter().map(|m| m.value).collect();
    assert_eq!(values, vec![1, 2, 4, 7]);
}

#[test]
fn test_implicit_values_count_up() {
    let symbols = visit(
        r#"<bindings>
  <enumeration name="Mode">
    <enumerator name="A"/>
    <enumerator name="B"/>
    <enumerator name="C"><value><code>10</code></value></enumerator>
    <enumerator name="D"/>
  </enumeration>
</bindings>"#,
    )
    .unwrap();

    let mode = only_enum(&symbols);
    assert!(!mode.is_flags);
    assert_eq!(mode.underlying, TypeReference::Primitive(Primitive::Int));
    let values: Vec<i64> = mode.members.iter().map(|m| m.value).collect();
    assert_eq!(values, vec![0, 1, 10, 11]);
}

#[test]
fn test_deprecated_member() {
    let symbols = visit(
        r#"<bindings>
  <enumeration name="Mode">
    <enumerator name="OLD" deprecated="true"><value><code>0x10</code></value></enumerator>
    <enumerator name="NEW"><value><code>1 &lt;&lt; 5</code></value></enumerator>
  </enumeration>
</bindings>"#,
    )
    .unwrap();

    let mode = only_enum(&symbols);
    assert!(mode.member("OLD").unwrap().deprecated);
    assert_eq!(mode.member("OLD").unwrap().value, 16);
    assert!(!mode.member("NEW").unwrap().deprecated);
    assert_eq!(mode.member("NEW").unwrap().value, 32);
}

#[test]
fn test_unparsable_value_is_malformed() {
    let result = visit(
        r#"<bindings>
  <enumeration name="Bad">
    <enumerator name="X"><value><code>sizeof(int)</code></value></enumerator>
  </enumeration>
</bindings>"#,
    );

    assert!(matches!(result, Err(ScrapeError::MalformedDocument(_))));
}

// ========================================================================
// Functions
// ========================================================================

#[test]
fn test_function_parameters_and_attributes() {
    let symbols = visit(
        r#"<bindings>
  <function name="ReadPixels" entrypoint="glReadPixels" convention="StdCall">
    <type>void</type>
    <param name="count"><type>int</type></param>
    <param name="data" direction="out"><type>void *</type></param>
    <param name="state" direction="inout"><type>float[4]</type></param>
  </function>
</bindings>"#,
    )
    .unwrap();

    let Symbol::Function(f) = &symbols[0] else {
        panic!("expected function");
    };
    assert_eq!(f.name, "ReadPixels");
    assert_eq!(f.entry_point, "glReadPixels");
    assert_eq!(f.native_name, "glReadPixels");
    assert_eq!(f.calling_convention, CallingConvention::StdCall);
    assert!(!f.is_variadic);

    let directions: Vec<Direction> = f.parameters.iter().map(|p| p.direction).collect();
    assert_eq!(directions, vec![Direction::In, Direction::Out, Direction::InOut]);
    assert_eq!(f.parameters[1].shape(), Shape::Pointer(1));
    assert_eq!(f.parameters[2].shape(), Shape::Array(Some(4)));
}

#[test]
fn test_native_type_fans_out_overloads() {
    let symbols = visit(
        r#"<bindings>
  <function name="BlitFramebuffer" entrypoint="glBlitFramebufferNV">
    <param name="mask"><type native="unsigned int">ClearBufferMask</type></param>
    <param name="filter"><type native="unsigned int">BlitFramebufferFilter</type></param>
  </function>
</bindings>"#,
    )
    .unwrap();

    assert_eq!(symbols.len(), 4);
    for symbol in &symbols {
        let Symbol::Function(f) = symbol else {
            panic!("expected function");
        };
        assert_eq!(f.name, "BlitFramebuffer");
        assert_eq!(f.entry_point, "glBlitFramebufferNV");
    }

    let Symbol::Function(first) = &symbols[0] else { unreachable!() };
    let Symbol::Function(last) = &symbols[3] else { unreachable!() };
    assert_eq!(first.parameters[0].ty, TypeReference::Primitive(Primitive::UInt));
    assert!(last.parameters[0].ty.is_named("ClearBufferMask"));
    assert!(last.parameters[1].ty.is_named("BlitFramebufferFilter"));
}

#[test]
fn test_matching_native_type_does_not_fan_out() {
    let symbols = visit(
        r#"<bindings>
  <function name="f"><param name="x"><type native="int">int</type></param></function>
</bindings>"#,
    )
    .unwrap();

    assert_eq!(symbols.len(), 1);
}

#[test]
fn test_unknown_convention_defaults_to_cdecl() {
    let symbols = visit(
        r#"<bindings><function name="f" convention="Pascal" variadic="true"/></bindings>"#,
    )
    .unwrap();

    let Symbol::Function(f) = &symbols[0] else {
        panic!("expected function");
    };
    assert_eq!(f.calling_convention, CallingConvention::Cdecl);
    assert!(f.is_variadic);
    assert_eq!(f.return_type, TypeReference::void());
}

// ========================================================================
// Structs, typedefs, macros
// ========================================================================

#[test]
fn test_struct_fields() {
    let symbols = visit(
        r#"<bindings>
  <struct name="Header" location="include/fmt.h:42">
    <field name="magic"><type>uint32_t</type></field>
    <field name="name" count="16"><type>char</type></field>
    <field name="samples"><type>short[8]</type></field>
    <field name="kind" bits="3"><type>unsigned int</type></field>
  </struct>
  <struct name="Opaque" incomplete="true"/>
</bindings>"#,
    )
    .unwrap();

    assert_eq!(symbols.len(), 1);
    let Symbol::Struct(header) = &symbols[0] else {
        panic!("expected struct");
    };
    assert_eq!(header.location, Location::new("include/fmt.h", 42));
    assert_eq!(header.fields.len(), 4);
    assert_eq!(header.fields[1].array_length, Some(16));
    assert_eq!(header.fields[2].array_length, Some(8));
    assert_eq!(header.fields[3].bit_width, Some(3));
    assert_eq!(header.fields[0].bit_width, None);
}

#[test]
fn test_typedef_and_macros() {
    let symbols = visit(
        r#"<bindings>
  <typedef name="GLenum"><type>unsigned int</type></typedef>
  <constant name="GL_TRUE" kind="macro"><type>int</type><value><code>1</code></value></constant>
  <macro name="MAX" parameters="a, b"><code>((a) &gt; (b) ? (a) : (b))</code></macro>
</bindings>"#,
    )
    .unwrap();

    assert_eq!(symbols.len(), 3);
    match &symbols[0] {
        Symbol::Typedef(t) => assert_eq!(t.target, TypeReference::Primitive(Primitive::UInt)),
        other => panic!("expected typedef, got {:?}", other),
    }
    match &symbols[1] {
        Symbol::Macro(m) => assert_eq!(m.body, MacroBody::Constant("1".to_string())),
        other => panic!("expected macro, got {:?}", other),
    }
    match &symbols[2] {
        Symbol::Macro(m) => assert_eq!(
            m.body,
            MacroBody::Function {
                parameters: vec!["a".to_string(), "b".to_string()],
                expansion: "((a) > (b) ? (a) : (b))".to_string(),
            }
        ),
        other => panic!("expected macro, got {:?}", other),
    }
}

// ========================================================================
// Traversal
// ========================================================================

#[test]
fn test_empty_root_yields_nothing() {
    assert!(visit("<bindings/>").unwrap().is_empty());
}

#[test]
fn test_unknown_elements_are_skipped() {
    let symbols = visit(
        r#"<bindings>
  <interop name="Future"/>
  <constant name="kValue" kind="enum"><value><code>1</code></value></constant>
  <typedef name="Handle"><type>void *</type></typedef>
</bindings>"#,
    )
    .unwrap();

    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].name(), "Handle");
}

#[test]
fn test_scopes_skip_placeholders_and_static_classes() {
    let symbols = visit(
        r#"<bindings>
  <namespace name="LIBRARY_NAMESPACE">
    <class name="Methods" static="true">
      <function name="Init"/>
    </class>
    <namespace name="gfx">
      <typedef name="Id"><type>int</type></typedef>
    </namespace>
  </namespace>
</bindings>"#,
    )
    .unwrap();

    assert_eq!(symbols.len(), 2);
    assert!(symbols[0].scope().is_global());
    assert_eq!(symbols[1].scope(), &Scope::parse("gfx"));
    assert!(symbols
        .iter()
        .all(|s| !s.scope().to_string().contains(LIBRARY_NAMESPACE_PLACEHOLDER)));
}

#[test]
fn test_visitor_restarts_over_same_document() {
    let document = Document::from_xml(
        r#"<bindings><typedef name="A"><type>int</type></typedef></bindings>"#,
    )
    .unwrap();
    let root = document.root().unwrap();

    let first: Vec<_> = SymbolVisitor::new(root, "test.h", TARGET).collect();
    let second: Vec<_> = SymbolVisitor::new(root, "test.h", TARGET).collect();
    assert_eq!(first.len(), 1);
    assert_eq!(first.len(), second.len());
}

#[test]
fn test_missing_name_stops_the_walk() {
    let document = Document::from_xml(
        r#"<bindings><typedef><type>int</type></typedef><typedef name="B"/></bindings>"#,
    )
    .unwrap();
    let mut visitor = SymbolVisitor::new(document.root().unwrap(), "test.h", TARGET);

    assert!(matches!(visitor.next(), Some(Err(ScrapeError::MalformedDocument(_)))));
    assert!(visitor.next().is_none());
}

// ========================================================================
// Values
// ========================================================================

#[test]
fn test_literal_forms() {
    assert_eq!(parse_literal("42"), Some(42));
    assert_eq!(parse_literal("0x1F"), Some(31));
    assert_eq!(parse_literal("0b101"), Some(5));
    assert_eq!(parse_literal("017"), Some(15));
    assert_eq!(parse_literal("4294967295u"), Some(4294967295));
    assert_eq!(parse_literal("0xFFFFFFFFFFFFFFFFULL"), Some(-1));
    assert_eq!(parse_literal("12abc"), None);
}

#[test]
fn test_expressions() {
    let mut known = HashMap::new();
    known.insert("A".to_string(), 1);
    known.insert("B".to_string(), 4);

    assert_eq!(evaluate("-1", &known), Ok(-1));
    assert_eq!(evaluate("A | B", &known), Ok(5));
    assert_eq!(evaluate("(A << 3) | B", &known), Ok(12));
    assert_eq!(evaluate("~0", &known), Ok(-1));
    assert!(evaluate("C", &known).is_err());
    assert!(evaluate("(A", &known).is_err());
    assert!(evaluate("A B", &known).is_err());
}

#[test]
fn test_binary_operators() {
    let mut known = HashMap::new();
    known.insert("A".to_string(), 6);

    assert_eq!(evaluate("A + 1", &known), Ok(7));
    assert_eq!(evaluate("A - 10", &known), Ok(-4));
    assert_eq!(evaluate("A * 2", &known), Ok(12));
    assert_eq!(evaluate("A / 4", &known), Ok(1));
    assert_eq!(evaluate("A % 4", &known), Ok(2));
    assert_eq!(evaluate("0xFF & ~0x0F", &known), Ok(0xF0));
    assert_eq!(evaluate("A ^ 3", &known), Ok(5));
    assert_eq!(evaluate("0x100 >> 4", &known), Ok(16));
    assert_eq!(evaluate("A == 6", &known), Ok(1));
    assert_eq!(evaluate("A != 6", &known), Ok(0));
    assert_eq!(evaluate("A >= 7 || A < 0", &known), Ok(0));
    assert_eq!(evaluate("A > 1 && !0", &known), Ok(1));
    assert_eq!(evaluate("A > 5 ? 10 : 20", &known), Ok(10));
    assert!(evaluate("A / 0", &known).is_err());
}

#[test]
fn test_operator_precedence() {
    let known = HashMap::new();

    assert_eq!(evaluate("(1 << 4) - 1", &known), Ok(15));
    assert_eq!(evaluate("1 << 4 - 1", &known), Ok(8));
    assert_eq!(evaluate("2 + 3 * 4", &known), Ok(14));
    assert_eq!(evaluate("10 - 4 - 3", &known), Ok(3));
    assert_eq!(evaluate("1 | 2 & 3", &known), Ok(3));
    assert_eq!(evaluate("-2 * -3", &known), Ok(6));
}

#[test]
fn test_casts_and_character_literals() {
    let mut known = HashMap::new();
    known.insert("A".to_string(), 2);

    assert_eq!(evaluate("(int)0x80000000", &known), Ok(-2147483648));
    assert_eq!(evaluate("(unsigned int)-1", &known), Ok(0xFFFF_FFFF));
    assert_eq!(evaluate("(unsigned char)0x1FF", &known), Ok(0xFF));
    assert_eq!(evaluate("(GLenum)0x8000", &known), Ok(0x8000));
    assert_eq!(evaluate("(A) + 1", &known), Ok(3));
    assert_eq!(evaluate("'A'", &known), Ok(65));
    assert_eq!(evaluate("'\\n'", &known), Ok(10));
}

#[test]
fn test_enum_with_arithmetic_values() {
    let symbols = visit(
        r#"<bindings>
  <enumeration name="Limits">
    <enumerator name="A"><value><code>4</code></value></enumerator>
    <enumerator name="B"><value><code>A + 1</code></value></enumerator>
    <enumerator name="MASK"><value><code>(1 &lt;&lt; 4) - 1</code></value></enumerator>
    <enumerator name="HIGH"><value><code>(int)0x80000000</code></value></enumerator>
  </enumeration>
</bindings>"#,
    )
    .unwrap();

    let limits = only_enum(&symbols);
    let values: Vec<i64> = limits.members.iter().map(|m| m.value).collect();
    assert_eq!(values, vec![4, 5, 15, -2147483648]);
}
