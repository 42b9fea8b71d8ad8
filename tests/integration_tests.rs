use serde::{Deserialize, Serialize};
use serde_rsn::{
    from_str, from_str_with_config, from_value, to_string, to_string_pretty,
    to_string_with_config, to_value, ErrorKind, Integer, KeywordEscape, ParseConfig, Value,
    WriteConfig,
};
use std::collections::{BTreeMap, HashMap};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    active: bool,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Product {
    sku: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Order {
    order_id: u32,
    customer: User,
    items: Vec<Product>,
    total: f64,
    note: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
enum Command {
    Quit,
    Move { x: i64, y: i64 },
    Write(String),
    Color(u8, u8, u8),
}

fn alice() -> User {
    User {
        id: 123,
        name: "Alice".to_string(),
        active: true,
        tags: vec!["admin".to_string(), "developer".to_string()],
    }
}

#[test]
fn test_simple_struct() {
    let user = alice();

    let rsn = to_string(&user).unwrap();
    println!("User RSN: {}", rsn);

    let user_back: User = from_str(&rsn).unwrap();
    assert_eq!(user, user_back);
}

#[test]
fn test_nested_struct() {
    let order = Order {
        order_id: 12345,
        customer: User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["vip".to_string()],
        },
        items: vec![
            Product {
                sku: "WIDGET-001".to_string(),
                price: 29.99,
                quantity: 2,
            },
            Product {
                sku: "GADGET-002".to_string(),
                price: 49.99,
                quantity: 1,
            },
        ],
        total: 109.97,
        note: None,
    };

    let rsn = to_string_pretty(&order).unwrap();
    println!("Order RSN:\n{}", rsn);
    assert!(rsn.starts_with("Order {\n  order_id: 12345,\n  customer: User {\n    id: 123,"));

    let order_back: Order = from_str(&rsn).unwrap();
    assert_eq!(order, order_back);
}

#[test]
fn test_enum_variants() {
    let commands = vec![
        Command::Quit,
        Command::Move { x: -1, y: 2 },
        Command::Write("hi".to_string()),
        Command::Color(255, 0, 128),
    ];

    let rsn = to_string(&commands).unwrap();
    assert_eq!(rsn, r#"[Quit,Move{x:-1,y:2},Write("hi"),Color(255,0,128)]"#);

    let back: Vec<Command> = from_str(&rsn).unwrap();
    assert_eq!(back, commands);
}

#[test]
fn test_handwritten_input() {
    let source = r#"
        // An order written by hand
        Order {
            order_id: 0x10,
            customer: {
                id: 1_000,
                name: r"C:\Users\bob",
                active: false,
                tags: [],
            },
            items: [
                Product { sku: "A", price: 1, quantity: 0b11 },
            ],
            total: 3e0,
            note: Some("fragile"), /* trailing comma allowed */
        }
    "#;

    let order: Order = from_str(source).unwrap();
    assert_eq!(order.order_id, 16);
    assert_eq!(order.customer.id, 1000);
    assert_eq!(order.customer.name, r"C:\Users\bob");
    assert_eq!(order.items[0].price, 1.0);
    assert_eq!(order.items[0].quantity, 3);
    assert_eq!(order.total, 3.0);
    assert_eq!(order.note.as_deref(), Some("fragile"));
}

#[test]
fn test_primitives() {
    assert_roundtrip(&42i32);
    assert_roundtrip(&3.5f64);
    assert_roundtrip(&true);
    assert_roundtrip(&false);
    assert_roundtrip(&'λ');
    assert_roundtrip(&"hello world".to_string());
    assert_roundtrip(&vec![1, 2, 3, 4, 5]);
    assert_roundtrip(&());
    assert_roundtrip(&(1u8, -2i16, "three".to_string()));
}

#[test]
fn test_write_configs() {
    let user = alice();

    let rsn = to_string_with_config(&user, &WriteConfig::new().with_anonymous_structs(true)).unwrap();
    assert!(rsn.starts_with("{id:123,"));
    let user_back: User = from_str(&rsn).unwrap();
    assert_eq!(user, user_back);

    let config = WriteConfig::pretty().with_implicit_map_at_root(true);
    let rsn = to_string_with_config(&user, &config).unwrap();
    assert!(rsn.starts_with("id: 123\nname: \"Alice\"\n"));
    let parse = ParseConfig::new().with_implicit_map_at_root(true);
    let user_back: User = from_str_with_config(&rsn, &parse).unwrap();
    assert_eq!(user, user_back);

    let config = WriteConfig::new().with_integer_suffixes(true);
    let rsn = to_string_with_config(&(1u8, 2u64, -3i16), &config).unwrap();
    assert_eq!(rsn, "(1u8,2,-3i16)");
}

#[test]
fn test_keyword_keys() {
    let mut map = BTreeMap::new();
    map.insert("true".to_string(), 1);
    map.insert("plain".to_string(), 2);

    // String keys stay strings; only identifiers need keyword escaping
    let rsn = to_string(&map).unwrap();
    assert_eq!(rsn, r#"{"plain":2,"true":1}"#);

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Flags {
        r#inf: bool,
    }

    let rsn = to_string(&Flags { r#inf: true }).unwrap();
    assert_eq!(rsn, "Flags{r#inf:true}");
    assert_eq!(from_str::<Flags>(&rsn).unwrap(), Flags { r#inf: true });

    let config = WriteConfig::new().with_keyword_escape(KeywordEscape::Quoted);
    let rsn = to_string_with_config(&Flags { r#inf: true }, &config).unwrap();
    assert_eq!(rsn, "Flags{\"inf\":true}");
    assert_eq!(from_str::<Flags>(&rsn).unwrap(), Flags { r#inf: true });
}

#[test]
fn test_to_value() {
    let value = to_value(&alice()).unwrap();

    let named = value.as_named().expect("named map");
    assert_eq!(named.name, "User");
    let fields = named.contents.as_map().expect("map contents");
    assert_eq!(fields.get_by_name("id"), Some(&Value::Integer(Integer::U32(123))));
    assert_eq!(fields.get_by_name("name").and_then(Value::as_str), Some("Alice"));
    assert_eq!(fields.get_by_name("active"), Some(&Value::Bool(true)));

    let tags = fields.get_by_name("tags").and_then(Value::as_list).expect("tags list");
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0], Value::from("admin"));

    assert_eq!(value.to_string(), to_string(&alice()).unwrap());
    let user_back: User = from_value(&value).unwrap();
    assert_eq!(user_back, alice());
}

#[test]
fn test_empty_collections() {
    let empty_vec: Vec<i32> = vec![];
    assert_roundtrip(&empty_vec);

    let empty_map: HashMap<String, u8> = HashMap::new();
    assert_roundtrip(&empty_map);

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Empty {}

    assert_eq!(to_string(&Empty {}).unwrap(), "Empty{}");
    assert_roundtrip(&Empty {});
}

#[test]
fn test_empty_tuples() {
    let empty: [u8; 0] = [];
    assert_eq!(to_string(&empty).unwrap(), "()");
    assert_roundtrip(&empty);

    let value = to_value(&empty).unwrap();
    assert_eq!(value, Value::Unit);
    let back: [u8; 0] = from_value(&value).unwrap();
    assert_eq!(back, empty);

    let items: Vec<u8> = from_str("()").unwrap();
    assert!(items.is_empty());

    // Only a zero-length tuple reads `()` as empty
    let err = from_str::<(u8, u8)>("()").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn test_special_strings() {
    let special_strings = vec![
        "".to_string(),
        "hello, world".to_string(),
        "line1\nline2".to_string(),
        "tab\there".to_string(),
        "quote \" and backslash \\".to_string(),
        "nul \0 and bell \u{7}".to_string(),
        "unicode: héllo wörld ☃".to_string(),
        "true".to_string(),
        "None".to_string(),
        "123".to_string(),
        "// not a comment".to_string(),
    ];

    for s in special_strings {
        println!("Testing string: {:?}", s);
        assert_roundtrip(&s);
    }
}

#[test]
fn test_numbers() {
    assert_roundtrip(&0i8);
    assert_roundtrip(&127i8);
    assert_roundtrip(&-128i8);
    assert_roundtrip(&32767i16);
    assert_roundtrip(&-32768i16);
    assert_roundtrip(&2147483647i32);
    assert_roundtrip(&-2147483648i32);
    assert_roundtrip(&9223372036854775807i64);
    assert_roundtrip(&-9223372036854775808i64);
    assert_roundtrip(&i128::MIN);
    assert_roundtrip(&u128::MAX);

    assert_roundtrip(&255u8);
    assert_roundtrip(&65535u16);
    assert_roundtrip(&4294967295u32);
    assert_roundtrip(&u64::MAX);

    assert_roundtrip(&0.0f32);
    assert_roundtrip(&3.5f32);
    assert_roundtrip(&-2.5f32);
    assert_roundtrip(&0.1f32);
    assert_roundtrip(&4.25f64);
    assert_roundtrip(&-5.75f64);
    assert_roundtrip(&f64::MAX);
    assert_roundtrip(&f64::INFINITY);
    assert_roundtrip(&f64::NEG_INFINITY);

    let nan: f64 = from_str(&to_string(&f64::NAN).unwrap()).unwrap();
    assert!(nan.is_nan());
}

#[test]
fn test_bytes() {
    #[derive(Serialize)]
    struct Blob {
        #[serde(serialize_with = "as_bytes")]
        data: Vec<u8>,
    }

    fn as_bytes<S: serde::Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(bytes)
    }

    let rsn = to_string(&Blob {
        data: vec![0, b'a', 0xff],
    })
    .unwrap();
    assert_eq!(rsn, r#"Blob{data:b"\0a\xff"}"#);

    let value = serde_rsn::parse(&rsn).unwrap();
    let fields = value.as_named().and_then(|named| named.contents.as_map()).unwrap();
    assert_eq!(fields.get_by_name("data").and_then(Value::as_bytes), Some(&[0, b'a', 0xff][..]));
}

#[test]
fn test_strict_duplicate_keys() {
    let source = "User { id: 1, name: \"a\", active: true, tags: [], id: 2 }";
    let err = from_str_with_config::<User>(source, &ParseConfig::strict()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateKeyRejected("id".to_string()));
    assert_eq!(err.offset(), Some(source.rfind("id").unwrap()));
}

#[test]
fn test_type_mismatch_reports_location() {
    let source = "User { id: \"one\", name: \"a\", active: true, tags: [] }";
    let err = from_str::<User>(source).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::TypeMismatch {
            expected: "u32".to_string(),
            found: "string \"one\"".to_string(),
        }
    );
    assert_eq!(err.offset(), Some(11));
    assert_eq!(err.to_string(), "expected u32, found string \"one\" at byte 11");
}

#[test]
fn test_json_interop() {
    let json = r#"{"name": "widget", "sizes": [1, 2.5, null], "enabled": true}"#;
    let value: serde_json::Value = serde_json::from_str(json).unwrap();

    let rsn = to_string(&value).unwrap();
    assert_eq!(rsn, r#"{"enabled":true,"name":"widget","sizes":[1,2.5,()]}"#);

    let back: serde_json::Value = from_str(&rsn).unwrap();
    assert_eq!(back, value);

    let tree = serde_rsn::parse(r#"{count: 3, items: [Red, "x"]}"#).unwrap();
    let as_json = serde_json::to_value(&tree).unwrap();
    assert_eq!(as_json, serde_json::json!({"count": 3, "items": ["Red", "x"]}));
}

fn assert_roundtrip<T>(original: &T)
where
    T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug,
{
    let rsn = to_string(original).unwrap();
    let deserialized: T = from_str(&rsn).unwrap();
    assert_eq!(*original, deserialized);

    let pretty = to_string_pretty(original).unwrap();
    let deserialized: T = from_str(&pretty).unwrap();
    assert_eq!(*original, deserialized);
}
