//! Integration tests running the key API against the in-memory registry.

use winreg_kit::value::REG_MULTI_SZ;
use winreg_kit::*;

const TEST_KEY: &str = "Software\\winreg-kit\\Tests";

fn test_key(registry: &MemoryRegistry) -> RegKey<MemoryRegistry> {
    RegKey::created(registry.clone(), RawKey::HKEY_CURRENT_USER, TEST_KEY, Access::ALL)
        .expect("failed to create test key")
}

fn child_key(
    registry: &MemoryRegistry,
    parent: &RegKey<MemoryRegistry>,
    name: &str,
) -> RegKey<MemoryRegistry> {
    RegKey::created(registry.clone(), parent.raw(), name, Access::ALL)
        .expect("failed to create child key")
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

#[test]
fn test_dword_round_trip() {
    let registry = MemoryRegistry::new();
    let key = test_key(&registry);

    key.set_dword_value("TestValueDword", 0x1234ABCD).unwrap();
    assert_eq!(key.get_dword_value("TestValueDword").unwrap(), 0x1234ABCD);
    assert_eq!(key.query_value_type("TestValueDword").unwrap(), ValueType::Dword);

    let value = key.try_get_dword_value("TestValueDword");
    assert!(value.is_valid());
    assert_eq!(*value.value(), 0x1234ABCD);
}

#[test]
fn test_try_set_then_try_get() {
    let registry = MemoryRegistry::new();
    let key = test_key(&registry);

    assert!(key.try_set_qword_value("TestValueQword", 0xAABB_CCDD_1122_3344).is_ok());
    assert_eq!(key.try_get_qword_value("TestValueQword").into_value(), 0xAABB_CCDD_1122_3344);
    assert_eq!(key.query_value_type("TestValueQword").unwrap(), ValueType::Qword);
}

#[test]
fn test_string_round_trip() {
    let registry = MemoryRegistry::new();
    let key = test_key(&registry);

    key.set_string_value("TestValueString", "Hello World String").unwrap();
    assert_eq!(key.get_string_value("TestValueString").unwrap(), "Hello World String");
    assert_eq!(key.query_value_type("TestValueString").unwrap(), ValueType::String);

    key.set_string_value("Empty", "").unwrap();
    assert_eq!(key.get_string_value("Empty").unwrap(), "");

    key.set_string_value("Unicode", "caf\u{e9} \u{1F600}").unwrap();
    assert_eq!(key.get_string_value("Unicode").unwrap(), "caf\u{e9} \u{1F600}");
}

#[test]
fn test_expand_string() {
    std::env::set_var("WINREG_KIT_INTEGRATION_DIR", "C:\\Data");
    let registry = MemoryRegistry::new();
    let key = test_key(&registry);

    key.set_expand_string_value("TestValueExpandString", "%WINREG_KIT_INTEGRATION_DIR%\\logs")
        .unwrap();

    let raw = key
        .get_expand_string_value("TestValueExpandString", ExpandStringOption::DontExpand)
        .unwrap();
    assert_eq!(raw, "%WINREG_KIT_INTEGRATION_DIR%\\logs");

    let expanded = key
        .get_expand_string_value("TestValueExpandString", ExpandStringOption::Expand)
        .unwrap();
    assert_eq!(expanded, "C:\\Data\\logs");

    // the stored type is unchanged by expansion
    assert_eq!(
        key.query_value_type("TestValueExpandString").unwrap(),
        ValueType::ExpandString
    );
}

#[test]
fn test_multi_string_round_trip() {
    let registry = MemoryRegistry::new();
    let key = test_key(&registry);

    key.set_multi_string_value("TestValueMultiString", &["Hi", "Hello", "Ciao"])
        .unwrap();
    assert_eq!(
        key.get_multi_string_value("TestValueMultiString").unwrap(),
        vec!["Hi", "Hello", "Ciao"]
    );
    assert_eq!(
        key.query_value_type("TestValueMultiString").unwrap(),
        ValueType::MultiString
    );

    let owned = vec![String::from("a"), String::new(), String::from("b")];
    key.set_multi_string_value("WithEmpty", &owned).unwrap();
    assert_eq!(key.get_multi_string_value("WithEmpty").unwrap(), owned);

    key.set_multi_string_value::<&str>("EmptyList", &[]).unwrap();
    assert!(key.get_multi_string_value("EmptyList").unwrap().is_empty());
}

#[test]
fn test_binary_round_trip() {
    let registry = MemoryRegistry::new();
    let key = test_key(&registry);

    let data = [0xAAu8, 0xBB, 0xCC, 0x11, 0x22, 0x33];
    key.set_binary_value("TestValueBinary", &data).unwrap();
    assert_eq!(key.get_binary_value("TestValueBinary").unwrap(), data);

    key.set_binary_value("EmptyBinary", &[]).unwrap();
    assert!(key.get_binary_value("EmptyBinary").unwrap().is_empty());
    assert!(key.try_get_binary_value("EmptyBinary").is_valid());
}

#[test]
fn test_missing_value() {
    let registry = MemoryRegistry::new();
    let key = test_key(&registry);

    let err = key.get_dword_value("Missing").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.result_code().code(), codes::ERROR_FILE_NOT_FOUND);

    let value = key.try_get_string_value("Missing");
    assert!(!value.is_valid());
    assert_eq!(value.error().code(), codes::ERROR_FILE_NOT_FOUND);
}

#[test]
fn test_wrong_type_is_rejected() {
    let registry = MemoryRegistry::new();
    let key = test_key(&registry);

    key.set_string_value("Text", "not a number").unwrap();
    let value = key.try_get_dword_value("Text");
    assert_eq!(value.error().code(), codes::ERROR_UNSUPPORTED_TYPE);
}

#[test]
fn test_contains() {
    let registry = MemoryRegistry::new();
    let key = test_key(&registry);
    key.set_dword_value("Present", 1).unwrap();
    let _child = child_key(&registry, &key, "Child");

    assert!(key.contains_value("Present").unwrap());
    assert!(!key.contains_value("Absent").unwrap());
    assert!(key.contains_sub_key("Child").unwrap());
    assert!(!key.contains_sub_key("NoChild").unwrap());

    assert!(*key.try_contains_value("Present").value());
    assert!(!*key.try_contains_sub_key("NoChild").value());
}

#[test]
fn test_contains_propagates_other_errors() {
    let registry = MemoryRegistry::new();
    let key: RegKey<MemoryRegistry> = RegKey::new(registry);

    let err = key.contains_value("Anything").unwrap_err();
    assert_eq!(err.result_code().code(), codes::ERROR_INVALID_HANDLE);
    assert!(!key.try_contains_sub_key("Anything").is_valid());
}

#[test]
fn test_enumeration() {
    let registry = MemoryRegistry::new();
    let key = test_key(&registry);

    for name in ["Alpha", "Beta", "Gamma"] {
        let _child = child_key(&registry, &key, name);
    }
    key.set_dword_value("One", 1).unwrap();
    key.set_string_value("Two", "2").unwrap();
    key.set_binary_value("Three", &[3]).unwrap();

    let mut sub_keys = key.enum_sub_keys().unwrap();
    sub_keys.sort();
    assert_eq!(sub_keys, vec!["Alpha", "Beta", "Gamma"]);

    let mut values = key.enum_values().unwrap();
    values.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        values,
        vec![
            ("One".to_string(), ValueType::Dword),
            ("Three".to_string(), ValueType::Binary),
            ("Two".to_string(), ValueType::String),
        ]
    );

    let info = key.query_info_key().unwrap();
    assert_eq!(info.sub_keys, 3);
    assert_eq!(info.values, 3);
    assert_eq!(info.max_sub_key_name_len, 5);
    assert!(info.last_write_datetime().is_some());
}

#[test]
fn test_enumerate_empty_key() {
    let registry = MemoryRegistry::new();
    let key = test_key(&registry);

    assert!(key.enum_sub_keys().unwrap().is_empty());
    assert!(key.try_enum_values().into_value().is_empty());
}

#[test]
fn test_delete_operations() {
    let registry = MemoryRegistry::new();
    let key = test_key(&registry);

    key.set_dword_value("Doomed", 7).unwrap();
    key.delete_value("Doomed").unwrap();
    assert!(!key.contains_value("Doomed").unwrap());
    assert_eq!(key.try_delete_value("Doomed").code(), codes::ERROR_FILE_NOT_FOUND);

    {
        let leaf = child_key(&registry, &key, "Leaf");
        leaf.set_dword_value("x", 1).unwrap();
    }
    key.delete_key("Leaf", Access::WOW64_64KEY).unwrap();
    assert!(!key.contains_sub_key("Leaf").unwrap());

    {
        let _deep = child_key(&registry, &key, "Tree\\A\\B");
    }
    assert_eq!(
        key.try_delete_key("Tree", Access::WOW64_64KEY).code(),
        codes::ERROR_ACCESS_DENIED
    );
    key.delete_tree("Tree").unwrap();
    assert!(!key.contains_sub_key("Tree").unwrap());

    assert!(key.try_flush_key().is_ok());
}

#[test]
fn test_create_with_options() {
    let registry = MemoryRegistry::new();
    let mut key: RegKey<MemoryRegistry> = RegKey::new(registry.clone());

    let disposition = key
        .create_with_options(
            RawKey::HKEY_CURRENT_USER,
            "Volatile",
            Access::ALL,
            api::REG_OPTION_VOLATILE,
        )
        .unwrap();
    assert_eq!(disposition, CreateDisposition::CreatedNewKey);
    assert!(registry.is_volatile(key.raw()));

    let again = key.try_create_with_options(RawKey::HKEY_CURRENT_USER, "Volatile", Access::ALL, 0);
    assert_eq!(*again.value(), CreateDisposition::OpenedExistingKey);
    assert_eq!(registry.open_handles(), 1);
}

#[test]
fn test_open_existing_and_missing() {
    let registry = MemoryRegistry::new();
    let created = test_key(&registry);
    created.set_dword_value("Shared", 5).unwrap();

    let opened: RegKey<_> =
        RegKey::opened(registry.clone(), RawKey::HKEY_CURRENT_USER, TEST_KEY, Access::READ)
            .unwrap();
    assert_eq!(opened.get_dword_value("Shared").unwrap(), 5);
    assert_eq!(opened.try_set_dword_value("Shared", 6).code(), codes::ERROR_ACCESS_DENIED);

    let mut missing: RegKey<MemoryRegistry> = RegKey::new(registry);
    let status = missing.try_open(RawKey::HKEY_CURRENT_USER, "Software\\Nope", Access::READ);
    assert_eq!(status.code(), codes::ERROR_FILE_NOT_FOUND);
    assert!(!missing.is_valid());
}

#[test]
fn test_move_semantics() {
    let registry = MemoryRegistry::new();
    let mut first = test_key(&registry);
    let raw = first.raw();

    let second = first.take();
    assert!(!first.is_valid());
    assert_eq!(second.raw(), raw);
    assert_eq!(second.try_set_dword_value("Moved", 1).code(), 0);

    let mut third: RegKey<MemoryRegistry> = RegKey::new(registry.clone());
    let mut second = second;
    third.swap(&mut second);
    assert_eq!(third.raw(), raw);
    assert!(!second.is_valid());
    assert_eq!(registry.open_handles(), 1);
}

#[test]
fn test_handles_closed_on_drop() {
    let registry = MemoryRegistry::new();
    {
        let key = test_key(&registry);
        let _child = child_key(&registry, &key, "Child");
        assert_eq!(registry.open_handles(), 2);
    }
    assert_eq!(registry.open_handles(), 0);
}

#[test]
fn test_detach_and_attach() {
    let registry = MemoryRegistry::new();
    let mut key = test_key(&registry);

    let raw = key.detach();
    assert!(!key.is_valid());
    assert!(registry.is_open(raw));

    let adopted: RegKey<MemoryRegistry> = RegKey::from_raw(registry.clone(), raw);
    assert!(adopted.is_valid());
    drop(adopted);
    assert!(!registry.is_open(raw));
}

#[test]
fn test_wide_strings() {
    let registry = MemoryRegistry::new();
    let key = RegKey::<MemoryRegistry, WideStrings>::created(
        registry,
        RawKey::HKEY_CURRENT_USER,
        &wide(TEST_KEY),
        Access::ALL,
    )
    .unwrap();

    key.set_string_value(&wide("Name"), &wide("Value")).unwrap();
    assert_eq!(key.get_string_value(&wide("Name")).unwrap(), wide("Value"));

    let list = vec![wide("Hi"), wide("Hello")];
    key.set_multi_string_value(&wide("List"), &list).unwrap();
    assert_eq!(key.get_multi_string_value(&wide("List")).unwrap(), list);

    assert_eq!(key.enum_values().unwrap().len(), 2);
}

#[test]
fn test_invalid_multi_string_data() {
    let registry = MemoryRegistry::new();
    let key = test_key(&registry);

    // an odd byte count cannot be wide text
    let name = wide("Broken");
    let data = [0x41u8, 0x00, 0x42];
    let status = registry.set_value(key.raw(), &name, REG_MULTI_SZ, &data, data.len() as u32);
    assert!(status.is_ok());

    let err = key.get_multi_string_value("Broken").unwrap_err();
    assert!(matches!(err, RegistryError::InvalidFormat(_)));

    let value = key.try_get_multi_string_value("Broken");
    assert_eq!(value.error().code(), codes::ERROR_INVALID_DATA);
}

#[test]
fn test_error_messages() {
    let result = RegResult::new(codes::ERROR_FILE_NOT_FOUND);
    assert!(result.failed());
    assert!(!result.message().is_empty());
    assert!(result.to_string().contains("(2)"));

    let err = RegistryError::native(result, "RegOpenKeyExW");
    assert!(err.to_string().starts_with("RegOpenKeyExW failed"));
}

#[cfg(feature = "serde")]
#[test]
fn test_key_info_serialization() {
    let registry = MemoryRegistry::new();
    let key = test_key(&registry);
    key.set_dword_value("x", 1).unwrap();

    let info = key.query_info_key().unwrap();
    let json = serde_json::to_string(&info).unwrap();
    let back: KeyInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(back, info);

    let json = serde_json::to_string(&ValueType::MultiString).unwrap();
    assert_eq!(json, "\"MultiString\"");
}
