//! Unit tests for the value codecs.

use winreg_kit::*;

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

#[test]
fn test_multi_string_layout() {
    let buffer = multi_string::encode(&[wide("Hi"), wide("Hello"), wide("Ciao")]);
    assert_eq!(buffer.len(), 15);
    assert_eq!(&buffer[..3], &[0x48, 0x69, 0]);
    assert_eq!(&buffer[13..], &[0, 0]);
}

#[test]
fn test_multi_string_empty_list() {
    assert_eq!(multi_string::encode::<Vec<u16>>(&[]), vec![0, 0]);
    assert!(multi_string::decode(&[0, 0]).unwrap().is_empty());
}

#[test]
fn test_multi_string_keeps_empty_entries() {
    let strings = vec![wide("a"), Vec::new(), wide("b"), Vec::new()];
    let buffer = multi_string::encode(&strings);
    assert_eq!(buffer, vec![0x61, 0, 0, 0x62, 0, 0, 0]);
    assert_eq!(multi_string::decode(&buffer).unwrap(), strings);
}

#[test]
fn test_multi_string_malformed() {
    for buffer in [&[][..], &[0][..], &[0x41, 0][..], &[0x41, 0x42][..], &[0x41, 0, 0x42][..]] {
        let err = multi_string::decode(buffer).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidFormat(_)), "{:?}", buffer);
        assert_eq!(err.result_code().code(), codes::ERROR_INVALID_DATA);
    }
}

#[test]
fn test_string_conversion() {
    let native = utils::utf8_to_wide("Hello").unwrap();
    assert_eq!(native, wide("Hello"));
    assert_eq!(utils::wide_to_utf8(&native).unwrap(), "Hello");
    assert_eq!(utils::wide_to_utf8(&[]).unwrap(), "");

    let err = utils::wide_to_utf8(&[0xDC00]).unwrap_err();
    assert_eq!(err.result_code().code(), codes::ERROR_NO_UNICODE_TRANSLATION);
}

#[test]
fn test_size_cast() {
    assert_eq!(cast::safe_size_to_u32(4096).unwrap(), 4096);
    assert_eq!(cast::u32_to_size(u32::MAX), u32::MAX as usize);
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_size_cast_overflow() {
    let err = cast::safe_size_to_u32(usize::MAX).unwrap_err();
    assert!(matches!(err, RegistryError::Overflow { .. }));
    assert_eq!(err.result_code().code(), codes::ERROR_ARITHMETIC_OVERFLOW);
}

#[test]
fn test_value_type_names() {
    assert_eq!(reg_type_to_string(value::REG_NONE), "REG_NONE");
    assert_eq!(reg_type_to_string(value::REG_SZ), "REG_SZ");
    assert_eq!(reg_type_to_string(value::REG_EXPAND_SZ), "REG_EXPAND_SZ");
    assert_eq!(reg_type_to_string(value::REG_BINARY), "REG_BINARY");
    assert_eq!(reg_type_to_string(value::REG_DWORD), "REG_DWORD");
    assert_eq!(reg_type_to_string(value::REG_DWORD_BIG_ENDIAN), "REG_DWORD_BIG_ENDIAN");
    assert_eq!(reg_type_to_string(value::REG_LINK), "REG_LINK");
    assert_eq!(reg_type_to_string(value::REG_MULTI_SZ), "REG_MULTI_SZ");
    assert_eq!(reg_type_to_string(value::REG_RESOURCE_LIST), "REG_RESOURCE_LIST");
    assert_eq!(
        reg_type_to_string(value::REG_FULL_RESOURCE_DESCRIPTOR),
        "REG_FULL_RESOURCE_DESCRIPTOR"
    );
    assert_eq!(
        reg_type_to_string(value::REG_RESOURCE_REQUIREMENTS_LIST),
        "REG_RESOURCE_REQUIREMENTS_LIST"
    );
    assert_eq!(reg_type_to_string(value::REG_QWORD), "REG_QWORD");
    assert_eq!(reg_type_to_string(12), "Unknown/unsupported registry type");
}

#[test]
fn test_expected_conversions() {
    let ok: RegExpected<u32> = Ok::<u32, RegistryError>(5).into();
    assert_eq!(ok.into_result(), Ok(5));

    let failed: RegExpected<u32> =
        Err::<u32, RegistryError>(RegistryError::format_error("bad".into())).into();
    assert_eq!(failed.err(), Some(RegResult::new(codes::ERROR_INVALID_DATA)));
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn wide_string() -> impl Strategy<Value = Vec<u16>> {
        prop::collection::vec(1u16..=u16::MAX, 0..16)
    }

    proptest! {
        #[test]
        fn test_multi_string_round_trip(strings in prop::collection::vec(wide_string(), 0..8)) {
            // a lone empty string shares the empty list's encoding
            prop_assume!(strings != vec![Vec::<u16>::new()]);

            let buffer = multi_string::encode(&strings);
            let expected_len = strings.iter().map(|s| s.len() + 1).sum::<usize>() + 1;
            prop_assert_eq!(buffer.len(), expected_len.max(2));
            prop_assert_eq!(multi_string::decode(&buffer).unwrap(), strings);
        }

        #[test]
        fn test_decode_never_panics(buffer in prop::collection::vec(any::<u16>(), 0..32)) {
            let _ = multi_string::decode(&buffer);
        }

        #[test]
        fn test_utf8_round_trip(text in "[^\\x00]{0,32}") {
            let native = utils::utf8_to_wide(&text).unwrap();
            prop_assert_eq!(utils::wide_to_utf8(&native).unwrap(), text);
        }

        #[test]
        fn test_cast_matches_try_from(size in any::<usize>()) {
            prop_assert_eq!(cast::safe_size_to_u32(size).ok(), u32::try_from(size).ok());
        }

        #[test]
        fn test_value_type_tags(raw in any::<u32>()) {
            prop_assert_eq!(ValueType::from_u32(raw).as_u32(), raw);
        }
    }
}
