//! Registry value type tags.

use std::fmt;

/// Raw value of `REG_NONE`.
pub const REG_NONE: u32 = 0;
/// Raw value of `REG_SZ`.
pub const REG_SZ: u32 = 1;
/// Raw value of `REG_EXPAND_SZ`.
pub const REG_EXPAND_SZ: u32 = 2;
/// Raw value of `REG_BINARY`.
pub const REG_BINARY: u32 = 3;
/// Raw value of `REG_DWORD`.
pub const REG_DWORD: u32 = 4;
/// Raw value of `REG_DWORD_BIG_ENDIAN`.
pub const REG_DWORD_BIG_ENDIAN: u32 = 5;
/// Raw value of `REG_LINK`.
pub const REG_LINK: u32 = 6;
/// Raw value of `REG_MULTI_SZ`.
pub const REG_MULTI_SZ: u32 = 7;
/// Raw value of `REG_RESOURCE_LIST`.
pub const REG_RESOURCE_LIST: u32 = 8;
/// Raw value of `REG_FULL_RESOURCE_DESCRIPTOR`.
pub const REG_FULL_RESOURCE_DESCRIPTOR: u32 = 9;
/// Raw value of `REG_RESOURCE_REQUIREMENTS_LIST`.
pub const REG_RESOURCE_REQUIREMENTS_LIST: u32 = 10;
/// Raw value of `REG_QWORD`.
pub const REG_QWORD: u32 = 11;

/// Registry value data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    /// No value type.
    None,

    /// String (null-terminated).
    String,

    /// String with environment variables.
    ExpandString,

    /// Binary data.
    Binary,

    /// 32-bit little-endian integer.
    Dword,

    /// 32-bit big-endian integer.
    DwordBigEndian,

    /// Symbolic link (Unicode).
    Link,

    /// Multiple strings.
    MultiString,

    /// Resource list.
    ResourceList,

    /// Full resource descriptor.
    FullResourceDescriptor,

    /// Resource requirements list.
    ResourceRequirementsList,

    /// 64-bit little-endian integer.
    Qword,

    /// Unknown or non-standard value type.
    /// Contains the raw type value.
    Unknown(u32),
}

impl ValueType {
    /// Maps a raw type tag.
    ///
    /// Types 0-11 are predefined; any other value is kept as
    /// `ValueType::Unknown`.
    pub fn from_u32(value: u32) -> Self {
        match value {
            REG_NONE => ValueType::None,
            REG_SZ => ValueType::String,
            REG_EXPAND_SZ => ValueType::ExpandString,
            REG_BINARY => ValueType::Binary,
            REG_DWORD => ValueType::Dword,
            REG_DWORD_BIG_ENDIAN => ValueType::DwordBigEndian,
            REG_LINK => ValueType::Link,
            REG_MULTI_SZ => ValueType::MultiString,
            REG_RESOURCE_LIST => ValueType::ResourceList,
            REG_FULL_RESOURCE_DESCRIPTOR => ValueType::FullResourceDescriptor,
            REG_RESOURCE_REQUIREMENTS_LIST => ValueType::ResourceRequirementsList,
            REG_QWORD => ValueType::Qword,
            _ => ValueType::Unknown(value),
        }
    }

    /// Returns the raw type tag.
    pub fn as_u32(&self) -> u32 {
        match self {
            ValueType::None => REG_NONE,
            ValueType::String => REG_SZ,
            ValueType::ExpandString => REG_EXPAND_SZ,
            ValueType::Binary => REG_BINARY,
            ValueType::Dword => REG_DWORD,
            ValueType::DwordBigEndian => REG_DWORD_BIG_ENDIAN,
            ValueType::Link => REG_LINK,
            ValueType::MultiString => REG_MULTI_SZ,
            ValueType::ResourceList => REG_RESOURCE_LIST,
            ValueType::FullResourceDescriptor => REG_FULL_RESOURCE_DESCRIPTOR,
            ValueType::ResourceRequirementsList => REG_RESOURCE_REQUIREMENTS_LIST,
            ValueType::Qword => REG_QWORD,
            ValueType::Unknown(value) => *value,
        }
    }

    /// Returns the name of this value type.
    pub fn name(&self) -> &'static str {
        reg_type_to_string(self.as_u32())
    }
}

impl From<u32> for ValueType {
    fn from(value: u32) -> Self {
        Self::from_u32(value)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns a readable label for a raw type tag.
pub fn reg_type_to_string(reg_type: u32) -> &'static str {
    match reg_type {
        REG_NONE => "REG_NONE",
        REG_SZ => "REG_SZ",
        REG_EXPAND_SZ => "REG_EXPAND_SZ",
        REG_BINARY => "REG_BINARY",
        REG_DWORD => "REG_DWORD",
        REG_DWORD_BIG_ENDIAN => "REG_DWORD_BIG_ENDIAN",
        REG_LINK => "REG_LINK",
        REG_MULTI_SZ => "REG_MULTI_SZ",
        REG_RESOURCE_LIST => "REG_RESOURCE_LIST",
        REG_FULL_RESOURCE_DESCRIPTOR => "REG_FULL_RESOURCE_DESCRIPTOR",
        REG_RESOURCE_REQUIREMENTS_LIST => "REG_RESOURCE_REQUIREMENTS_LIST",
        REG_QWORD => "REG_QWORD",
        _ => "Unknown/unsupported registry type",
    }
}
