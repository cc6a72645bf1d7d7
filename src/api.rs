//! The native registry interface.
//!
//! [`RegistryApi`] mirrors the procedural Win32 registry calls one to one:
//! every method returns a [`RegResult`] and hands results back through
//! `&mut` out-parameters, with 32-bit sizes. Names are passed as wide
//! slices without a terminator. [`RegKey`](crate::RegKey) is the safe layer
//! on top; implementations of this trait are the store itself.

use crate::status::RegResult;
use crate::value::{REG_BINARY, REG_DWORD, REG_EXPAND_SZ, REG_MULTI_SZ, REG_NONE, REG_QWORD, REG_SZ};
use std::ops::BitOr;

/// An untyped native key handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawKey(pub isize);

impl RawKey {
    /// The null handle.
    pub const NULL: RawKey = RawKey(0);
    /// `HKEY_CLASSES_ROOT`.
    pub const HKEY_CLASSES_ROOT: RawKey = RawKey(0x8000_0000_u32 as i32 as isize);
    /// `HKEY_CURRENT_USER`.
    pub const HKEY_CURRENT_USER: RawKey = RawKey(0x8000_0001_u32 as i32 as isize);
    /// `HKEY_LOCAL_MACHINE`.
    pub const HKEY_LOCAL_MACHINE: RawKey = RawKey(0x8000_0002_u32 as i32 as isize);
    /// `HKEY_USERS`.
    pub const HKEY_USERS: RawKey = RawKey(0x8000_0003_u32 as i32 as isize);
    /// `HKEY_CURRENT_CONFIG`.
    pub const HKEY_CURRENT_CONFIG: RawKey = RawKey(0x8000_0005_u32 as i32 as isize);

    /// The predefined root handles.
    pub const PREDEFINED: [RawKey; 5] = [
        RawKey::HKEY_CLASSES_ROOT,
        RawKey::HKEY_CURRENT_USER,
        RawKey::HKEY_LOCAL_MACHINE,
        RawKey::HKEY_USERS,
        RawKey::HKEY_CURRENT_CONFIG,
    ];

    /// Returns true for the null handle.
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Returns true for a predefined root handle, which is never closed.
    pub fn is_predefined(&self) -> bool {
        (0x8000_0000_u32 as i32 as isize..=0x8000_0006_u32 as i32 as isize).contains(&self.0)
    }
}

/// Key access rights (`REGSAM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Access(pub u32);

impl Access {
    /// Required to query the values of a key.
    pub const QUERY_VALUE: Access = Access(0x0001);
    /// Required to create, delete, or set a value.
    pub const SET_VALUE: Access = Access(0x0002);
    /// Required to create a subkey.
    pub const CREATE_SUB_KEY: Access = Access(0x0004);
    /// Required to enumerate the subkeys of a key.
    pub const ENUMERATE_SUB_KEYS: Access = Access(0x0008);
    /// Required to request change notifications.
    pub const NOTIFY: Access = Access(0x0010);
    /// Reserved for system use.
    pub const CREATE_LINK: Access = Access(0x0020);
    /// Use the 64-bit registry view.
    pub const WOW64_64KEY: Access = Access(0x0100);
    /// Use the 32-bit registry view.
    pub const WOW64_32KEY: Access = Access(0x0200);
    /// `KEY_READ`.
    pub const READ: Access = Access(0x0002_0019);
    /// `KEY_WRITE`.
    pub const WRITE: Access = Access(0x0002_0006);
    /// `KEY_ALL_ACCESS`.
    pub const ALL: Access = Access(0x000F_003F);

    /// Returns true if every right in `other` is granted.
    pub fn contains(&self, other: Access) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Access {
    type Output = Access;

    fn bitor(self, rhs: Access) -> Access {
        Access(self.0 | rhs.0)
    }
}

impl Default for Access {
    fn default() -> Self {
        Access::ALL
    }
}

/// Key is preserved when the system restarts.
pub const REG_OPTION_NON_VOLATILE: u32 = 0x0000;
/// Key is lost when the system restarts.
pub const REG_OPTION_VOLATILE: u32 = 0x0001;

/// `create_key` created a new key.
pub const REG_CREATED_NEW_KEY: u32 = 0x0001;
/// `create_key` opened an existing key.
pub const REG_OPENED_EXISTING_KEY: u32 = 0x0002;

/// `get_value` flag: accept `REG_NONE`.
pub const RRF_RT_REG_NONE: u32 = 0x0000_0001;
/// `get_value` flag: accept `REG_SZ`.
pub const RRF_RT_REG_SZ: u32 = 0x0000_0002;
/// `get_value` flag: accept `REG_EXPAND_SZ`.
pub const RRF_RT_REG_EXPAND_SZ: u32 = 0x0000_0004;
/// `get_value` flag: accept `REG_BINARY`.
pub const RRF_RT_REG_BINARY: u32 = 0x0000_0008;
/// `get_value` flag: accept `REG_DWORD`.
pub const RRF_RT_REG_DWORD: u32 = 0x0000_0010;
/// `get_value` flag: accept `REG_MULTI_SZ`.
pub const RRF_RT_REG_MULTI_SZ: u32 = 0x0000_0020;
/// `get_value` flag: accept `REG_QWORD`.
pub const RRF_RT_REG_QWORD: u32 = 0x0000_0040;
/// `get_value` flag: accept any type.
pub const RRF_RT_ANY: u32 = 0x0000_FFFF;
/// `get_value` flag: return `REG_EXPAND_SZ` data unexpanded.
pub const RRF_NOEXPAND: u32 = 0x1000_0000;

/// Returns the `RRF_RT_*` bit that accepts `value_type`, or 0 if none does.
pub fn rrf_type_bit(value_type: u32) -> u32 {
    match value_type {
        REG_NONE => RRF_RT_REG_NONE,
        REG_SZ => RRF_RT_REG_SZ,
        REG_EXPAND_SZ => RRF_RT_REG_EXPAND_SZ,
        REG_BINARY => RRF_RT_REG_BINARY,
        REG_DWORD => RRF_RT_REG_DWORD,
        REG_MULTI_SZ => RRF_RT_REG_MULTI_SZ,
        REG_QWORD => RRF_RT_REG_QWORD,
        _ => 0,
    }
}

/// Key metadata as reported by `query_info_key`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawKeyInfo {
    /// Number of subkeys.
    pub sub_keys: u32,
    /// Longest subkey name, in code units, without terminator.
    pub max_sub_key_len: u32,
    /// Number of values.
    pub values: u32,
    /// Longest value name, in code units, without terminator.
    pub max_value_name_len: u32,
    /// Largest value data, in bytes.
    pub max_value_len: u32,
    /// Last write time as a Windows FILETIME.
    pub last_write_time: u64,
}

/// The procedural registry interface.
pub trait RegistryApi {
    /// Creates or opens `sub_key` under `parent` (RegCreateKeyExW).
    fn create_key(
        &self,
        parent: RawKey,
        sub_key: &[u16],
        options: u32,
        access: Access,
        result: &mut RawKey,
        disposition: &mut u32,
    ) -> RegResult;

    /// Opens an existing `sub_key` under `parent` (RegOpenKeyExW).
    fn open_key(
        &self,
        parent: RawKey,
        sub_key: &[u16],
        access: Access,
        result: &mut RawKey,
    ) -> RegResult;

    /// Closes a handle (RegCloseKey).
    fn close_key(&self, key: RawKey) -> RegResult;

    /// Writes a value (RegSetValueExW). `cb_data` is `data.len()`.
    fn set_value(
        &self,
        key: RawKey,
        name: &[u16],
        value_type: u32,
        data: &[u8],
        cb_data: u32,
    ) -> RegResult;

    /// Reads a value (RegGetValueW).
    ///
    /// With `data` set to `None`, only the required size is written to
    /// `cb_data`. Otherwise `cb_data` holds the buffer size on input; if the
    /// value does not fit, `ERROR_MORE_DATA` is returned along with the
    /// required size.
    fn get_value(
        &self,
        key: RawKey,
        name: &[u16],
        flags: u32,
        value_type: Option<&mut u32>,
        data: Option<&mut [u8]>,
        cb_data: &mut u32,
    ) -> RegResult;

    /// Reads the type and size of a value (RegQueryValueExW without data).
    fn query_value(
        &self,
        key: RawKey,
        name: &[u16],
        value_type: Option<&mut u32>,
        cb_data: &mut u32,
    ) -> RegResult;

    /// Reads key metadata (RegQueryInfoKeyW).
    fn query_info_key(&self, key: RawKey, info: &mut RawKeyInfo) -> RegResult;

    /// Reads the name of the subkey at `index` (RegEnumKeyExW).
    ///
    /// `cch_name` holds the buffer capacity including the terminator on
    /// input and the name length without terminator on output.
    fn enum_key(&self, key: RawKey, index: u32, name: &mut [u16], cch_name: &mut u32) -> RegResult;

    /// Reads the name and type of the value at `index` (RegEnumValueW).
    fn enum_value(
        &self,
        key: RawKey,
        index: u32,
        name: &mut [u16],
        cch_name: &mut u32,
        value_type: Option<&mut u32>,
    ) -> RegResult;

    /// Deletes a value (RegDeleteValueW).
    fn delete_value(&self, key: RawKey, name: &[u16]) -> RegResult;

    /// Deletes a subkey that has no subkeys of its own (RegDeleteKeyExW).
    fn delete_key(&self, key: RawKey, sub_key: &[u16], access: Access) -> RegResult;

    /// Deletes a subkey and everything below it (RegDeleteTreeW).
    fn delete_tree(&self, key: RawKey, sub_key: &[u16]) -> RegResult;

    /// Writes pending changes of a key to the backing store (RegFlushKey).
    fn flush_key(&self, key: RawKey) -> RegResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_handles() {
        for root in RawKey::PREDEFINED {
            assert!(root.is_predefined());
            assert!(!root.is_null());
        }
        assert!(!RawKey(0x1234).is_predefined());
        assert!(RawKey::NULL.is_null());
    }

    #[test]
    fn test_access_rights() {
        let access = Access::READ | Access::SET_VALUE;
        assert!(access.contains(Access::QUERY_VALUE));
        assert!(access.contains(Access::SET_VALUE));
        assert!(!Access::READ.contains(Access::SET_VALUE));
        assert!(Access::ALL.contains(Access::READ | Access::WRITE));
    }

    #[test]
    fn test_rrf_type_bits() {
        assert_eq!(rrf_type_bit(REG_MULTI_SZ), RRF_RT_REG_MULTI_SZ);
        assert_eq!(rrf_type_bit(REG_QWORD), RRF_RT_REG_QWORD);
        assert_eq!(rrf_type_bit(6), 0);
    }
}
