//! The Windows registry backend.
//!
//! [`Win32Api`] forwards every [`RegistryApi`] call to the matching
//! `advapi32` function. Names arrive without a terminator and are
//! null-terminated here, just before the call.

#![allow(unsafe_code)]

use crate::api::{Access, RawKey, RawKeyInfo, RegistryApi};
use crate::scoped::ScopedPtr;
use crate::status::RegResult;
use std::ffi::c_void;
use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Foundation::{LocalFree, FILETIME, HLOCAL, WIN32_ERROR};
use windows::Win32::System::Diagnostics::Debug::{
    FormatMessageW, FORMAT_MESSAGE_ALLOCATE_BUFFER, FORMAT_MESSAGE_FROM_SYSTEM,
    FORMAT_MESSAGE_IGNORE_INSERTS,
};
use windows::Win32::System::Registry::{
    RegCloseKey, RegCreateKeyExW, RegDeleteKeyExW, RegDeleteTreeW, RegDeleteValueW, RegEnumKeyExW,
    RegEnumValueW, RegFlushKey, RegGetValueW, RegOpenKeyExW, RegQueryInfoKeyW, RegQueryValueExW,
    RegSetValueExW, HKEY, REG_CREATE_KEY_DISPOSITION, REG_OPEN_CREATE_OPTIONS, REG_ROUTINE_FLAGS,
    REG_SAM_FLAGS, REG_VALUE_TYPE,
};

fn hkey(key: RawKey) -> HKEY {
    HKEY(key.0 as *mut c_void)
}

fn status(error: WIN32_ERROR) -> RegResult {
    RegResult::new(error.0 as i32)
}

fn terminated(name: &[u16]) -> Vec<u16> {
    let mut wide = Vec::with_capacity(name.len() + 1);
    wide.extend_from_slice(name);
    wide.push(0);
    wide
}

/// Registry access through `advapi32`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Win32Api;

impl RegistryApi for Win32Api {
    fn create_key(
        &self,
        parent: RawKey,
        sub_key: &[u16],
        options: u32,
        access: Access,
        result: &mut RawKey,
        disposition: &mut u32,
    ) -> RegResult {
        let sub_key = terminated(sub_key);
        let mut created = HKEY::default();
        let mut created_disposition = REG_CREATE_KEY_DISPOSITION::default();
        // SAFETY: every pointer refers to a live local for the whole call.
        let error = unsafe {
            RegCreateKeyExW(
                hkey(parent),
                PCWSTR(sub_key.as_ptr()),
                0,
                PCWSTR::null(),
                REG_OPEN_CREATE_OPTIONS(options),
                REG_SAM_FLAGS(access.0),
                None,
                &mut created,
                Some(&mut created_disposition),
            )
        };
        if error.is_ok() {
            *result = RawKey(created.0 as isize);
            *disposition = created_disposition.0;
        }
        status(error)
    }

    fn open_key(
        &self,
        parent: RawKey,
        sub_key: &[u16],
        access: Access,
        result: &mut RawKey,
    ) -> RegResult {
        let sub_key = terminated(sub_key);
        let mut opened = HKEY::default();
        // SAFETY: `sub_key` is null-terminated and outlives the call.
        let error = unsafe {
            RegOpenKeyExW(
                hkey(parent),
                PCWSTR(sub_key.as_ptr()),
                0,
                REG_SAM_FLAGS(access.0),
                &mut opened,
            )
        };
        if error.is_ok() {
            *result = RawKey(opened.0 as isize);
        }
        status(error)
    }

    fn close_key(&self, key: RawKey) -> RegResult {
        // SAFETY: closing a handle has no memory effects on our side.
        status(unsafe { RegCloseKey(hkey(key)) })
    }

    fn set_value(
        &self,
        key: RawKey,
        name: &[u16],
        value_type: u32,
        data: &[u8],
        cb_data: u32,
    ) -> RegResult {
        let name = terminated(name);
        let data = &data[..(cb_data as usize).min(data.len())];
        // SAFETY: `name` is null-terminated; the data slice carries its length.
        status(unsafe {
            RegSetValueExW(
                hkey(key),
                PCWSTR(name.as_ptr()),
                0,
                REG_VALUE_TYPE(value_type),
                Some(data),
            )
        })
    }

    fn get_value(
        &self,
        key: RawKey,
        name: &[u16],
        flags: u32,
        value_type: Option<&mut u32>,
        data: Option<&mut [u8]>,
        cb_data: &mut u32,
    ) -> RegResult {
        let name = terminated(name);
        let data = data.map(|buffer| {
            *cb_data = (*cb_data).min(buffer.len() as u32);
            buffer.as_mut_ptr() as *mut c_void
        });
        // SAFETY: `cb_data` never exceeds the length of the data buffer.
        status(unsafe {
            RegGetValueW(
                hkey(key),
                PCWSTR::null(),
                PCWSTR(name.as_ptr()),
                REG_ROUTINE_FLAGS(flags),
                value_type.map(|t| t as *mut u32 as *mut REG_VALUE_TYPE),
                data,
                Some(cb_data),
            )
        })
    }

    fn query_value(
        &self,
        key: RawKey,
        name: &[u16],
        value_type: Option<&mut u32>,
        cb_data: &mut u32,
    ) -> RegResult {
        let name = terminated(name);
        // SAFETY: no data buffer is passed; only the type and size are written.
        status(unsafe {
            RegQueryValueExW(
                hkey(key),
                PCWSTR(name.as_ptr()),
                None,
                value_type.map(|t| t as *mut u32 as *mut REG_VALUE_TYPE),
                None,
                Some(cb_data),
            )
        })
    }

    fn query_info_key(&self, key: RawKey, info: &mut RawKeyInfo) -> RegResult {
        let mut last_write = FILETIME::default();
        // SAFETY: every out-pointer refers to a field of `info` or a local.
        let error = unsafe {
            RegQueryInfoKeyW(
                hkey(key),
                PWSTR::null(),
                None,
                None,
                Some(&mut info.sub_keys),
                Some(&mut info.max_sub_key_len),
                None,
                Some(&mut info.values),
                Some(&mut info.max_value_name_len),
                Some(&mut info.max_value_len),
                None,
                Some(&mut last_write),
            )
        };
        info.last_write_time =
            (u64::from(last_write.dwHighDateTime) << 32) | u64::from(last_write.dwLowDateTime);
        status(error)
    }

    fn enum_key(&self, key: RawKey, index: u32, name: &mut [u16], cch_name: &mut u32) -> RegResult {
        *cch_name = (*cch_name).min(name.len() as u32);
        // SAFETY: `cch_name` never exceeds the length of `name`.
        status(unsafe {
            RegEnumKeyExW(
                hkey(key),
                index,
                PWSTR(name.as_mut_ptr()),
                cch_name,
                None,
                PWSTR::null(),
                None,
                None,
            )
        })
    }

    fn enum_value(
        &self,
        key: RawKey,
        index: u32,
        name: &mut [u16],
        cch_name: &mut u32,
        value_type: Option<&mut u32>,
    ) -> RegResult {
        *cch_name = (*cch_name).min(name.len() as u32);
        // SAFETY: `cch_name` never exceeds the length of `name`; no data is read.
        status(unsafe {
            RegEnumValueW(
                hkey(key),
                index,
                PWSTR(name.as_mut_ptr()),
                cch_name,
                None,
                value_type.map(|t| t as *mut u32),
                None,
                None,
            )
        })
    }

    fn delete_value(&self, key: RawKey, name: &[u16]) -> RegResult {
        let name = terminated(name);
        // SAFETY: `name` is null-terminated and outlives the call.
        status(unsafe { RegDeleteValueW(hkey(key), PCWSTR(name.as_ptr())) })
    }

    fn delete_key(&self, key: RawKey, sub_key: &[u16], access: Access) -> RegResult {
        let sub_key = terminated(sub_key);
        // SAFETY: `sub_key` is null-terminated and outlives the call.
        status(unsafe { RegDeleteKeyExW(hkey(key), PCWSTR(sub_key.as_ptr()), access.0, 0) })
    }

    fn delete_tree(&self, key: RawKey, sub_key: &[u16]) -> RegResult {
        let sub_key = terminated(sub_key);
        let sub_key = if sub_key.len() == 1 { PCWSTR::null() } else { PCWSTR(sub_key.as_ptr()) };
        // SAFETY: `sub_key` is null or null-terminated and outlives the call.
        status(unsafe { RegDeleteTreeW(hkey(key), sub_key) })
    }

    fn flush_key(&self, key: RawKey) -> RegResult {
        // SAFETY: flushing a handle has no memory effects on our side.
        status(unsafe { RegFlushKey(hkey(key)) })
    }
}

unsafe fn release_local(ptr: *mut u16) {
    let _ = LocalFree(HLOCAL(ptr as *mut c_void));
}

/// Looks up the system message for `code`.
///
/// Returns `None` when the system has no message for it.
pub(crate) fn format_system_message(code: u32, language_id: u32) -> Option<String> {
    let mut buffer = ScopedPtr::null(release_local);
    // SAFETY: with FORMAT_MESSAGE_ALLOCATE_BUFFER the system stores a
    // LocalAlloc'd pointer through `lpbuffer`; `buffer` frees it on drop.
    let len = unsafe {
        FormatMessageW(
            FORMAT_MESSAGE_ALLOCATE_BUFFER
                | FORMAT_MESSAGE_FROM_SYSTEM
                | FORMAT_MESSAGE_IGNORE_INSERTS,
            None,
            code,
            language_id,
            PWSTR(buffer.as_out_ptr() as *mut u16),
            0,
            None,
        )
    };
    if len == 0 || buffer.is_null() {
        return None;
    }

    // SAFETY: the system wrote `len` code units at the returned address.
    let wide = unsafe { std::slice::from_raw_parts(buffer.get(), len as usize) };
    let message = String::from_utf16_lossy(wide);
    Some(message.trim_end().to_string())
}
