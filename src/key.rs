//! Owned registry key handles with typed value access.
//!
//! [`RegKey`] owns at most one native key handle and closes it when dropped.
//! Every operation comes in two forms:
//!
//! - the plain form returns [`Result`] and fails with a [`RegistryError`];
//! - the `try_` form never fails past its boundary and reports problems as a
//!   [`RegResult`] or a [`RegExpected`].
//!
//! Strings cross the boundary through the key's [`StringTraits`] parameter;
//! everything below it is wide.

use crate::api::{
    Access, RawKey, RawKeyInfo, RegistryApi, REG_CREATED_NEW_KEY, REG_OPTION_NON_VOLATILE,
    RRF_NOEXPAND, RRF_RT_REG_BINARY, RRF_RT_REG_DWORD, RRF_RT_REG_EXPAND_SZ, RRF_RT_REG_MULTI_SZ,
    RRF_RT_REG_QWORD, RRF_RT_REG_SZ,
};
use crate::cast::{safe_size_to_u32, u32_to_size};
use crate::error::{RegistryError, Result};
use crate::expected::RegExpected;
use crate::multi_string;
use crate::status::{codes, RegResult};
use crate::strings::{StringTraits, Utf8Strings};
use crate::utils::{
    bytes_to_wide, filetime_to_datetime, read_u32_le, read_u64_le, trim_terminator, wide_to_bytes,
};
use crate::value::{
    ValueType, REG_BINARY, REG_DWORD, REG_EXPAND_SZ, REG_MULTI_SZ, REG_QWORD, REG_SZ,
};
use chrono::{DateTime, Utc};
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, instrument, warn};

/// Attempts made to read a value whose size keeps changing under us.
pub const MAX_QUERY_ATTEMPTS: usize = 4;

/// Whether `create_with_options` made a new key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreateDisposition {
    /// The key did not exist and was created.
    CreatedNewKey,
    /// The key already existed and was opened.
    OpenedExistingKey,
}

/// How `REG_EXPAND_SZ` data is returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpandStringOption {
    /// Return the data as stored.
    #[default]
    DontExpand,
    /// Replace `%NAME%` references with environment values.
    Expand,
}

/// Key metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyInfo {
    /// Number of subkeys.
    pub sub_keys: u32,
    /// Number of values.
    pub values: u32,
    /// Longest subkey name, in code units.
    pub max_sub_key_name_len: u32,
    /// Longest value name, in code units.
    pub max_value_name_len: u32,
    /// Largest value data, in bytes.
    pub max_value_data_len: u32,
    /// Last write time as a Windows FILETIME.
    pub last_write_time: u64,
}

impl KeyInfo {
    /// Returns the last write time as a UTC timestamp.
    pub fn last_write_datetime(&self) -> Option<DateTime<Utc>> {
        filetime_to_datetime(self.last_write_time)
    }
}

impl From<RawKeyInfo> for KeyInfo {
    fn from(raw: RawKeyInfo) -> Self {
        Self {
            sub_keys: raw.sub_keys,
            values: raw.values,
            max_sub_key_name_len: raw.max_sub_key_len,
            max_value_name_len: raw.max_value_name_len,
            max_value_data_len: raw.max_value_len,
            last_write_time: raw.last_write_time,
        }
    }
}

fn check(result: RegResult, context: &'static str) -> Result<()> {
    if result.failed() {
        return Err(RegistryError::native(result, context));
    }
    Ok(())
}

fn to_status(result: Result<()>) -> RegResult {
    match result {
        Ok(()) => RegResult::success(),
        Err(err) => err.result_code(),
    }
}

/// An owned registry key handle.
///
/// A `RegKey` is either open, owning exactly one native handle, or closed.
/// Moving it moves the handle; [`RegKey::take`] moves the handle out of a
/// key that stays in place and leaves that key closed. Predefined root
/// handles may be attached but are never closed.
///
/// There is no internal synchronization: share a key between threads only
/// behind your own lock, or give each thread its own key.
pub struct RegKey<A: RegistryApi, S: StringTraits = Utf8Strings> {
    api: A,
    hkey: Option<RawKey>,
    strings: PhantomData<S>,
}

impl<A: RegistryApi, S: StringTraits> RegKey<A, S> {
    /// Creates a closed key bound to `api`.
    pub fn new(api: A) -> Self {
        Self {
            api,
            hkey: None,
            strings: PhantomData,
        }
    }

    /// Takes ownership of an open native handle.
    pub fn from_raw(api: A, hkey: RawKey) -> Self {
        let mut key = Self::new(api);
        key.attach(hkey);
        key
    }

    /// Creates (or opens) `sub_key` under `parent` and returns the owning key.
    pub fn created(api: A, parent: RawKey, sub_key: &S::Borrowed, access: Access) -> Result<Self> {
        let mut key = Self::new(api);
        key.create(parent, sub_key, access)?;
        Ok(key)
    }

    /// Opens the existing `sub_key` under `parent` and returns the owning key.
    pub fn opened(api: A, parent: RawKey, sub_key: &S::Borrowed, access: Access) -> Result<Self> {
        let mut key = Self::new(api);
        key.open(parent, sub_key, access)?;
        Ok(key)
    }

    /// Returns the native API this key talks to.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Returns the owned handle, or the null handle if the key is closed.
    pub fn raw(&self) -> RawKey {
        self.hkey.unwrap_or(RawKey::NULL)
    }

    /// Returns true if the key owns an open handle.
    pub fn is_valid(&self) -> bool {
        self.hkey.is_some()
    }

    /// Closes the owned handle, if any. Closing a closed key does nothing.
    pub fn close(&mut self) {
        let Some(hkey) = self.hkey.take() else {
            return;
        };
        if hkey.is_predefined() {
            return;
        }

        let result = self.api.close_key(hkey);
        if result.failed() {
            warn!(handle = hkey.0, code = result.code(), "failed to close registry key");
        }
    }

    /// Gives up ownership of the handle without closing it.
    pub fn detach(&mut self) -> RawKey {
        self.hkey.take().unwrap_or(RawKey::NULL)
    }

    /// Takes ownership of `hkey`, closing any handle owned before.
    pub fn attach(&mut self, hkey: RawKey) {
        if self.hkey == Some(hkey) {
            return;
        }
        self.close();
        if !hkey.is_null() {
            self.hkey = Some(hkey);
        }
    }

    /// Exchanges the contents of two keys.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Moves the handle into a new key, leaving this one closed.
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        Self {
            api: self.api.clone(),
            hkey: self.hkey.take(),
            strings: PhantomData,
        }
    }

    fn native(s: &S::Borrowed) -> Result<Vec<u16>> {
        let wide = S::to_native(s)?;
        if wide.contains(&0) {
            return Err(RegistryError::invalid_string("embedded null in registry name or string"));
        }
        Ok(wide)
    }

    // ---------------------------------------------------------------------
    // Open / create
    // ---------------------------------------------------------------------

    /// Creates or opens `sub_key` under `parent` and takes ownership of it.
    ///
    /// On success any handle owned before is closed.
    pub fn create(&mut self, parent: RawKey, sub_key: &S::Borrowed, access: Access) -> Result<()> {
        self.create_with_options(parent, sub_key, access, REG_OPTION_NON_VOLATILE)
            .map(|_| ())
    }

    /// Like [`RegKey::create`], with `REG_OPTION_*` flags and the disposition.
    #[instrument(skip(self, sub_key))]
    pub fn create_with_options(
        &mut self,
        parent: RawKey,
        sub_key: &S::Borrowed,
        access: Access,
        options: u32,
    ) -> Result<CreateDisposition> {
        let sub_key = Self::native(sub_key)?;
        let mut hkey = RawKey::NULL;
        let mut disposition = 0;
        check(
            self.api.create_key(parent, &sub_key, options, access, &mut hkey, &mut disposition),
            "RegCreateKeyExW",
        )?;

        self.attach(hkey);
        let disposition = if disposition == REG_CREATED_NEW_KEY {
            CreateDisposition::CreatedNewKey
        } else {
            CreateDisposition::OpenedExistingKey
        };
        debug!(handle = hkey.0, ?disposition, "registry key created");
        Ok(disposition)
    }

    /// Non-throwing [`RegKey::create`].
    pub fn try_create(
        &mut self,
        parent: RawKey,
        sub_key: &S::Borrowed,
        access: Access,
    ) -> RegResult {
        to_status(self.create(parent, sub_key, access))
    }

    /// Non-throwing [`RegKey::create_with_options`].
    pub fn try_create_with_options(
        &mut self,
        parent: RawKey,
        sub_key: &S::Borrowed,
        access: Access,
        options: u32,
    ) -> RegExpected<CreateDisposition> {
        self.create_with_options(parent, sub_key, access, options).into()
    }

    /// Opens the existing `sub_key` under `parent` and takes ownership of it.
    ///
    /// On success any handle owned before is closed.
    #[instrument(skip(self, sub_key))]
    pub fn open(&mut self, parent: RawKey, sub_key: &S::Borrowed, access: Access) -> Result<()> {
        let sub_key = Self::native(sub_key)?;
        let mut hkey = RawKey::NULL;
        check(self.api.open_key(parent, &sub_key, access, &mut hkey), "RegOpenKeyExW")?;

        self.attach(hkey);
        debug!(handle = hkey.0, "registry key opened");
        Ok(())
    }

    /// Non-throwing [`RegKey::open`].
    pub fn try_open(&mut self, parent: RawKey, sub_key: &S::Borrowed, access: Access) -> RegResult {
        to_status(self.open(parent, sub_key, access))
    }

    // ---------------------------------------------------------------------
    // Writing values
    // ---------------------------------------------------------------------

    fn set_raw(&self, name: &S::Borrowed, value_type: u32, data: &[u8]) -> Result<()> {
        let name = Self::native(name)?;
        let cb_data = safe_size_to_u32(data.len())?;
        check(
            self.api.set_value(self.raw(), &name, value_type, data, cb_data),
            "RegSetValueExW",
        )
    }

    fn terminated_string(value: &S::Borrowed) -> Result<Vec<u8>> {
        let mut wide = Self::native(value)?;
        wide.push(0);
        Ok(wide_to_bytes(&wide))
    }

    /// Writes a `REG_DWORD` value.
    pub fn set_dword_value(&self, name: &S::Borrowed, data: u32) -> Result<()> {
        self.set_raw(name, REG_DWORD, &data.to_le_bytes())
    }

    /// Writes a `REG_QWORD` value.
    pub fn set_qword_value(&self, name: &S::Borrowed, data: u64) -> Result<()> {
        self.set_raw(name, REG_QWORD, &data.to_le_bytes())
    }

    /// Writes a `REG_SZ` value.
    pub fn set_string_value(&self, name: &S::Borrowed, data: &S::Borrowed) -> Result<()> {
        self.set_raw(name, REG_SZ, &Self::terminated_string(data)?)
    }

    /// Writes a `REG_EXPAND_SZ` value.
    pub fn set_expand_string_value(&self, name: &S::Borrowed, data: &S::Borrowed) -> Result<()> {
        self.set_raw(name, REG_EXPAND_SZ, &Self::terminated_string(data)?)
    }

    /// Writes a `REG_MULTI_SZ` value.
    pub fn set_multi_string_value<V: AsRef<S::Borrowed>>(
        &self,
        name: &S::Borrowed,
        data: &[V],
    ) -> Result<()> {
        let strings = data
            .iter()
            .map(|s| Self::native(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let buffer = multi_string::encode(&strings);
        self.set_raw(name, REG_MULTI_SZ, &wide_to_bytes(&buffer))
    }

    /// Writes a `REG_BINARY` value.
    pub fn set_binary_value(&self, name: &S::Borrowed, data: &[u8]) -> Result<()> {
        let head = hex::encode(&data[..data.len().min(16)]);
        debug!(len = data.len(), %head, "writing binary value");
        self.set_raw(name, REG_BINARY, data)
    }

    /// Non-throwing [`RegKey::set_dword_value`].
    pub fn try_set_dword_value(&self, name: &S::Borrowed, data: u32) -> RegResult {
        to_status(self.set_dword_value(name, data))
    }

    /// Non-throwing [`RegKey::set_qword_value`].
    pub fn try_set_qword_value(&self, name: &S::Borrowed, data: u64) -> RegResult {
        to_status(self.set_qword_value(name, data))
    }

    /// Non-throwing [`RegKey::set_string_value`].
    pub fn try_set_string_value(&self, name: &S::Borrowed, data: &S::Borrowed) -> RegResult {
        to_status(self.set_string_value(name, data))
    }

    /// Non-throwing [`RegKey::set_expand_string_value`].
    pub fn try_set_expand_string_value(&self, name: &S::Borrowed, data: &S::Borrowed) -> RegResult {
        to_status(self.set_expand_string_value(name, data))
    }

    /// Non-throwing [`RegKey::set_multi_string_value`].
    pub fn try_set_multi_string_value<V: AsRef<S::Borrowed>>(
        &self,
        name: &S::Borrowed,
        data: &[V],
    ) -> RegResult {
        to_status(self.set_multi_string_value(name, data))
    }

    /// Non-throwing [`RegKey::set_binary_value`].
    pub fn try_set_binary_value(&self, name: &S::Borrowed, data: &[u8]) -> RegResult {
        to_status(self.set_binary_value(name, data))
    }

    // ---------------------------------------------------------------------
    // Reading values
    // ---------------------------------------------------------------------

    /// Reads a fixed-size value with a single call.
    fn query_fixed<const N: usize>(
        &self,
        name: &S::Borrowed,
        flags: u32,
    ) -> Result<([u8; N], usize)> {
        let name = Self::native(name)?;
        let mut data = [0u8; N];
        let mut cb_data = safe_size_to_u32(N)?;
        check(
            self.api.get_value(self.raw(), &name, flags, None, Some(&mut data), &mut cb_data),
            "RegGetValueW",
        )?;
        Ok((data, u32_to_size(cb_data)))
    }

    /// Reads a variable-size value: probe the size, then fill a buffer of
    /// exactly that size. If the value grows in between, probe again.
    fn query_sized(&self, name: &S::Borrowed, flags: u32) -> Result<Vec<u8>> {
        let name = Self::native(name)?;
        let hkey = self.raw();

        for attempt in 1..=MAX_QUERY_ATTEMPTS {
            let mut cb_data = 0u32;
            check(
                self.api.get_value(hkey, &name, flags, None, None, &mut cb_data),
                "RegGetValueW",
            )?;

            let mut data = vec![0u8; u32_to_size(cb_data)];
            let result = self
                .api
                .get_value(hkey, &name, flags, None, Some(&mut data), &mut cb_data);
            if result.code() == codes::ERROR_MORE_DATA {
                debug!(attempt, required = cb_data, "value grew between size probe and read");
                continue;
            }
            check(result, "RegGetValueW")?;

            data.truncate(u32_to_size(cb_data));
            return Ok(data);
        }

        Err(RegistryError::native(
            RegResult::new(codes::ERROR_MORE_DATA),
            "RegGetValueW",
        ))
    }

    fn query_string(&self, name: &S::Borrowed, flags: u32) -> Result<S::Owned> {
        let mut wide = bytes_to_wide(&self.query_sized(name, flags)?)?;
        trim_terminator(&mut wide);
        S::construct_from_native(&wide)
    }

    /// Reads a `REG_DWORD` value.
    pub fn get_dword_value(&self, name: &S::Borrowed) -> Result<u32> {
        let (data, len) = self.query_fixed::<4>(name, RRF_RT_REG_DWORD)?;
        read_u32_le(&data[..len])
    }

    /// Reads a `REG_QWORD` value.
    pub fn get_qword_value(&self, name: &S::Borrowed) -> Result<u64> {
        let (data, len) = self.query_fixed::<8>(name, RRF_RT_REG_QWORD)?;
        read_u64_le(&data[..len])
    }

    /// Reads a `REG_SZ` value.
    pub fn get_string_value(&self, name: &S::Borrowed) -> Result<S::Owned> {
        self.query_string(name, RRF_RT_REG_SZ)
    }

    /// Reads a `REG_EXPAND_SZ` value.
    ///
    /// With [`ExpandStringOption::Expand`] the registry expands the data and
    /// reports it as `REG_SZ`, so plain `REG_SZ` values are accepted too.
    pub fn get_expand_string_value(
        &self,
        name: &S::Borrowed,
        option: ExpandStringOption,
    ) -> Result<S::Owned> {
        let flags = match option {
            ExpandStringOption::DontExpand => RRF_RT_REG_EXPAND_SZ | RRF_NOEXPAND,
            ExpandStringOption::Expand => RRF_RT_REG_SZ,
        };
        self.query_string(name, flags)
    }

    /// Reads a `REG_MULTI_SZ` value.
    pub fn get_multi_string_value(&self, name: &S::Borrowed) -> Result<Vec<S::Owned>> {
        let wide = bytes_to_wide(&self.query_sized(name, RRF_RT_REG_MULTI_SZ)?)?;
        multi_string::decode(&wide)?
            .iter()
            .map(|s| S::construct_from_native(s))
            .collect()
    }

    /// Reads a `REG_BINARY` value.
    pub fn get_binary_value(&self, name: &S::Borrowed) -> Result<Vec<u8>> {
        self.query_sized(name, RRF_RT_REG_BINARY)
    }

    /// Non-throwing [`RegKey::get_dword_value`].
    pub fn try_get_dword_value(&self, name: &S::Borrowed) -> RegExpected<u32> {
        self.get_dword_value(name).into()
    }

    /// Non-throwing [`RegKey::get_qword_value`].
    pub fn try_get_qword_value(&self, name: &S::Borrowed) -> RegExpected<u64> {
        self.get_qword_value(name).into()
    }

    /// Non-throwing [`RegKey::get_string_value`].
    pub fn try_get_string_value(&self, name: &S::Borrowed) -> RegExpected<S::Owned> {
        self.get_string_value(name).into()
    }

    /// Non-throwing [`RegKey::get_expand_string_value`].
    pub fn try_get_expand_string_value(
        &self,
        name: &S::Borrowed,
        option: ExpandStringOption,
    ) -> RegExpected<S::Owned> {
        self.get_expand_string_value(name, option).into()
    }

    /// Non-throwing [`RegKey::get_multi_string_value`].
    pub fn try_get_multi_string_value(&self, name: &S::Borrowed) -> RegExpected<Vec<S::Owned>> {
        self.get_multi_string_value(name).into()
    }

    /// Non-throwing [`RegKey::get_binary_value`].
    pub fn try_get_binary_value(&self, name: &S::Borrowed) -> RegExpected<Vec<u8>> {
        self.get_binary_value(name).into()
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Returns the type of a value.
    pub fn query_value_type(&self, name: &S::Borrowed) -> Result<ValueType> {
        let name = Self::native(name)?;
        let mut value_type = 0u32;
        let mut cb_data = 0u32;
        check(
            self.api.query_value(self.raw(), &name, Some(&mut value_type), &mut cb_data),
            "RegQueryValueExW",
        )?;
        Ok(ValueType::from_u32(value_type))
    }

    /// Non-throwing [`RegKey::query_value_type`].
    pub fn try_query_value_type(&self, name: &S::Borrowed) -> RegExpected<ValueType> {
        self.query_value_type(name).into()
    }

    /// Returns counts, name lengths and the last write time of the key.
    pub fn query_info_key(&self) -> Result<KeyInfo> {
        let mut info = RawKeyInfo::default();
        check(self.api.query_info_key(self.raw(), &mut info), "RegQueryInfoKeyW")?;
        Ok(info.into())
    }

    /// Non-throwing [`RegKey::query_info_key`].
    pub fn try_query_info_key(&self) -> RegExpected<KeyInfo> {
        self.query_info_key().into()
    }

    /// Returns true if the key has a value called `name`.
    ///
    /// Only "not found" counts as `false`; any other failure is an error.
    pub fn contains_value(&self, name: &S::Borrowed) -> Result<bool> {
        let name = Self::native(name)?;
        let mut cb_data = 0u32;
        let result = self.api.query_value(self.raw(), &name, None, &mut cb_data);
        match result.code() {
            codes::ERROR_SUCCESS => Ok(true),
            codes::ERROR_FILE_NOT_FOUND => Ok(false),
            _ => Err(RegistryError::native(result, "RegQueryValueExW")),
        }
    }

    /// Non-throwing [`RegKey::contains_value`].
    pub fn try_contains_value(&self, name: &S::Borrowed) -> RegExpected<bool> {
        self.contains_value(name).into()
    }

    /// Returns true if the key has a subkey at `sub_key`.
    ///
    /// Only "not found" counts as `false`; any other failure is an error.
    pub fn contains_sub_key(&self, sub_key: &S::Borrowed) -> Result<bool> {
        let sub_key = Self::native(sub_key)?;
        let mut probe = RawKey::NULL;
        let result = self.api.open_key(self.raw(), &sub_key, Access::READ, &mut probe);
        match result.code() {
            codes::ERROR_SUCCESS => {
                let closed = self.api.close_key(probe);
                if closed.failed() {
                    warn!(handle = probe.0, code = closed.code(), "failed to close probe key");
                }
                Ok(true)
            }
            codes::ERROR_FILE_NOT_FOUND => Ok(false),
            _ => Err(RegistryError::native(result, "RegOpenKeyExW")),
        }
    }

    /// Non-throwing [`RegKey::contains_sub_key`].
    pub fn try_contains_sub_key(&self, sub_key: &S::Borrowed) -> RegExpected<bool> {
        self.contains_sub_key(sub_key).into()
    }

    // ---------------------------------------------------------------------
    // Enumeration
    // ---------------------------------------------------------------------

    fn name_capacity(&self, max_name_len: fn(&RawKeyInfo) -> u32) -> Result<usize> {
        let mut info = RawKeyInfo::default();
        check(self.api.query_info_key(self.raw(), &mut info), "RegQueryInfoKeyW")?;
        Ok(u32_to_size(max_name_len(&info)) + 1)
    }

    /// Walks indexes from 0 until the registry reports no more items.
    ///
    /// The name buffer is sized from the longest name the key reports; if a
    /// name outgrows it the size is probed again, a bounded number of times.
    fn enumerate<T: Default>(
        &self,
        context: &'static str,
        max_name_len: fn(&RawKeyInfo) -> u32,
        mut fetch: impl FnMut(u32, &mut [u16], &mut u32, &mut T) -> RegResult,
    ) -> Result<Vec<(S::Owned, T)>> {
        let mut buffer = vec![0u16; self.name_capacity(max_name_len)?];
        let mut entries = Vec::new();
        let mut index = 0u32;
        let mut attempts = 0;

        loop {
            let mut cch_name = safe_size_to_u32(buffer.len())?;
            let mut extra = T::default();
            let result = fetch(index, &mut buffer[..], &mut cch_name, &mut extra);
            match result.code() {
                codes::ERROR_NO_MORE_ITEMS => break,
                codes::ERROR_MORE_DATA => {
                    attempts += 1;
                    if attempts >= MAX_QUERY_ATTEMPTS {
                        return Err(RegistryError::native(result, context));
                    }
                    let capacity = self.name_capacity(max_name_len)?.max(buffer.len() * 2);
                    debug!(index, capacity, "name outgrew enumeration buffer");
                    buffer.resize(capacity, 0);
                    continue;
                }
                _ => check(result, context)?,
            }

            attempts = 0;
            let name = S::construct_from_native(&buffer[..u32_to_size(cch_name)])?;
            entries.push((name, extra));
            index += 1;
        }

        debug!(count = entries.len(), context, "enumeration complete");
        Ok(entries)
    }

    /// Returns the names of the immediate subkeys.
    pub fn enum_sub_keys(&self) -> Result<Vec<S::Owned>> {
        let hkey = self.raw();
        let entries = self.enumerate(
            "RegEnumKeyExW",
            |info| info.max_sub_key_len,
            |index, name, cch_name, _: &mut ()| self.api.enum_key(hkey, index, name, cch_name),
        )?;
        Ok(entries.into_iter().map(|(name, ())| name).collect())
    }

    /// Non-throwing [`RegKey::enum_sub_keys`].
    pub fn try_enum_sub_keys(&self) -> RegExpected<Vec<S::Owned>> {
        self.enum_sub_keys().into()
    }

    /// Returns the names and types of the values.
    pub fn enum_values(&self) -> Result<Vec<(S::Owned, ValueType)>> {
        let hkey = self.raw();
        let entries = self.enumerate(
            "RegEnumValueW",
            |info| info.max_value_name_len,
            |index, name, cch_name, value_type: &mut u32| {
                self.api.enum_value(hkey, index, name, cch_name, Some(value_type))
            },
        )?;
        Ok(entries
            .into_iter()
            .map(|(name, value_type)| (name, ValueType::from_u32(value_type)))
            .collect())
    }

    /// Non-throwing [`RegKey::enum_values`].
    pub fn try_enum_values(&self) -> RegExpected<Vec<(S::Owned, ValueType)>> {
        self.enum_values().into()
    }

    // ---------------------------------------------------------------------
    // Deletion and flushing
    // ---------------------------------------------------------------------

    /// Deletes a value.
    pub fn delete_value(&self, name: &S::Borrowed) -> Result<()> {
        let name = Self::native(name)?;
        check(self.api.delete_value(self.raw(), &name), "RegDeleteValueW")
    }

    /// Non-throwing [`RegKey::delete_value`].
    pub fn try_delete_value(&self, name: &S::Borrowed) -> RegResult {
        to_status(self.delete_value(name))
    }

    /// Deletes a subkey that has no subkeys of its own.
    pub fn delete_key(&self, sub_key: &S::Borrowed, access: Access) -> Result<()> {
        let sub_key = Self::native(sub_key)?;
        check(self.api.delete_key(self.raw(), &sub_key, access), "RegDeleteKeyExW")
    }

    /// Non-throwing [`RegKey::delete_key`].
    pub fn try_delete_key(&self, sub_key: &S::Borrowed, access: Access) -> RegResult {
        to_status(self.delete_key(sub_key, access))
    }

    /// Deletes a subkey with all of its subkeys and values.
    pub fn delete_tree(&self, sub_key: &S::Borrowed) -> Result<()> {
        let sub_key = Self::native(sub_key)?;
        check(self.api.delete_tree(self.raw(), &sub_key), "RegDeleteTreeW")
    }

    /// Non-throwing [`RegKey::delete_tree`].
    pub fn try_delete_tree(&self, sub_key: &S::Borrowed) -> RegResult {
        to_status(self.delete_tree(sub_key))
    }

    /// Writes pending changes of the key to the backing store.
    pub fn flush_key(&self) -> Result<()> {
        check(self.api.flush_key(self.raw()), "RegFlushKey")
    }

    /// Non-throwing [`RegKey::flush_key`].
    pub fn try_flush_key(&self) -> RegResult {
        to_status(self.flush_key())
    }
}

impl<A: RegistryApi + Default, S: StringTraits> Default for RegKey<A, S> {
    fn default() -> Self {
        Self::new(A::default())
    }
}

impl<A: RegistryApi, S: StringTraits> Drop for RegKey<A, S> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<A: RegistryApi, S: StringTraits> fmt::Debug for RegKey<A, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegKey").field("hkey", &self.hkey).finish()
    }
}
