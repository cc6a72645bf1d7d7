//! In-process registry store.
//!
//! [`MemoryRegistry`] implements [`RegistryApi`] on a tree held in memory.
//! It follows the Win32 calls closely enough to stand in for the system
//! registry: predefined root handles, case-insensitive but case-preserving
//! names, access checks on handles, `ERROR_KEY_DELETED` for handles whose key
//! went away, RegGetValueW type filtering and string terminator fix-ups, and
//! environment expansion of `REG_EXPAND_SZ` data.
//!
//! Clones share the same store.

use crate::api::{
    rrf_type_bit, Access, RawKey, RawKeyInfo, RegistryApi, REG_CREATED_NEW_KEY,
    REG_OPENED_EXISTING_KEY, REG_OPTION_VOLATILE, RRF_NOEXPAND, RRF_RT_ANY, RRF_RT_REG_EXPAND_SZ,
};
use crate::cast::safe_size_to_u32;
use crate::status::{codes, RegResult};
use crate::utils::{bytes_to_wide, datetime_to_filetime, wide_eq_ignore_case, wide_to_bytes};
use crate::value::{REG_EXPAND_SZ, REG_MULTI_SZ, REG_SZ};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

type StoreResult<T> = std::result::Result<T, RegResult>;

const PATH_SEPARATOR: u16 = b'\\' as u16;

/// First handle value handed out; handles are multiples of 4 like real ones.
const FIRST_HANDLE: isize = 0x1000;

fn fail<T>(code: i32) -> StoreResult<T> {
    Err(RegResult::new(code))
}

fn status(result: StoreResult<()>) -> RegResult {
    match result {
        Ok(()) => RegResult::success(),
        Err(err) => err,
    }
}

fn components(path: &[u16]) -> impl Iterator<Item = &[u16]> {
    path.split(|&c| c == PATH_SEPARATOR).filter(|c| !c.is_empty())
}

fn filetime_now() -> u64 {
    datetime_to_filetime(chrono::Utc::now())
}

struct StoredValue {
    name: Vec<u16>,
    value_type: u32,
    data: Vec<u8>,
}

struct Node {
    name: Vec<u16>,
    parent: Option<usize>,
    children: Vec<usize>,
    values: Vec<StoredValue>,
    volatile: bool,
    last_write_time: u64,
}

impl Node {
    fn new(name: Vec<u16>, parent: Option<usize>, volatile: bool) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            values: Vec::new(),
            volatile,
            last_write_time: filetime_now(),
        }
    }

    fn value(&self, name: &[u16]) -> Option<&StoredValue> {
        self.values.iter().find(|v| wide_eq_ignore_case(&v.name, name))
    }
}

struct OpenHandle {
    node: usize,
    access: Access,
}

struct Store {
    nodes: HashMap<usize, Node>,
    next_node: usize,
    roots: Vec<(RawKey, usize)>,
    handles: HashMap<isize, OpenHandle>,
    next_handle: isize,
}

impl Store {
    fn new() -> Self {
        let mut store = Self {
            nodes: HashMap::new(),
            next_node: 0,
            roots: Vec::new(),
            handles: HashMap::new(),
            next_handle: FIRST_HANDLE,
        };

        let names = [
            "HKEY_CLASSES_ROOT",
            "HKEY_CURRENT_USER",
            "HKEY_LOCAL_MACHINE",
            "HKEY_USERS",
            "HKEY_CURRENT_CONFIG",
        ];
        for (root, name) in RawKey::PREDEFINED.into_iter().zip(names) {
            let id = store.alloc(Node::new(name.encode_utf16().collect(), None, false));
            store.roots.push((root, id));
        }
        store
    }

    /// Ids are never reused, so a handle to a deleted key stays dead.
    fn alloc(&mut self, node: Node) -> usize {
        let id = self.next_node;
        self.next_node += 1;
        self.nodes.insert(id, node);
        id
    }

    fn node(&self, id: usize) -> StoreResult<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| RegResult::new(codes::ERROR_KEY_DELETED))
    }

    fn node_mut(&mut self, id: usize) -> StoreResult<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| RegResult::new(codes::ERROR_KEY_DELETED))
    }

    fn is_alive(&self, id: usize) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Resolves a handle to its node and granted rights.
    fn resolve(&self, key: RawKey) -> StoreResult<(usize, Access)> {
        if let Some(&(_, id)) = self.roots.iter().find(|(root, _)| *root == key) {
            return Ok((id, Access::ALL));
        }

        let handle = self
            .handles
            .get(&key.0)
            .ok_or_else(|| RegResult::new(codes::ERROR_INVALID_HANDLE))?;
        self.node(handle.node)?;
        Ok((handle.node, handle.access))
    }

    fn resolve_with(&self, key: RawKey, needed: Access) -> StoreResult<usize> {
        let (id, access) = self.resolve(key)?;
        if !access.contains(needed) {
            return fail(codes::ERROR_ACCESS_DENIED);
        }
        Ok(id)
    }

    fn live_children(&self, id: usize) -> StoreResult<Vec<usize>> {
        Ok(self
            .node(id)?
            .children
            .iter()
            .copied()
            .filter(|&child| self.is_alive(child))
            .collect())
    }

    fn find_child(&self, parent: usize, name: &[u16]) -> StoreResult<Option<usize>> {
        Ok(self
            .live_children(parent)?
            .into_iter()
            .find(|&child| {
                self.nodes
                    .get(&child)
                    .map_or(false, |node| wide_eq_ignore_case(&node.name, name))
            }))
    }

    fn walk(&self, start: usize, path: &[u16]) -> StoreResult<usize> {
        let mut current = start;
        for component in components(path) {
            current = self
                .find_child(current, component)?
                .ok_or_else(|| RegResult::new(codes::ERROR_FILE_NOT_FOUND))?;
        }
        Ok(current)
    }

    fn new_handle(&mut self, node: usize, access: Access) -> RawKey {
        let raw = self.next_handle;
        self.next_handle += 4;
        self.handles.insert(raw, OpenHandle { node, access });
        RawKey(raw)
    }

    fn touch(&mut self, id: usize) -> StoreResult<()> {
        self.node_mut(id)?.last_write_time = filetime_now();
        Ok(())
    }

    fn create(
        &mut self,
        parent: RawKey,
        sub_key: &[u16],
        options: u32,
        access: Access,
    ) -> StoreResult<(RawKey, u32)> {
        let (start, parent_access) = self.resolve(parent)?;
        let volatile = options & REG_OPTION_VOLATILE != 0;

        let mut current = start;
        let mut disposition = REG_OPENED_EXISTING_KEY;
        for component in components(sub_key) {
            match self.find_child(current, component)? {
                Some(child) => current = child,
                None => {
                    if current == start && !parent_access.contains(Access::CREATE_SUB_KEY) {
                        return fail(codes::ERROR_ACCESS_DENIED);
                    }
                    let child = self.alloc(Node::new(component.to_vec(), Some(current), volatile));
                    self.node_mut(current)?.children.push(child);
                    self.touch(current)?;
                    current = child;
                    disposition = REG_CREATED_NEW_KEY;
                }
            }
        }

        Ok((self.new_handle(current, access), disposition))
    }

    fn open(&mut self, parent: RawKey, sub_key: &[u16], access: Access) -> StoreResult<RawKey> {
        let (start, _) = self.resolve(parent)?;
        let target = self.walk(start, sub_key)?;
        Ok(self.new_handle(target, access))
    }

    fn close(&mut self, key: RawKey) -> StoreResult<()> {
        if key.is_predefined() {
            return Ok(());
        }
        match self.handles.remove(&key.0) {
            Some(_) => Ok(()),
            None => fail(codes::ERROR_INVALID_HANDLE),
        }
    }

    fn set_value(
        &mut self,
        key: RawKey,
        name: &[u16],
        value_type: u32,
        data: &[u8],
        cb_data: u32,
    ) -> StoreResult<()> {
        if safe_size_to_u32(data.len()).ok() != Some(cb_data) {
            return fail(codes::ERROR_INVALID_PARAMETER);
        }

        let id = self.resolve_with(key, Access::SET_VALUE)?;
        let node = self.node_mut(id)?;
        match node.values.iter_mut().find(|v| wide_eq_ignore_case(&v.name, name)) {
            Some(existing) => {
                existing.value_type = value_type;
                existing.data = data.to_vec();
            }
            None => node.values.push(StoredValue {
                name: name.to_vec(),
                value_type,
                data: data.to_vec(),
            }),
        }
        self.touch(id)
    }

    /// Reads a value the way RegGetValueW presents it.
    fn read_value(&self, key: RawKey, name: &[u16], flags: u32) -> StoreResult<(u32, Vec<u8>)> {
        let accepted = flags & RRF_RT_ANY;
        if accepted == 0 || (accepted == RRF_RT_REG_EXPAND_SZ && flags & RRF_NOEXPAND == 0) {
            return fail(codes::ERROR_INVALID_PARAMETER);
        }

        let id = self.resolve_with(key, Access::QUERY_VALUE)?;
        let stored = self
            .node(id)?
            .value(name)
            .ok_or_else(|| RegResult::new(codes::ERROR_FILE_NOT_FOUND))?;

        let mut value_type = stored.value_type;
        let mut data = stored.data.clone();
        if value_type == REG_EXPAND_SZ && flags & RRF_NOEXPAND == 0 {
            data = expand_environment(&data);
            value_type = REG_SZ;
        }

        if rrf_type_bit(value_type) & accepted == 0 {
            return fail(codes::ERROR_UNSUPPORTED_TYPE);
        }

        if matches!(value_type, REG_SZ | REG_EXPAND_SZ | REG_MULTI_SZ) {
            terminate_string_data(&mut data, value_type);
        }
        Ok((value_type, data))
    }

    fn query_info(&self, key: RawKey) -> StoreResult<RawKeyInfo> {
        let id = self.resolve_with(key, Access::QUERY_VALUE)?;
        let children = self.live_children(id)?;
        let node = self.node(id)?;

        let mut info = RawKeyInfo {
            last_write_time: node.last_write_time,
            ..RawKeyInfo::default()
        };
        info.sub_keys = safe_size_to_u32(children.len()).map_err(|e| e.result_code())?;
        info.values = safe_size_to_u32(node.values.len()).map_err(|e| e.result_code())?;

        let max_sub_key = children
            .iter()
            .filter_map(|&child| self.nodes.get(&child))
            .map(|child| child.name.len())
            .max()
            .unwrap_or(0);
        let max_value_name = node.values.iter().map(|v| v.name.len()).max().unwrap_or(0);
        let max_value = node.values.iter().map(|v| v.data.len()).max().unwrap_or(0);

        info.max_sub_key_len = safe_size_to_u32(max_sub_key).map_err(|e| e.result_code())?;
        info.max_value_name_len = safe_size_to_u32(max_value_name).map_err(|e| e.result_code())?;
        info.max_value_len = safe_size_to_u32(max_value).map_err(|e| e.result_code())?;
        Ok(info)
    }

    fn delete_value(&mut self, key: RawKey, name: &[u16]) -> StoreResult<()> {
        let id = self.resolve_with(key, Access::SET_VALUE)?;
        let node = self.node_mut(id)?;
        let before = node.values.len();
        node.values.retain(|v| !wide_eq_ignore_case(&v.name, name));
        if node.values.len() == before {
            return fail(codes::ERROR_FILE_NOT_FOUND);
        }
        self.touch(id)
    }

    fn delete_key(&mut self, key: RawKey, sub_key: &[u16]) -> StoreResult<()> {
        if components(sub_key).next().is_none() {
            return fail(codes::ERROR_INVALID_PARAMETER);
        }

        let (start, _) = self.resolve(key)?;
        let target = self.walk(start, sub_key)?;
        if !self.live_children(target)?.is_empty() {
            return fail(codes::ERROR_ACCESS_DENIED);
        }
        self.unlink(target)
    }

    fn delete_tree(&mut self, key: RawKey, sub_key: &[u16]) -> StoreResult<()> {
        let (start, _) = self.resolve(key)?;

        if components(sub_key).next().is_none() {
            for child in self.live_children(start)? {
                self.remove_subtree(child);
            }
            let node = self.node_mut(start)?;
            node.children.clear();
            node.values.clear();
            return self.touch(start);
        }

        let target = self.walk(start, sub_key)?;
        self.unlink(target)
    }

    /// Detaches a node from its parent and drops it with everything below.
    fn unlink(&mut self, id: usize) -> StoreResult<()> {
        let parent = self.node(id)?.parent;
        let Some(parent) = parent else {
            return fail(codes::ERROR_ACCESS_DENIED);
        };

        self.remove_subtree(id);
        self.node_mut(parent)?.children.retain(|&child| child != id);
        self.touch(parent)
    }

    fn remove_subtree(&mut self, id: usize) {
        let children = match self.nodes.remove(&id) {
            Some(node) => node.children,
            None => return,
        };
        for child in children {
            self.remove_subtree(child);
        }
    }
}

/// Appends the terminators RegGetValueW guarantees for string types.
///
/// Data with an odd byte count is left alone; it is not valid wide text.
fn terminate_string_data(data: &mut Vec<u8>, value_type: u32) {
    let Ok(mut wide) = bytes_to_wide(data) else {
        return;
    };

    if wide.last() != Some(&0) {
        wide.push(0);
    }
    if value_type == REG_MULTI_SZ && (wide.len() < 2 || wide[wide.len() - 2] != 0) {
        wide.push(0);
    }
    *data = wide_to_bytes(&wide);
}

/// Expands `%NAME%` references from the process environment.
///
/// Unknown variables are left as written.
fn expand_environment(data: &[u8]) -> Vec<u8> {
    let Ok(wide) = bytes_to_wide(data) else {
        return data.to_vec();
    };
    let text = String::from_utf16_lossy(crate::utils::until_null(&wide));

    let mut expanded = String::with_capacity(text.len());
    let mut rest = text.as_str();
    while let Some(start) = rest.find('%') {
        expanded.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) => {
                let name = &after[..end];
                match std::env::var(name) {
                    Ok(value) if !name.is_empty() => expanded.push_str(&value),
                    _ => {
                        expanded.push('%');
                        expanded.push_str(name);
                        expanded.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                expanded.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    expanded.push_str(rest);

    let mut wide: Vec<u16> = expanded.encode_utf16().collect();
    wide.push(0);
    wide_to_bytes(&wide)
}

/// A registry held in process memory.
#[derive(Clone)]
pub struct MemoryRegistry {
    store: Arc<Mutex<Store>>,
}

impl MemoryRegistry {
    /// Creates an empty registry with the predefined root keys.
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::new())),
        }
    }

    /// Returns the number of open (non-predefined) handles.
    pub fn open_handles(&self) -> usize {
        self.lock().handles.len()
    }

    /// Returns true if the handle is open.
    pub fn is_open(&self, key: RawKey) -> bool {
        self.lock().handles.contains_key(&key.0)
    }

    /// Returns true if the key behind `key` was created volatile.
    pub fn is_volatile(&self, key: RawKey) -> bool {
        let store = self.lock();
        store
            .resolve(key)
            .and_then(|(id, _)| store.node(id).map(|node| node.volatile))
            .unwrap_or(false)
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.lock();
        f.debug_struct("MemoryRegistry")
            .field("keys", &store.nodes.len())
            .field("open_handles", &store.handles.len())
            .finish()
    }
}

impl RegistryApi for MemoryRegistry {
    fn create_key(
        &self,
        parent: RawKey,
        sub_key: &[u16],
        options: u32,
        access: Access,
        result: &mut RawKey,
        disposition: &mut u32,
    ) -> RegResult {
        match self.lock().create(parent, sub_key, options, access) {
            Ok((key, created)) => {
                debug!(handle = key.0, disposition = created, "created registry key");
                *result = key;
                *disposition = created;
                RegResult::success()
            }
            Err(err) => err,
        }
    }

    fn open_key(
        &self,
        parent: RawKey,
        sub_key: &[u16],
        access: Access,
        result: &mut RawKey,
    ) -> RegResult {
        match self.lock().open(parent, sub_key, access) {
            Ok(key) => {
                *result = key;
                RegResult::success()
            }
            Err(err) => err,
        }
    }

    fn close_key(&self, key: RawKey) -> RegResult {
        status(self.lock().close(key))
    }

    fn set_value(
        &self,
        key: RawKey,
        name: &[u16],
        value_type: u32,
        data: &[u8],
        cb_data: u32,
    ) -> RegResult {
        status(self.lock().set_value(key, name, value_type, data, cb_data))
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
        let (stored_type, bytes) = match self.lock().read_value(key, name, flags) {
            Ok(value) => value,
            Err(err) => return err,
        };
        let required = match safe_size_to_u32(bytes.len()) {
            Ok(required) => required,
            Err(err) => return err.result_code(),
        };

        if let Some(value_type) = value_type {
            *value_type = stored_type;
        }

        let Some(buffer) = data else {
            *cb_data = required;
            return RegResult::success();
        };

        let capacity = (*cb_data as usize).min(buffer.len());
        *cb_data = required;
        if bytes.len() > capacity {
            return RegResult::new(codes::ERROR_MORE_DATA);
        }
        buffer[..bytes.len()].copy_from_slice(&bytes);
        RegResult::success()
    }

    fn query_value(
        &self,
        key: RawKey,
        name: &[u16],
        value_type: Option<&mut u32>,
        cb_data: &mut u32,
    ) -> RegResult {
        let store = self.lock();
        let id = match store.resolve_with(key, Access::QUERY_VALUE) {
            Ok(id) => id,
            Err(err) => return err,
        };
        let stored = match store.node(id).map(|node| node.value(name)) {
            Ok(Some(stored)) => stored,
            Ok(None) => return RegResult::new(codes::ERROR_FILE_NOT_FOUND),
            Err(err) => return err,
        };

        match safe_size_to_u32(stored.data.len()) {
            Ok(size) => *cb_data = size,
            Err(err) => return err.result_code(),
        }
        if let Some(value_type) = value_type {
            *value_type = stored.value_type;
        }
        RegResult::success()
    }

    fn query_info_key(&self, key: RawKey, info: &mut RawKeyInfo) -> RegResult {
        match self.lock().query_info(key) {
            Ok(queried) => {
                *info = queried;
                RegResult::success()
            }
            Err(err) => err,
        }
    }

    fn enum_key(&self, key: RawKey, index: u32, name: &mut [u16], cch_name: &mut u32) -> RegResult {
        let store = self.lock();
        let children = match store
            .resolve_with(key, Access::ENUMERATE_SUB_KEYS)
            .and_then(|id| store.live_children(id))
        {
            Ok(children) => children,
            Err(err) => return err,
        };

        let Some(&child) = children.get(index as usize) else {
            return RegResult::new(codes::ERROR_NO_MORE_ITEMS);
        };
        let child_name = match store.node(child) {
            Ok(node) => &node.name,
            Err(err) => return err,
        };
        copy_name(child_name, name, cch_name)
    }

    fn enum_value(
        &self,
        key: RawKey,
        index: u32,
        name: &mut [u16],
        cch_name: &mut u32,
        value_type: Option<&mut u32>,
    ) -> RegResult {
        let store = self.lock();
        let node = match store
            .resolve_with(key, Access::QUERY_VALUE)
            .and_then(|id| store.node(id))
        {
            Ok(node) => node,
            Err(err) => return err,
        };

        let Some(stored) = node.values.get(index as usize) else {
            return RegResult::new(codes::ERROR_NO_MORE_ITEMS);
        };
        let result = copy_name(&stored.name, name, cch_name);
        if result.is_ok() {
            if let Some(value_type) = value_type {
                *value_type = stored.value_type;
            }
        }
        result
    }

    fn delete_value(&self, key: RawKey, name: &[u16]) -> RegResult {
        status(self.lock().delete_value(key, name))
    }

    fn delete_key(&self, key: RawKey, sub_key: &[u16], _access: Access) -> RegResult {
        status(self.lock().delete_key(key, sub_key))
    }

    fn delete_tree(&self, key: RawKey, sub_key: &[u16]) -> RegResult {
        status(self.lock().delete_tree(key, sub_key))
    }

    fn flush_key(&self, key: RawKey) -> RegResult {
        status(self.lock().resolve(key).map(|_| ()))
    }
}

/// Copies a name plus terminator into an enumeration buffer.
fn copy_name(source: &[u16], name: &mut [u16], cch_name: &mut u32) -> RegResult {
    let capacity = (*cch_name as usize).min(name.len());
    if source.len() + 1 > capacity {
        return RegResult::new(codes::ERROR_MORE_DATA);
    }

    name[..source.len()].copy_from_slice(source);
    name[source.len()] = 0;
    // fits: source.len() < capacity <= *cch_name
    *cch_name = source.len() as u32;
    RegResult::success()
}
