//! Scoped ownership of a single allocator-owned pointer.
//!
//! The system message formatter hands back a buffer that must be released
//! with the platform's generic free call. [`ScopedPtr`] pairs such a pointer
//! with its release function and guarantees the release runs exactly once.

use std::ptr;

/// Release function for a [`ScopedPtr`].
pub type ReleaseFn<T> = unsafe fn(*mut T);

/// Owns a heap pointer and releases it on drop.
pub struct ScopedPtr<T> {
    ptr: *mut T,
    release: ReleaseFn<T>,
}

impl<T> ScopedPtr<T> {
    /// Creates an empty guard that will use `release` once it owns a pointer.
    pub fn null(release: ReleaseFn<T>) -> Self {
        Self {
            ptr: ptr::null_mut(),
            release,
        }
    }

    /// Takes ownership of `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a pointer that `release` may free exactly once,
    /// and nothing else may free it.
    pub unsafe fn from_raw(ptr: *mut T, release: ReleaseFn<T>) -> Self {
        Self { ptr, release }
    }

    /// Returns the owned pointer without giving up ownership.
    pub fn get(&self) -> *mut T {
        self.ptr
    }

    /// Returns the address of the owned pointer, for APIs that allocate into it.
    ///
    /// Any pointer already owned is released first.
    pub fn as_out_ptr(&mut self) -> *mut *mut T {
        self.reset();
        &mut self.ptr
    }

    /// Returns true if no pointer is owned.
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    /// Gives up ownership and returns the pointer without releasing it.
    pub fn into_raw(mut self) -> *mut T {
        std::mem::replace(&mut self.ptr, ptr::null_mut())
    }

    /// Releases the owned pointer, if any, and leaves the guard empty.
    pub fn reset(&mut self) {
        let ptr = std::mem::replace(&mut self.ptr, ptr::null_mut());
        if !ptr.is_null() {
            // SAFETY: ownership of `ptr` was handed to this guard together with
            // its release function and the field was nulled above, so this is
            // the only release of this pointer.
            unsafe { (self.release)(ptr) };
        }
    }
}

impl<T> Drop for ScopedPtr<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T> std::fmt::Debug for ScopedPtr<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedPtr").field("ptr", &self.ptr).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    thread_local! {
        static RELEASED: Cell<usize> = const { Cell::new(0) };
    }

    unsafe fn release_box(ptr: *mut u64) {
        drop(Box::from_raw(ptr));
        RELEASED.with(|c| c.set(c.get() + 1));
    }

    fn released() -> usize {
        RELEASED.with(|c| c.get())
    }

    #[test]
    fn test_releases_once_on_drop() {
        let before = released();
        {
            let guard = unsafe { ScopedPtr::from_raw(Box::into_raw(Box::new(7u64)), release_box) };
            assert!(!guard.is_null());
            assert_eq!(unsafe { *guard.get() }, 7);
        }
        assert_eq!(released(), before + 1);
    }

    #[test]
    fn test_null_guard_does_nothing() {
        let before = released();
        drop(ScopedPtr::null(release_box));
        assert_eq!(released(), before);
    }

    #[test]
    fn test_reset_then_drop_releases_once() {
        let before = released();
        let mut guard = unsafe { ScopedPtr::from_raw(Box::into_raw(Box::new(1u64)), release_box) };
        guard.reset();
        assert!(guard.is_null());
        drop(guard);
        assert_eq!(released(), before + 1);
    }

    #[test]
    fn test_out_ptr_and_into_raw() {
        let before = released();
        let mut guard = ScopedPtr::null(release_box);
        unsafe { *guard.as_out_ptr() = Box::into_raw(Box::new(9u64)) };
        let raw = guard.into_raw();
        assert_eq!(released(), before);
        unsafe { release_box(raw) };
        assert_eq!(released(), before + 1);
    }
}
