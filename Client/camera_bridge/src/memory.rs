//! Scoped access to buffers that live in the caller's memory space.
//!
//! A delivery pins every buffer it needs before calling out and lets the views
//! drop afterwards. Views release their buffer on drop without copying anything
//! back, so an early `?` return releases exactly what was pinned so far.

use std::ffi::CStr;
use std::ops::Deref;

use crate::error::BridgeError;

pub trait CallerMemory {
    /// Caller-side handle to a byte array.
    type ByteArray;
    /// Caller-side handle to a float array.
    type FloatArray;
    /// Caller-side handle to a string.
    type Text;

    type Bytes<'a>: Deref<Target = [u8]>
    where
        Self: 'a;
    type Floats<'a>: Deref<Target = [f32]>
    where
        Self: 'a;
    type Chars<'a>: Deref<Target = CStr>
    where
        Self: 'a;

    /// Pins a byte array. `name` only labels the error.
    fn pin_bytes<'a>(
        &mut self,
        name: &'static str,
        array: &'a Self::ByteArray,
    ) -> Result<Self::Bytes<'a>, BridgeError>
    where
        Self: 'a;

    fn pin_floats<'a>(
        &mut self,
        name: &'static str,
        array: &'a Self::FloatArray,
    ) -> Result<Self::Floats<'a>, BridgeError>
    where
        Self: 'a;

    fn pin_text<'a>(&mut self, text: &'a Self::Text) -> Result<Self::Chars<'a>, BridgeError>
    where
        Self: 'a;
}
