//! Signature-tagged engine callbacks.
//!
//! The engine hands over bare addresses; nothing about the signature is checked
//! at runtime. Each wrapper below fixes the argument layout for one kind of
//! channel and exposes the boundary call as a safe `invoke`, relying on the
//! contract accepted by [`CallbackRegistry::register`](crate::registry::CallbackRegistry::register).

use std::ffi::{c_char, CStr};
use std::num::NonZeroUsize;

use crate::error::BridgeError;
use crate::types::{MonoFrame, StereoFrame};

pub type RawFrameFn = unsafe extern "C" fn(
    frame_data: *const u8,
    data_size: i32,
    width: i32,
    height: i32,
    timestamp: i64,
    intrinsics: *const f32,
    distortion: *const f32,
    pose: *const f32,
    is_left: bool,
);

pub type RawStereoFrameFn = unsafe extern "C" fn(
    frame_data: *const u8,
    data_size: i32,
    width: i32,
    height: i32,
    timestamp: i64,
    stereo_metadata: *const f32,
    metadata_size: i32,
);

pub type RawErrorFn = unsafe extern "C" fn(error_message: *const c_char);

/// Length of a span as the `i32` the engine expects.
pub(crate) fn span_len(name: &'static str, len: usize) -> Result<i32, BridgeError> {
    i32::try_from(len).map_err(|_| BridgeError::OversizeBuffer { name, len })
}

/// Callback for the left and right frame channels.
#[derive(Copy, Clone, Debug)]
pub struct FrameCallback(RawFrameFn);

impl FrameCallback {
    /// # Safety
    ///
    /// `address` must point to a function with the [`RawFrameFn`] signature that
    /// stays callable for as long as this value is used.
    pub(crate) unsafe fn from_address(address: NonZeroUsize) -> Self {
        Self(std::mem::transmute::<usize, RawFrameFn>(address.get()))
    }

    pub fn address(self) -> usize {
        self.0 as usize
    }

    pub fn invoke(self, frame: &MonoFrame<'_>) -> Result<(), BridgeError> {
        let data_size = span_len("frame data", frame.pixels.len())?;
        // The address was registered under the frame signature; see `from_address`.
        unsafe {
            (self.0)(
                frame.pixels.as_ptr(),
                data_size,
                frame.width,
                frame.height,
                frame.timestamp,
                frame.intrinsics.as_ptr(),
                frame.distortion.as_ptr(),
                frame.pose.as_ptr(),
                frame.side.is_left(),
            );
        }
        Ok(())
    }
}

/// Callback for the stereo frame channel.
#[derive(Copy, Clone, Debug)]
pub struct StereoFrameCallback(RawStereoFrameFn);

impl StereoFrameCallback {
    /// # Safety
    ///
    /// `address` must point to a function with the [`RawStereoFrameFn`] signature.
    pub(crate) unsafe fn from_address(address: NonZeroUsize) -> Self {
        Self(std::mem::transmute::<usize, RawStereoFrameFn>(address.get()))
    }

    pub fn address(self) -> usize {
        self.0 as usize
    }

    pub fn invoke(self, frame: &StereoFrame<'_>) -> Result<(), BridgeError> {
        let data_size = span_len("frame data", frame.pixels.len())?;
        let metadata_size = span_len("stereo metadata", frame.metadata.len())?;
        unsafe {
            (self.0)(
                frame.pixels.as_ptr(),
                data_size,
                frame.width,
                frame.height,
                frame.timestamp,
                frame.metadata.as_ptr(),
                metadata_size,
            );
        }
        Ok(())
    }
}

/// Callback for the error channel.
#[derive(Copy, Clone, Debug)]
pub struct ErrorCallback(RawErrorFn);

impl ErrorCallback {
    /// # Safety
    ///
    /// `address` must point to a function with the [`RawErrorFn`] signature.
    pub(crate) unsafe fn from_address(address: NonZeroUsize) -> Self {
        Self(std::mem::transmute::<usize, RawErrorFn>(address.get()))
    }

    pub fn address(self) -> usize {
        self.0 as usize
    }

    pub fn invoke(self, message: &CStr) {
        unsafe { (self.0)(message.as_ptr()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_len_rejects_lengths_beyond_i32() {
        assert_eq!(span_len("pose", 7).unwrap(), 7);
        let too_long = i32::MAX as usize + 1;
        assert!(matches!(
            span_len("frame data", too_long),
            Err(BridgeError::OversizeBuffer { name: "frame data", .. })
        ));
    }
}
