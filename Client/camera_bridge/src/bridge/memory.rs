use std::ffi::CStr;
use std::ops::Deref;

use jni::objects::{AutoElements, JByteArray, JFloatArray, JString, ReleaseMode};
use jni::strings::JavaStr;
use jni::sys::{jbyte, jfloat};
use jni::JNIEnv;

use crate::error::BridgeError;
use crate::memory::CallerMemory;

/// Java arrays and strings reached through one `JNIEnv`.
///
/// Arrays are pinned with `ReleaseMode::NoCopyBack`: the bridge only reads
/// them, so release is always `JNI_ABORT`.
pub struct JniMemory<'local> {
    env: JNIEnv<'local>,
}

impl<'local> JniMemory<'local> {
    pub fn new(env: JNIEnv<'local>) -> Self {
        Self { env }
    }
}

pub struct PinnedBytes<'local, 'a>(AutoElements<'local, 'local, 'a, jbyte>);

impl Deref for PinnedBytes<'_, '_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // jbyte is i8; same size and alignment as u8.
        unsafe { std::slice::from_raw_parts(self.0.as_ptr().cast::<u8>(), self.0.len()) }
    }
}

pub struct PinnedFloats<'local, 'a>(AutoElements<'local, 'local, 'a, jfloat>);

impl Deref for PinnedFloats<'_, '_> {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}

pub struct PinnedChars<'local, 'a>(JavaStr<'local, 'local, 'a>);

impl Deref for PinnedChars<'_, '_> {
    type Target = CStr;

    fn deref(&self) -> &CStr {
        // GetStringUTFChars returns a nul-terminated modified UTF-8 buffer that
        // stays valid until the JavaStr is dropped.
        unsafe { CStr::from_ptr(self.0.as_ptr()) }
    }
}

fn ensure_present(name: &'static str, is_null: bool) -> Result<(), BridgeError> {
    if is_null {
        Err(BridgeError::BufferUnavailable(name))
    } else {
        Ok(())
    }
}

impl<'local> CallerMemory for JniMemory<'local> {
    type ByteArray = JByteArray<'local>;
    type FloatArray = JFloatArray<'local>;
    type Text = JString<'local>;

    type Bytes<'a> = PinnedBytes<'local, 'a>
    where
        Self: 'a;
    type Floats<'a> = PinnedFloats<'local, 'a>
    where
        Self: 'a;
    type Chars<'a> = PinnedChars<'local, 'a>
    where
        Self: 'a;

    fn pin_bytes<'a>(
        &mut self,
        name: &'static str,
        array: &'a JByteArray<'local>,
    ) -> Result<PinnedBytes<'local, 'a>, BridgeError>
    where
        Self: 'a,
    {
        ensure_present(name, array.is_null())?;
        // The array is only read and released without copy-back.
        let elements = unsafe { self.env.get_array_elements(array, ReleaseMode::NoCopyBack) }
            .map_err(|_| BridgeError::BufferUnavailable(name))?;
        Ok(PinnedBytes(elements))
    }

    fn pin_floats<'a>(
        &mut self,
        name: &'static str,
        array: &'a JFloatArray<'local>,
    ) -> Result<PinnedFloats<'local, 'a>, BridgeError>
    where
        Self: 'a,
    {
        ensure_present(name, array.is_null())?;
        let elements = unsafe { self.env.get_array_elements(array, ReleaseMode::NoCopyBack) }
            .map_err(|_| BridgeError::BufferUnavailable(name))?;
        Ok(PinnedFloats(elements))
    }

    fn pin_text<'a>(&mut self, text: &'a JString<'local>) -> Result<PinnedChars<'local, 'a>, BridgeError>
    where
        Self: 'a,
    {
        ensure_present("error message", text.is_null())?;
        let chars = self
            .env
            .get_string(text)
            .map_err(|_| BridgeError::BufferUnavailable("error message"))?;
        Ok(PinnedChars(chars))
    }
}
