//! Native methods of `com.meta.questcamera.plugin.QuestCameraPlugin`.
//!
//! Every body runs under `catch_unwind`; a panic is logged and the call
//! returns its failure value instead of unwinding into the JVM.

use std::ffi::c_void;
use std::panic::{catch_unwind, AssertUnwindSafe};

use jni::objects::{JByteArray, JClass, JFloatArray, JObject, JString};
use jni::sys::{jboolean, jint, jlong, JNI_FALSE, JNI_TRUE, JNI_VERSION_1_6};
use jni::{JNIEnv, JavaVM};
use tracing::{debug, error};

use super::control::JniCameraControl;
use super::memory::JniMemory;
use super::HostRuntime;
use crate::dispatcher::{Dispatcher, FrameArgs, StereoFrameArgs};
use crate::registry;
use crate::relay::CommandRelay;
use crate::types::{Channel, Side};

fn guarded<T>(entry_point: &str, fallback: T, body: impl FnOnce() -> T) -> T {
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => value,
        Err(_) => {
            error!("Panic in {}", entry_point);
            fallback
        }
    }
}

fn to_jboolean(value: bool) -> jboolean {
    if value {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

fn set_callback(channel: Channel, callback: jlong) {
    guarded("set callback", (), || {
        // The engine hands over a function with the channel's fixed signature.
        unsafe { registry::global().register(channel, callback as usize) }
    })
}

#[no_mangle]
pub extern "system" fn Java_com_meta_questcamera_plugin_QuestCameraPlugin_setLeftFrameCallback(
    _env: JNIEnv,
    _class: JClass,
    callback: jlong,
) {
    set_callback(Channel::LeftFrame, callback);
}

#[no_mangle]
pub extern "system" fn Java_com_meta_questcamera_plugin_QuestCameraPlugin_setRightFrameCallback(
    _env: JNIEnv,
    _class: JClass,
    callback: jlong,
) {
    set_callback(Channel::RightFrame, callback);
}

#[no_mangle]
pub extern "system" fn Java_com_meta_questcamera_plugin_QuestCameraPlugin_setErrorCallback(
    _env: JNIEnv,
    _class: JClass,
    callback: jlong,
) {
    set_callback(Channel::Error, callback);
}

#[no_mangle]
pub extern "system" fn Java_com_meta_questcamera_plugin_QuestCameraPlugin_setStereoFrameCallback(
    _env: JNIEnv,
    _class: JClass,
    callback: jlong,
) {
    set_callback(Channel::StereoFrame, callback);
}

#[no_mangle]
pub extern "system" fn Java_com_meta_questcamera_plugin_QuestCameraPlugin_nativeInitialize<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    context: JObject<'local>,
) -> jboolean {
    guarded("nativeInitialize", JNI_FALSE, || {
        let plugin_class = super::cached_plugin_class();
        let mut relay = CommandRelay::new(JniCameraControl::new(&mut env, plugin_class.as_ref()));
        to_jboolean(relay.initialize(&context))
    })
}

#[no_mangle]
pub extern "system" fn Java_com_meta_questcamera_plugin_QuestCameraPlugin_nativeStartDualCamera(
    mut env: JNIEnv,
    _class: JClass,
) -> jboolean {
    guarded("nativeStartDualCamera", JNI_FALSE, || {
        let plugin_class = super::cached_plugin_class();
        let mut relay = CommandRelay::new(JniCameraControl::new(&mut env, plugin_class.as_ref()));
        to_jboolean(relay.start_dual_camera())
    })
}

#[no_mangle]
pub extern "system" fn Java_com_meta_questcamera_plugin_QuestCameraPlugin_nativeStopDualCamera(
    mut env: JNIEnv,
    _class: JClass,
) {
    guarded("nativeStopDualCamera", (), || {
        let plugin_class = super::cached_plugin_class();
        CommandRelay::new(JniCameraControl::new(&mut env, plugin_class.as_ref())).stop_dual_camera();
    })
}

#[no_mangle]
pub extern "system" fn Java_com_meta_questcamera_plugin_QuestCameraPlugin_nativeStartSingleCamera(
    mut env: JNIEnv,
    _class: JClass,
    is_left: jboolean,
) -> jboolean {
    guarded("nativeStartSingleCamera", JNI_FALSE, || {
        let plugin_class = super::cached_plugin_class();
        let mut relay = CommandRelay::new(JniCameraControl::new(&mut env, plugin_class.as_ref()));
        to_jboolean(relay.start_single_camera(Side::from_is_left(is_left != JNI_FALSE)))
    })
}

#[no_mangle]
pub extern "system" fn Java_com_meta_questcamera_plugin_QuestCameraPlugin_nativeStopSingleCamera(
    mut env: JNIEnv,
    _class: JClass,
    is_left: jboolean,
) {
    guarded("nativeStopSingleCamera", (), || {
        let plugin_class = super::cached_plugin_class();
        CommandRelay::new(JniCameraControl::new(&mut env, plugin_class.as_ref()))
            .stop_single_camera(Side::from_is_left(is_left != JNI_FALSE));
    })
}

#[allow(clippy::too_many_arguments)]
fn on_frame_available<'local>(
    env: JNIEnv<'local>,
    side: Side,
    frame_data: JByteArray<'local>,
    width: jint,
    height: jint,
    timestamp: jlong,
    intrinsics: JFloatArray<'local>,
    distortion: JFloatArray<'local>,
    pose: JFloatArray<'local>,
) {
    guarded("onFrameAvailable", (), || {
        let mut memory = JniMemory::new(env);
        let args = FrameArgs {
            frame_data: &frame_data,
            width,
            height,
            timestamp,
            intrinsics: &intrinsics,
            distortion: &distortion,
            pose: &pose,
        };
        // Dropped frames are already traced and counted by the dispatcher.
        let _ = Dispatcher::global().on_frame_available(&mut memory, side, args);
    })
}

#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub extern "system" fn Java_com_meta_questcamera_plugin_QuestCameraPlugin_onLeftFrameAvailable<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    frame_data: JByteArray<'local>,
    width: jint,
    height: jint,
    timestamp: jlong,
    intrinsics: JFloatArray<'local>,
    distortion: JFloatArray<'local>,
    pose: JFloatArray<'local>,
) {
    on_frame_available(
        env, Side::Left, frame_data, width, height, timestamp, intrinsics, distortion, pose,
    );
}

#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub extern "system" fn Java_com_meta_questcamera_plugin_QuestCameraPlugin_onRightFrameAvailable<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    frame_data: JByteArray<'local>,
    width: jint,
    height: jint,
    timestamp: jlong,
    intrinsics: JFloatArray<'local>,
    distortion: JFloatArray<'local>,
    pose: JFloatArray<'local>,
) {
    on_frame_available(
        env, Side::Right, frame_data, width, height, timestamp, intrinsics, distortion, pose,
    );
}

#[no_mangle]
pub extern "system" fn Java_com_meta_questcamera_plugin_QuestCameraPlugin_onStereoFrameAvailable<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    frame_data: JByteArray<'local>,
    width: jint,
    height: jint,
    timestamp: jlong,
    stereo_metadata: JFloatArray<'local>,
) {
    guarded("onStereoFrameAvailable", (), || {
        let mut memory = JniMemory::new(env);
        let args = StereoFrameArgs {
            frame_data: &frame_data,
            width,
            height,
            timestamp,
            stereo_metadata: &stereo_metadata,
        };
        let _ = Dispatcher::global().on_stereo_frame_available(&mut memory, args);
    })
}

#[no_mangle]
pub extern "system" fn Java_com_meta_questcamera_plugin_QuestCameraPlugin_onCameraError<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    error_message: JString<'local>,
) {
    guarded("onCameraError", (), || {
        let mut memory = JniMemory::new(env);
        let _ = Dispatcher::global().on_camera_error(&mut memory, &error_message);
    })
}

#[no_mangle]
pub extern "system" fn JNI_OnLoad(vm: JavaVM, _reserved: *mut c_void) -> jint {
    guarded("JNI_OnLoad", (), || {
        debug!("JNI_OnLoad called");
        super::install(HostRuntime::new(vm));
    });
    JNI_VERSION_1_6
}

#[no_mangle]
pub extern "system" fn JNI_OnUnload(_vm: JavaVM, _reserved: *mut c_void) {
    guarded("JNI_OnUnload", (), || {
        debug!("JNI_OnUnload called");
        super::uninstall();
        registry::global().clear();
    })
}
