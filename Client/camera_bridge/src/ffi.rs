use std::ffi::CString;
use std::panic::{catch_unwind, AssertUnwindSafe};

use interoptopus::{ffi_function, function, Inventory, InventoryBuilder};
use tracing::{error, info};

use crate::bridge::control::JniCameraControl;
use crate::bridge::with_host;
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::logging::{init_logging, set_debug_callback, DebugCallback};
use crate::metrics;
use crate::registry;
use crate::relay::CommandRelay;
use crate::types::{Channel, Side};

/// Returns the version of this API.
#[ffi_function]
#[no_mangle]
pub extern "C" fn version() -> u32 {
    0x00_01_00_00
}

/// Registers a callback for logging messages to the application that uses this library.
#[ffi_function]
#[no_mangle]
pub extern "C" fn register_debug_callback(callback: DebugCallback) {
    set_debug_callback(Some(callback));
}

#[ffi_function]
#[no_mangle]
pub extern "C" fn unregister_debug_callback() {
    set_debug_callback(None);
}

/// Installs logging. `log_level` is 0=trace .. 4=error; anything else means info.
#[ffi_function]
#[no_mangle]
pub extern "C" fn init(log_level: u32, forward_to_application: bool) {
    let config = BridgeConfig::from_raw(log_level, forward_to_application);
    init_logging(config);
    info!("Camera bridge initialized with {:?}", config);
}

fn register(channel: Channel, address: i64) {
    // Same contract as the JNI setters: the engine hands over a function with
    // the channel's fixed signature, or 0 to clear the slot.
    unsafe { registry::global().register(channel, address as usize) }
}

#[ffi_function]
#[no_mangle]
pub extern "C" fn register_left_frame_callback(address: i64) {
    register(Channel::LeftFrame, address);
}

#[ffi_function]
#[no_mangle]
pub extern "C" fn register_right_frame_callback(address: i64) {
    register(Channel::RightFrame, address);
}

#[ffi_function]
#[no_mangle]
pub extern "C" fn register_stereo_frame_callback(address: i64) {
    register(Channel::StereoFrame, address);
}

#[ffi_function]
#[no_mangle]
pub extern "C" fn register_error_callback(address: i64) {
    register(Channel::Error, address);
}

/// Hands the delivery counters, in Prometheus text format, to `callback`.
#[ffi_function]
#[no_mangle]
pub extern "C" fn metrics_snapshot(callback: extern "C" fn(*const std::os::raw::c_char)) {
    let rendered = match metrics::global().render() {
        Ok(text) => text,
        Err(err) => {
            error!("Failed to render metrics: {}", err);
            return;
        }
    };
    if let Ok(c_string) = CString::new(rendered) {
        callback(c_string.as_ptr());
    }
}

/// Runs one relay command on the calling thread, attached to the recorded VM.
fn relay_command<T>(
    command: &str,
    fallback: T,
    f: impl FnOnce(&mut CommandRelay<JniCameraControl<'_, '_>>) -> T,
) -> T {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        with_host(|env, plugin_class| {
            // Unity's threads stay attached, so local refs must be freed per command.
            env.with_local_frame(16, |env| -> Result<T, BridgeError> {
                let mut relay = CommandRelay::new(JniCameraControl::new(env, plugin_class));
                Ok(f(&mut relay))
            })
        })
        .and_then(|result| result)
    }));
    match outcome {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            error!("{} failed: {}", command, err);
            fallback
        }
        Err(_) => {
            error!("Panic in {}", command);
            fallback
        }
    }
}

/// Initializes the camera plugin with the current Unity activity as its context.
#[ffi_function]
#[no_mangle]
pub extern "C" fn initialize_camera() -> bool {
    relay_command("initialize_camera", false, |relay| {
        let activity = relay_activity(relay);
        match activity {
            Some(activity) => relay.initialize(&activity),
            None => false,
        }
    })
}

fn relay_activity<'local>(
    relay: &mut CommandRelay<JniCameraControl<'_, 'local>>,
) -> Option<jni::objects::JObject<'local>> {
    match relay.control_mut().unity_activity() {
        Ok(activity) => Some(activity),
        Err(err) => {
            error!("Failed to resolve the Unity activity: {}", err);
            None
        }
    }
}

#[ffi_function]
#[no_mangle]
pub extern "C" fn start_dual_camera() -> bool {
    relay_command("start_dual_camera", false, |relay| relay.start_dual_camera())
}

#[ffi_function]
#[no_mangle]
pub extern "C" fn stop_dual_camera() {
    relay_command("stop_dual_camera", (), |relay| relay.stop_dual_camera())
}

#[ffi_function]
#[no_mangle]
pub extern "C" fn start_single_camera(is_left: bool) -> bool {
    relay_command("start_single_camera", false, |relay| {
        relay.start_single_camera(Side::from_is_left(is_left))
    })
}

#[ffi_function]
#[no_mangle]
pub extern "C" fn stop_single_camera(is_left: bool) {
    relay_command("stop_single_camera", (), |relay| {
        relay.stop_single_camera(Side::from_is_left(is_left))
    })
}

pub fn build_binding_inventory() -> Inventory {
    InventoryBuilder::new()
        .register(function!(version))
        .register(function!(register_debug_callback))
        .register(function!(unregister_debug_callback))
        .register(function!(init))
        .register(function!(register_left_frame_callback))
        .register(function!(register_right_frame_callback))
        .register(function!(register_stereo_frame_callback))
        .register(function!(register_error_callback))
        .register(function!(metrics_snapshot))
        .register(function!(initialize_camera))
        .register(function!(start_dual_camera))
        .register(function!(stop_dual_camera))
        .register(function!(start_single_camera))
        .register(function!(stop_single_camera))
        .inventory()
}
