//! JNI side of the bridge: the recorded host VM, pinned array views and the
//! `QuestCameraPlugin` control surface.

pub mod control;
pub mod exports;
pub mod memory;

use std::sync::{PoisonError, RwLock};

use jni::objects::{GlobalRef, JClass};
use jni::{JNIEnv, JavaVM};
use once_cell::sync::Lazy;
use tracing::{debug, error};

use crate::error::BridgeError;

pub const PLUGIN_CLASS: &str = "com/meta/questcamera/plugin/QuestCameraPlugin";

/// Handle to the hosting JVM, recorded at load time.
pub struct HostRuntime {
    vm: JavaVM,
    /// `FindClass` on a natively attached thread only sees the system class
    /// loader, so the plugin class is looked up once while loading.
    plugin_class: Option<GlobalRef>,
}

static HOST: Lazy<RwLock<Option<HostRuntime>>> = Lazy::new(|| RwLock::new(None));

impl HostRuntime {
    pub fn new(vm: JavaVM) -> Self {
        let plugin_class = match vm.get_env() {
            Ok(mut env) => cache_plugin_class(&mut env),
            Err(err) => {
                error!("Failed to get JNIEnv while loading: {}", err);
                None
            }
        };
        Self { vm, plugin_class }
    }

    pub fn plugin_class(&self) -> Option<&GlobalRef> {
        self.plugin_class.as_ref()
    }

    /// Runs `f` with an environment attached to the calling thread.
    pub fn with_env<T>(
        &self,
        f: impl FnOnce(&mut JNIEnv, Option<&GlobalRef>) -> T,
    ) -> Result<T, BridgeError> {
        let mut env = self.vm.attach_current_thread()?;
        Ok(f(&mut *env, self.plugin_class.as_ref()))
    }
}

fn cache_plugin_class(env: &mut JNIEnv) -> Option<GlobalRef> {
    let class = match env.find_class(PLUGIN_CLASS) {
        Ok(class) => class,
        Err(err) => {
            let _ = env.exception_clear();
            debug!("Plugin class not visible while loading: {}", err);
            return None;
        }
    };
    match env.new_global_ref(&class) {
        Ok(global) => Some(global),
        Err(err) => {
            error!("Failed to pin plugin class: {}", err);
            None
        }
    }
}

pub fn install(runtime: HostRuntime) {
    *HOST.write().unwrap_or_else(PoisonError::into_inner) = Some(runtime);
}

/// Drops the recorded handle and returns whether one was set.
pub fn uninstall() -> bool {
    HOST.write().unwrap_or_else(PoisonError::into_inner).take().is_some()
}

/// Runs `f` against the recorded host, attaching the calling thread if needed.
pub fn with_host<T>(
    f: impl FnOnce(&mut JNIEnv, Option<&GlobalRef>) -> T,
) -> Result<T, BridgeError> {
    let host = HOST.read().unwrap_or_else(PoisonError::into_inner);
    match host.as_ref() {
        Some(runtime) => runtime.with_env(f),
        None => Err(BridgeError::VmUnavailable),
    }
}

/// Plugin class cached at load time, if the host has been recorded.
pub(crate) fn cached_plugin_class() -> Option<GlobalRef> {
    HOST.read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .and_then(|runtime| runtime.plugin_class().cloned())
}

/// Cached plugin class, falling back to a lookup through `env`.
pub(crate) fn plugin_class<'local>(
    env: &mut JNIEnv<'local>,
    cached: Option<&GlobalRef>,
) -> Result<JClass<'local>, BridgeError> {
    match cached {
        Some(global) => {
            let local = env.new_local_ref(global)?;
            Ok(JClass::from(local))
        }
        None => Ok(env.find_class(PLUGIN_CLASS)?),
    }
}
