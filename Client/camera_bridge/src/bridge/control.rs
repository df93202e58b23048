use jni::objects::{GlobalRef, JClass, JObject, JValue, JValueOwned};
use jni::JNIEnv;
use tracing::error;

use crate::error::BridgeError;
use crate::relay::CameraControl;
use crate::types::Side;

const COMPANION_SIG: &str = "Lcom/meta/questcamera/plugin/QuestCameraPlugin$Companion;";
const GET_INSTANCE_SIG: &str = "()Lcom/meta/questcamera/plugin/QuestCameraPlugin;";
const CONTEXT_CLASS: &str = "android/content/Context";
const UNITY_PLAYER_CLASS: &str = "com.unity3d.player.UnityPlayer";

/// `QuestCameraPlugin` reached through `Companion.getInstance()`.
pub struct JniCameraControl<'e, 'local> {
    env: &'e mut JNIEnv<'local>,
    plugin_class: Option<&'e GlobalRef>,
}

impl<'e, 'local> JniCameraControl<'e, 'local> {
    pub fn new(env: &'e mut JNIEnv<'local>, plugin_class: Option<&'e GlobalRef>) -> Self {
        Self { env, plugin_class }
    }

    /// Describes and clears a pending Java exception so it never surfaces in
    /// the engine's calling frame.
    fn settle<T>(&mut self, what: &'static str, result: jni::errors::Result<T>) -> Result<T, BridgeError> {
        if self.env.exception_check().unwrap_or(false) {
            error!("Exception occurred while calling {}", what);
            let _ = self.env.exception_describe();
            let _ = self.env.exception_clear();
            return Err(BridgeError::HostException(what));
        }
        Ok(result?)
    }

    fn plugin_class(&mut self) -> Result<JClass<'local>, BridgeError> {
        let result = super::plugin_class(self.env, self.plugin_class);
        if self.env.exception_check().unwrap_or(false) {
            let _ = self.env.exception_clear();
        }
        result.map_err(|err| BridgeError::InstanceUnavailable(format!("QuestCameraPlugin class: {}", err)))
    }

    /// The single resolution path every command goes through.
    fn instance(&mut self) -> Result<JObject<'local>, BridgeError> {
        let class = self.plugin_class()?;

        let companion = self.env.get_static_field(&class, "Companion", COMPANION_SIG);
        let companion = self
            .settle("Companion", companion)
            .and_then(|value| Ok(value.l()?))
            .map_err(|err| BridgeError::InstanceUnavailable(format!("Companion field: {}", err)))?;
        if companion.is_null() {
            return Err(BridgeError::InstanceUnavailable("Companion object is null".into()));
        }

        let instance = self.env.call_method(&companion, "getInstance", GET_INSTANCE_SIG, &[]);
        let instance = self
            .settle("getInstance", instance)
            .and_then(|value| Ok(value.l()?))
            .map_err(|err| BridgeError::InstanceUnavailable(format!("getInstance: {}", err)))?;
        if instance.is_null() {
            return Err(BridgeError::InstanceUnavailable("getInstance returned null".into()));
        }
        Ok(instance)
    }

    fn call(
        &mut self,
        method: &'static str,
        sig: &str,
        args: &[JValue],
    ) -> Result<JValueOwned<'local>, BridgeError> {
        let instance = self.instance()?;
        let result = self.env.call_method(&instance, method, sig, args);
        self.settle(method, result)
    }

    /// `UnityPlayer.currentActivity`, loaded through the plugin's class loader
    /// since a natively attached thread cannot see application classes.
    pub fn unity_activity(&mut self) -> Result<JObject<'local>, BridgeError> {
        let class = self.plugin_class()?;
        let loader = self
            .env
            .call_method(&class, "getClassLoader", "()Ljava/lang/ClassLoader;", &[]);
        let loader = self.settle("getClassLoader", loader)?.l()?;
        let name = self.env.new_string(UNITY_PLAYER_CLASS)?;
        let unity_player = self.env.call_method(
            &loader,
            "loadClass",
            "(Ljava/lang/String;)Ljava/lang/Class;",
            &[JValue::Object(&name)],
        );
        let unity_player = JClass::from(self.settle("loadClass", unity_player)?.l()?);
        let activity = self
            .env
            .get_static_field(&unity_player, "currentActivity", "Landroid/app/Activity;");
        let activity = self.settle("currentActivity", activity)?.l()?;
        if activity.is_null() {
            return Err(BridgeError::NotAContext);
        }
        Ok(activity)
    }
}

impl<'e, 'local> CameraControl for JniCameraControl<'e, 'local> {
    type Context = JObject<'local>;

    fn initialize(&mut self, context: &JObject<'local>) -> Result<bool, BridgeError> {
        let instance = self.instance()?;
        let is_context = self.env.is_instance_of(context, CONTEXT_CLASS);
        if context.is_null() || !self.settle("isInstanceOf", is_context)? {
            return Err(BridgeError::NotAContext);
        }
        let result = self.env.call_method(
            &instance,
            "initialize",
            "(Landroid/content/Context;)Z",
            &[JValue::Object(context)],
        );
        Ok(self.settle("initialize", result)?.z()?)
    }

    fn start_dual_camera(&mut self) -> Result<bool, BridgeError> {
        Ok(self.call("startDualCamera", "()Z", &[])?.z()?)
    }

    fn stop_dual_camera(&mut self) -> Result<(), BridgeError> {
        Ok(self.call("stopDualCamera", "()V", &[])?.v()?)
    }

    fn start_single_camera(&mut self, side: Side) -> Result<bool, BridgeError> {
        let is_left = JValue::Bool(u8::from(side.is_left()));
        Ok(self.call("startSingleCamera", "(Z)Z", &[is_left])?.z()?)
    }

    fn stop_single_camera(&mut self, side: Side) -> Result<(), BridgeError> {
        let is_left = JValue::Bool(u8::from(side.is_left()));
        Ok(self.call("stopSingleCamera", "(Z)V", &[is_left])?.v()?)
    }
}
