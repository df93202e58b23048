//! Marshals camera events from the managed subsystem into the engine's callbacks.
//!
//! Every delivery resolves its callback first, pins the buffers it needs,
//! invokes the callback once on the calling thread and lets the pinned views
//! drop. An unregistered callback, an unavailable buffer or a malformed array
//! drops the event; none of them are reported through the error channel.

use tracing::{debug, error, warn};

use crate::callback::{ErrorCallback, FrameCallback, StereoFrameCallback};
use crate::config::FrameLayout;
use crate::error::BridgeError;
use crate::memory::CallerMemory;
use crate::metrics::{self, BridgeMetrics};
use crate::registry::{self, CallbackRegistry};
use crate::types::{Channel, MonoFrame, Side, StereoFrame};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Delivery {
    /// The registered callback was invoked once.
    Delivered,
    /// No callback was registered for the channel.
    Unregistered,
}

/// Caller-side handles of one mono frame.
pub struct FrameArgs<'a, M: CallerMemory> {
    pub frame_data: &'a M::ByteArray,
    pub width: i32,
    pub height: i32,
    pub timestamp: i64,
    pub intrinsics: &'a M::FloatArray,
    pub distortion: &'a M::FloatArray,
    pub pose: &'a M::FloatArray,
}

/// Caller-side handles of one stereo frame.
pub struct StereoFrameArgs<'a, M: CallerMemory> {
    pub frame_data: &'a M::ByteArray,
    pub width: i32,
    pub height: i32,
    pub timestamp: i64,
    pub stereo_metadata: &'a M::FloatArray,
}

pub struct Dispatcher<'r> {
    registry: &'r CallbackRegistry,
    metrics: &'r BridgeMetrics,
    layout: FrameLayout,
}

impl Dispatcher<'static> {
    /// Dispatcher over the process-wide registry and counters.
    pub fn global() -> Self {
        Dispatcher::new(registry::global(), metrics::global())
    }
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r CallbackRegistry, metrics: &'r BridgeMetrics) -> Self {
        Self {
            registry,
            metrics,
            layout: FrameLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: FrameLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn on_frame_available<'a, M>(
        &self,
        memory: &mut M,
        side: Side,
        args: FrameArgs<'a, M>,
    ) -> Result<Delivery, BridgeError>
    where
        M: CallerMemory + 'a,
    {
        let channel = side.channel();
        let Some(callback) = self.registry.frame_callback(side) else {
            return Ok(self.skip(channel));
        };
        let outcome = self.deliver_frame(memory, side, callback, args);
        self.record(channel, outcome)
    }

    pub fn on_stereo_frame_available<'a, M>(
        &self,
        memory: &mut M,
        args: StereoFrameArgs<'a, M>,
    ) -> Result<Delivery, BridgeError>
    where
        M: CallerMemory + 'a,
    {
        let Some(callback) = self.registry.stereo_frame_callback() else {
            return Ok(self.skip(Channel::StereoFrame));
        };
        let outcome = self.deliver_stereo_frame(memory, callback, args);
        self.record(Channel::StereoFrame, outcome)
    }

    pub fn on_camera_error<'a, M>(
        &self,
        memory: &mut M,
        message: &'a M::Text,
    ) -> Result<Delivery, BridgeError>
    where
        M: CallerMemory + 'a,
    {
        let Some(callback) = self.registry.error_callback() else {
            return Ok(self.skip(Channel::Error));
        };
        let outcome = deliver_error(memory, callback, message);
        self.record(Channel::Error, outcome)
    }

    fn deliver_frame<'a, M>(
        &self,
        memory: &mut M,
        side: Side,
        callback: FrameCallback,
        args: FrameArgs<'a, M>,
    ) -> Result<(), BridgeError>
    where
        M: CallerMemory + 'a,
    {
        let frame_data = memory.pin_bytes("frame data", args.frame_data)?;
        let intrinsics = memory.pin_floats("intrinsics", args.intrinsics)?;
        let distortion = memory.pin_floats("distortion", args.distortion)?;
        let pose = memory.pin_floats("pose", args.pose)?;
        self.layout.check(&intrinsics, &distortion, &pose)?;

        let frame = MonoFrame {
            side,
            pixels: &frame_data,
            width: args.width,
            height: args.height,
            timestamp: args.timestamp,
            intrinsics: &intrinsics,
            distortion: &distortion,
            pose: &pose,
        };
        debug!(
            "Calling {} callback with {} bytes",
            side.channel(),
            frame.pixels.len()
        );
        callback.invoke(&frame)
    }

    fn deliver_stereo_frame<'a, M>(
        &self,
        memory: &mut M,
        callback: StereoFrameCallback,
        args: StereoFrameArgs<'a, M>,
    ) -> Result<(), BridgeError>
    where
        M: CallerMemory + 'a,
    {
        let frame_data = memory.pin_bytes("frame data", args.frame_data)?;
        let metadata = memory.pin_floats("stereo metadata", args.stereo_metadata)?;

        let frame = StereoFrame {
            pixels: &frame_data,
            width: args.width,
            height: args.height,
            timestamp: args.timestamp,
            metadata: &metadata,
        };
        debug!(
            "Calling stereo frame callback with {} bytes, metadata size: {}",
            frame.pixels.len(),
            frame.metadata.len()
        );
        callback.invoke(&frame)
    }

    fn skip(&self, channel: Channel) -> Delivery {
        debug!("{} callback is null, skipping event", channel);
        self.metrics.record_dropped(channel, "unregistered");
        Delivery::Unregistered
    }

    fn record(
        &self,
        channel: Channel,
        outcome: Result<(), BridgeError>,
    ) -> Result<Delivery, BridgeError> {
        match outcome {
            Ok(()) => {
                self.metrics.record_delivered(channel);
                Ok(Delivery::Delivered)
            }
            Err(err) => {
                warn!("Dropping {} event: {}", channel, err);
                self.metrics.record_dropped(channel, err.drop_reason());
                Err(err)
            }
        }
    }
}

fn deliver_error<'a, M>(
    memory: &mut M,
    callback: ErrorCallback,
    message: &'a M::Text,
) -> Result<(), BridgeError>
where
    M: CallerMemory + 'a,
{
    let text = memory.pin_text(message)?;
    error!("Camera error: {}", text.to_string_lossy());
    callback.invoke(&text);
    Ok(())
}
