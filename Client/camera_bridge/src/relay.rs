//! Forwards engine commands to the managed camera plugin.
//!
//! Every failure, whether the plugin instance cannot be found, a method is
//! missing or the call raised, is logged and turned into `false` (or a no-op
//! for the void commands). Nothing propagates back into the engine.

use tracing::{debug, error};

use crate::error::BridgeError;
use crate::types::Side;

/// Control surface of the managed camera plugin.
pub trait CameraControl {
    /// Host object passed through to `initialize`.
    type Context: ?Sized;

    fn initialize(&mut self, context: &Self::Context) -> Result<bool, BridgeError>;
    fn start_dual_camera(&mut self) -> Result<bool, BridgeError>;
    fn stop_dual_camera(&mut self) -> Result<(), BridgeError>;
    fn start_single_camera(&mut self, side: Side) -> Result<bool, BridgeError>;
    fn stop_single_camera(&mut self, side: Side) -> Result<(), BridgeError>;
}

pub struct CommandRelay<C> {
    control: C,
}

impl<C: CameraControl> CommandRelay<C> {
    pub fn new(control: C) -> Self {
        Self { control }
    }

    pub fn initialize(&mut self, context: &C::Context) -> bool {
        debug!("Native initialize called");
        settle("initialize", self.control.initialize(context))
    }

    pub fn start_dual_camera(&mut self) -> bool {
        debug!("Native start dual camera called");
        settle("startDualCamera", self.control.start_dual_camera())
    }

    pub fn stop_dual_camera(&mut self) {
        debug!("Native stop dual camera called");
        settle_void("stopDualCamera", self.control.stop_dual_camera());
    }

    pub fn start_single_camera(&mut self, side: Side) -> bool {
        debug!("Native start single camera called ({:?})", side);
        settle("startSingleCamera", self.control.start_single_camera(side))
    }

    pub fn stop_single_camera(&mut self, side: Side) {
        debug!("Native stop single camera called ({:?})", side);
        settle_void("stopSingleCamera", self.control.stop_single_camera(side));
    }

    pub fn control_mut(&mut self) -> &mut C {
        &mut self.control
    }

    pub fn into_inner(self) -> C {
        self.control
    }
}

fn settle(command: &str, result: Result<bool, BridgeError>) -> bool {
    match result {
        Ok(started) => {
            debug!("{} result: {}", command, started);
            started
        }
        Err(err) => {
            error!("{} failed: {}", command, err);
            false
        }
    }
}

fn settle_void(command: &str, result: Result<(), BridgeError>) {
    match result {
        Ok(()) => debug!("{} completed", command),
        Err(err) => error!("{} failed: {}", command, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeControl {
        calls: Vec<String>,
        fail_with_exception: bool,
        missing_instance: bool,
    }

    impl FakeControl {
        fn check(&mut self, name: &'static str) -> Result<(), BridgeError> {
            self.calls.push(name.to_string());
            if self.missing_instance {
                return Err(BridgeError::InstanceUnavailable("Companion".into()));
            }
            if self.fail_with_exception {
                return Err(BridgeError::HostException(name));
            }
            Ok(())
        }
    }

    impl CameraControl for FakeControl {
        type Context = str;

        fn initialize(&mut self, context: &str) -> Result<bool, BridgeError> {
            self.check("initialize")?;
            if context != "activity" {
                return Err(BridgeError::NotAContext);
            }
            Ok(true)
        }

        fn start_dual_camera(&mut self) -> Result<bool, BridgeError> {
            self.check("startDualCamera")?;
            Ok(true)
        }

        fn stop_dual_camera(&mut self) -> Result<(), BridgeError> {
            self.check("stopDualCamera")
        }

        fn start_single_camera(&mut self, side: Side) -> Result<bool, BridgeError> {
            self.check("startSingleCamera")?;
            Ok(side.is_left())
        }

        fn stop_single_camera(&mut self, _side: Side) -> Result<(), BridgeError> {
            self.check("stopSingleCamera")
        }
    }

    #[test]
    fn successful_commands_pass_results_through() {
        let mut relay = CommandRelay::new(FakeControl::default());
        assert!(relay.initialize("activity"));
        assert!(relay.start_dual_camera());
        relay.stop_dual_camera();
        assert!(relay.start_single_camera(Side::Left));
        assert!(!relay.start_single_camera(Side::Right));
        relay.stop_single_camera(Side::Left);

        assert_eq!(
            relay.into_inner().calls,
            [
                "initialize",
                "startDualCamera",
                "stopDualCamera",
                "startSingleCamera",
                "startSingleCamera",
                "stopSingleCamera"
            ]
        );
    }

    #[test]
    fn missing_instance_reports_false() {
        let mut relay = CommandRelay::new(FakeControl {
            missing_instance: true,
            ..FakeControl::default()
        });
        assert!(!relay.initialize("activity"));
        assert!(!relay.start_dual_camera());
        relay.stop_dual_camera();
    }

    #[test]
    fn host_exception_reports_false() {
        let mut relay = CommandRelay::new(FakeControl {
            fail_with_exception: true,
            ..FakeControl::default()
        });
        assert!(!relay.start_single_camera(Side::Left));
        relay.stop_single_camera(Side::Right);
    }

    #[test]
    fn wrong_context_reports_false() {
        let mut relay = CommandRelay::new(FakeControl::default());
        assert!(!relay.initialize("application"));
    }
}
