use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::callback::{ErrorCallback, FrameCallback, StereoFrameCallback};
use crate::types::{Channel, Side};

/// Process-wide registry the exported entry points read and write.
static GLOBAL_REGISTRY: Lazy<CallbackRegistry> = Lazy::new(CallbackRegistry::new);

pub fn global() -> &'static CallbackRegistry {
    &GLOBAL_REGISTRY
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SlotState {
    Unregistered,
    Registered,
}

/// One guarded address per channel. Each slot has its own lock, so a slow
/// registration on one channel never stalls deliveries on another.
#[derive(Default)]
struct Slot {
    address: Mutex<Option<NonZeroUsize>>,
}

impl Slot {
    fn store(&self, address: Option<NonZeroUsize>) {
        *self.address.lock().unwrap_or_else(PoisonError::into_inner) = address;
    }

    fn load(&self) -> Option<NonZeroUsize> {
        *self.address.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Default)]
pub struct CallbackRegistry {
    slots: [Slot; 4],
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `address` for `channel`; `0` unregisters it. Last writer wins.
    ///
    /// # Safety
    ///
    /// A non-zero `address` must be a function with the signature fixed for
    /// `channel` (see [`crate::callback`]) and must remain callable until it is
    /// replaced, cleared, or the registry is dropped.
    pub unsafe fn register(&self, channel: Channel, address: usize) {
        debug!("Setting {} callback: {:#x}", channel, address);
        self.slots[channel.index()].store(NonZeroUsize::new(address));
    }

    pub fn resolve(&self, channel: Channel) -> Option<NonZeroUsize> {
        self.slots[channel.index()].load()
    }

    pub fn state(&self, channel: Channel) -> SlotState {
        match self.resolve(channel) {
            Some(_) => SlotState::Registered,
            None => SlotState::Unregistered,
        }
    }

    /// Resets every slot, as on module unload.
    pub fn clear(&self) {
        for slot in &self.slots {
            slot.store(None);
        }
    }

    pub fn frame_callback(&self, side: Side) -> Option<FrameCallback> {
        self.resolve(side.channel())
            // Registered under the frame signature by the `register` contract.
            .map(|address| unsafe { FrameCallback::from_address(address) })
    }

    pub fn stereo_frame_callback(&self) -> Option<StereoFrameCallback> {
        self.resolve(Channel::StereoFrame)
            .map(|address| unsafe { StereoFrameCallback::from_address(address) })
    }

    pub fn error_callback(&self) -> Option<ErrorCallback> {
        self.resolve(Channel::Error)
            .map(|address| unsafe { ErrorCallback::from_address(address) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    extern "C" fn first(_: *const std::ffi::c_char) {}
    extern "C" fn second(_: *const std::ffi::c_char) {}

    #[test]
    fn slots_start_unregistered() {
        let registry = CallbackRegistry::new();
        for channel in Channel::ALL {
            assert_eq!(registry.state(channel), SlotState::Unregistered);
            assert!(registry.resolve(channel).is_none());
        }
    }

    #[test]
    fn registration_is_per_channel() {
        let registry = CallbackRegistry::new();
        unsafe { registry.register(Channel::Error, first as usize) };

        assert_eq!(registry.state(Channel::Error), SlotState::Registered);
        assert_eq!(registry.state(Channel::LeftFrame), SlotState::Unregistered);
        assert_eq!(
            registry.error_callback().map(ErrorCallback::address),
            Some(first as usize)
        );
    }

    #[test]
    fn zero_address_unregisters() {
        let registry = CallbackRegistry::new();
        unsafe {
            registry.register(Channel::Error, first as usize);
            registry.register(Channel::Error, 0);
        }
        assert_eq!(registry.state(Channel::Error), SlotState::Unregistered);
        assert!(registry.error_callback().is_none());
    }

    #[test]
    fn clear_resets_every_slot() {
        let registry = CallbackRegistry::new();
        for channel in Channel::ALL {
            unsafe { registry.register(channel, first as usize) };
        }
        registry.clear();
        for channel in Channel::ALL {
            assert_eq!(registry.state(channel), SlotState::Unregistered);
        }
    }

    #[test]
    fn concurrent_resolve_never_sees_a_torn_address() {
        let registry = Arc::new(CallbackRegistry::new());
        let done = Arc::new(AtomicBool::new(false));
        let a = first as usize;
        let b = second as usize;

        let writer = {
            let registry = registry.clone();
            let done = done.clone();
            std::thread::spawn(move || {
                for i in 0..20_000 {
                    let address = if i % 2 == 0 { a } else { b };
                    unsafe { registry.register(Channel::Error, address) };
                }
                done.store(true, Ordering::SeqCst);
            })
        };

        while !done.load(Ordering::SeqCst) {
            if let Some(seen) = registry.resolve(Channel::Error) {
                assert!(seen.get() == a || seen.get() == b);
            }
        }
        writer.join().unwrap();
        assert_eq!(registry.resolve(Channel::Error).map(NonZeroUsize::get), Some(b));
    }
}
