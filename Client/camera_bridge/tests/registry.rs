use proptest::prelude::*;
use quest_camera_bridge::registry::{CallbackRegistry, SlotState};
use quest_camera_bridge::types::Channel;

fn channel() -> impl Strategy<Value = Channel> {
    prop::sample::select(Channel::ALL.to_vec())
}

proptest! {
    // Addresses are only stored and read back here, never called.
    #[test]
    fn resolve_returns_last_registered_address(
        channel in channel(),
        addresses in prop::collection::vec(any::<usize>(), 1..8),
    ) {
        let registry = CallbackRegistry::new();
        for address in &addresses {
            unsafe { registry.register(channel, *address) };
        }
        let last = *addresses.last().unwrap();
        prop_assert_eq!(registry.resolve(channel).map(|a| a.get()).unwrap_or(0), last);
        prop_assert_eq!(
            registry.state(channel),
            if last == 0 { SlotState::Unregistered } else { SlotState::Registered }
        );
    }

    #[test]
    fn other_channels_are_untouched(channel in channel(), address in 1usize..) {
        let registry = CallbackRegistry::new();
        unsafe { registry.register(channel, address) };
        for other in Channel::ALL.into_iter().filter(|c| *c != channel) {
            prop_assert!(registry.resolve(other).is_none());
        }
    }

    #[test]
    fn null_clears_any_slot(channel in channel(), address in 1usize..) {
        let registry = CallbackRegistry::new();
        unsafe {
            registry.register(channel, address);
            registry.register(channel, 0);
        }
        prop_assert_eq!(registry.state(channel), SlotState::Unregistered);
    }
}
