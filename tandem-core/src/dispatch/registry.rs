use core::fmt;

use heapless::Vec;
use tandem_hal::{IrqEvent, PeripheralHandle, PinId};

use super::{InterruptHandler, PinHandler};

/// Controllers per peripheral family
pub const MAX_CONTROLLERS: usize = 8;

/// External interrupt lines with a handler
pub const MAX_PINS: usize = 16;

/// Why a registration was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Every slot is taken
    Full,
    /// The key already has a handler
    Duplicate,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Full => f.write_str("registry full"),
            RegistryError::Duplicate => f.write_str("key already registered"),
        }
    }
}

/// Fixed-capacity table from keys to handlers
///
/// At most one entry per key. Lookup is a linear scan in registration
/// order; the first match wins.
pub struct DispatchTable<'a, K, H: ?Sized, const N: usize> {
    entries: Vec<(K, &'a H), N>,
}

impl<'a, K: Copy + Eq, H: ?Sized, const N: usize> DispatchTable<'a, K, H, N> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn register(&mut self, key: K, handler: &'a H) -> Result<(), RegistryError> {
        if self.entries.iter().any(|(k, _)| *k == key) {
            return Err(RegistryError::Duplicate);
        }
        self.entries
            .push((key, handler))
            .map_err(|_| RegistryError::Full)
    }

    pub fn lookup(&self, key: K) -> Option<&'a H> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, handler)| *handler)
    }

}

impl<K: Copy + Eq, H: ?Sized, const N: usize> Default for DispatchTable<'_, K, H, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Controllers of one family, keyed by handle
pub type HandleRegistry<'a> =
    DispatchTable<'a, PeripheralHandle, dyn InterruptHandler + 'a, MAX_CONTROLLERS>;

/// External interrupt lines, keyed by pin
pub type PinRegistry<'a> = DispatchTable<'a, PinId, dyn PinHandler + 'a, MAX_PINS>;

impl<'a> DispatchTable<'a, PeripheralHandle, dyn InterruptHandler + 'a, MAX_CONTROLLERS> {
    /// Forward `event` to the driver owning `handle`
    ///
    /// Returns `false`, doing nothing else, if no driver owns it.
    pub fn route(&self, handle: PeripheralHandle, event: IrqEvent) -> bool {
        match self.lookup(handle) {
            Some(handler) => {
                handler.on_interrupt(event);
                true
            }
            None => false,
        }
    }
}

impl<'a> DispatchTable<'a, PinId, dyn PinHandler + 'a, MAX_PINS> {
    /// Forward an edge on `pin` to its handler, if any
    pub fn route(&self, pin: PinId) -> bool {
        match self.lookup(pin) {
            Some(handler) => {
                handler.on_edge();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use critical_section::Mutex;
    use proptest::prelude::*;

    /// Records every event it receives
    struct Recorder {
        events: Mutex<RefCell<std::vec::Vec<IrqEvent>>>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                events: Mutex::new(RefCell::new(std::vec::Vec::new())),
            }
        }

        fn events(&self) -> std::vec::Vec<IrqEvent> {
            critical_section::with(|cs| self.events.borrow_ref(cs).clone())
        }
    }

    impl InterruptHandler for Recorder {
        fn on_interrupt(&self, event: IrqEvent) {
            critical_section::with(|cs| self.events.borrow_ref_mut(cs).push(event));
        }
    }

    const ALL_EVENTS: [IrqEvent; 4] = [
        IrqEvent::TransmitComplete,
        IrqEvent::ReceiveComplete,
        IrqEvent::TransferComplete,
        IrqEvent::Error,
    ];

    fn handle(raw: usize) -> PeripheralHandle {
        PeripheralHandle::from_raw(raw)
    }

    #[test]
    fn test_route_unknown_handle_is_noop() {
        let registry = HandleRegistry::new();
        assert!(!registry.route(handle(0x1000), IrqEvent::TransmitComplete));
    }

    #[test]
    fn test_route_reaches_only_owner() {
        let a = Recorder::new();
        let b = Recorder::new();
        let mut registry = HandleRegistry::new();
        registry.register(handle(1), &a).unwrap();
        registry.register(handle(2), &b).unwrap();

        for event in ALL_EVENTS {
            assert!(registry.route(handle(2), event));
        }

        assert!(a.events().is_empty());
        assert_eq!(b.events(), ALL_EVENTS.to_vec());
    }

    #[test]
    fn test_duplicate_handle_rejected() {
        let a = Recorder::new();
        let b = Recorder::new();
        let mut registry = HandleRegistry::new();
        registry.register(handle(1), &a).unwrap();
        assert_eq!(
            registry.register(handle(1), &b),
            Err(RegistryError::Duplicate)
        );
        registry.route(handle(1), IrqEvent::Error);
        assert_eq!(a.events(), vec![IrqEvent::Error]);
        assert!(b.events().is_empty());
    }

    #[test]
    fn test_capacity_exhausted() {
        let recorder = Recorder::new();
        let mut registry = HandleRegistry::new();
        for raw in 0..MAX_CONTROLLERS {
            registry.register(handle(raw), &recorder).unwrap();
        }
        assert_eq!(
            registry.register(handle(MAX_CONTROLLERS), &recorder),
            Err(RegistryError::Full)
        );
        assert!(!registry.route(handle(MAX_CONTROLLERS), IrqEvent::Error));
        assert!(registry.route(handle(MAX_CONTROLLERS - 1), IrqEvent::Error));
    }

    proptest! {
        #[test]
        fn prop_route_dispatches_to_exactly_the_owner(
            raws in prop::collection::hash_set(0usize..0x1_0000, 1..=MAX_CONTROLLERS),
            pick in any::<prop::sample::Index>(),
            event in prop::sample::select(ALL_EVENTS.to_vec()),
        ) {
            let raws: std::vec::Vec<usize> = raws.into_iter().collect();
            let recorders: std::vec::Vec<Recorder> = raws.iter().map(|_| Recorder::new()).collect();
            let mut registry = HandleRegistry::new();
            for (raw, recorder) in raws.iter().zip(&recorders) {
                registry.register(handle(*raw), recorder).unwrap();
            }

            let target = pick.index(raws.len());
            prop_assert!(registry.route(handle(raws[target]), event));

            for (i, recorder) in recorders.iter().enumerate() {
                let expected = if i == target { vec![event] } else { vec![] };
                prop_assert_eq!(recorder.events(), expected);
            }
        }

        #[test]
        fn prop_unregistered_handles_route_nowhere(
            raws in prop::collection::hash_set(0usize..0x100, 0..=MAX_CONTROLLERS),
            stranger in 0x100usize..0x200,
        ) {
            let recorder = Recorder::new();
            let mut registry = HandleRegistry::new();
            for raw in &raws {
                registry.register(handle(*raw), &recorder).unwrap();
            }
            prop_assert!(!registry.route(handle(stranger), IrqEvent::Error));
            prop_assert!(recorder.events().is_empty());
        }
    }
}
