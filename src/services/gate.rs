use std::sync::atomic::{AtomicBool, Ordering};

/// Single "request in flight" flag shared by the editor and the tree.
#[derive(Debug, Default)]
pub struct RequestGate {
    in_flight: AtomicBool,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claims the gate; `None` when another request holds it.
    pub fn try_begin(&self) -> Option<GateGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GateGuard { gate: self })
    }
}

/// Releases the gate when dropped, on every exit path.
#[derive(Debug)]
pub struct GateGuard<'a> {
    gate: &'a RequestGate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::Release);
    }
}
