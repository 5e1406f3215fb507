//! Shared device handle for concurrent contexts.
//!
//! ```text
//! ┌───────────────┐
//! │ irq handler   ├──┐
//! ├───────────────┤  │   ┌─────────────────┐   ┌──────────┐
//! │ poll callback ├──┼──▶│ SharedIsl29028  ├──▶│ Isl29028 │
//! ├───────────────┤  │   │ (blocking mutex)│   └──────────┘
//! │ attr writers  ├──┘   └─────────────────┘
//! └───────────────┘
//! ```
//!
//! One mutex serializes every operation end to end, bus transactions and
//! the reconciler's settle wait included. That wait happening under the
//! lock is deliberate backpressure: an attribute writer blocks until the
//! hardware has settled, so it can never observe a half-applied
//! configuration.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::attrs::{self, AttrValue, Channel};
use crate::device::Isl29028;
use crate::error::Result;
use crate::ports::{EventSink, HostServices, IrqControl};

/// A device behind a critical-section mutex, shareable between the
/// interrupt context, the poll callback, and attribute writers.
pub struct SharedIsl29028<B, I, H, E, D> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Isl29028<B, I, H, E, D>>>,
}

impl<B, I, H, E, D> SharedIsl29028<B, I, H, E, D>
where
    B: I2c,
    I: IrqControl,
    H: HostServices,
    E: EventSink,
    D: DelayNs,
{
    /// Wraps an attached device.
    pub fn new(device: Isl29028<B, I, H, E, D>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(device)),
        }
    }

    /// Runs `f` with exclusive access to the device. All forwarding
    /// methods below go through here; use this directly for compound
    /// operations that must not interleave.
    pub fn with<R>(&self, f: impl FnOnce(&mut Isl29028<B, I, H, E, D>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Entry point for the platform's interrupt handler.
    pub fn handle_interrupt(&self) {
        self.with(Isl29028::handle_interrupt);
    }

    /// Entry point for the platform's deferred poll callback.
    pub fn poll_tick(&self) {
        self.with(Isl29028::poll_tick);
    }

    pub fn open_als(&self) -> Result<()> {
        self.with(Isl29028::open_als)
    }

    pub fn close_als(&self) {
        self.with(Isl29028::close_als);
    }

    pub fn open_prox(&self) -> Result<()> {
        self.with(Isl29028::open_prox)
    }

    pub fn close_prox(&self) {
        self.with(Isl29028::close_prox);
    }

    pub fn suspend(&self) -> Result<()> {
        self.with(Isl29028::suspend)
    }

    pub fn resume(&self) -> Result<()> {
        self.with(Isl29028::resume)
    }

    pub fn early_suspend(&self) {
        self.with(Isl29028::early_suspend);
    }

    pub fn early_resume(&self) {
        self.with(Isl29028::early_resume);
    }

    /// Reads an attribute; see [`attrs::read_attr`].
    pub fn read_attr(&self, channel: Channel, name: &str) -> Result<AttrValue> {
        self.with(|dev| attrs::read_attr(dev, channel, name))
    }

    /// Writes an attribute; see [`attrs::write_attr`].
    pub fn write_attr(&self, channel: Channel, name: &str, raw: &str) -> Result<()> {
        self.with(|dev| attrs::write_attr(dev, channel, name, raw))
    }

    /// Consumes the handle and quiesces the device. Taking `self` by
    /// value makes a detach racing an in-flight operation a compile
    /// error rather than a runtime one.
    pub fn detach(self) -> (B, I, H, E, D) {
        self.inner.into_inner().into_inner().detach()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlatformConfig;
    use crate::device::mock::{MockBus, MockDelay, MockHost, MockIrq, MockSink};

    fn shared() -> (
        SharedIsl29028<MockBus, MockIrq, MockHost, MockSink, MockDelay>,
        MockHost,
        MockSink,
    ) {
        let host = MockHost::default();
        let sink = MockSink::default();
        let mut dev = Isl29028::new(
            MockBus::default(),
            MockIrq::default(),
            host.clone(),
            sink.clone(),
            MockDelay::default(),
            PlatformConfig::default(),
        );
        dev.attach().unwrap();
        (SharedIsl29028::new(dev), host, sink)
    }

    #[test]
    fn attribute_writes_go_through_the_lock() {
        let (shared, _host, _sink) = shared();
        shared.open_prox().unwrap();
        shared.write_attr(Channel::Proximity, "enable", "1").unwrap();
        assert_eq!(
            shared.read_attr(Channel::Proximity, "enable").unwrap(),
            "1\n"
        );
    }

    #[test]
    fn interrupt_entry_point_dispatches() {
        let (shared, host, sink) = shared();
        shared.open_prox().unwrap();
        shared.write_attr(Channel::Proximity, "enable", "1").unwrap();

        shared.handle_interrupt();
        assert_eq!(sink.0.borrow().prox.len(), 1);
        assert_eq!(host.0.borrow().wake_locks.as_slice(), [500]);
    }

    #[test]
    fn detach_consumes_the_handle_and_quiesces() {
        let (shared, host, _sink) = shared();
        shared.open_als().unwrap();
        shared.write_attr(Channel::Light, "dump_period", "100").unwrap();
        assert!(host.0.borrow().scheduled_ms.is_some());

        let (_bus, irq, _host, _sink, _delay) = shared.detach();
        assert_eq!(host.0.borrow().scheduled_ms, None);
        assert!(irq.0.borrow().masked);
    }
}
