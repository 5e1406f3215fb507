//! ISL29028 device core: state store, configuration reconciler, and
//! event dispatcher.
//!
//! ```text
//!  attribute writes ──┐
//!  open/close ────────┤              ┌──▶ I2c bus (registers)
//!  suspend/resume ────┼─▶ Isl29028 ──┼──▶ IrqControl (line)
//!  irq / poll tick ───┘              ├──▶ HostServices (wake, poll)
//!                                    └──▶ EventSink (samples)
//! ```
//!
//! Every external stimulus mutates the state store and then runs
//! [`Isl29028::update_device`], which recomputes the full hardware
//! configuration from scratch — thresholds, CONFIGURE byte, interrupt
//! mask, trigger polarity, wake source, line mask, poll scheduling.
//! Interrupts and poll ticks run the identical [`Isl29028::dispatch`]
//! routine.
//!
//! ## Serialization
//!
//! `&mut self` on every operation is the locking contract: exactly one
//! operation runs against a device at a time, bus transactions included.
//! Callers that share a device across contexts wrap it in
//! [`SharedIsl29028`](crate::shared::SharedIsl29028), which holds one
//! blocking mutex across each whole operation. The reconciler's settle
//! wait deliberately happens under that lock as backpressure.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use log::{error, info};

use crate::config::{PlatformConfig, RangeMode};
use crate::error::{Error, Result};
use crate::ports::{EventSink, HostServices, IrqControl, Polarity};
use crate::registers::{
    self, REG_ALSIR_DT1, REG_ALSIR_TH1, REG_CONFIGURE, REG_ID, REG_INTERRUPT, REG_PROX_DATA,
    REG_PROX_LT, REG_TEST1, REG_TEST2,
};
use crate::tuning::{
    adjust_range, als_threshold_window, normalize_null_value, normalize_period, scale_light,
};

/// Default 7-bit bus address of the ISL29028.
pub const DEFAULT_ADDRESS: u8 = 0x44;

/// The chip converts continuously at a fixed 800 ms light period; the
/// ALS `poll_delay` attribute reports this and ignores writes.
pub const ALS_FIXED_PERIOD_NS: u64 = 800_000_000;

/// Settle time granted to the first hardware sample after an
/// out-of-dispatch configuration change.
const SETTLE_MS: u32 = 100;

/// How long a proximity event keeps the system awake.
const WAKE_LOCK_MS: u32 = 500;

/// Interrupt acknowledge attempts before the line is masked.
const ACK_ATTEMPTS: u32 = 3;
const ACK_RETRY_DELAY_MS: u32 = 1;

/// Optional board hooks run around the device's lifetime.
pub type PlatformHook = fn() -> core::result::Result<(), &'static str>;

/// Setup/teardown hooks supplied by the board (regulator ramp, pin mux).
#[derive(Debug, Clone, Copy, Default)]
pub struct Hooks {
    /// Runs before first bus contact at attach.
    pub setup: Option<PlatformHook>,
    /// Runs on detach and on every attach rollback path.
    pub teardown: Option<PlatformHook>,
}

/// One physical ISL29028 with all of its mutable driver state.
pub struct Isl29028<B, I, H, E, D> {
    bus: B,
    irq: I,
    host: H,
    events: E,
    delay: D,
    address: u8,
    config: PlatformConfig,
    hooks: Hooks,

    // Common state.
    suspended: bool,
    early_suspended: bool,
    dump_period_ms: u32,
    dump_output: bool,
    dump_registers: bool,

    // Light channel.
    als_opened: bool,
    als_enabled: bool,
    als_high_range: bool,
    als_auto_range: bool,
    als_sensitivity: u32,
    als_light: u16,

    // Proximity channel.
    prox_opened: bool,
    prox_enabled: bool,
    prox_period_ns: u64,
    prox_null_value: u16,

    /// Tri-purpose flag. When an object is near: the IRQ must go
    /// high-active to see the leaving edge, and the light channel must
    /// be temporarily suppressed because of that polarity. All three
    /// meanings are always the same value; see the accessor views.
    object_near: bool,

    // IRQ bookkeeping.
    irq_wake_enabled: bool,
    irq_masked: bool,
    in_dispatch: bool,
}

impl<B, I, H, E, D> Isl29028<B, I, H, E, D>
where
    B: I2c,
    I: IrqControl,
    H: HostServices,
    E: EventSink,
    D: DelayNs,
{
    /// Builds the device context around its collaborators.
    ///
    /// No hardware is touched; call [`attach`](Self::attach) next. The
    /// interrupt line is expected to be wired low-active and unmasked,
    /// matching the chip's reset polarity.
    pub fn new(bus: B, irq: I, host: H, events: E, delay: D, config: PlatformConfig) -> Self {
        Self {
            bus,
            irq,
            host,
            events,
            delay,
            address: DEFAULT_ADDRESS,
            als_high_range: config.als_range_mode == RangeMode::High,
            als_auto_range: config.als_range_mode == RangeMode::Auto,
            als_sensitivity: config.als_sensitivity,
            als_light: 0,
            prox_period_ns: normalize_period(config.prox_period_ns),
            prox_null_value: config.prox_null_value,
            config,
            hooks: Hooks::default(),

            suspended: false,
            early_suspended: false,
            dump_period_ms: 0,
            dump_output: false,
            dump_registers: false,

            als_opened: false,
            als_enabled: false,

            prox_opened: false,
            prox_enabled: false,

            object_near: false,

            irq_wake_enabled: false,
            irq_masked: false,
            in_dispatch: false,
        }
    }

    /// Replaces the default bus address (ADDR pin strapped high).
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Installs board setup/teardown hooks.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Probes and initializes the chip: platform setup hook, presence
    /// check, reset command sequence. Rolls back the hook on every
    /// failure path.
    pub fn attach(&mut self) -> Result<()> {
        if let Some(setup) = self.hooks.setup {
            setup().map_err(Error::Setup)?;
        }

        // Presence check: the ID register must answer.
        if self.read_reg(REG_ID).is_err() {
            error!("fail to detect ISL29028 chip.");
            self.run_teardown_hook();
            return Err(Error::NoDevice);
        }

        if let Err(e) = self.reset_device() {
            self.run_teardown_hook();
            return Err(e);
        }

        Ok(())
    }

    /// Quiesces the device and returns the owned collaborators.
    ///
    /// The line is masked and the pending poll synchronously canceled
    /// before anything is released, so no stray dispatch can observe
    /// torn-down state.
    pub fn detach(mut self) -> (B, I, H, E, D) {
        self.update_irq_state(false);
        let _ = self.update_irq_wake(false);
        self.host.cancel_poll();
        self.run_teardown_hook();

        (self.bus, self.irq, self.host, self.events, self.delay)
    }

    /// Issues the documented reset command sequence and waits for it.
    fn reset_device(&mut self) -> Result<()> {
        let sequence = [
            (REG_CONFIGURE, 0x00),
            (REG_TEST2, 0x29),
            (REG_TEST1, 0x00),
            (REG_TEST2, 0x00),
        ];
        for (reg, value) in sequence {
            if let Err(e) = self.write_reg(reg, value) {
                error!("fail to reset device.");
                return Err(e);
            }
        }

        self.delay.delay_ms(1);
        Ok(())
    }

    fn run_teardown_hook(&mut self) {
        if let Some(teardown) = self.hooks.teardown {
            if let Err(msg) = teardown() {
                error!("fail to perform platform teardown: {msg}");
            }
        }
    }

    // ── Derived predicates (recomputed, never cached) ─────────

    fn prox_active(&self) -> bool {
        self.prox_opened && self.prox_enabled
    }

    fn als_active(&self) -> bool {
        self.als_opened
            && self.als_enabled
            && !self.suspended
            && !self.early_suspended
            && (!self.prox_active() || !self.als_suppressed())
    }

    fn irq_active(&self) -> bool {
        self.dump_period_ms == 0
            && !self.suspended
            && (self.als_active() || self.prox_active())
    }

    fn irq_trigger(&self) -> Polarity {
        if self.prox_active() && self.irq_high_active() {
            Polarity::ActiveHigh
        } else {
            Polarity::ActiveLow
        }
    }

    // Views of the tri-purpose flag.

    /// An object is within the calibrated proximity window.
    pub fn object_near(&self) -> bool {
        self.object_near
    }

    /// The light channel is suppressed while the object is near.
    fn als_suppressed(&self) -> bool {
        self.object_near
    }

    /// The line must be high-active to observe the leaving edge.
    fn irq_high_active(&self) -> bool {
        self.object_near
    }

    // ── Configuration reconciler ──────────────────────────────

    /// Recomputes and pushes the complete hardware configuration from
    /// the current state.
    ///
    /// The first bus failure aborts reconciliation; partial hardware
    /// state is acceptable because the next call rebuilds everything
    /// from scratch. Logical state is never rolled back here — the
    /// caller's intent survives a transient bus glitch.
    pub fn update_device(&mut self) -> Result<()> {
        // Sensor threshold windows.
        if self.als_active() {
            self.push_als_thresholds()?;
        }
        if self.prox_active() {
            self.push_prox_thresholds()?;
        }

        // CONFIGURE register.
        let config = registers::configure_value(
            self.prox_period_ns,
            self.als_active(),
            self.prox_active(),
            self.als_high_range,
        );
        if let Err(e) = self.write_reg(REG_CONFIGURE, config) {
            error!("fail to set configure register.");
            return Err(e);
        }

        // INTERRUPT register, also acknowledges a pending request.
        // The prox flag is only cleared when the channel goes inactive:
        // while active, hardware clears it itself once the object is far.
        let intr = if self.prox_active() {
            registers::INTR_ACTIVE
        } else {
            registers::INTR_INACTIVE
        };
        if let Err(e) = self.write_reg(REG_INTERRUPT, intr) {
            error!("fail to set interrupt register.");
            return Err(e);
        }

        // Line configuration.
        let trigger = self.irq_trigger();
        if let Err(e) = self.irq.set_trigger(trigger) {
            error!("fail to set irq type: {e}");
            return Err(e.into());
        }

        let prox_on = self.prox_active();
        self.update_irq_wake(prox_on)?;

        let irq_on = self.irq_active();
        self.update_irq_state(irq_on);

        // Wait out the first sampling cycle, except inside the
        // dispatcher where the sample already exists.
        if (self.als_active() || self.prox_active()) && !self.in_dispatch {
            self.delay.delay_ms(SETTLE_MS);
        }

        // Periodic dump poll.
        if self.dump_period_ms != 0 {
            self.host.schedule_poll(self.dump_period_ms);
        } else {
            self.host.cancel_poll();
        }

        if self.dump_registers {
            self.dump_register_file();
        }

        Ok(())
    }

    fn push_als_thresholds(&mut self) -> Result<()> {
        let (low, high) = als_threshold_window(self.als_light, self.als_sensitivity);
        let buf = registers::pack_als_thresholds(low, high);

        self.bus
            .write(self.address, &[REG_ALSIR_TH1, buf[0], buf[1], buf[2]])
            .map_err(|e| {
                error!("fail to set als threshold range.");
                Error::Bus(e.kind())
            })
    }

    fn push_prox_thresholds(&mut self) -> Result<()> {
        let low = self.prox_null_value + self.config.prox_lowthres_offset;
        let high = low + self.config.prox_threswindow;

        // Both fit in 8 bits: the null-value write path keeps
        // `null + offset + window` at or below the 250-count ceiling.
        self.bus
            .write(self.address, &[REG_PROX_LT, low as u8, high as u8])
            .map_err(|e| {
                error!("fail to set prox threshold range.");
                Error::Bus(e.kind())
            })
    }

    /// Makes the line a wake source exactly while proximity runs.
    /// Idempotent; rolls the flag back if the controller refuses.
    fn update_irq_wake(&mut self, on: bool) -> Result<()> {
        if self.irq_wake_enabled != on {
            self.irq_wake_enabled = on;
            if let Err(e) = self.irq.set_wake(on) {
                self.irq_wake_enabled = !on;
                error!("fail to set irq wake: {e}");
                return Err(e.into());
            }
        }

        Ok(())
    }

    /// Masks/unmasks the line, tracking the current state so the
    /// controller only sees real transitions.
    fn update_irq_state(&mut self, on: bool) {
        if self.irq_masked == on {
            self.irq_masked = !on;
            if on {
                self.irq.unmask();
            } else {
                self.irq.mask();
            }
        }
    }

    fn dump_register_file(&mut self) {
        const DUMP: [(&str, u8); 9] = [
            ("CONFIGURE", REG_CONFIGURE),
            ("INTERRUPT", REG_INTERRUPT),
            ("PROX_LT", REG_PROX_LT),
            ("PROX_HT", registers::REG_PROX_HT),
            ("ALSIR_TH1", REG_ALSIR_TH1),
            ("ALSIR_TH2", registers::REG_ALSIR_TH2),
            ("ALSIR_TH3", registers::REG_ALSIR_TH3),
            ("PROX_DATA", REG_PROX_DATA),
            ("ALSIR_DT1", REG_ALSIR_DT1),
        ];
        for (name, reg) in DUMP {
            match self.read_reg(reg) {
                Ok(value) => info!("{name}\t: {value:02x}"),
                Err(e) => error!("fail to dump {name}: {e}"),
            }
        }
    }

    // ── Event dispatcher ──────────────────────────────────────

    /// Services a hardware interrupt.
    pub fn handle_interrupt(&mut self) {
        self.dispatch();
    }

    /// Services a periodic dump poll; same routine as a real interrupt.
    pub fn poll_tick(&mut self) {
        self.dispatch();
    }

    /// Collects fresh samples, reports them, and re-arms the device.
    fn dispatch(&mut self) {
        self.in_dispatch = true;

        // Collect ambient light.
        if self.als_active() {
            let raw = self.read_light();
            let mlux = scale_light(raw, self.als_high_range, self.config.als_factor);

            self.als_light = raw;
            self.als_high_range = adjust_range(
                raw,
                self.als_auto_range,
                self.als_high_range,
                self.config.als_low_thres,
                self.config.als_high_thres,
            );

            self.events.report_light(mlux, raw);

            if self.dump_output {
                info!("light={raw:04}({mlux:07}mLux).");
            }
        }

        // Collect proximity output.
        if self.prox_active() {
            let raw = self.read_prox();
            let near_at = self.prox_null_value
                + self.config.prox_lowthres_offset
                + self.config.prox_threswindow;
            self.object_near = u16::from(raw) >= near_at;

            self.events.report_proximity(self.object_near, raw);
            self.host.wake_lock_timeout(WAKE_LOCK_MS);

            if self.dump_output {
                let state = if self.object_near { "near" } else { "far" };
                info!("prox={raw:03}({state}).");
            }
        }

        // Acknowledge and re-arm; three attempts before giving up.
        let mut acknowledged = false;
        for attempt in 0..ACK_ATTEMPTS {
            match self.update_device() {
                Ok(()) => {
                    acknowledged = true;
                    break;
                }
                Err(e) => {
                    error!("fail to acknowledge interrupt({attempt}): {e}");
                    self.delay.delay_ms(ACK_RETRY_DELAY_MS);
                }
            }
        }

        if !acknowledged {
            // Mask the line so a stuck request cannot storm. Wake state
            // is left alone; a later configuration change unmasks.
            self.update_irq_state(false);
        }

        self.in_dispatch = false;
    }

    /// Reads the 16-bit light output. A bus failure is logged and
    /// yields 0 rather than aborting the dispatch cycle.
    fn read_light(&mut self) -> u16 {
        let mut buf = [0u8; 2];
        match self.bus.write_read(self.address, &[REG_ALSIR_DT1], &mut buf) {
            Ok(()) => registers::decode_als_data(buf),
            Err(_) => {
                error!("fail to read als output register.");
                0
            }
        }
    }

    /// Reads the 8-bit proximity output; 0 on bus failure.
    fn read_prox(&mut self) -> u8 {
        let mut buf = [0u8; 1];
        match self.bus.write_read(self.address, &[REG_PROX_DATA], &mut buf) {
            Ok(()) => buf[0],
            Err(_) => {
                error!("fail to read prox output register.");
                0
            }
        }
    }

    // ── Channel open/close ────────────────────────────────────

    pub fn open_als(&mut self) -> Result<()> {
        self.als_opened = true;
        self.update_device()
    }

    pub fn close_als(&mut self) {
        self.als_opened = false;
        let _ = self.update_device();
    }

    pub fn open_prox(&mut self) -> Result<()> {
        self.prox_opened = true;
        self.update_device()
    }

    pub fn close_prox(&mut self) {
        self.prox_opened = false;
        let _ = self.update_device();
    }

    // ── Power transitions ─────────────────────────────────────

    pub fn suspend(&mut self) -> Result<()> {
        self.suspended = true;
        self.update_device()
    }

    pub fn resume(&mut self) -> Result<()> {
        self.suspended = false;
        self.update_device()
    }

    /// Screen-off notification: stops light reporting while proximity
    /// (wake source) keeps running.
    pub fn early_suspend(&mut self) {
        self.early_suspended = true;
        let _ = self.update_device();
    }

    pub fn early_resume(&mut self) {
        self.early_suspended = false;
        let _ = self.update_device();
    }

    // ── Attribute setters ─────────────────────────────────────
    //
    // Each stores the requested intent first and then reconciles; a bus
    // failure is reported but does not undo the stored value.

    pub fn set_dump_period_ms(&mut self, ms: u32) -> Result<()> {
        self.dump_period_ms = ms;
        self.update_device()
    }

    pub fn set_dump_output(&mut self, on: bool) -> Result<()> {
        self.dump_output = on;
        self.update_device()
    }

    pub fn set_dump_registers(&mut self, on: bool) -> Result<()> {
        self.dump_registers = on;
        self.update_device()
    }

    pub fn set_als_enabled(&mut self, on: bool) -> Result<()> {
        self.als_enabled = on;
        self.update_device()
    }

    pub fn set_als_range(&mut self, mode: RangeMode) -> Result<()> {
        self.als_high_range = mode == RangeMode::High;
        self.als_auto_range = mode == RangeMode::Auto;
        self.update_device()
    }

    pub fn set_als_sensitivity(&mut self, percent: u32) -> Result<()> {
        if percent > 100 {
            return Err(Error::Invalid("sensitivity above 100 percent"));
        }
        self.als_sensitivity = percent;
        self.update_device()
    }

    pub fn set_prox_enabled(&mut self, on: bool) -> Result<()> {
        self.prox_enabled = on;
        self.update_device()
    }

    /// Stores the nearest permitted sampling period at or below the
    /// request (subject to the LED-protection floor).
    pub fn set_prox_period_ns(&mut self, period_ns: u64) -> Result<()> {
        self.prox_period_ns = normalize_period(period_ns);
        self.update_device()
    }

    /// Re-baselines the proximity null value. Rejected before any
    /// hardware mutation when the threshold geometry cannot fit.
    pub fn set_prox_null_value(&mut self, candidate: u64) -> Result<()> {
        self.prox_null_value = normalize_null_value(
            candidate,
            self.config.prox_lowthres_offset,
            self.config.prox_threswindow,
        )?;
        self.update_device()
    }

    // ── Attribute getters ─────────────────────────────────────

    pub fn dump_period_ms(&self) -> u32 {
        self.dump_period_ms
    }

    pub fn dump_output(&self) -> bool {
        self.dump_output
    }

    pub fn dump_registers(&self) -> bool {
        self.dump_registers
    }

    pub fn als_enabled(&self) -> bool {
        self.als_enabled
    }

    /// The `range` attribute reads back the range currently in effect
    /// (0 or 1), not the requested mode — auto-ranging keeps moving it.
    pub fn als_range_attr(&self) -> u64 {
        u64::from(self.als_high_range)
    }

    pub fn als_sensitivity(&self) -> u32 {
        self.als_sensitivity
    }

    /// Last raw light reading.
    pub fn als_light(&self) -> u16 {
        self.als_light
    }

    pub fn prox_enabled(&self) -> bool {
        self.prox_enabled
    }

    pub fn prox_period_ns(&self) -> u64 {
        self.prox_period_ns
    }

    pub fn prox_null_value(&self) -> u16 {
        self.prox_null_value
    }

    // ── Bus helpers ───────────────────────────────────────────

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<()> {
        self.bus
            .write(self.address, &[reg, value])
            .map_err(|e| Error::Bus(e.kind()))
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.bus
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|e| Error::Bus(e.kind()))?;
        Ok(buf[0])
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod mock {
    //! Mock adapters for the port traits, shared by the device, attrs,
    //! and shared-handle tests. Handles are `Rc<RefCell<_>>` so a test
    //! can keep inspecting state it handed to the device.

    use core::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    use embedded_hal::delay::DelayNs;
    use embedded_hal::i2c::{self, ErrorType, I2c, Operation};

    use crate::ports::{EventSink, HostServices, IrqControl, IrqError, Polarity};

    // ── Bus ───────────────────────────────────────────────────

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MockBusError;

    impl i2c::Error for MockBusError {
        fn kind(&self) -> i2c::ErrorKind {
            i2c::ErrorKind::Other
        }
    }

    #[derive(Default)]
    pub struct BusState {
        pub regs: [u8; 16],
        pub writes: Vec<(u8, Vec<u8>)>,
        pub fail_reads: bool,
        pub fail_writes: bool,
    }

    impl BusState {
        /// Last value written to `reg`, if any write touched it.
        pub fn last_write(&self, reg: u8) -> Option<u8> {
            self.writes
                .iter()
                .rev()
                .find(|(r, _)| *r == reg)
                .map(|(_, data)| data[0])
        }
    }

    #[derive(Clone, Default)]
    pub struct MockBus(pub Rc<RefCell<BusState>>);

    impl ErrorType for MockBus {
        type Error = MockBusError;
    }

    impl I2c for MockBus {
        fn transaction(
            &mut self,
            _address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            let mut state = self.0.borrow_mut();
            let mut reg: Option<u8> = None;

            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        if state.fail_writes && bytes.len() > 1 {
                            return Err(MockBusError);
                        }
                        let base = bytes[0];
                        reg = Some(base);
                        if bytes.len() > 1 {
                            for (i, b) in bytes[1..].iter().enumerate() {
                                state.regs[(base as usize + i) % 16] = *b;
                            }
                            state.writes.push((base, bytes[1..].to_vec()));
                        }
                    }
                    Operation::Read(buf) => {
                        if state.fail_reads {
                            return Err(MockBusError);
                        }
                        let base = reg.take().unwrap_or(0);
                        for (i, b) in buf.iter_mut().enumerate() {
                            *b = state.regs[(base as usize + i) % 16];
                        }
                    }
                }
            }
            Ok(())
        }
    }

    // ── Interrupt line ────────────────────────────────────────

    #[derive(Default)]
    pub struct IrqState {
        pub masked: bool,
        pub wake: bool,
        pub high_active: bool,
        pub wake_calls: u32,
        pub mask_calls: u32,
        pub unmask_calls: u32,
        pub fail_wake: bool,
    }

    #[derive(Clone, Default)]
    pub struct MockIrq(pub Rc<RefCell<IrqState>>);

    impl IrqControl for MockIrq {
        fn unmask(&mut self) {
            let mut s = self.0.borrow_mut();
            s.masked = false;
            s.unmask_calls += 1;
        }

        fn mask(&mut self) {
            let mut s = self.0.borrow_mut();
            s.masked = true;
            s.mask_calls += 1;
        }

        fn set_trigger(&mut self, polarity: Polarity) -> Result<(), IrqError> {
            self.0.borrow_mut().high_active = polarity == Polarity::ActiveHigh;
            Ok(())
        }

        fn set_wake(&mut self, on: bool) -> Result<(), IrqError> {
            let mut s = self.0.borrow_mut();
            if s.fail_wake {
                return Err(IrqError::WakeNotSupported);
            }
            s.wake = on;
            s.wake_calls += 1;
            Ok(())
        }
    }

    // ── Host services ─────────────────────────────────────────

    #[derive(Default)]
    pub struct HostState {
        pub scheduled_ms: Option<u32>,
        pub cancel_calls: u32,
        pub wake_locks: Vec<u32>,
    }

    #[derive(Clone, Default)]
    pub struct MockHost(pub Rc<RefCell<HostState>>);

    impl HostServices for MockHost {
        fn wake_lock_timeout(&mut self, ms: u32) {
            self.0.borrow_mut().wake_locks.push(ms);
        }

        fn schedule_poll(&mut self, ms: u32) {
            self.0.borrow_mut().scheduled_ms = Some(ms);
        }

        fn cancel_poll(&mut self) {
            let mut s = self.0.borrow_mut();
            s.scheduled_ms = None;
            s.cancel_calls += 1;
        }
    }

    // ── Event sink ────────────────────────────────────────────

    #[derive(Default)]
    pub struct SinkState {
        pub light: Vec<(u32, u16)>,
        pub prox: Vec<(bool, u8)>,
    }

    #[derive(Clone, Default)]
    pub struct MockSink(pub Rc<RefCell<SinkState>>);

    impl EventSink for MockSink {
        fn report_light(&mut self, mlux: u32, raw: u16) {
            self.0.borrow_mut().light.push((mlux, raw));
        }

        fn report_proximity(&mut self, near: bool, raw: u8) {
            self.0.borrow_mut().prox.push((near, raw));
        }
    }

    // ── Delay ─────────────────────────────────────────────────

    #[derive(Clone, Default)]
    pub struct MockDelay(pub Rc<RefCell<u64>>);

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            *self.0.borrow_mut() += u64::from(ns);
        }
    }

    impl MockDelay {
        pub fn total_ms(&self) -> u64 {
            *self.0.borrow() / 1_000_000
        }
    }
}
