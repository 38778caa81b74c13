use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, tick, Receiver, Sender, TrySendError};
use log::{debug, info, warn};

use super::ramp::{DirectionFlags, RampLimits, VelocityRamp};
use crate::types::VelocityCommand;

/// Where ramped commands go every tick. Calls may block; the control loop
/// makes them on dispatch threads, several at a time.
pub trait CommandSink: Send + Sync + 'static {
    /// Delivers one command. Implementations swallow their own errors.
    fn send_command(&self, cmd: VelocityCommand);
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ControlInput {
    Directions(DirectionFlags),
    Stop,
}

const INPUT_CAPACITY: usize = 16;
const REPORT_CAPACITY: usize = 64;
/// Regular tick commands beyond this many unfinished sends are dropped.
pub const MAX_IN_FLIGHT: usize = 8;
/// How long the loop waits for pending sends before its final zero.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(3);

/// Runs each command on its own short-lived thread so a slow bridge never
/// stalls the tick. Sends are not ordered against each other.
struct Dispatcher<S> {
    sink: Arc<S>,
    in_flight: Arc<AtomicUsize>,
}

impl<S: CommandSink> Dispatcher<S> {
    fn new(sink: S) -> Self {
        Self {
            sink: Arc::new(sink),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Starts a send. `urgent` sends (stop) ignore the in-flight limit.
    fn dispatch(&self, cmd: VelocityCommand, urgent: bool) -> bool {
        if !urgent && self.in_flight.load(Ordering::Acquire) >= MAX_IN_FLIGHT {
            debug!("{} commands still in flight, dropping {:?}", MAX_IN_FLIGHT, cmd);
            return false;
        }
        self.in_flight.fetch_add(1, Ordering::AcqRel);

        let sink = Arc::clone(&self.sink);
        let in_flight = Arc::clone(&self.in_flight);
        let spawned = thread::Builder::new().name("cmd-vel".to_string()).spawn(move || {
            sink.send_command(cmd);
            in_flight.fetch_sub(1, Ordering::AcqRel);
        });
        match spawned {
            Ok(_) => true,
            Err(e) => {
                self.in_flight.fetch_sub(1, Ordering::AcqRel);
                warn!("Failed to spawn command thread: {}", e);
                false
            }
        }
    }

    /// Waits for unfinished sends, then delivers `cmd` on the calling thread.
    fn finish(&self, cmd: VelocityCommand) {
        let deadline = Instant::now() + DRAIN_TIMEOUT;
        while self.in_flight.load(Ordering::Acquire) > 0 {
            if Instant::now() >= deadline {
                warn!("Command sends still pending after {:?}", DRAIN_TIMEOUT);
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        self.sink.send_command(cmd);
    }
}

/// 20 Hz control loop running on its own thread: ramps the held directions
/// and sends one command per tick, changed or not.
#[derive(Debug)]
pub struct ControlLoop {
    input: Option<Sender<ControlInput>>,
    sent: Receiver<VelocityCommand>,
    handle: Option<JoinHandle<()>>,
    held: DirectionFlags,
    stop_pending: bool,
    last_sent: VelocityCommand,
}

impl ControlLoop {
    pub fn spawn<S: CommandSink>(sink: S, limits: RampLimits, period: Duration) -> std::io::Result<Self> {
        let (input_tx, input_rx) = bounded::<ControlInput>(INPUT_CAPACITY);
        let (sent_tx, sent_rx) = bounded::<VelocityCommand>(REPORT_CAPACITY);

        let evict_rx = sent_rx.clone();
        let handle = thread::Builder::new()
            .name("control-loop".to_string())
            .spawn(move || run_loop(Dispatcher::new(sink), limits, period, input_rx, (sent_tx, evict_rx)))?;

        Ok(Self {
            input: Some(input_tx),
            sent: sent_rx,
            handle: Some(handle),
            held: DirectionFlags::NONE,
            stop_pending: false,
            last_sent: VelocityCommand::ZERO,
        })
    }

    /// Never blocks the UI. Returns false when the message could not be queued.
    fn push(&self, msg: ControlInput) -> bool {
        let Some(input) = &self.input else {
            return false;
        };
        match input.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(msg)) => {
                debug!("Control input queue full, retrying {:?} next frame", msg);
                false
            }
            Err(TrySendError::Disconnected(msg)) => {
                warn!("Control loop is gone, dropping {:?}", msg);
                false
            }
        }
    }

    /// Updates the held directions. Only changes are forwarded to the loop;
    /// a change that could not be queued is retried on the next call.
    pub fn set_directions(&mut self, flags: DirectionFlags) {
        if self.stop_pending {
            if !self.push(ControlInput::Stop) {
                return;
            }
            self.stop_pending = false;
        }
        if flags != self.held && self.push(ControlInput::Directions(flags)) {
            self.held = flags;
        }
    }

    pub fn held(&self) -> DirectionFlags {
        self.held
    }

    /// Clears held directions, zeroes the ramp and sends a zero command at once.
    pub fn stop_robot(&mut self) {
        self.held = DirectionFlags::NONE;
        self.stop_pending = !self.push(ControlInput::Stop);
    }

    /// Latest command the loop has sent.
    pub fn last_sent(&mut self) -> VelocityCommand {
        while let Ok(cmd) = self.sent.try_recv() {
            self.last_sent = cmd;
        }
        self.last_sent
    }

    /// Closes the input channel and waits for the loop to exit.
    pub fn shutdown(mut self) {
        self.input.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Control loop panicked");
            }
        }
    }
}

impl Drop for ControlLoop {
    fn drop(&mut self) {
        // closing the channel ends the loop; not joined here to keep the UI responsive
        self.input.take();
    }
}

/// Publishes `cmd` to the UI, evicting the oldest report when the channel is full.
fn report(sent: &Sender<VelocityCommand>, evict: &Receiver<VelocityCommand>, cmd: VelocityCommand) {
    if let Err(TrySendError::Full(cmd)) = sent.try_send(cmd) {
        let _ = evict.try_recv();
        let _ = sent.try_send(cmd);
    }
}

fn run_loop<S: CommandSink>(
    dispatcher: Dispatcher<S>,
    limits: RampLimits,
    period: Duration,
    input: Receiver<ControlInput>,
    (sent, evict): (Sender<VelocityCommand>, Receiver<VelocityCommand>),
) {
    info!("Control loop started ({} ms tick)", period.as_millis());
    let ticker = tick(period);
    let mut ramp = VelocityRamp::new(limits);
    let mut held = DirectionFlags::NONE;

    loop {
        select! {
            recv(input) -> msg => match msg {
                Ok(ControlInput::Directions(flags)) => held = flags,
                Ok(ControlInput::Stop) => {
                    held = DirectionFlags::NONE;
                    ramp.reset();
                    dispatcher.dispatch(VelocityCommand::ZERO, true);
                    report(&sent, &evict, VelocityCommand::ZERO);
                }
                Err(_) => break,
            },
            recv(ticker) -> _ => {
                let cmd = ramp.step(held);
                dispatcher.dispatch(cmd, false);
                report(&sent, &evict, cmd);
            }
        }
    }

    // leave the robot still when the panel goes away
    if !ramp.current().is_zero() {
        dispatcher.finish(VelocityCommand::ZERO);
    }
    info!("Control loop stopped");
}
