//! Platform bootstrap
//!
//! Creates every driver exactly once, routes interrupts to them and starts
//! the application tasks. On the host, simulated controllers raise their
//! interrupts on a dispatcher thread and tasks run on std threads.

use std::fmt;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use serde::Deserialize;
use static_cell::StaticCell;
use tandem_core::config::{ConfigError, ConsoleConfig, PlatformConfig, TimeoutConfig};
use tandem_core::console::Debugger;
use tandem_core::dispatch::{InterruptRouter, RegistryError};
use tandem_core::driver::{I2cMaster, SpiMaster, SpiSlaveSpecifier, Uart};
use tandem_core::sync::{EventLatch, TaskMutex};
use tandem_core::task::{Task, TaskError};
use tandem_hal::{Mode, PinId, Priority};
use tandem_hal_host::{
    HostSemaphore, InterruptController, SimButton, SimI2c, SimPin, SimSpi, SimUart, ThreadSpawner,
    UartRemote, I2C1, SPI1, UART1,
};

use crate::commands;

pub type Sem = HostSemaphore;
pub type ConsoleUart = Uart<Sem, SimUart>;
pub type Console = Debugger<'static, Sem, SimUart>;

/// Simulated board contents
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Devices that acknowledge on the I2C bus
    pub i2c_devices: Vec<u8>,
    /// EXTI line mask of the user button
    pub button_pin: u16,
    /// Completion latency of every simulated controller
    pub irq_latency_us: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            i2c_devices: Vec::new(),
            button_pin: 1 << 13,
            irq_latency_us: 0,
        }
    }
}

/// Contents of platform.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub console: ConsoleConfig,
    pub timeouts: TimeoutConfig,
    pub board: BoardConfig,
}

impl DemoConfig {
    pub fn platform(&self) -> PlatformConfig {
        PlatformConfig {
            console: self.console.clone(),
            timeouts: self.timeouts,
        }
    }
}

/// Why the platform could not come up
#[derive(Debug)]
pub enum PlatformError {
    Parse(toml::de::Error),
    Config(ConfigError),
    Registry(RegistryError),
    Interrupts(io::Error),
    Task(TaskError),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Parse(e) => write!(f, "platform.toml: {}", e),
            PlatformError::Config(e) => write!(f, "platform.toml: {}", e),
            PlatformError::Registry(e) => write!(f, "interrupt routing: {}", e),
            PlatformError::Interrupts(e) => write!(f, "interrupt thread: {}", e),
            PlatformError::Task(e) => write!(f, "task: {}", e),
        }
    }
}

impl From<RegistryError> for PlatformError {
    fn from(e: RegistryError) -> Self {
        PlatformError::Registry(e)
    }
}

impl From<TaskError> for PlatformError {
    fn from(e: TaskError) -> Self {
        PlatformError::Task(e)
    }
}

/// Parse and validate the configuration text
pub fn load_config(text: &str) -> Result<DemoConfig, PlatformError> {
    let config: DemoConfig = toml::from_str(text).map_err(PlatformError::Parse)?;
    config.platform().validate().map_err(PlatformError::Config)?;
    Ok(config)
}

/// Everything the tasks share
pub struct Platform {
    pub config: PlatformConfig,
    /// Both tasks use the bus; a scan must not interleave with a register read
    pub i2c: TaskMutex<Sem, &'static I2cMaster<Sem, SimI2c>>,
    pub spi: &'static SpiMaster<Sem, SimSpi>,
    /// SPI flash on the demo board; loops its input back
    pub flash: Mutex<SpiSlaveSpecifier<SimPin>>,
    pub button: SimButton,
    pub button_latch: &'static EventLatch<Sem>,
    pub debugger: &'static Console,
}

static UART: StaticCell<ConsoleUart> = StaticCell::new();
static I2C: StaticCell<I2cMaster<Sem, SimI2c>> = StaticCell::new();
static SPI: StaticCell<SpiMaster<Sem, SimSpi>> = StaticCell::new();
static BUTTON_LATCH: StaticCell<EventLatch<Sem>> = StaticCell::new();
static ROUTER: StaticCell<InterruptRouter<'static>> = StaticCell::new();
static DEBUGGER: StaticCell<Console> = StaticCell::new();
static PLATFORM: StaticCell<Platform> = StaticCell::new();

static SPAWNER: ThreadSpawner = ThreadSpawner::new();

/// Bring up drivers and interrupt routing
///
/// Returns the platform and the far end of the console UART.
pub fn init(config: &DemoConfig) -> Result<(&'static Platform, UartRemote), PlatformError> {
    let controller = InterruptController::new();
    let latency = Duration::from_micros(config.board.irq_latency_us);

    let (uart_port, wire) = SimUart::new(UART1, controller.line());
    wire.set_delay(latency);
    wire.set_mirror(true);

    let (i2c_port, i2c_bus) = SimI2c::new(I2C1, controller.line());
    i2c_bus.set_delay(latency);
    for &address in &config.board.i2c_devices {
        i2c_bus.add_device(address);
    }

    let (spi_port, spi_bus) = SimSpi::new(SPI1, controller.line());
    spi_bus.set_delay(latency);

    let button_pin = PinId(config.board.button_pin);
    let button = SimButton::new(button_pin, controller.line());

    let uart: &'static ConsoleUart = UART.init(Uart::new(uart_port));
    let i2c: &'static I2cMaster<Sem, SimI2c> = I2C.init(I2cMaster::new(i2c_port));
    let spi: &'static SpiMaster<Sem, SimSpi> = SPI.init(SpiMaster::new(spi_port));
    let button_latch: &'static EventLatch<Sem> = BUTTON_LATCH.init(EventLatch::new(button_pin));

    let router = ROUTER.init(InterruptRouter::new());
    router.attach(uart)?;
    router.attach(i2c)?;
    router.attach(spi)?;
    router.attach_latch(button_latch)?;
    let router: &'static InterruptRouter<'static> = router;

    controller
        .run(move |irq| {
            router.dispatch(irq);
        })
        .map_err(PlatformError::Interrupts)?;

    let platform_config = config.platform();
    let debugger: &'static Console =
        DEBUGGER.init(Debugger::new(uart, platform_config.console_timeout()));
    if platform_config.console.auto_re_print {
        debugger.auto_re_print();
    }

    let platform = PLATFORM.init(Platform {
        config: platform_config,
        i2c: TaskMutex::new(i2c),
        spi,
        flash: Mutex::new(SpiSlaveSpecifier::new(Mode::Mode0, SimPin::new())),
        button,
        button_latch,
        debugger,
    });
    Ok((platform, wire))
}

/// Start the application tasks
pub fn start(platform: &'static Platform) -> Result<(), PlatformError> {
    let master = Task::new(&SPAWNER, "Master", 2048, Priority(1), platform, master_task);
    platform.debugger.escalate(master.start())?;

    let console = Task::new(&SPAWNER, "Console", 4096, Priority(2), platform, console_task);
    platform.debugger.escalate(console.start())?;
    Ok(())
}

/// Scan the I2C bus each time the user button is pressed
fn master_task(platform: &'static Platform) -> ! {
    loop {
        platform.button_latch.wait();
        let table = platform.i2c.lock().scan(platform.config.timeouts.probe());
        let _ = platform
            .debugger
            .print(format_args!("\r\n     Probing I2C devices\r\n{}", table));
    }
}

/// Read commands from the console and run them
fn console_task(platform: &'static Platform) -> ! {
    let console = platform.debugger;
    let _ = console.print_str("\r\nTandem host demo. Type 'help' for commands.\r\n");
    loop {
        let _ = console.print_str(&platform.config.console.prompt);
        match console.next_command() {
            Ok(line) => commands::execute(platform, &line),
            Err(e) => {
                let _ = console.print(format_args!("console: {}\r\n", e));
            }
        }
    }
}
