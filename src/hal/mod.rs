pub mod gpio;
pub mod power;
pub mod soft_uart;
pub mod timer;
pub mod watchdog;

// Re-export commonly used types
pub use gpio::PortASelector;
pub use power::Power;
pub use soft_uart::SoftTx;
pub use timer::BaudTimer;
pub use watchdog::Watchdog;
