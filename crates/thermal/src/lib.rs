//! # Thermal
//!
//! Infrared thermometer readers.
//!
//! Responsibilities:
//! - Provide `TemperatureSensor` implementations
//! - Read kernel hwmon attributes for real hardware
//! - Simulate plausible readings when no hardware is present

pub mod fixed;
pub mod hwmon;
pub mod simulated;

pub use contracts::{TemperatureSample, TemperatureSensor};
pub use fixed::StaticThermometer;
pub use hwmon::HwmonThermometer;
pub use simulated::{SimulatedThermometer, SimulatedThermometerConfig};
