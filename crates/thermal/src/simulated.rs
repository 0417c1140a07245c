//! Simulated thermometer
//!
//! Generates readings around a configurable ambient temperature, with the
//! object channel swinging slowly above it as if the vehicle crossed warmer
//! patches of ground.

use contracts::{checked_reading, ContractError, TemperatureChannel, TemperatureSensor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// Simulated thermometer configuration
#[derive(Debug, Clone)]
pub struct SimulatedThermometerConfig {
    /// Mean ambient temperature (°C)
    pub ambient_c: f64,
    /// Peak object temperature above ambient (°C)
    pub object_swing_c: f64,
    /// Uniform noise amplitude (°C)
    pub noise_c: f64,
    /// Probability that a single read fails, in [0, 1]
    pub failure_rate: f64,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for SimulatedThermometerConfig {
    fn default() -> Self {
        Self {
            ambient_c: 22.0,
            object_swing_c: 8.0,
            noise_c: 0.05,
            failure_rate: 0.0,
            seed: None,
        }
    }
}

/// Thermometer producing synthetic readings
pub struct SimulatedThermometer {
    id: String,
    config: SimulatedThermometerConfig,
    rng: StdRng,
    reads: u64,
}

impl SimulatedThermometer {
    pub fn new(id: impl Into<String>, config: SimulatedThermometerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            id: id.into(),
            config,
            rng,
            reads: 0,
        }
    }

    pub fn with_defaults(id: impl Into<String>) -> Self {
        Self::new(id, SimulatedThermometerConfig::default())
    }

    fn sample(&mut self, channel: TemperatureChannel) -> Result<f64, ContractError> {
        self.reads += 1;

        let failure_rate = self.config.failure_rate.clamp(0.0, 1.0);
        if self.rng.random_bool(failure_rate) {
            return Err(ContractError::sensor_read(&self.id, channel, "simulated bus error"));
        }

        let noise = if self.config.noise_c > 0.0 {
            self.rng.random_range(-self.config.noise_c..=self.config.noise_c)
        } else {
            0.0
        };
        let value = match channel {
            TemperatureChannel::Ambient => self.config.ambient_c + noise,
            TemperatureChannel::Object => {
                let phase = self.reads as f64 / 50.0;
                self.config.ambient_c + self.config.object_swing_c * phase.sin().abs() + noise
            }
        };

        trace!(sensor_id = %self.id, %channel, value, "simulated read");
        checked_reading(&self.id, channel, value)
    }
}

impl TemperatureSensor for SimulatedThermometer {
    fn id(&self) -> &str {
        &self.id
    }

    fn read_ambient(&mut self) -> Result<f64, ContractError> {
        self.sample(TemperatureChannel::Ambient)
    }

    fn read_object(&mut self) -> Result<f64, ContractError> {
        self.sample(TemperatureChannel::Object)
    }
}
