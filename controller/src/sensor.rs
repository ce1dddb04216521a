use smarthome_common::SensorDriver;

const SWEEP_STEPS: u64 = 10;
const DROPOUT_EVERY: u64 = 25;

/// Stand-in for the DHT and MQ-2 drivers on hosts without hardware.
///
/// Temperature walks 27.0..=32.0 °C and back in 0.5 °C steps so an AUTO fan
/// crosses both hysteresis edges. Every 25th climate read fails with NaN the
/// way a DHT timeout does.
#[derive(Debug, Default)]
pub struct SimulatedSensor {
    climate_reads: u64,
    gas_reads: u64,
}

impl SimulatedSensor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SensorDriver for SimulatedSensor {
    fn read_temperature_humidity(&mut self) -> (f32, f32) {
        self.climate_reads = self.climate_reads.saturating_add(1);
        let tick = self.climate_reads;
        if tick % DROPOUT_EVERY == 0 {
            return (f32::NAN, f32::NAN);
        }

        let phase = tick % (SWEEP_STEPS * 2);
        let step = if phase <= SWEEP_STEPS {
            phase
        } else {
            SWEEP_STEPS * 2 - phase
        };
        let temperature = 27.0 + step as f32 * 0.5;
        let humidity = 42.0 + (tick % 6) as f32 * 0.5;
        (humidity, temperature)
    }

    fn read_gas_level(&mut self) -> u16 {
        self.gas_reads = self.gas_reads.saturating_add(1);
        380 + (self.gas_reads % 10) as u16 * 7
    }
}
