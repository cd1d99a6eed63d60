//! Raspberry Pi devices: MCP3008 ADC on SPI0, a GPIO button and a hardware-PWM servo.
use fan_traits::{ActuatorSink, BoxError, InputSource};
use rppal::gpio::{Gpio, InputPin};
use rppal::pwm::{Channel, Polarity, Pwm};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use tracing::trace;

use crate::error::{HwError, Result};
use crate::util::{SERVO_PERIOD, angle_to_pulse, mcp3008_command, mcp3008_value};

const SPI_CLOCK_HZ: u32 = 1_000_000;

pub struct Mcp3008Inputs {
    spi: Spi,
    button: InputPin,
    light_channel: u8,
    dial_channel: u8,
}

impl Mcp3008Inputs {
    pub fn new(button_pin: u8, light_channel: u8, dial_channel: u8) -> Result<Self> {
        // Reject bad channels before touching the bus.
        mcp3008_command(light_channel)?;
        mcp3008_command(dial_channel)?;
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK_HZ, Mode::Mode0)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        let button = Gpio::new()
            .and_then(|g| g.get(button_pin))
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_input_pulldown();
        Ok(Self {
            spi,
            button,
            light_channel,
            dial_channel,
        })
    }

    fn read_channel(&mut self, channel: u8) -> Result<u16> {
        let tx = mcp3008_command(channel)?;
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        let value = mcp3008_value(rx);
        trace!(channel, value, "mcp3008 read");
        Ok(value)
    }
}

impl InputSource for Mcp3008Inputs {
    fn read_light(&mut self) -> std::result::Result<u16, BoxError> {
        Ok(self.read_channel(self.light_channel)?)
    }

    fn read_dial(&mut self) -> std::result::Result<u16, BoxError> {
        Ok(self.read_channel(self.dial_channel)?)
    }

    fn read_button(&mut self) -> std::result::Result<bool, BoxError> {
        Ok(self.button.is_high())
    }
}

pub struct PwmServo {
    pwm: Pwm,
}

impl PwmServo {
    /// Enable the PWM channel at 50 Hz, initially holding `initial_angle`.
    pub fn new(channel: u8, initial_angle: u8) -> Result<Self> {
        let channel = match channel {
            0 => Channel::Pwm0,
            1 => Channel::Pwm1,
            other => return Err(HwError::Pwm(format!("no pwm channel {other}"))),
        };
        let pwm = Pwm::with_period(
            channel,
            SERVO_PERIOD,
            angle_to_pulse(initial_angle)?,
            Polarity::Normal,
            true,
        )
        .map_err(|e| HwError::Pwm(e.to_string()))?;
        Ok(Self { pwm })
    }
}

impl ActuatorSink for PwmServo {
    fn move_to(&mut self, position: u8) -> std::result::Result<(), BoxError> {
        let pulse = angle_to_pulse(position)?;
        self.pwm
            .set_pulse_width(pulse)
            .map_err(|e| HwError::Pwm(e.to_string()))?;
        let pulse_us = u64::try_from(pulse.as_micros()).unwrap_or(u64::MAX);
        trace!(position, pulse_us, "servo pulse set");
        Ok(())
    }
}
