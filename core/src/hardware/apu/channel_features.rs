/// Volume envelope shared by the square and noise channels: a counter clocked
/// at 64Hz by the frame sequencer that ramps `volume` up or down once per
/// `period` ticks, until it hits 0 or 15 and latches.
#[derive(Default, Debug, Copy, Clone)]
pub struct EnvelopeFeature {
    pub volume: u8,
    pub volume_load: u8,
    enabled: bool,
    add_mode: bool,
    period_load: u8,
    period: u8,
}

impl EnvelopeFeature {
    pub fn tick(&mut self) {
        if !self.enabled || self.period == 0 {
            return;
        }
        self.period = self.period.saturating_sub(1);
        if self.period != 0 {
            return;
        }
        if self.add_mode {
            if self.volume < 15 {
                self.volume += 1;
                self.period = self.period_load;
            } else {
                self.enabled = false;
            }
        } else if self.volume > 0 {
            self.volume -= 1;
            self.period = self.period_load;
        } else {
            self.enabled = false;
        }
    }

    pub fn trigger(&mut self) {
        self.enabled = self.period_load != 0;
        self.period = self.period_load;
        self.volume = self.volume_load;
    }

    pub fn read_register(&self) -> u8 {
        (self.volume_load << 4) | self.period_load | if self.add_mode { 0x08 } else { 0 }
    }

    pub fn write_register(&mut self, value: u8) {
        self.volume_load = (value & 0xF0) >> 4;
        self.add_mode = value & 0x08 != 0;
        self.period_load = value & 0x07;
    }

    /// NRx2 upper 5 bits all zero means the channel's DAC is off and it
    /// should immediately mute.
    pub fn dac_enabled(&self) -> bool {
        self.volume_load != 0 || self.add_mode
    }
}

/// Length counter shared by all four channels: counts *up* from the value
/// loaded through NRx1 and silences the channel once it reaches the cap (64,
/// or 256 for the wave channel) - the increment-and-disable-at-the-cap
/// convention this engine settled on over the alternative decrement-to-zero
/// scheme real hardware also documents.
#[derive(Default, Debug, Copy, Clone)]
pub struct LengthFeature {
    counter: u16,
    full_length: u16,
    pub length_enable: bool,
}

impl LengthFeature {
    pub fn new(full_length: u16) -> Self {
        LengthFeature {
            counter: 0,
            full_length,
            length_enable: false,
        }
    }

    pub fn write_register(&mut self, load_value: u8) {
        self.counter = load_value as u16;
    }

    /// A trigger with the counter already sitting at the cap restarts it from
    /// zero rather than disabling the channel on the very next tick.
    pub fn trigger(&mut self) {
        if self.counter >= self.full_length {
            self.counter = 0;
        }
    }

    pub fn tick(&mut self, channel_enabled: &mut bool) {
        if !self.length_enable || self.counter >= self.full_length {
            return;
        }
        self.counter += 1;
        if self.counter >= self.full_length {
            *channel_enabled = false;
        }
    }
}

/// Channel 1's frequency sweep: periodically nudges the frequency up or down
/// by a shifted amount of itself, clocked at 128Hz.
#[derive(Default, Debug, Copy, Clone)]
pub struct SweepFeature {
    period_load: u8,
    negate: bool,
    shift: u8,
    enabled: bool,
    period: u8,
    shadow_frequency: u16,
}

impl SweepFeature {
    pub fn write_register(&mut self, value: u8) {
        self.period_load = (value & 0x70) >> 4;
        self.negate = value & 0x08 != 0;
        self.shift = value & 0x07;
    }

    pub fn read_register(&self) -> u8 {
        (self.period_load << 4) | if self.negate { 0x08 } else { 0 } | self.shift
    }

    pub fn trigger(&mut self, frequency: u16, channel_enabled: &mut bool) {
        self.shadow_frequency = frequency;
        self.period = if self.period_load == 0 { 8 } else { self.period_load };
        self.enabled = self.period_load != 0 || self.shift != 0;
        if self.shift != 0 {
            self.calculate(channel_enabled);
        }
    }

    pub fn tick(&mut self, channel_enabled: &mut bool, frequency: &mut u16) {
        if !self.enabled || self.period == 0 {
            return;
        }
        self.period = self.period.saturating_sub(1);
        if self.period != 0 {
            return;
        }
        self.period = if self.period_load == 0 { 8 } else { self.period_load };
        if let Some(new_freq) = self.calculate(channel_enabled) {
            if self.shift != 0 {
                self.shadow_frequency = new_freq;
                *frequency = new_freq;
                self.calculate(channel_enabled);
            }
        }
    }

    fn calculate(&mut self, channel_enabled: &mut bool) -> Option<u16> {
        let delta = self.shadow_frequency >> self.shift;
        let new_freq = if self.negate {
            self.shadow_frequency.wrapping_sub(delta)
        } else {
            self.shadow_frequency.wrapping_add(delta)
        };
        if new_freq >= 2048 {
            *channel_enabled = false;
            None
        } else {
            Some(new_freq)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_ramps_up_to_cap() {
        let mut envelope = EnvelopeFeature::default();
        envelope.write_register(0b0000_1001); // volume 0, add mode, period 1
        envelope.trigger();
        envelope.tick();
        assert_eq!(envelope.volume, 1);
    }

    #[test]
    fn test_length_counter_disables_channel_at_cap() {
        let mut length = LengthFeature::new(64);
        length.write_register(63); // one tick away from the 64 cap
        length.length_enable = true;
        let mut enabled = true;
        length.tick(&mut enabled);
        assert!(!enabled);
    }

    #[test]
    fn test_sweep_disables_channel_on_overflow() {
        let mut sweep = SweepFeature::default();
        sweep.write_register(0b0000_0001); // period 0 (->8), negate 0, shift 1
        let mut enabled = true;
        sweep.trigger(2000, &mut enabled);
        assert!(!enabled);
    }
}
