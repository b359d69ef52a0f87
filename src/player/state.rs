//! Mutable performance state carried across a song.

use super::PlayError;

pub const DEFAULT_TEMPO: f64 = 120.0;
pub const DEFAULT_OCTAVE: u8 = 4;
pub const DEFAULT_DURATION: u32 = 4;

/// Tempo, octave and default note length as they stand mid-performance.
///
/// Tempo is kept as a float so repeated `tempo *` / `tempo /` scaling
/// does not drift; only its integral part is ever displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceState {
    tempo: f64,
    octave: u8,
    duration: u32,
}

impl Default for PerformanceState {
    fn default() -> Self {
        Self {
            tempo: DEFAULT_TEMPO,
            octave: DEFAULT_OCTAVE,
            duration: DEFAULT_DURATION,
        }
    }
}

impl PerformanceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    pub fn octave(&self) -> u8 {
        self.octave
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn set_tempo(&mut self, bpm: f64) {
        self.tempo = bpm;
    }

    pub fn multiply_tempo(&mut self, factor: f64) {
        self.tempo *= factor;
    }

    pub fn divide_tempo(&mut self, divisor: f64) {
        self.tempo /= divisor;
    }

    pub fn set_duration(&mut self, denominator: u32) {
        self.duration = denominator;
    }

    /// Move to `octave`, failing when it leaves the playable range.
    pub fn set_octave(&mut self, octave: i32) -> Result<(), PlayError> {
        if !(0..=8).contains(&octave) {
            return Err(PlayError::OctaveRange(octave));
        }
        self.octave = octave as u8;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_the_documented_defaults() {
        let state = PerformanceState::new();
        assert_eq!(state.tempo(), 120.0);
        assert_eq!(state.octave(), 4);
        assert_eq!(state.duration(), 4);
    }

    #[test]
    fn tempo_scaling_keeps_fractions() {
        let mut state = PerformanceState::new();
        state.divide_tempo(7.0);
        state.multiply_tempo(7.0);
        assert!((state.tempo() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn octave_moves_within_range() {
        let mut state = PerformanceState::new();
        state.set_octave(0).unwrap();
        assert_eq!(state.octave(), 0);
        state.set_octave(8).unwrap();
        assert_eq!(state.octave(), 8);
    }

    #[test]
    fn octave_rejects_out_of_range() {
        let mut state = PerformanceState::new();
        assert!(matches!(state.set_octave(9), Err(PlayError::OctaveRange(9))));
        assert!(matches!(
            state.set_octave(-1),
            Err(PlayError::OctaveRange(-1))
        ));
        // A failed move leaves the state where it was.
        assert_eq!(state.octave(), 4);
    }
}
