//! Heat score jitter.

use rand::Rng;

use crate::records::MarketSignal;

/// Default upper bound (inclusive) of the downward adjustment.
pub const DEFAULT_MAX_JITTER: u8 = 5;

/// Lowers `heat_score` by a uniform draw from `0..=max`. No clamping at zero;
/// the subtraction saturates at `i32::MIN`.
pub fn jitter_heat(signal: &mut MarketSignal, max: u8, rng: &mut impl Rng) {
    let drop = i32::from(rng.gen_range(0..=max));
    signal.heat_score = signal.heat_score.saturating_sub(drop);
}

/// Returns a jittered copy of every signal, drawing independently per record.
pub fn jitter_all(signals: &[MarketSignal], max: u8, rng: &mut impl Rng) -> Vec<MarketSignal> {
    signals
        .iter()
        .cloned()
        .map(|mut signal| {
            jitter_heat(&mut signal, max, rng);
            signal
        })
        .collect()
}
