/// Chord voicings the creature's limbs trigger, as fundamental frequencies
/// in Hz. Hosts index these by limb; out-of-range indices wrap.
pub const CHORD_FREQUENCIES: [[f32; 3]; 6] = [
    // C major (I)
    [261.63, 329.63, 392.0],
    // G major (V)
    [196.0, 246.94, 293.66],
    // A minor (vi)
    [220.0, 261.63, 329.63],
    // F major (IV)
    [174.61, 220.0, 261.63],
    // D minor (ii)
    [146.83, 174.61, 220.0],
    // E minor (iii)
    [164.81, 196.0, 246.94],
];

/// Chord for a limb index, wrapping past the table end.
pub fn chord_for_limb(limb: usize) -> &'static [f32; 3] {
    &CHORD_FREQUENCIES[limb % CHORD_FREQUENCIES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limb_indices_wrap() {
        assert_eq!(chord_for_limb(0), chord_for_limb(6));
        assert_eq!(chord_for_limb(2), &CHORD_FREQUENCIES[2]);
    }

    #[test]
    fn voicings_ascend() {
        for chord in &CHORD_FREQUENCIES {
            assert!(chord[0] < chord[1] && chord[1] < chord[2]);
        }
    }
}
