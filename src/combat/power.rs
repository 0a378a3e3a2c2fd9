//! The tonnage-to-combat-power curve.
//!
//! Power grows superlinearly with tonnage, so one big hull beats the
//! same tonnage split across small hulls. The first hundred tons are a
//! lookup table of `100 * t^1.2` rounded to the nearest integer; larger
//! hulls are priced by halving recursively and paying a 14.9% premium
//! for integration.

/// Largest tonnage the curve is defined for; bigger requests clamp.
pub const MAX_TONNAGE: u32 = 4068;

#[rustfmt::skip]
const POWER_TABLE: [u64; 101] = [
        0,   100,   230,   374,   528,   690,   859,  1033,  1213,  1397,
     1585,  1777,  1973,  2171,  2373,  2578,  2786,  2996,  3209,  3424,
     3641,  3861,  4082,  4306,  4532,  4759,  4988,  5220,  5452,  5687,
     5923,  6161,  6400,  6641,  6883,  7127,  7372,  7618,  7866,  8115,
     8365,  8617,  8870,  9124,  9379,  9635,  9893, 10151, 10411, 10672,
    10934, 11197, 11461, 11725, 11991, 12258, 12526, 12795, 13065, 13336,
    13608, 13880, 14154, 14428, 14703, 14979, 15256, 15534, 15813, 16092,
    16373, 16654, 16936, 17218, 17502, 17786, 18071, 18356, 18643, 18930,
    19218, 19507, 19796, 20086, 20377, 20668, 20960, 21253, 21547, 21841,
    22136, 22431, 22727, 23024, 23321, 23619, 23918, 24217, 24517, 24818,
    25119,
];

/// Combat power of a hull of the given tonnage.
pub fn power(tonnage: u32) -> u64 {
    let t = tonnage.min(MAX_TONNAGE);
    if t <= 100 {
        POWER_TABLE[t as usize]
    } else {
        let lower = t / 2;
        let upper = t - lower;
        (1.149 * (power(lower) + power(upper)) as f64) as u64
    }
}

/// Total bombardment damage that counts as 100% destruction of a
/// colony: ten strike cruisers firing for ten rounds, each round worth
/// twice the hull's power.
pub fn bombardment_reference() -> u64 {
    100 * 2 * power(25)
}
