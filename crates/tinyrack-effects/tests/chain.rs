//! Integration tests for the effect chain: every variant through the full
//! slot, compressor, and EQ path.

use proptest::prelude::*;
use tinyrack_effects::{
    CHAIN_SLOTS, CompressorSettings, EffectChain, EffectType, EqGains,
};

const SAMPLE_RATE: f32 = 48000.0;

fn sine(frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|i| libm::sinf(core::f32::consts::TAU * 440.0 * i as f32 / SAMPLE_RATE) * 0.5)
        .collect()
}

#[test]
fn full_chain_stays_finite() {
    let chain = EffectChain::new(SAMPLE_RATE);
    chain.set_slot(0, EffectType::Overdrive);
    chain.set_slot(1, EffectType::Phaser);
    chain.set_slot(2, EffectType::Reverb);
    chain.set_compressor(true, CompressorSettings::default());
    chain.set_eq(
        true,
        EqGains {
            low_db: 3.0,
            mid_db: -2.0,
            high_db: 1.0,
        },
    );

    let input = sine(128);
    for _ in 0..100 {
        let mut left = input.clone();
        let mut right = input.clone();
        chain.process(&mut left, &mut right);
        assert!(left.iter().chain(&right).all(|s| s.is_finite()));
    }
    assert_eq!(chain.process_calls(), 100);
}

#[test]
fn reset_clears_every_stage() {
    let chain = EffectChain::new(SAMPLE_RATE);
    chain.set_slot(0, EffectType::Delay);
    chain.set_slot(1, EffectType::Reverb);
    chain.set_slot_param(0, 2, 1.0);

    let input = sine(128);
    for _ in 0..20 {
        let mut left = input.clone();
        let mut right = input.clone();
        chain.process(&mut left, &mut right);
    }

    chain.reset();
    let mut left = vec![0.0; 128];
    let mut right = vec![0.0; 128];
    chain.process(&mut left, &mut right);
    assert!(left.iter().chain(&right).all(|s| *s == 0.0));
}

#[test]
fn reselecting_same_type_keeps_state() {
    let chain = EffectChain::new(SAMPLE_RATE);
    chain.set_slot(0, EffectType::Delay);
    chain.set_slot_param(0, 2, 1.0);

    // Fill past the default 300 ms delay time.
    let input = sine(128);
    for _ in 0..120 {
        let mut left = input.clone();
        let mut right = input.clone();
        chain.process(&mut left, &mut right);
    }

    chain.set_slot(0, EffectType::Delay);
    let mut left = vec![0.0; 128];
    let mut right = vec![0.0; 128];
    chain.process(&mut left, &mut right);
    assert!(left.iter().any(|s| *s != 0.0), "delay tail was dropped");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any slot configuration with any parameter values produces finite
    /// output for bounded input.
    #[test]
    fn any_configuration_is_stable(
        kinds in prop::array::uniform3(0u8..6),
        params in prop::collection::vec(0.0f32..=1.0, 12),
        input in prop::collection::vec(-1.0f32..=1.0, 64),
    ) {
        let chain = EffectChain::new(SAMPLE_RATE);
        for slot in 0..CHAIN_SLOTS {
            let kind = EffectType::from_id(kinds[slot]).unwrap();
            chain.set_slot(slot, kind);
            for p in 0..kind.param_count() {
                chain.set_slot_param(slot, p, params[slot * 4 + p]);
            }
        }
        for _ in 0..16 {
            let mut left = input.clone();
            let mut right = input.clone();
            chain.process(&mut left, &mut right);
            prop_assert!(left.iter().chain(&right).all(|s| s.is_finite()));
        }
    }
}
