//! Claim ranking and challenge resolution tests.

use core::cmp::Ordering;

use inferno_dice::challenge::{answers_inferno, is_locked_down};
use inferno_dice::claim::{
    categorize_claim, claim_matches_roll, is_always_claimable, is_challenge_claim, is_inferno,
    is_reverse_of,
};
use inferno_dice::{
    Category, ChallengeState, Claim, LastAction, Roll, build_claim_options, compare_claims,
    enumerate_claims, is_legal_raise, meets_or_beats, next_higher_claim, normalize_roll,
    resolve_active_challenge, resolve_bluff, split_claim,
};
use proptest::prelude::*;

fn claim(code: u8) -> Claim {
    Claim::from_code(code).unwrap()
}

fn roll(first: u8, second: u8) -> Roll {
    Roll::new(first, second).unwrap()
}

fn codes(claims: &[Claim]) -> Vec<u8> {
    claims.iter().map(Claim::code).collect()
}

#[test]
fn normalization_puts_the_larger_face_first() {
    for d1 in 1..=6 {
        for d2 in 1..=6 {
            let normalized = normalize_roll(d1, d2).unwrap();
            assert_eq!(split_claim(normalized), (d1.max(d2), d1.min(d2)));
        }
    }
    assert_eq!(normalize_roll(3, 5), Some(claim(53)));
    assert_eq!(normalize_roll(4, 4), Some(claim(44)));
    assert_eq!(normalize_roll(0, 4), None);
    assert_eq!(normalize_roll(7, 1), None);
}

#[test]
fn claim_codes_are_validated() {
    assert!(Claim::from_code(35).is_none());
    assert!(Claim::from_code(70).is_none());
    assert!(Claim::from_code(10).is_none());
    assert!(Claim::try_from(99).is_err());
    assert_eq!(enumerate_claims().len(), 21);
    assert_eq!(split_claim(Claim::SOCIAL), (4, 1));
}

#[test]
fn categories_and_specials() {
    assert_eq!(categorize_claim(claim(53)), Category::Mixed);
    assert_eq!(categorize_claim(claim(22)), Category::Double);
    for special in [21, 31, 41] {
        assert_eq!(categorize_claim(claim(special)), Category::Special);
        assert!(is_always_claimable(claim(special)));
    }
    assert!(!is_always_claimable(claim(66)));
    assert!(is_inferno(claim(21)));
    assert!(!is_inferno(claim(31)));
    assert!(is_reverse_of(Some(claim(54)), Claim::REVERSE));
    assert!(!is_reverse_of(None, Claim::REVERSE));
    assert!(!is_reverse_of(Some(claim(54)), claim(55)));
    assert!(is_challenge_claim(Some(claim(32))));
    assert!(!is_challenge_claim(None));
}

#[test]
fn compare_is_a_strict_total_order() {
    let all = enumerate_claims();
    for a in all {
        for b in all {
            let ab = compare_claims(*a, *b);
            assert_eq!(ab, compare_claims(*b, *a).reverse());
            assert_eq!(ab == Ordering::Equal, a == b);
            for c in all {
                if ab == Ordering::Less && compare_claims(*b, *c) == Ordering::Less {
                    assert_eq!(compare_claims(*a, *c), Ordering::Less);
                }
            }
        }
    }
    assert!(all.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn doubles_beat_every_mixed_roll() {
    assert_eq!(compare_claims(claim(11), claim(65)), Ordering::Greater);
    for double in enumerate_claims().iter().filter(|c| c.category() == Category::Double) {
        for mixed in enumerate_claims().iter().filter(|c| c.category() == Category::Mixed) {
            assert_eq!(compare_claims(*double, *mixed), Ordering::Greater);
        }
    }
    assert_eq!(compare_claims(claim(54), claim(53)), Ordering::Greater);
    assert_eq!(compare_claims(claim(61), claim(54)), Ordering::Greater);
}

#[test]
fn inferno_and_reverse_outrank_ordinary_rolls() {
    for ordinary in enumerate_claims().iter().filter(|c| !c.is_special()) {
        assert_eq!(compare_claims(Claim::INFERNO, *ordinary), Ordering::Greater);
        assert_eq!(compare_claims(Claim::REVERSE, *ordinary), Ordering::Greater);
    }
    assert_eq!(compare_claims(Claim::INFERNO, Claim::REVERSE), Ordering::Greater);
}

#[test]
fn legal_raise_rules() {
    for candidate in enumerate_claims() {
        assert!(is_legal_raise(None, *candidate));
    }
    assert!(is_legal_raise(Some(claim(53)), claim(53)));
    assert!(is_legal_raise(Some(claim(53)), claim(54)));
    assert!(!is_legal_raise(Some(claim(53)), claim(52)));
    assert!(is_legal_raise(Some(claim(66)), Claim::REVERSE));
    assert!(meets_or_beats(claim(11), claim(65)));
    assert!(!meets_or_beats(claim(65), claim(11)));
}

#[test]
fn next_higher_claim_walks_the_ordinary_ranks() {
    assert_eq!(next_higher_claim(claim(53)), claim(54));
    assert_eq!(next_higher_claim(claim(54)), claim(61));
    assert_eq!(next_higher_claim(claim(65)), claim(11));
    assert_eq!(next_higher_claim(claim(66)), Claim::INFERNO);
    assert_eq!(next_higher_claim(Claim::REVERSE), Claim::INFERNO);
    assert_eq!(next_higher_claim(Claim::INFERNO), Claim::INFERNO);
}

#[test]
fn social_must_be_rolled() {
    assert!(claim_matches_roll(Claim::SOCIAL, roll(1, 4)));
    assert!(!claim_matches_roll(Claim::SOCIAL, roll(4, 2)));
}

#[test]
fn bluff_resolution() {
    let verdict = resolve_bluff(claim(53), roll(3, 5), false);
    assert!(!verdict.liar);
    assert_eq!(verdict.penalty, 1);

    // Under-claiming is honest.
    assert!(!resolve_bluff(claim(53), roll(6, 6), false).liar);
    assert!(resolve_bluff(claim(53), roll(5, 2), false).liar);

    // Specials need the exact roll.
    let inferno = resolve_bluff(Claim::INFERNO, roll(6, 6), false);
    assert!(inferno.liar);
    assert_eq!(inferno.penalty, 2);
    assert_eq!(resolve_bluff(Claim::INFERNO, roll(1, 2), false).penalty, 2);
}

#[test]
fn reverse_against_inferno_keeps_double_stakes() {
    for first in 1..=6 {
        for second in 1..=6 {
            let verdict = resolve_bluff(Claim::REVERSE, roll(first, second), true);
            assert_eq!(verdict.penalty, 2);
            assert_eq!(verdict.liar, roll(first, second).claim() != Claim::REVERSE);
        }
    }
    assert_eq!(resolve_bluff(Claim::REVERSE, roll(6, 5), false).penalty, 1);
}

#[test]
fn reverse_resolves_to_the_baseline() {
    assert_eq!(
        resolve_active_challenge(Some(claim(54)), Some(Claim::REVERSE)),
        Some(claim(54))
    );
    assert_eq!(
        resolve_active_challenge(Some(claim(54)), Some(claim(54))),
        Some(claim(54))
    );
    assert_eq!(resolve_active_challenge(None, None), None);
    assert!(is_locked_down(Some(Claim::INFERNO), Some(Claim::REVERSE)));
    assert!(!is_locked_down(Some(claim(66)), Some(Claim::REVERSE)));
}

#[test]
fn challenge_state_tracks_reverse_chains() {
    let mut challenge = ChallengeState::new();
    challenge.apply(Claim::INFERNO);
    assert!(challenge.is_locked_down());
    assert_eq!(challenge.last_action(), LastAction::Normal);

    challenge.apply(Claim::REVERSE);
    assert_eq!(challenge.last_action(), LastAction::ReverseVsInferno);
    assert_eq!(challenge.baseline(), Some(Claim::INFERNO));
    assert_eq!(challenge.active(), Some(Claim::INFERNO));

    challenge.apply(Claim::REVERSE);
    assert_eq!(challenge.last_action(), LastAction::ReverseVsInferno);
    assert_eq!(challenge.active(), Some(Claim::INFERNO));

    challenge.apply(Claim::SOCIAL);
    assert_eq!(challenge, ChallengeState::new());
}

#[test]
fn reverse_on_an_ordinary_claim_is_normal() {
    let mut challenge = ChallengeState::new();
    challenge.apply(claim(54));
    challenge.apply(Claim::REVERSE);
    assert_eq!(challenge.last_action(), LastAction::Normal);
    assert_eq!(challenge.active(), Some(claim(54)));
    assert!(challenge.allows(claim(55), roll(5, 5)));
    assert!(!challenge.allows(claim(53), roll(5, 3)));
}

#[test]
fn lockdown_refuses_ordinary_answers() {
    let mut challenge = ChallengeState::new();
    challenge.apply(Claim::INFERNO);
    assert!(!challenge.allows(claim(66), roll(6, 6)));
    assert!(challenge.allows(Claim::INFERNO, roll(6, 6)));
    assert!(challenge.allows(Claim::REVERSE, roll(6, 6)));
    assert!(challenge.allows(Claim::SOCIAL, roll(4, 1)));
    assert!(!challenge.allows(Claim::SOCIAL, roll(6, 6)));
    assert!(answers_inferno(Claim::REVERSE));
    assert!(!answers_inferno(Claim::SOCIAL));
}

#[test]
fn opening_options_exclude_social() {
    let expected: Vec<Claim> = enumerate_claims()
        .iter()
        .copied()
        .filter(|c| *c != Claim::SOCIAL)
        .collect();
    assert_eq!(build_claim_options(None, None), expected);
}

#[test]
fn inferno_options_are_inferno_and_reverse() {
    let mut options = codes(&build_claim_options(Some(Claim::INFERNO), None));
    options.sort_unstable();
    assert_eq!(options, vec![21, 31]);
}

#[test]
fn options_over_65() {
    let options = build_claim_options(Some(claim(65)), None);
    for option in &options {
        assert!(meets_or_beats(*option, claim(65)) || is_always_claimable(*option));
    }
    assert_eq!(codes(&options), vec![65, 11, 22, 33, 44, 55, 66, 31, 21]);
}

#[test]
fn options_include_social_only_when_rolled() {
    let mut challenge = ChallengeState::new();
    challenge.apply(claim(65));
    assert!(!challenge.options_for(Some(roll(3, 2))).contains(&Claim::SOCIAL));
    let options = challenge.options_for(Some(roll(1, 4)));
    assert!(options.contains(&Claim::SOCIAL));
    assert!(options.windows(2).all(|pair| pair[0] < pair[1]));
}

proptest! {
    #[test]
    fn options_never_undercut_the_challenge(
        last in prop::sample::select(enumerate_claims().to_vec()),
        baseline in prop::option::of(prop::sample::select(enumerate_claims().to_vec())),
    ) {
        let effective = resolve_active_challenge(baseline, Some(last)).unwrap();
        for option in build_claim_options(Some(last), baseline) {
            prop_assert!(option != Claim::SOCIAL);
            prop_assert!(meets_or_beats(option, effective) || is_always_claimable(option));
        }
    }

    #[test]
    fn normalized_rolls_round_trip(d1 in 1u8..=6, d2 in 1u8..=6) {
        let normalized = normalize_roll(d1, d2).unwrap();
        prop_assert_eq!(Claim::from_code(normalized.code()), Some(normalized));
        prop_assert_eq!(Roll::of_claim(normalized).claim(), normalized);
    }
}
