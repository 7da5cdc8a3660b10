use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use toolbox_game::{
    AvatarSlot, BadgeTier, Milestone, PlaceOutcome, ProgressEvent, ProgressState,
    ProgressionEngine, SeasonBadge, SeasonState, SeasonTemplate, WizardState, next_milestone,
    record_daily_activity,
};

fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .checked_add_days(Days::new(offset))
        .unwrap()
}

fn unlocked_ids(state: &ProgressState) -> Vec<String> {
    state
        .stickers
        .iter()
        .filter(|s| s.unlocked)
        .map(|s| s.id.clone())
        .collect()
}

fn unlocked_slots(state: &ProgressState) -> Vec<AvatarSlot> {
    AvatarSlot::ALL
        .into_iter()
        .filter(|slot| state.avatar.unlocked.is_unlocked(*slot))
        .collect()
}

fn event_strategy() -> impl Strategy<Value = ProgressEvent> {
    prop_oneof![
        (-60i64..60).prop_map(ProgressEvent::AddXp),
        Just(ProgressEvent::RecomputeUnlocks),
        prop_oneof![
            Just("s_star"),
            Just("s_gear"),
            Just("s_heart"),
            Just("s_wrench")
        ]
        .prop_map(|id| ProgressEvent::PlaceSticker(id.to_string())),
        Just(ProgressEvent::ClearPlacedStickers),
        prop_oneof![
            Just(AvatarSlot::Hat),
            Just(AvatarSlot::Goggles),
            Just(AvatarSlot::Gloves)
        ]
        .prop_map(ProgressEvent::ToggleAvatarItem),
        (0u64..90).prop_map(|offset| ProgressEvent::RecordActivity(day(offset))),
        Just(ProgressEvent::EarnBadge("Spark Scout".to_string())),
    ]
}

#[test]
fn next_milestone_sorts_unsorted_lists() {
    let list = vec![
        Milestone::new(10, "A"),
        Milestone::new(30, "C"),
        Milestone::new(20, "B"),
    ];
    assert_eq!(
        next_milestone(15, &[], &list),
        Some(&Milestone::new(20, "B"))
    );
    assert_eq!(next_milestone(35, &[], &list), None);
}

#[test]
fn scout_badge_is_earned_once_across_repeated_days() {
    let template = SeasonTemplate {
        name: "Test".into(),
        badges: vec![
            SeasonBadge::new(5, "Scout", BadgeTier::Bronze),
            SeasonBadge::new(10, "Warden", BadgeTier::Silver),
        ],
    };
    let mut season = SeasonState::for_month(day(0), &template);
    let mut earned = Vec::new();
    for offset in 0..7 {
        for _ in 0..3 {
            earned.extend(record_daily_activity(&mut season, day(offset)));
        }
    }
    assert_eq!(season.streak, 7);
    assert_eq!(season.earned, vec!["Scout"]);
    assert_eq!(earned.len(), 1);
}

proptest! {
    #[test]
    fn add_xp_matches_clamped_sum(start in 0u32..10_000, delta in -20_000i64..20_000) {
        let mut state = ProgressState { xp: start, ..ProgressState::default() };
        let expected = (i64::from(start) + delta).max(0);
        prop_assert_eq!(i64::from(state.add_xp(delta)), expected);
    }

    #[test]
    fn unlocks_are_monotonic_across_event_sequences(
        events in prop::collection::vec(event_strategy(), 1..40)
    ) {
        let engine = ProgressionEngine::default();
        let mut state = engine.new_progress();
        for event in events {
            let before_stickers = unlocked_ids(&state);
            let before_slots = unlocked_slots(&state);
            let transition = engine.apply(&state, event).unwrap();
            let after_stickers = unlocked_ids(&transition.state);
            let after_slots = unlocked_slots(&transition.state);
            for id in &before_stickers {
                prop_assert!(after_stickers.contains(id));
            }
            for slot in &before_slots {
                prop_assert!(after_slots.contains(slot));
            }
            state = transition.state;
        }
    }

    #[test]
    fn recompute_is_idempotent(xp in 0u32..100) {
        let engine = ProgressionEngine::default();
        let state = ProgressState { xp, ..engine.new_progress() };
        let once = engine.apply(&state, ProgressEvent::RecomputeUnlocks).unwrap().state;
        let twice = engine.apply(&once, ProgressEvent::RecomputeUnlocks).unwrap();
        prop_assert_eq!(&twice.state, &once);
        prop_assert!(twice.effects.is_empty());
    }

    #[test]
    fn placing_adds_exactly_one_entry_only_when_unlocked(xp in 0u32..50) {
        let engine = ProgressionEngine::default();
        let state = ProgressState { xp, ..engine.new_progress() };
        let mut state = engine.apply(&state, ProgressEvent::RecomputeUnlocks).unwrap().state;
        let before = state.placed_stickers.len();
        let outcome = state.place_sticker("s_gear").unwrap();
        if xp >= 20 {
            prop_assert_eq!(outcome, PlaceOutcome::Placed);
            prop_assert_eq!(state.placed_stickers.len(), before + 1);
        } else {
            prop_assert_eq!(outcome, PlaceOutcome::Locked);
            prop_assert_eq!(state.placed_stickers.len(), before);
        }
    }

    #[test]
    fn wizard_index_always_in_bounds(target in any::<i64>()) {
        let mut wizard = WizardState::default();
        wizard.advance_step(target);
        prop_assert!(wizard.active_index() <= 5);
    }

    #[test]
    fn streak_never_exceeds_days_seen(offsets in prop::collection::vec(0u64..30, 1..30)) {
        let mut state = ProgressState::default();
        for offset in &offsets {
            state.record_activity(day(*offset));
        }
        let distinct = {
            let mut seen = offsets.clone();
            seen.sort_unstable();
            seen.dedup();
            seen.len()
        };
        prop_assert!(state.streak >= 1);
        prop_assert!(usize::try_from(state.streak).unwrap() <= distinct);
    }
}
