use picsmaller_core::{
    update, BatchState, CompressOptions, Effect, ImageData, Msg, OptionsError, Origin, Rejection,
    SizeTrend,
};
use pretty_assertions::assert_eq;

#[test]
fn submissions_carry_the_options_in_force() {
    let options = CompressOptions {
        quality: 40,
        max_width: Some(800),
        max_height: None,
    };
    let (state, _) = update(BatchState::new(), Msg::OptionsChanged(options));
    assert_eq!(state.options(), options);

    let origin = Origin::new("a.jpg", ImageData::new(vec![0u8; 8], 2, 2));
    let (_, effects) = update(state, Msg::FilesAdded(vec![origin]));
    match effects.as_slice() {
        [Effect::SubmitTransform {
            options: submitted,
            origin,
            ..
        }] => {
            assert_eq!(*submitted, options);
            assert_eq!(origin.name, "a.jpg");
        }
        other => panic!("unexpected effects {other:?}"),
    }
}

#[test]
fn invalid_options_are_rejected_and_reset_restores_defaults() {
    let bad = CompressOptions {
        quality: 0,
        ..Default::default()
    };
    let (state, _) = update(BatchState::new(), Msg::OptionsChanged(bad));
    assert_eq!(state.options(), CompressOptions::default());
    assert_eq!(
        state.last_rejection(),
        Some(&Rejection::InvalidOptions(OptionsError::Quality(0)))
    );

    let custom = CompressOptions {
        quality: 90,
        ..Default::default()
    };
    let (state, _) = update(state, Msg::OptionsChanged(custom));
    assert!(state.last_rejection().is_none());
    let (state, _) = update(state, Msg::OptionsReset);
    assert_eq!(state.options(), CompressOptions::default());
}

#[test]
fn row_metrics_reflect_shrink_and_growth() {
    let (state, effects) = update(
        BatchState::new(),
        Msg::FilesAdded(vec![
            Origin::new("small.png", ImageData::new(vec![0u8; 100], 20, 10)),
            Origin::new("big.png", ImageData::new(vec![0u8; 50], 20, 10)),
        ]),
    );
    let mut state = state;
    for effect in effects {
        if let Effect::SubmitTransform { key, ticket, .. } = effect {
            let (next, _) = update(
                state,
                Msg::TransformDone {
                    key,
                    ticket,
                    result: Ok(ImageData::new(vec![0u8; 50 * key as usize], 10, 5)),
                },
            );
            state = next;
        }
    }

    let view = state.view();
    let shrunk = view.jobs[0].decrease.as_ref().unwrap();
    assert_eq!(shrunk.rate, -0.5);
    assert_eq!(shrunk.text, "50.00%");
    assert_eq!(shrunk.trend, SizeTrend::Shrunk);
    assert_eq!(view.jobs[0].dimension, "20*10");
    assert_eq!(view.jobs[0].new_dimension.as_deref(), Some("10*5"));

    let grew = view.jobs[1].decrease.as_ref().unwrap();
    assert_eq!(grew.rate, 1.0);
    assert_eq!(grew.text, "100.00%");
    assert_eq!(grew.trend, SizeTrend::Grew);
}
