use sensor_kernel::dispatch::status;
use sensor_kernel::{
    AlgorithmId, Dispatcher, FrameGeometry, InArgs, OutArgs, SensorError, SyntheticSource,
};

const SENTINEL: u8 = 0xAB;

fn buffers(geometry: FrameGeometry, seed: u64) -> (Vec<u8>, Vec<u8>) {
    let input = SyntheticSource::new(geometry, seed)
        .next_frame()
        .expect("synthetic frame");
    (input, vec![SENTINEL; geometry.output_len()])
}

fn sentinel_args() -> OutArgs {
    OutArgs {
        target_x: 1234,
        target_y: -1234,
        target_mass: 999,
        ..OutArgs::default()
    }
}

#[test]
fn unknown_id_is_a_neutral_no_op() {
    let geometry = FrameGeometry::default();
    let mut dispatcher = Dispatcher::new(geometry);
    dispatcher.init(AlgorithmId::Motion).unwrap();
    let generation = dispatcher.arena().generation();

    let (input, mut output) = buffers(geometry, 1);
    let mut out_args = sentinel_args();
    for raw in [5, 99, -1, i32::MAX] {
        assert_eq!(dispatcher.init_algorithm(raw), Ok(0));
        assert_eq!(
            dispatcher.run_algorithm(raw, &input, &mut output, &InArgs::default(), &mut out_args),
            Ok(0)
        );
    }

    assert!(output.iter().all(|b| *b == SENTINEL));
    assert_eq!(out_args, sentinel_args());
    assert_eq!(dispatcher.active(), Some(AlgorithmId::Motion));
    assert_eq!(dispatcher.arena().generation(), generation);
}

#[test]
fn every_variant_initialises_and_runs() {
    let geometry = FrameGeometry::default();
    let mut dispatcher = Dispatcher::new(geometry);
    let (input, mut output) = buffers(geometry, 2);

    for id in AlgorithmId::ALL {
        assert_eq!(dispatcher.init_algorithm(id.raw()), Ok(0), "{}", id);
        let mut out_args = sentinel_args();
        output.fill(SENTINEL);
        assert_eq!(
            dispatcher.run_algorithm(id.raw(), &input, &mut output, &InArgs::default(), &mut out_args),
            Ok(0),
            "{}",
            id
        );
        assert!(out_args.target_mass <= 100, "{}", id);
        assert!((-100..=100).contains(&out_args.target_x), "{}", id);
        assert!(output.iter().any(|b| *b != SENTINEL), "{}", id);
    }
}

#[test]
fn object_finds_the_synthetic_block() {
    let geometry = FrameGeometry::default();
    let mut dispatcher = Dispatcher::new(geometry);
    let (input, mut output) = buffers(geometry, 3);
    let mut out_args = OutArgs::default();
    dispatcher.init(AlgorithmId::Object).unwrap();
    dispatcher
        .run(AlgorithmId::Object, &input, &mut output, &InArgs::default(), &mut out_args)
        .unwrap();
    assert!(out_args.target_mass > 0);
    // The block sits in the upper half.
    assert!(out_args.target_y < 0);
}

#[test]
fn running_after_another_setup_is_stale() {
    let geometry = FrameGeometry::default();
    let mut dispatcher = Dispatcher::new(geometry);
    let (input, mut output) = buffers(geometry, 4);
    let mut out_args = sentinel_args();

    dispatcher.init(AlgorithmId::Motion).unwrap();
    dispatcher.init(AlgorithmId::EdgeLine).unwrap();

    let err = dispatcher
        .run_algorithm(
            AlgorithmId::Motion.raw(),
            &input,
            &mut output,
            &InArgs::default(),
            &mut out_args,
        )
        .unwrap_err();
    assert_eq!(err, SensorError::StaleArena);
    assert!(output.iter().all(|b| *b == SENTINEL));
    assert_eq!(out_args, sentinel_args());

    // The current holder is unaffected.
    assert_eq!(
        dispatcher.run_algorithm(
            AlgorithmId::EdgeLine.raw(),
            &input,
            &mut output,
            &InArgs::default(),
            &mut out_args
        ),
        Ok(0)
    );
}

#[test]
fn run_before_setup_is_rejected() {
    let geometry = FrameGeometry::default();
    let mut dispatcher = Dispatcher::new(geometry);
    let (input, mut output) = buffers(geometry, 5);
    let mut out_args = OutArgs::default();
    let result = dispatcher.run_algorithm(
        AlgorithmId::Line.raw(),
        &input,
        &mut output,
        &InArgs::default(),
        &mut out_args,
    );
    assert_eq!(result, Err(SensorError::NotInitialized));
    assert_eq!(status(result), SensorError::NotInitialized.status());
}

#[test]
fn short_buffers_fail_before_writing() {
    let geometry = FrameGeometry::default();
    let mut dispatcher = Dispatcher::new(geometry);
    dispatcher.init(AlgorithmId::Mxn).unwrap();
    let (input, _) = buffers(geometry, 6);
    let mut output = vec![SENTINEL; geometry.output_len() - 2];
    let mut out_args = sentinel_args();

    let err = dispatcher
        .run(AlgorithmId::Mxn, &input, &mut output, &InArgs::default(), &mut out_args)
        .unwrap_err();
    assert!(matches!(err, SensorError::BufferTooSmall { .. }));
    assert!(output.iter().all(|b| *b == SENTINEL));
    assert_eq!(out_args, sentinel_args());
}

#[test]
fn failed_setup_leaves_variant_inactive() {
    let geometry = FrameGeometry::new(80, 48);
    let mut dispatcher = Dispatcher::new(geometry);
    let (input, mut output) = buffers(geometry, 7);
    let mut out_args = OutArgs::default();

    let err = dispatcher.init_algorithm(AlgorithmId::Motion.raw()).unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(dispatcher.active(), None);
    assert_eq!(
        dispatcher.run(AlgorithmId::Motion, &input, &mut output, &InArgs::default(), &mut out_args),
        Err(SensorError::NotInitialized)
    );
}

#[test]
fn resetup_replays_identically() {
    let geometry = FrameGeometry::default();
    let mut dispatcher = Dispatcher::new(geometry);
    let mut output = vec![0u8; geometry.output_len()];

    let mut replay = |dispatcher: &mut Dispatcher| {
        dispatcher.init(AlgorithmId::Motion).unwrap();
        let mut source = SyntheticSource::new(geometry, 11);
        let mut results = Vec::new();
        for _ in 0..4 {
            let input = source.next_frame().unwrap();
            let mut out_args = OutArgs::default();
            dispatcher
                .run(AlgorithmId::Motion, &input, &mut output, &InArgs::default(), &mut out_args)
                .unwrap();
            results.push((out_args, output.clone()));
        }
        results
    };

    let first = replay(&mut dispatcher);
    let second = replay(&mut dispatcher);
    assert_eq!(first, second);
    // The block moves, so motion shows up after the first frame.
    assert_eq!(first[0].0.target_mass, 0);
    assert!(first[1].0.target_mass > 0);
}
