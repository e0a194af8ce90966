use rtrb::{Consumer, RingBuffer};
use zupfen::nodes::RtrbSink;
use zupfen::{
    Engine, GroupId, Handle, Param, Sequence, Synth, SynthCommand, SynthConfig, SynthController, VoiceId,
    VoiceParams,
};

const RATE: u32 = 44_100;

struct Rig {
    engine: Engine,
    capture: Consumer<f32>,
}

impl Rig {
    fn new() -> Self {
        let (producer, capture) = RingBuffer::new(1 << 16);
        let engine = Engine::new(RATE).with_output(RtrbSink::stereo(producer));
        Self { engine, capture }
    }

    fn add_synth(&mut self, seed: u64) -> Handle<SynthCommand> {
        let ctx = *self.engine.context();
        let synth = self
            .engine
            .add(Synth::new(&ctx, &SynthConfig::default().with_seed(seed)));
        self.engine.output(&synth);
        synth
    }

    /// Process `blocks` blocks and return (left, right).
    fn run(&mut self, blocks: usize) -> (Vec<f32>, Vec<f32>) {
        let mut left = Vec::new();
        let mut right = Vec::new();
        for _ in 0..blocks {
            self.engine.process();
            while let (Ok(l), Ok(r)) = (self.capture.pop(), self.capture.pop()) {
                left.push(l);
                right.push(r);
            }
        }
        (left, right)
    }
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}

#[test]
fn idle_synth_renders_silence() {
    let mut rig = Rig::new();
    rig.add_synth(1);
    let (l, r) = rig.run(20);
    assert_eq!(l.len(), 20 * 64);
    assert!(l.iter().chain(&r).all(|s| *s == 0.0));
    assert_eq!(rig.engine.blocks_processed(), 20);
}

#[test]
fn triggered_note_reaches_the_sink() {
    let mut rig = Rig::new();
    let mut synth = SynthController::new(rig.add_synth(1));
    synth
        .trigger_on(VoiceId(57), GroupId(0), VoiceParams::new().with_frequency(220.0).with_amplitude(0.8))
        .unwrap();

    let (l, r) = rig.run(200);
    assert!(peak(&l) > 0.01);
    assert!(peak(&l) <= 1.0);
    // centered: both sides identical
    for (a, b) in l.iter().zip(&r) {
        assert!((a - b).abs() < 1e-6);
    }

    synth.trigger_off(VoiceId(57)).unwrap();
    // 0.1 s release is under 70 blocks
    rig.run(80);
    let (l, _) = rig.run(10);
    assert!(l.iter().all(|s| *s == 0.0));
}

#[test]
fn hard_pan_keeps_the_other_side_silent() {
    let mut rig = Rig::new();
    let mut synth = SynthController::new(rig.add_synth(3));
    synth
        .trigger_on(VoiceId(1), GroupId(0), VoiceParams::new().with_pan(1.0))
        .unwrap();
    let (l, r) = rig.run(100);
    assert!(peak(&l) < 1e-6);
    assert!(peak(&r) > 0.01);
}

#[test]
fn sink_sums_every_connected_synth() {
    let play = |which: &[(u64, f32)]| {
        let mut rig = Rig::new();
        for &(seed, freq) in which {
            let mut synth = rig.add_synth(seed);
            synth
                .send(SynthCommand::TriggerOn {
                    id: VoiceId(0),
                    group: GroupId(0),
                    params: VoiceParams::new().with_frequency(freq),
                })
                .unwrap();
        }
        rig.run(50).0
    };

    let a = play(&[(1, 220.0)]);
    let b = play(&[(2, 330.0)]);
    let both = play(&[(1, 220.0), (2, 330.0)]);
    assert_eq!(both.len(), a.len());
    for i in 0..both.len() {
        assert!((both[i] - (a[i] + b[i])).abs() < 1e-5);
    }
}

#[test]
fn sequence_starts_on_the_scheduled_sample() {
    let mut rig = Rig::new();
    let mut synth = SynthController::new(rig.add_synth(4));
    let mut seq = Sequence::new();
    // 0.1 s = sample 4410, inside block 68 (4352..4416)
    seq.add(VoiceId(1), GroupId(0), VoiceParams::new(), 0.1, 0.2);
    synth.play_sequence(seq).unwrap();

    let (l, _) = rig.run(100);
    // the envelope's first sample is 0, so 4410 itself is silent too
    assert!(l[..4411].iter().all(|s| *s == 0.0));
    assert!(l[4411..4416].iter().any(|s| *s != 0.0));
}

#[test]
fn group_edit_mutes_only_that_group() {
    let mut rig = Rig::new();
    let mut synth = SynthController::new(rig.add_synth(5));
    synth
        .trigger_on(VoiceId(1), GroupId(1), VoiceParams::new().with_pan(-1.0))
        .unwrap();
    synth
        .trigger_on(VoiceId(2), GroupId(2), VoiceParams::new().with_pan(1.0))
        .unwrap();
    rig.run(20);

    synth.adjust_group(GroupId(1), Param::Amplitude, -1.0).unwrap();
    assert_eq!(synth.get_parameter(VoiceId(1), Param::Amplitude), Some(0.0));
    let (l, r) = rig.run(20);
    // voice 2 is hard right, so only rounding noise may reach the left side
    assert!(peak(&l) < 1e-6);
    assert!(peak(&r) > 0.01);
}

#[test]
fn release_all_empties_the_pool() {
    let mut rig = Rig::new();
    let mut synth = SynthController::new(rig.add_synth(6));
    for i in 0..8 {
        let params = VoiceParams::new().with_frequency(110.0 * (1.0 + i as f32 / 4.0));
        synth.trigger_on(VoiceId(i), GroupId(0), params).unwrap();
    }
    rig.run(50);
    synth.release_all().unwrap();
    rig.run(80);
    let (l, r) = rig.run(5);
    assert!(l.iter().chain(&r).all(|s| *s == 0.0));
}
