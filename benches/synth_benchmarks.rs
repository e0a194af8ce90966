use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use zupfen::dsp::KarplusString;
use zupfen::synth::Voice;
use zupfen::{AudioContext, GroupId, Synth, SynthConfig, VoiceId, VoiceParams};

pub fn criterion_benchmark(c: &mut Criterion) {
    let ctx = AudioContext::new(48_000, 512);

    c.bench_function("KarplusString.tic() x512", |b| {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut string = KarplusString::new(&ctx, 220.0).unwrap();
        string.pluck(&mut rng);
        b.iter(|| {
            for _ in 0..512 {
                string.tic().unwrap();
            }
            black_box(string.sample())
        })
    });

    c.bench_function("Voice.render() 512 frames, 4 layers", |b| {
        let config = SynthConfig::default().with_seed(1);
        let mut voice = Voice::new(&ctx, &config, 0);
        voice.init(VoiceParams::new().with_frequency(110.0).with_attack_time(0.01));
        for _ in 0..4 {
            voice.trigger_on().unwrap();
        }
        let mut left = [0.0f32; 512];
        let mut right = [0.0f32; 512];
        b.iter(|| {
            voice.render(&mut left, &mut right).unwrap();
            black_box(left[0])
        })
    });

    c.bench_function("Synth.render() 512 frames, 16 voices", |b| {
        let config = SynthConfig::default().with_polyphony(16).with_seed(1);
        let mut synth = Synth::new(&ctx, &config);
        for i in 0..16 {
            let params = VoiceParams::new()
                .with_frequency(55.0 * (1.0 + i as f32 * 0.25))
                .with_pan(i as f32 / 8.0 - 1.0);
            synth.trigger_on(VoiceId(i), GroupId(0), params).unwrap();
        }
        let mut left = [0.0f32; 512];
        let mut right = [0.0f32; 512];
        b.iter(|| {
            left.iter_mut().chain(right.iter_mut()).for_each(|s| *s = 0.0);
            synth.render(&mut left, &mut right);
            black_box(left[0])
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
