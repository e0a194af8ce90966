//! Three plucked parts looping over 80 seconds, with scripted group edits.
//!
//! Run with: cargo run --example three_voices --features cpal_sink [seconds]

use std::thread::sleep;
use std::time::{Duration, Instant};

use zupfen::{Engine, GroupId, Param, Sequence, Synth, SynthConfig, SynthController, VoiceId, VoiceParams};

/// (frequency, start offset in the 4 s bar, duration), per part
const PARTS: [[(f32, f64, f64); 2]; 3] = [
    [(261.63, 0.0, 2.0), (293.66, 2.0, 2.0)],
    [(293.66, 0.0, 2.0), (493.88, 2.5, 1.5)],
    [(392.00, 0.0, 2.0), (587.33, 3.0, 1.0)],
];

fn build_sequence() -> Sequence {
    // attack 10 s clamps to the 3 s maximum
    let base = VoiceParams::new().with_amplitude(0.8).with_attack_time(10.0);

    let mut seq = Sequence::new();
    let mut next_id = 0;
    let mut bar = 0.0;
    while bar < 80.0 {
        for (group, part) in PARTS.iter().enumerate() {
            for &(freq, offset, duration) in part.iter() {
                // an octave down
                let params = base.with_frequency(freq / 2.0);
                seq.add(VoiceId(next_id), GroupId(group as u8), params, bar + offset, duration);
                next_id += 1;
            }
        }
        bar += 4.0;
    }
    seq
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let seconds: f64 = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 84.0,
    };

    let mut engine = Engine::default_output().ok_or("No audio device")?;
    let ctx = *engine.context();
    let config = SynthConfig::default().with_polyphony(32);
    let synth = engine.add(Synth::new(&ctx, &config));
    engine.output(&synth);

    let mut synth = SynthController::new(synth);
    synth.play_sequence(build_sequence())?;

    // (time, group, parameter, delta), standing in for the keyboard
    let mut edits = vec![
        (12.0, GroupId(0), Param::Amplitude, -0.3),
        (24.0, GroupId(1), Param::Amplitude, -0.4),
        (36.0, GroupId(0), Param::AttackTime, -2.5),
        (48.0, GroupId(2), Param::Pan, 0.8),
        (60.0, GroupId(1), Param::Pan, -0.8),
    ];
    edits.reverse();

    println!("Playing for {} s... Ctrl+C to stop", seconds);

    let start = Instant::now();
    let rate = engine.sample_rate() as f64;
    while start.elapsed().as_secs_f64() < seconds {
        let now = start.elapsed().as_secs_f64();
        while edits.last().map_or(false, |e| e.0 <= now) {
            if let Some((_, group, param, delta)) = edits.pop() {
                println!("{:>5.1} s: group {} {} {:+}", now, group.0, param, delta);
                synth.adjust_group(group, param, delta)?;
            }
        }

        let target = (now * rate / 64.0) as u64 + 6;
        while engine.blocks_processed() < target {
            engine.process();
        }
        sleep(Duration::from_micros(500));
    }

    synth.release_all()?;
    Ok(())
}
