use ambience::{io::OfflineHost, AmbientMixer, GeneratorSettings, MixerConfig, CATALOG};

fn config() -> MixerConfig {
    MixerConfig {
        generator: GeneratorSettings {
            duration_secs: 0.25,
            ..GeneratorSettings::default()
        },
        seed: Some(2024),
        ..MixerConfig::default()
    }
}

#[test]
fn renders_silence_with_nothing_playing() {
    let host = OfflineHost::new(16_000, 2);
    let probe = host.probe();
    let mixer = AmbientMixer::new(host, config());

    let samples = probe.render(512);
    assert!(samples.iter().all(|&s| s == 0.0));
    mixer.dispose().unwrap();
}

#[test]
fn renders_full_scene_within_bounds() {
    let host = OfflineHost::new(16_000, 2);
    let probe = host.probe();
    let mixer = AmbientMixer::new(host, config());

    for sound in CATALOG {
        mixer.play(sound.id).unwrap();
    }
    mixer.set_master_volume(0.15).unwrap();

    let samples = probe.render(4_096);
    assert_eq!(probe.active_nodes(), CATALOG.len());
    assert!(samples.iter().any(|s| s.abs() > 0.0));
    // six voices at 0.6, each within [-1, 1], under a 0.15 master
    assert!(samples.iter().all(|s| s.abs() <= 0.6 * 6.0 * 0.15 + 1e-4));
}

#[test]
fn seeded_mix_is_reproducible() {
    let render = || {
        let host = OfflineHost::new(16_000, 2);
        let probe = host.probe();
        let mixer = AmbientMixer::new(host, config());
        mixer.play("rain-forest").unwrap();
        mixer.play("fireplace").unwrap();
        probe.render(1_024)
    };

    assert_eq!(render(), render());
}

#[test]
fn mono_output_reads_first_channel() {
    let host = OfflineHost::new(16_000, 1);
    let probe = host.probe();
    let mixer = AmbientMixer::new(host, config());
    mixer.set_volume("white-noise", 1.0).unwrap();
    mixer.play("white-noise").unwrap();

    let samples = probe.render(64);
    let buffer = mixer.cache().cached("white-noise").unwrap();
    assert_eq!(samples, buffer.channel(0)[..64]);
}
