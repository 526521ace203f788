//! Output through the system's default cpal device.
//!
//! The cpal stream lives on a dedicated worker thread for its whole life; the
//! control side talks to it over a command channel. The audio callback only
//! ever `try_lock`s the renderer slot, so a contended slot costs one block of
//! silence instead of a blocked realtime thread.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    FromSample, Sample, SampleFormat, SizedSample,
};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, warn};

use crate::{
    error::EngineError,
    graph::GraphRenderer,
    io::{AudioHost, OutputDevice},
    MAX_BLOCK_SIZE,
};

type RendererSlot = Arc<Mutex<Option<GraphRenderer>>>;
type Reply = Sender<Result<(), String>>;

enum StreamCommand {
    Play(Reply),
    Pause(Reply),
    Close,
}

/// Opens [`CpalOutput`]s on the default host.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalHost;

impl AudioHost for CpalHost {
    fn open_output(&self) -> Result<Box<dyn OutputDevice>, EngineError> {
        Ok(Box::new(CpalOutput::open()?))
    }
}

pub struct CpalOutput {
    sample_rate: u32,
    channels: usize,
    suspended: bool,
    renderer: RendererSlot,
    commands: Sender<StreamCommand>,
    worker: Option<JoinHandle<()>>,
}

impl CpalOutput {
    /// Open the default output device. The stream starts suspended.
    pub fn open() -> Result<Self, EngineError> {
        let renderer: RendererSlot = Arc::new(Mutex::new(None));
        let (commands, command_rx) = crossbeam_channel::unbounded();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);

        let slot = renderer.clone();
        let worker = thread::Builder::new()
            .name("ambience-output".into())
            .spawn(move || run_stream(slot, ready_tx, command_rx))
            .map_err(|e| EngineError::AudioDeviceUnavailable(e.to_string()))?;

        let ready = ready_rx.recv();
        let (sample_rate, channels) = match ready {
            Ok(Ok(format)) => format,
            Ok(Err(message)) => {
                let _ = worker.join();
                return Err(EngineError::AudioDeviceUnavailable(message));
            }
            Err(_) => {
                let _ = worker.join();
                return Err(EngineError::AudioDeviceUnavailable(
                    "output thread exited before the stream was built".into(),
                ));
            }
        };

        debug!(sample_rate, channels, "output stream ready");

        Ok(Self {
            sample_rate,
            channels,
            suspended: true,
            renderer,
            commands,
            worker: Some(worker),
        })
    }

    fn request(&self, command: impl FnOnce(Reply) -> StreamCommand) -> Result<(), EngineError> {
        let (reply, response) = crossbeam_channel::bounded(1);
        self.commands
            .send(command(reply))
            .map_err(|_| EngineError::AudioDeviceUnavailable("output thread stopped".into()))?;
        response
            .recv()
            .map_err(|_| EngineError::AudioDeviceUnavailable("output thread stopped".into()))?
            .map_err(EngineError::AudioDeviceUnavailable)
    }
}

impl OutputDevice for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn attach(&mut self, renderer: GraphRenderer) {
        *self.renderer.lock() = Some(renderer);
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        if self.worker.is_none() {
            return Err(EngineError::AudioDeviceUnavailable("output closed".into()));
        }
        if let Err(err) = self.request(StreamCommand::Play) {
            warn!(%err, "failed to resume output stream");
            return Err(err);
        }
        self.suspended = false;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), EngineError> {
        self.request(StreamCommand::Pause)?;
        self.suspended = true;
        Ok(())
    }

    fn close(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = self.commands.send(StreamCommand::Close);
        if worker.join().is_err() {
            warn!("output thread panicked");
        }
        self.renderer.lock().take();
        self.suspended = true;
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        self.close();
    }
}

/// Worker body: build the stream, report its format, then serve commands
/// until told to close or the control side goes away.
fn run_stream(
    slot: RendererSlot,
    ready: Sender<Result<(u32, usize), String>>,
    commands: Receiver<StreamCommand>,
) {
    let stream = match build_stream(slot) {
        Ok((stream, sample_rate, channels)) => {
            if ready.send(Ok((sample_rate, channels))).is_err() {
                return;
            }
            stream
        }
        Err(message) => {
            let _ = ready.send(Err(message));
            return;
        }
    };

    for command in commands.iter() {
        match command {
            StreamCommand::Play(reply) => {
                let _ = reply.send(stream.play().map_err(|e| e.to_string()));
            }
            StreamCommand::Pause(reply) => {
                let _ = reply.send(stream.pause().map_err(|e| e.to_string()));
            }
            StreamCommand::Close => break,
        }
    }

    debug!("output stream closed");
}

fn build_stream(slot: RendererSlot) -> Result<(cpal::Stream, u32, usize), String> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| "no default output device available".to_string())?;
    let supported = device
        .default_output_config()
        .map_err(|e| format!("failed to fetch default output config: {e}"))?;

    let sample_rate = supported.sample_rate().0;
    let channels = supported.channels() as usize;
    let config = supported.config();

    let stream = match supported.sample_format() {
        SampleFormat::F32 => build_typed::<f32>(&device, &config, slot),
        SampleFormat::I16 => build_typed::<i16>(&device, &config, slot),
        SampleFormat::U16 => build_typed::<u16>(&device, &config, slot),
        other => return Err(format!("unsupported sample format: {other:?}")),
    }
    .map_err(|e| format!("failed to build output stream: {e}"))?;

    // Not every backend can pause; those just start running early.
    if let Err(err) = stream.pause() {
        debug!(%err, "output stream cannot start paused");
    }

    Ok((stream, sample_rate, channels))
}

fn build_typed<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    slot: RendererSlot,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut scratch = vec![0.0f32; MAX_BLOCK_SIZE * channels.max(1)];

    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let Some(mut guard) = slot.try_lock() else {
                data.fill(T::EQUILIBRIUM);
                return;
            };
            let Some(renderer) = guard.as_mut() else {
                data.fill(T::EQUILIBRIUM);
                return;
            };

            for chunk in data.chunks_mut(scratch.len()) {
                let block = &mut scratch[..chunk.len()];
                renderer.render(block, channels);
                for (out, &sample) in chunk.iter_mut().zip(block.iter()) {
                    *out = T::from_sample(sample);
                }
            }
        },
        |err| error!("output stream error: {}", err),
        None,
    )
}
