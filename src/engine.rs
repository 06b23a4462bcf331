//! Media engine seam: resolving a location into a live decoder.
//!
//! The playback service drives decoders only through these traits, so
//! tests can substitute an instrumented engine. The production engine
//! wraps `rodio`. Neither trait is `Send`: the engine is built by a
//! factory invoked on the service thread and never leaves it.

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};
use thiserror::Error;

use crate::library::Location;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no audio output device: {0}")]
    Output(#[from] rodio::StreamError),
    #[error("failed to open {location}: {source}")]
    Open {
        location: Location,
        source: std::io::Error,
    },
    #[error("failed to decode {location}: {source}")]
    Decode {
        location: Location,
        source: rodio::decoder::DecoderError,
    },
}

/// One live playback instance bound to a single open media source.
/// Dropping it releases the underlying output; a dropped decoder is
/// never reused.
pub trait Decoder {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek_to(&mut self, position: Duration);
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
    fn set_volume(&mut self, gain: f32);
    /// True once the source has been fully consumed.
    fn is_finished(&self) -> bool;
}

/// Opens locations into decoders. Callers keep at most one decoder
/// live at a time and drop the old one before opening the next.
pub trait MediaEngine {
    fn open(&mut self, location: &Location) -> Result<Box<dyn Decoder>, EngineError>;
}

/// Factory the playback service invokes on its own thread to build the
/// engine. Only the factory crosses threads, never the engine itself.
pub type EngineFactory = Arc<dyn Fn() -> Result<Box<dyn MediaEngine>, EngineError> + Send + Sync>;

pub struct RodioEngine {
    stream: OutputStream,
}

impl RodioEngine {
    /// Opens the default output device. The stream is not `Send`, so
    /// this must run on the thread that will own the engine.
    pub fn new() -> Result<Self, EngineError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in
        // debugging, but noisy for a TUI app.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }
}

impl MediaEngine for RodioEngine {
    fn open(&mut self, location: &Location) -> Result<Box<dyn Decoder>, EngineError> {
        let file = File::open(location.as_path()).map_err(|e| EngineError::Open {
            location: location.clone(),
            source: e,
        })?;

        let source = rodio::Decoder::new(BufReader::new(file)).map_err(|e| EngineError::Decode {
            location: location.clone(),
            source: e,
        })?;
        let duration = source.total_duration();

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        // Created paused; the service decides when output starts.
        sink.pause();

        Ok(Box::new(RodioDecoder { sink, duration }))
    }
}

pub fn rodio_factory() -> EngineFactory {
    Arc::new(|| RodioEngine::new().map(|engine| Box::new(engine) as Box<dyn MediaEngine>))
}

struct RodioDecoder {
    sink: Sink,
    duration: Option<Duration>,
}

impl Decoder for RodioDecoder {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn seek_to(&mut self, position: Duration) {
        if let Err(err) = self.sink.try_seek(position) {
            tracing::warn!(%err, "seek not supported for this source");
        }
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn set_volume(&mut self, gain: f32) {
        self.sink.set_volume(gain);
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}

impl Drop for RodioDecoder {
    fn drop(&mut self) {
        // A detached sink keeps playing; stop it so dropping really releases.
        self.sink.stop();
    }
}
