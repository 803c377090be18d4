//! Writer thread for recordings of the processed output.
//!
//! The audio callback only pushes samples into the record queue; opening,
//! writing and finalizing files happens here, off the real-time thread.

use std::{
    path::PathBuf,
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use resobox::{
    engine::Recorder,
    io::wav::{recording_path, RecordingInfo},
};

/// How often queued samples are moved to disk.
const PUMP_INTERVAL: Duration = Duration::from_millis(20);

enum Command {
    Start,
    Stop,
}

#[derive(Debug)]
pub enum RecordEvent {
    Started(PathBuf),
    Saved(RecordingInfo),
    Failed(String),
}

pub struct RecordingThread {
    commands: Option<Sender<Command>>,
    events: Receiver<RecordEvent>,
    handle: Option<JoinHandle<()>>,
    started: Option<Instant>,
}

impl RecordingThread {
    pub fn spawn(recorder: Recorder, dir: PathBuf, sample_rate: u32) -> Self {
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("resobox-recorder".into())
            .spawn(move || writer_loop(recorder, dir, sample_rate, command_rx, event_tx))
            .map_err(|err| tracing::error!(%err, "could not start recorder thread"))
            .ok();
        Self {
            commands: Some(command_tx),
            events: event_rx,
            handle,
            started: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.started.is_some()
    }

    /// Time since the current recording started.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started.map(|started| started.elapsed())
    }

    pub fn toggle(&mut self) {
        let command = if self.is_recording() {
            self.started = None;
            Command::Stop
        } else {
            self.started = Some(Instant::now());
            Command::Start
        };
        let sent = self
            .commands
            .as_ref()
            .is_some_and(|commands| commands.send(command).is_ok());
        if !sent {
            self.started = None;
        }
    }

    /// Collect what the writer reported since the last call.
    pub fn poll(&mut self) -> Vec<RecordEvent> {
        let events: Vec<RecordEvent> = self.events.try_iter().collect();
        if events.iter().any(|event| matches!(event, RecordEvent::Failed(_))) {
            self.started = None;
        }
        events
    }
}

impl Drop for RecordingThread {
    fn drop(&mut self) {
        // Closing the command channel tells the writer to finish the file.
        self.commands = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("recorder thread panicked");
            }
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

fn writer_loop(
    mut recorder: Recorder,
    dir: PathBuf,
    sample_rate: u32,
    commands: Receiver<Command>,
    events: Sender<RecordEvent>,
) {
    let report = |event: RecordEvent| {
        if let RecordEvent::Failed(err) = &event {
            tracing::warn!(%err, "recording failed");
        }
        let _ = events.send(event);
    };
    let stop = |recorder: &mut Recorder| match recorder.stop() {
        Ok(Some(info)) => {
            if recorder.overruns() > 0 {
                tracing::warn!(dropped_chunks = recorder.overruns(), "recording has gaps");
            }
            report(RecordEvent::Saved(info));
        }
        Ok(None) => {}
        Err(err) => report(RecordEvent::Failed(err.to_string())),
    };

    loop {
        match commands.recv_timeout(PUMP_INTERVAL) {
            Ok(Command::Start) => {
                if let Err(err) = std::fs::create_dir_all(&dir) {
                    report(RecordEvent::Failed(format!("{}: {err}", dir.display())));
                    continue;
                }
                let path = recording_path(&dir, unix_now());
                match recorder.start(&path, sample_rate) {
                    Ok(_) => report(RecordEvent::Started(path)),
                    Err(err) => report(RecordEvent::Failed(err.to_string())),
                }
            }
            Ok(Command::Stop) => stop(&mut recorder),
            Err(RecvTimeoutError::Timeout) => {
                if let Err(err) = recorder.pump() {
                    report(RecordEvent::Failed(err.to_string()));
                    stop(&mut recorder);
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                stop(&mut recorder);
                break;
            }
        }
    }
}
