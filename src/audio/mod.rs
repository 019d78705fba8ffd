pub mod chime;

use chime::Chime;

use log::info;
use rodio::{OutputStream, Sink};
use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

use crate::effects::SideEffectDispatcher;

enum CueCommand {
    Warning,
    StepFinished,
    SessionComplete,
}

/// Plays engine cues on a dedicated audio thread.
///
/// The thread owns the non-Send rodio objects; callers only push commands
/// over a channel, so a missing or failing audio device can never stall a
/// timer operation.
pub struct AudioCueDispatcher {
    tx: Arc<Mutex<Option<Sender<CueCommand>>>>,
}

impl AudioCueDispatcher {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<CueCommand>, String> {
        if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<CueCommand>();

        thread::Builder::new()
            .name("cue-player".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<(), String> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| format!("Failed to create audio sink: {}", e))?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    // Cues are best-effort; a host without an audio device
                    // just drops them.
                    if ensure_sink(&mut _stream, &mut sink).is_err() {
                        continue;
                    }
                    if let Some(ref s) = sink {
                        match cmd {
                            CueCommand::Warning => {
                                s.append(Chime::new(880.0, 180));
                            }
                            CueCommand::StepFinished => {
                                s.append(Chime::new(660.0, 160));
                                s.append(Chime::new(880.0, 160));
                                s.append(Chime::new(988.0, 260));
                            }
                            CueCommand::SessionComplete => {
                                s.append(Chime::new(523.0, 200));
                                s.append(Chime::new(659.0, 200));
                                s.append(Chime::new(784.0, 200));
                                s.append(Chime::new(1047.0, 400));
                            }
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        let tx_clone = tx.clone();
        *self.tx.lock().map_err(|e| e.to_string())? = Some(tx);
        Ok(tx_clone)
    }

    fn send(&self, cmd: CueCommand) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(cmd).map_err(|e| e.to_string())
    }
}

impl SideEffectDispatcher for AudioCueDispatcher {
    fn play_warning_cue(&self, _step_id: &str) -> Result<(), String> {
        self.send(CueCommand::Warning)
    }

    fn play_finish_cue(&self, _step_id: &str) -> Result<(), String> {
        self.send(CueCommand::StepFinished)
    }

    fn play_session_complete_cue(&self) -> Result<(), String> {
        self.send(CueCommand::SessionComplete)
    }

    fn show_message(&self, text: &str) -> Result<(), String> {
        info!("{text}");
        Ok(())
    }

    fn request_notification(&self, title: &str, body: &str) -> Result<(), String> {
        // Best-effort: no desktop notification backend is wired in here;
        // embeddings with one override this method.
        info!("notification: {title}: {body}");
        Ok(())
    }

    fn bring_into_view(&self, _step_id: &str) -> Result<(), String> {
        Ok(())
    }
}
