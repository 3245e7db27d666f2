//! Scripted collaborators for unit tests.

use std::sync::{Arc, Mutex};

use super::notify::{Notice, Notifier};
use super::player::{PlayerCapability, PlayerError, PlayerPlatform};

#[derive(Debug, Default)]
struct PlayerScript {
    time: f64,
    duration: f64,
    failing: bool,
    playing: bool,
    seeks: Vec<f64>,
}

/// Player whose position is set by the test.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPlayer {
    script: Arc<Mutex<PlayerScript>>,
}

impl ScriptedPlayer {
    pub fn new(duration: f64) -> Self {
        let player = Self::default();
        player.set_duration(duration);
        player
    }

    pub fn set_time(&self, time: f64) {
        self.script.lock().unwrap().time = time;
    }

    pub fn set_duration(&self, duration: f64) {
        self.script.lock().unwrap().duration = duration;
    }

    pub fn set_failing(&self, failing: bool) {
        self.script.lock().unwrap().failing = failing;
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.script.lock().unwrap().seeks.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.script.lock().unwrap().playing
    }
}

impl PlayerCapability for ScriptedPlayer {
    fn current_time(&self) -> Result<f64, PlayerError> {
        let script = self.script.lock().unwrap();
        if script.failing {
            return Err(PlayerError::NotReady);
        }
        Ok(script.time)
    }

    fn duration(&self) -> Result<f64, PlayerError> {
        let script = self.script.lock().unwrap();
        if script.failing {
            return Err(PlayerError::NotReady);
        }
        Ok(script.duration)
    }

    fn seek_to(&mut self, seconds: f64, _allow_seek_ahead: bool) -> Result<(), PlayerError> {
        let mut script = self.script.lock().unwrap();
        if script.failing {
            return Err(PlayerError::Call("seekTo threw".to_string()));
        }
        script.seeks.push(seconds);
        script.time = seconds;
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        let mut script = self.script.lock().unwrap();
        if script.failing {
            return Err(PlayerError::Call("playVideo threw".to_string()));
        }
        script.playing = true;
        Ok(())
    }
}

pub struct ScriptedPlatform {
    pub sdk_loaded: bool,
    pub host_present: bool,
    pub sdk_load_requests: usize,
    pub player: ScriptedPlayer,
}

impl ScriptedPlatform {
    pub fn ready_with(player: ScriptedPlayer) -> Self {
        Self {
            sdk_loaded: true,
            host_present: true,
            sdk_load_requests: 0,
            player,
        }
    }
}

impl PlayerPlatform for ScriptedPlatform {
    fn sdk_loaded(&self) -> bool {
        self.sdk_loaded
    }

    fn request_sdk_load(&mut self) {
        self.sdk_load_requests += 1;
    }

    fn has_host_element(&self, _element_id: &str) -> bool {
        self.host_present
    }

    fn create_player(
        &mut self,
        _element_id: &str,
        _media_id: &str,
    ) -> Result<Box<dyn PlayerCapability>, PlayerError> {
        Ok(Box::new(self.player.clone()))
    }
}

#[derive(Debug, Default)]
struct NotifierLog {
    notices: Vec<Notice>,
    questions: Vec<String>,
    answer: bool,
}

/// Records notices and answers confirmations with a fixed reply.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    log: Arc<Mutex<NotifierLog>>,
}

impl RecordingNotifier {
    pub fn answering(answer: bool) -> Self {
        let notifier = Self::default();
        notifier.set_answer(answer);
        notifier
    }

    pub fn set_answer(&self, answer: bool) {
        self.log.lock().unwrap().answer = answer;
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.log.lock().unwrap().notices.clone()
    }

    pub fn questions(&self) -> Vec<String> {
        self.log.lock().unwrap().questions.clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.log.lock().unwrap().notices.push(notice);
    }

    fn confirm(&self, question: &str) -> bool {
        let mut log = self.log.lock().unwrap();
        log.questions.push(question.to_string());
        log.answer
    }
}
