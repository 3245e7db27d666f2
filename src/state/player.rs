/// Last sampled player position. Polled, never pushed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerState {
    pub current_time_seconds: f64,
    pub duration_seconds: f64,
    pub is_ready: bool,
}

impl PlayerState {
    pub fn duration_known(&self) -> bool {
        self.duration_seconds > 0.0
    }

    /// Current position truncated to whole seconds, as recorded on comments.
    pub fn current_whole_seconds(&self) -> u64 {
        if self.current_time_seconds.is_finite() && self.current_time_seconds > 0.0 {
            self.current_time_seconds.floor() as u64
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_seconds_floor_and_guard() {
        let mut state = PlayerState::default();
        assert_eq!(state.current_whole_seconds(), 0);
        state.current_time_seconds = 125.9;
        assert_eq!(state.current_whole_seconds(), 125);
        state.current_time_seconds = f64::NAN;
        assert_eq!(state.current_whole_seconds(), 0);
        assert!(!state.duration_known());
    }
}
