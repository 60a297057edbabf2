use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum AuditorState {
    #[default]
    Idle,
    Running,
    Displayed,
}

impl AuditorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditorState::Idle => "Idle",
            AuditorState::Running => "Running",
            AuditorState::Displayed => "Displayed",
        }
    }
}
