use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
  Started,
  Success,
  NoFile,
  Fail,
  PartialFail,
}

impl RunState {
  pub fn is_terminal(self) -> bool {
    self != RunState::Started
  }
}

/// Outcome of a finished run given how many of its files made it to storage.
pub fn classify(total_files: usize, uploaded_files: usize) -> RunState {
  debug_assert!(uploaded_files <= total_files);
  if total_files == 0 {
    RunState::NoFile
  } else if uploaded_files == total_files {
    RunState::Success
  } else if uploaded_files == 0 {
    RunState::Fail
  } else {
    RunState::PartialFail
  }
}
