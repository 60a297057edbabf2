use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreLabel {
    Excellent,
    Good,
    NeedsImprovement,
    Poor,
}

impl ScoreLabel {
    pub fn from_score(score: u32) -> Self {
        if score >= 90 {
            ScoreLabel::Excellent
        } else if score >= 70 {
            ScoreLabel::Good
        } else if score >= 50 {
            ScoreLabel::NeedsImprovement
        } else {
            ScoreLabel::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreLabel::Excellent => "Excellent",
            ScoreLabel::Good => "Good",
            ScoreLabel::NeedsImprovement => "Needs Improvement",
            ScoreLabel::Poor => "Poor",
        }
    }
}

impl fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
