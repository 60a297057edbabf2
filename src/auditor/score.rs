mod metric_scorer;
mod score_label;

pub use metric_scorer::*;
pub use score_label::ScoreLabel;
