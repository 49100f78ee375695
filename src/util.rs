/// `part / whole` as a percentage, or `None` when there is nothing to divide by.
pub fn percentage(part: f64, whole: f64) -> Option<f64> {
    match whole {
        positive if positive > 0.0 => Some(part / whole * 100.0),
        _ => None,
    }
}

/// Accuracy across `games` rounds of `questions_per_round` questions each.
/// Defined as `0.0` before any game has been played.
pub fn accuracy_percent(total_correct: usize, questions_per_round: usize, games: usize) -> f64 {
    percentage(
        total_correct as f64,
        (questions_per_round * games) as f64,
    )
    .unwrap_or(0.0)
}
