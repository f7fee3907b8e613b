use crate::core::horse::HorsePars;

const SPEED_WEIGHT: f64 = 0.4;
const STAMINA_WEIGHT: f64 = 0.3;
const EXPERIENCE_WEIGHT: f64 = 0.2;
const LUCK_WEIGHT: f64 = 0.1;

/// Weighted form score of a horse.
pub fn form_score(horse: &HorsePars) -> f64 {
    horse.speed * SPEED_WEIGHT
        + horse.stamina * STAMINA_WEIGHT
        + horse.experience * EXPERIENCE_WEIGHT
        + horse.luck * LUCK_WEIGHT
}

/// win_probabilities estimates the win probability of every horse in the field as its share of
/// the summed form scores. The result is in field order.
pub fn win_probabilities(field: &[HorsePars]) -> Vec<(String, f64)> {
    if field.is_empty() {
        return Vec::new();
    }

    let scores: Vec<f64> = field.iter().map(form_score).collect();
    let score_sum: f64 = scores.iter().sum();

    field
        .iter()
        .zip(scores.iter())
        .map(|(horse, score)| {
            let prob = if score_sum > 0.0 {
                score / score_sum
            } else {
                1.0 / field.len() as f64
            };
            (horse.name.to_owned(), prob)
        })
        .collect()
}

/// print_odds prints the stats table with the estimated win probabilities.
pub fn print_odds(field: &[HorsePars]) {
    println!("INFO: Horse stats with estimated win probabilities");
    for (horse, (_, prob)) in field.iter().zip(win_probabilities(field)) {
        println!(
            "{:<20} speed {:.3}, stamina {:.3}, luck {:.3}, probability {:3}%",
            horse.name,
            horse.speed,
            horse.stamina,
            horse.luck,
            (prob * 100.0) as u32
        );
    }
}
