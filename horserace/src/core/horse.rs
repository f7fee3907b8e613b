use serde::{Deserialize, Serialize};

/// * `name` - Horse name, unique within one race
/// * `speed` - Progress-per-tick multiplier
/// * `stamina` - Carried for the odds estimate, unused by the event logic
/// * `luck` - Probability of resisting an adverse event, in [0, 1]
/// * `experience` - Carried for the odds estimate, unused by the event logic
/// * `color` - Display color as hex string, e.g. #FFA500
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HorsePars {
    pub name: String,
    pub speed: f64,
    #[serde(default = "default_attribute")]
    pub stamina: f64,
    #[serde(default = "default_attribute")]
    pub luck: f64,
    #[serde(default = "default_attribute")]
    pub experience: f64,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_attribute() -> f64 {
    0.5
}

fn default_color() -> String {
    String::from("#FF0000")
}

/// A horse entered in a race. The static attributes come from its parameters, the progress is
/// owned by the race it runs in.
#[derive(Debug, Clone)]
pub struct Horse {
    pub name: String,
    pub speed: f64,
    pub stamina: f64,
    pub luck: f64,
    pub experience: f64,
    pub color: String,
    progress: f64,
}

impl Horse {
    pub fn new(horse_pars: &HorsePars) -> Horse {
        Horse {
            name: horse_pars.name.to_owned(),
            speed: horse_pars.speed,
            stamina: horse_pars.stamina,
            luck: horse_pars.luck,
            experience: horse_pars.experience,
            color: horse_pars.color.to_owned(),
            progress: 0.0,
        }
    }

    /// Race progress, 0 at the start and 1 at the finish line.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn has_finished(&self) -> bool {
        self.progress >= 1.0
    }

    /// The method advances the horse by one tick at the given base rate, clamped at the finish
    /// line.
    pub fn advance(&mut self, base_rate: f64) {
        self.progress = (self.progress + self.speed * base_rate).min(1.0);
    }

    /// The method applies a progress delta (negative for adverse events). If `floor` is set the
    /// progress does not drop below the start line.
    pub fn apply_delta(&mut self, delta: f64, floor: bool) {
        self.progress += delta;
        if floor && self.progress < 0.0 {
            self.progress = 0.0;
        }
    }

    pub fn reset(&mut self) {
        self.progress = 0.0;
    }

    #[cfg(test)]
    pub(crate) fn set_progress(&mut self, progress: f64) {
        self.progress = progress;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pars(speed: f64) -> HorsePars {
        HorsePars {
            name: String::from("Comet"),
            speed,
            stamina: 0.5,
            luck: 0.5,
            experience: 0.5,
            color: String::from("#FFA500"),
        }
    }

    #[test]
    fn advance_is_clamped_at_finish() {
        let mut horse = Horse::new(&pars(1.5));
        horse.set_progress(0.9995);
        horse.advance(0.001);
        assert_eq!(horse.progress(), 1.0);
        assert!(horse.has_finished());
    }

    #[test]
    fn delta_floor_is_optional() {
        let mut horse = Horse::new(&pars(1.0));
        horse.apply_delta(-0.03, true);
        assert_eq!(horse.progress(), 0.0);
        horse.apply_delta(-0.03, false);
        assert!(horse.progress() < 0.0);
    }

    #[test]
    fn missing_attributes_take_defaults() {
        let json = r#"{"name": "Dusty", "speed": 1.2}"#;
        let pars: HorsePars = serde_json::from_str(json).unwrap();
        assert_eq!(pars.luck, 0.5);
        assert_eq!(pars.color, "#FF0000");
    }
}
