use crate::core::betting::Bet;
use crate::core::horse::HorsePars;
use crate::core::race::RacePars;
use std::collections::HashSet;
use thiserror::Error;

/// Minimum number of horses needed to start a race.
pub const MIN_FIELD_SIZE: usize = 2;

/// FieldError is used if the field, the race parameters or a bet sheet do not fulfill the
/// requirements of a race. The simulator itself does not check any of this.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FieldError {
    #[error("at least {min} horses are needed, got {got}")]
    TooFewHorses { min: usize, got: usize },
    #[error("horse name {0} is used more than once")]
    DuplicateName(String),
    #[error("horse name must not be empty")]
    EmptyName,
    #[error("speed of {name} must be positive and finite, got {speed}")]
    InvalidSpeed { name: String, speed: f64 },
    #[error("{attribute} of {name} must be in [0, 1], got {value}")]
    AttributeOutOfRange {
        name: String,
        attribute: &'static str,
        value: f64,
    },
    #[error("invalid race parameter {0}")]
    InvalidRacePar(&'static str),
    #[error("bet of {bettor} is placed on unknown horse {horse}")]
    UnknownHorse { bettor: String, horse: String },
}

/// validate_field checks the horses entered in a race.
pub fn validate_field(field: &[HorsePars]) -> Result<(), FieldError> {
    if field.len() < MIN_FIELD_SIZE {
        return Err(FieldError::TooFewHorses {
            min: MIN_FIELD_SIZE,
            got: field.len(),
        });
    }

    let mut names = HashSet::with_capacity(field.len());
    for horse in field.iter() {
        if horse.name.trim().is_empty() {
            return Err(FieldError::EmptyName);
        }
        if !names.insert(horse.name.as_str()) {
            return Err(FieldError::DuplicateName(horse.name.to_owned()));
        }
        if !(horse.speed.is_finite() && horse.speed > 0.0) {
            return Err(FieldError::InvalidSpeed {
                name: horse.name.to_owned(),
                speed: horse.speed,
            });
        }
        for (attribute, value) in [
            ("stamina", horse.stamina),
            ("luck", horse.luck),
            ("experience", horse.experience),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(FieldError::AttributeOutOfRange {
                    name: horse.name.to_owned(),
                    attribute,
                    value,
                });
            }
        }
    }

    Ok(())
}

/// validate_race_pars checks the race parameters.
pub fn validate_race_pars(pars: &RacePars) -> Result<(), FieldError> {
    if !(pars.base_rate.is_finite() && pars.base_rate > 0.0) {
        return Err(FieldError::InvalidRacePar("base_rate"));
    }
    if !(0.0..=1.0).contains(&pars.p_event) {
        return Err(FieldError::InvalidRacePar("p_event"));
    }
    if pars.tick_interval_ms == 0 {
        return Err(FieldError::InvalidRacePar("tick_interval_ms"));
    }
    if pars.max_ticks == Some(0) {
        return Err(FieldError::InvalidRacePar("max_ticks"));
    }
    Ok(())
}

/// validate_bets checks that every bet is placed on a horse of the field.
pub fn validate_bets(bets: &[Bet], field: &[HorsePars]) -> Result<(), FieldError> {
    let names: HashSet<&str> = field.iter().map(|h| h.name.as_str()).collect();
    match bets.iter().find(|bet| !names.contains(bet.horse.as_str())) {
        Some(bet) => Err(FieldError::UnknownHorse {
            bettor: bet.bettor.to_owned(),
            horse: bet.horse.to_owned(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horse(name: &str, speed: f64, luck: f64) -> HorsePars {
        HorsePars {
            name: name.to_owned(),
            speed,
            stamina: 0.5,
            luck,
            experience: 0.5,
            color: String::from("#FFFFFF"),
        }
    }

    #[test]
    fn valid_field_passes() {
        assert_eq!(validate_field(&[horse("A", 1.0, 0.2), horse("B", 1.3, 1.0)]), Ok(()));
    }

    #[test]
    fn field_needs_two_horses() {
        assert_eq!(
            validate_field(&[horse("A", 1.0, 0.2)]),
            Err(FieldError::TooFewHorses { min: 2, got: 1 })
        );
        assert!(validate_field(&[]).is_err());
    }

    #[test]
    fn stalled_and_duplicate_horses_are_rejected() {
        assert!(matches!(
            validate_field(&[horse("A", 0.0, 0.2), horse("B", 1.0, 0.2)]),
            Err(FieldError::InvalidSpeed { .. })
        ));
        assert!(matches!(
            validate_field(&[horse("A", f64::NAN, 0.2), horse("B", 1.0, 0.2)]),
            Err(FieldError::InvalidSpeed { .. })
        ));
        assert_eq!(
            validate_field(&[horse("A", 1.0, 0.2), horse("A", 1.0, 0.2)]),
            Err(FieldError::DuplicateName(String::from("A")))
        );
    }

    #[test]
    fn luck_must_be_a_probability() {
        let err = validate_field(&[horse("A", 1.0, 1.5), horse("B", 1.0, 0.2)]).unwrap_err();
        assert_eq!(
            err,
            FieldError::AttributeOutOfRange {
                name: String::from("A"),
                attribute: "luck",
                value: 1.5,
            }
        );
        assert_eq!(err.to_string(), "luck of A must be in [0, 1], got 1.5");
    }

    #[test]
    fn race_pars_are_checked() {
        assert_eq!(validate_race_pars(&RacePars::default()), Ok(()));
        let pars = RacePars {
            p_event: 1.2,
            ..RacePars::default()
        };
        assert_eq!(validate_race_pars(&pars), Err(FieldError::InvalidRacePar("p_event")));
        let pars = RacePars {
            base_rate: 0.0,
            ..RacePars::default()
        };
        assert_eq!(validate_race_pars(&pars), Err(FieldError::InvalidRacePar("base_rate")));
    }

    #[test]
    fn bets_must_target_the_field() {
        let field = vec![horse("A", 1.0, 0.2), horse("B", 1.0, 0.2)];
        let bets = vec![
            Bet {
                bettor: String::from("Ana"),
                horse: String::from("A"),
                amount: 10,
            },
            Bet {
                bettor: String::from("Ben"),
                horse: String::from("Z"),
                amount: 10,
            },
        ];
        assert_eq!(
            validate_bets(&bets, &field),
            Err(FieldError::UnknownHorse {
                bettor: String::from("Ben"),
                horse: String::from("Z"),
            })
        );
        assert_eq!(validate_bets(&bets[..1], &field), Ok(()));
    }
}
