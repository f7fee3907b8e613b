use crate::core::horse::HorsePars;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

/// Maximum number of horses entered in one race.
pub const MAX_FIELD_SIZE: usize = 6;

pub const HORSE_NAMES: [&str; 24] = [
    "Thunderbolt",
    "Silver Arrow",
    "Midnight Run",
    "Desert Wind",
    "Copper Kettle",
    "Lucky Clover",
    "Storm Chaser",
    "Golden Hoof",
    "Blue Moon",
    "Red Rocket",
    "Whisper",
    "Old Timer",
    "Dusty Trail",
    "Comet",
    "Wildfire",
    "Northern Star",
    "Pepper",
    "Sundance",
    "Iron Will",
    "Maple",
    "Shadowfax",
    "Gallop Gus",
    "Night Owl",
    "Rusty Spur",
];

/// Stable is the roster of saved horses races are drawn from. Horse names are unique; inserting
/// a horse with a known name replaces it.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct Stable {
    horses: Vec<HorsePars>,
}

impl Stable {
    pub fn new() -> Stable {
        Stable::default()
    }

    pub fn from_horses(horses: Vec<HorsePars>) -> Stable {
        let mut stable = Stable::new();
        for horse in horses {
            stable.insert(horse);
        }
        stable
    }

    pub fn insert(&mut self, horse: HorsePars) {
        match self.horses.iter_mut().find(|h| h.name == horse.name) {
            Some(existing) => *existing = horse,
            None => self.horses.push(horse),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<HorsePars> {
        let idx = self.horses.iter().position(|h| h.name == name)?;
        Some(self.horses.remove(idx))
    }

    pub fn get(&self, name: &str) -> Option<&HorsePars> {
        self.horses.iter().find(|h| h.name == name)
    }

    pub fn horses(&self) -> &[HorsePars] {
        &self.horses
    }

    pub fn len(&self) -> usize {
        self.horses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.horses.is_empty()
    }

    /// Shuffled selection of at most `max` horses for one race.
    pub fn select_field<R: Rng>(&self, rng: &mut R, max: usize) -> Vec<HorsePars> {
        self.select_field_including(rng, max, &[])
    }

    /// Shuffled selection for one race that always contains the named horses (e.g. the horses
    /// bets were placed on). The remaining places up to `max` are drawn from the other horses.
    /// Names that are not in the stable are skipped. If more than `max` horses are named, all of
    /// them are entered.
    pub fn select_field_including<R: Rng>(
        &self,
        rng: &mut R,
        max: usize,
        names: &[&str],
    ) -> Vec<HorsePars> {
        let mut field: Vec<HorsePars> = Vec::with_capacity(max.max(names.len()));
        for name in names.iter() {
            if field.iter().all(|h| h.name != *name) {
                if let Some(horse) = self.get(name) {
                    field.push(horse.to_owned());
                }
            }
        }

        let mut others: Vec<&HorsePars> = self
            .horses
            .iter()
            .filter(|h| field.iter().all(|entered| entered.name != h.name))
            .collect();
        others.shuffle(rng);
        let no_free = max.saturating_sub(field.len());
        field.extend(others.into_iter().take(no_free).cloned());

        // the field order decides ties, named horses must not be favoured
        field.shuffle(rng);
        field
    }
}

/// random_hex_color returns a color string of the form #RRGGBB.
pub fn random_hex_color<R: Rng>(rng: &mut R) -> String {
    format!("#{:06X}", rng.gen_range(0..=0xFF_FF_FFu32))
}

/// generate_random_horse creates a horse with speed in [1.0, 1.5) and the remaining attributes in
/// [0, 1). The name is drawn from the given list; names already in the stable get a numeric
/// suffix.
pub fn generate_random_horse<R: Rng>(rng: &mut R, names: &[&str], stable: &Stable) -> HorsePars {
    let speed_distr = Uniform::new(1.0, 1.5);
    let attr_distr = Uniform::new(0.0, 1.0);

    let base_name = names.choose(rng).copied().unwrap_or("Horse");
    let mut name = base_name.to_owned();
    let mut suffix = 2;
    while stable.get(&name).is_some() {
        name = format!("{} {}", base_name, suffix);
        suffix += 1;
    }

    HorsePars {
        name,
        speed: speed_distr.sample(rng),
        stamina: attr_distr.sample(rng),
        luck: attr_distr.sample(rng),
        experience: attr_distr.sample(rng),
        color: random_hex_color(rng),
    }
}

/// generate_random_stable fills a new stable with `no_horses` random horses.
pub fn generate_random_stable<R: Rng>(rng: &mut R, no_horses: usize) -> Stable {
    let mut stable = Stable::new();
    for _ in 0..no_horses {
        let horse = generate_random_horse(rng, &HORSE_NAMES, &stable);
        stable.insert(horse);
    }
    stable
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn horse(name: &str, speed: f64) -> HorsePars {
        HorsePars {
            name: name.to_owned(),
            speed,
            stamina: 0.5,
            luck: 0.5,
            experience: 0.5,
            color: String::from("#123456"),
        }
    }

    #[test]
    fn insert_replaces_by_name() {
        let mut stable = Stable::new();
        stable.insert(horse("Comet", 1.1));
        stable.insert(horse("Dusty", 1.2));
        stable.insert(horse("Comet", 1.4));

        assert_eq!(stable.len(), 2);
        assert_eq!(stable.get("Comet").map(|h| h.speed), Some(1.4));
    }

    #[test]
    fn remove_by_name() {
        let mut stable = Stable::from_horses(vec![horse("Comet", 1.1), horse("Dusty", 1.2)]);
        assert_eq!(stable.remove("Comet").map(|h| h.name), Some(String::from("Comet")));
        assert!(stable.remove("Comet").is_none());
        assert_eq!(stable.len(), 1);
    }

    #[test]
    fn field_is_bounded_and_distinct() {
        let mut rng = StdRng::seed_from_u64(21);
        let stable = generate_random_stable(&mut rng, 10);
        assert_eq!(stable.len(), 10);

        let field = stable.select_field(&mut rng, MAX_FIELD_SIZE);
        assert_eq!(field.len(), MAX_FIELD_SIZE);
        let names: HashSet<&str> = field.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names.len(), MAX_FIELD_SIZE);

        let small = Stable::from_horses(vec![horse("Comet", 1.1)]);
        assert_eq!(small.select_field(&mut rng, MAX_FIELD_SIZE).len(), 1);
    }

    #[test]
    fn named_horses_are_always_entered() {
        let mut rng = StdRng::seed_from_u64(24);
        let stable = generate_random_stable(&mut rng, 8);
        let names: Vec<&str> = stable.horses().iter().map(|h| h.name.as_str()).collect();
        let backed = [names[6], names[7], names[7], "Unknown"];

        for _ in 0..20 {
            let field = stable.select_field_including(&mut rng, MAX_FIELD_SIZE, &backed);

            assert_eq!(field.len(), MAX_FIELD_SIZE);
            let entered: HashSet<&str> = field.iter().map(|h| h.name.as_str()).collect();
            assert_eq!(entered.len(), MAX_FIELD_SIZE);
            assert!(entered.contains(names[6]));
            assert!(entered.contains(names[7]));
            assert!(!entered.contains("Unknown"));
        }
    }

    #[test]
    fn named_horses_beyond_max_are_all_entered() {
        let mut rng = StdRng::seed_from_u64(25);
        let stable = generate_random_stable(&mut rng, 8);
        let names: Vec<&str> = stable.horses().iter().map(|h| h.name.as_str()).collect();

        let field = stable.select_field_including(&mut rng, 2, &names[..3]);

        assert_eq!(field.len(), 3);
    }

    #[test]
    fn random_horses_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(22);
        let stable = generate_random_stable(&mut rng, 50);

        for h in stable.horses() {
            assert!(h.speed >= 1.0 && h.speed < 1.5);
            for attr in [h.stamina, h.luck, h.experience] {
                assert!((0.0..1.0).contains(&attr));
            }
            assert_eq!(h.color.len(), 7);
            assert!(h.color.starts_with('#'));
        }
    }

    #[test]
    fn generated_names_are_unique() {
        let mut rng = StdRng::seed_from_u64(23);
        let stable = generate_random_stable(&mut rng, 3);
        let known = Stable::from_horses(vec![horse("Comet", 1.0)]);
        let more = generate_random_horse(&mut rng, &["Comet"], &known);

        assert_eq!(stable.len(), 3);
        assert_eq!(more.name, "Comet 2");
    }
}
