// Weapon Effects Module: static catalog + rarity-weighted selection (§4.4).

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    SpeedBoost,
    Shield,
    Ghost,
    DoubleScore,
    FoodBomb,
    Teleport,
    Laser,
    Shrink,
    Freeze,
    Magnet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

#[derive(Debug, Clone, Copy)]
pub struct WeaponEntry {
    pub name: &'static str,
    pub weapon_type: WeaponType,
    pub description: &'static str,
    pub duration: Duration,
    pub color: &'static str,
    pub icon: &'static str,
    pub rarity: Rarity,
}

/// Rarity weights from §4.4: 50/30/15/5 for common/uncommon/rare/legendary.
const RARITY_WEIGHTS: [(Rarity, u32); 4] = [
    (Rarity::Common, 50),
    (Rarity::Uncommon, 30),
    (Rarity::Rare, 15),
    (Rarity::Legendary, 5),
];

const CATALOG: [WeaponEntry; 10] = [
    WeaponEntry {
        name: "Speed Boost",
        weapon_type: WeaponType::SpeedBoost,
        description: "Temporarily increases movement speed",
        duration: Duration::from_millis(8_000),
        color: "#facc15",
        icon: "bolt",
        rarity: Rarity::Common,
    },
    WeaponEntry {
        name: "Shield",
        weapon_type: WeaponType::Shield,
        description: "Grants temporary invincibility",
        duration: Duration::from_millis(5_000),
        color: "#60a5fa",
        icon: "shield",
        rarity: Rarity::Common,
    },
    WeaponEntry {
        name: "Magnet",
        weapon_type: WeaponType::Magnet,
        description: "Reserved: pulls nearby food toward the snake",
        duration: Duration::from_millis(5_000),
        color: "#f472b6",
        icon: "magnet",
        rarity: Rarity::Common,
    },
    WeaponEntry {
        name: "Ghost",
        weapon_type: WeaponType::Ghost,
        description: "Phase through other snakes and walls",
        duration: Duration::from_millis(6_000),
        color: "#a78bfa",
        icon: "ghost",
        rarity: Rarity::Uncommon,
    },
    WeaponEntry {
        name: "Shrink",
        weapon_type: WeaponType::Shrink,
        description: "Reserved: shortens the snake's body",
        duration: Duration::from_millis(1),
        color: "#34d399",
        icon: "shrink",
        rarity: Rarity::Uncommon,
    },
    WeaponEntry {
        name: "Freeze",
        weapon_type: WeaponType::Freeze,
        description: "Reserved: briefly freezes nearby opponents",
        duration: Duration::from_millis(3_000),
        color: "#22d3ee",
        icon: "snowflake",
        rarity: Rarity::Uncommon,
    },
    WeaponEntry {
        name: "Double Score",
        weapon_type: WeaponType::DoubleScore,
        description: "Doubles points earned from food",
        duration: Duration::from_millis(10_000),
        color: "#fb923c",
        icon: "star",
        rarity: Rarity::Rare,
    },
    WeaponEntry {
        name: "Food Bomb",
        weapon_type: WeaponType::FoodBomb,
        description: "Scatters a burst of food around the head",
        duration: Duration::from_millis(1),
        color: "#f87171",
        icon: "bomb",
        rarity: Rarity::Rare,
    },
    WeaponEntry {
        name: "Teleport",
        weapon_type: WeaponType::Teleport,
        description: "Instantly relocates the head to a free cell",
        duration: Duration::from_millis(1),
        color: "#c084fc",
        icon: "teleport",
        rarity: Rarity::Legendary,
    },
    WeaponEntry {
        name: "Laser",
        weapon_type: WeaponType::Laser,
        description: "Reserved: fires a beam along the current heading",
        duration: Duration::from_millis(1),
        color: "#ef4444",
        icon: "laser",
        rarity: Rarity::Legendary,
    },
];

pub struct WeaponCatalog;

impl WeaponCatalog {
    pub fn entry(weapon_type: WeaponType) -> &'static WeaponEntry {
        CATALOG
            .iter()
            .find(|w| w.weapon_type == weapon_type)
            .expect("catalog covers every WeaponType variant")
    }

    pub fn of_rarity(rarity: Rarity) -> impl Iterator<Item = &'static WeaponEntry> {
        CATALOG.iter().filter(move |w| w.rarity == rarity)
    }

    /// Picks a rarity by weight, then a weapon uniformly within that rarity.
    pub fn random(rng: &mut impl Rng) -> &'static WeaponEntry {
        let total: u32 = RARITY_WEIGHTS.iter().map(|(_, w)| w).sum();
        let mut roll = rng.gen_range(0..total);
        let mut chosen = Rarity::Common;
        for (rarity, weight) in RARITY_WEIGHTS {
            if roll < weight {
                chosen = rarity;
                break;
            }
            roll -= weight;
        }

        let candidates: Vec<&WeaponEntry> = Self::of_rarity(chosen).collect();
        candidates[rng.gen_range(0..candidates.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn catalog_covers_every_weapon_type() {
        for wt in [
            WeaponType::SpeedBoost,
            WeaponType::Shield,
            WeaponType::Ghost,
            WeaponType::DoubleScore,
            WeaponType::FoodBomb,
            WeaponType::Teleport,
            WeaponType::Laser,
            WeaponType::Shrink,
            WeaponType::Freeze,
            WeaponType::Magnet,
        ] {
            assert_eq!(WeaponCatalog::entry(wt).weapon_type, wt);
        }
    }

    #[test]
    fn random_weapon_is_always_in_catalog() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let entry = WeaponCatalog::random(&mut rng);
            assert_eq!(WeaponCatalog::entry(entry.weapon_type).name, entry.name);
        }
    }
}
