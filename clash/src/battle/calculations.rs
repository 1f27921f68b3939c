use std::ops::Div;

use clash_data::{
    Fraction,
    NatureData,
    Stat,
    StatTable,
};

/// Calculates a monster's actual stats from its form's base stats, genes, effort, and level.
pub fn calculate_monster_stats(
    base_stats: &StatTable,
    level: u8,
    genes: &StatTable,
    effort: &StatTable,
    nature: &NatureData,
) -> StatTable {
    let level = level as u32;
    let mut stats = StatTable::default();
    for (stat, value) in base_stats {
        let value = 2 * value as u32 + genes.get(stat) as u32 + effort.get(stat) as u32 / 4;
        let value = value * level / 100;
        let value = if stat == Stat::HP {
            value + level + 10
        } else {
            value + 5
        };
        stats.set(stat, value.min(u16::MAX as u32) as u16);
    }
    apply_nature_to_stats(stats, nature)
}

/// Applies the given nature to the stat table, returning the new stat table.
///
/// A nature that raises and lowers the same stat is neutral. HP is never affected.
pub fn apply_nature_to_stats(mut stats: StatTable, nature: &NatureData) -> StatTable {
    let (increased, decreased) = match (nature.increased, nature.decreased) {
        (Some(increased), Some(decreased)) if increased == decreased => return stats,
        pair => pair,
    };

    if let Some(stat) = increased.filter(|stat| *stat != Stat::HP) {
        let value = stats.get(stat) as u32;
        let value = value + (value * 10).div(100);
        stats.set(stat, value.min(u16::MAX as u32) as u16);
    }

    if let Some(stat) = decreased.filter(|stat| *stat != Stat::HP) {
        let value = stats.get(stat) as u32;
        let value = value - num::Integer::div_ceil(&(value * 10), &100);
        stats.set(stat, value as u16);
    }

    stats
}

/// The multiplier for a stat stage.
///
/// Positive stages grow the numerator and negative stages grow the denominator, starting from
/// `base:base`.
pub fn stage_ratio(stage: i8, base: u64) -> Fraction {
    let magnitude = stage.unsigned_abs() as u64;
    if stage >= 0 {
        Fraction::new(base + magnitude, base)
    } else {
        Fraction::new(base, base + magnitude)
    }
}

/// The chance of a critical hit at the given stage.
///
/// Stage 0 never lands a critical hit.
pub fn critical_hit_chance(stage: u8) -> Fraction {
    match stage {
        0 => Fraction::new(0, 1),
        1 => Fraction::new(1, 16),
        2 => Fraction::new(1, 8),
        3 => Fraction::new(1, 4),
        4 => Fraction::new(1, 3),
        _ => Fraction::new(1, 2),
    }
}

/// Base damage of a hit, before any modifiers.
///
/// Integer arithmetic truncates at every step.
pub fn base_damage(level: u8, power: u32, attack: u32, defense: u32) -> u32 {
    let level = level as u64;
    let damage = (level * 2 / 5 + 2) * power as u64 * attack as u64 / 50 / defense.max(1) as u64;
    damage.min(u32::MAX as u64) as u32
}
