//! Enchantments and the static lookup table they are resolved against.
//!
//! Identifiers run from `-1` (the "no enchantment" sentinel) to `37`; the table
//! is indexed by `identifier + 1`.

use std::collections::BTreeMap;
use std::fmt;

use tracing::warn;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::item::ItemType;

/// Smallest valid identifier (the sentinel).
pub const MIN_IDENTIFIER: i32 = -1;
/// Largest valid identifier (Sweeping Edge).
pub const MAX_IDENTIFIER: i32 = 37;

/// Highest level accepted on an input enchantment.
pub const MAX_LEVEL: u32 = 255;

/// Surcharge per prior-work level `0..=6`. Level 6 is the "too expensive" marker.
pub const PRIOR_WORK_PENALTY: [u32; 7] = [0, 1, 3, 7, 15, 31, 100];

/// Static data for one enchantment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnchantmentInfo {
    pub name: &'static str,
    pub item_multiplier: u32,
    pub book_multiplier: u32,
    pub max_level: u32,
}

const fn info(
    name: &'static str,
    item_multiplier: u32,
    book_multiplier: u32,
    max_level: u32,
) -> EnchantmentInfo {
    EnchantmentInfo {
        name,
        item_multiplier,
        book_multiplier,
        max_level,
    }
}

const ENTRIES: [EnchantmentInfo; 39] = [
    info("None", 0, 0, 0),
    info("Aqua Affinity", 4, 2, 1),
    info("Bane of Arthropods", 2, 1, 5),
    info("Blast Protection", 4, 2, 4),
    info("Channeling", 8, 4, 1),
    info("Curse of Binding", 8, 4, 1),
    info("Curse of Vanishing", 8, 4, 1),
    info("Depth Strider", 4, 2, 3),
    info("Efficiency", 1, 1, 5),
    info("Feather Falling", 2, 1, 4),
    info("Fire Aspect", 4, 2, 2),
    info("Fire Protection", 2, 1, 4),
    info("Flame", 4, 2, 1),
    info("Fortune", 4, 2, 3),
    info("Frost Walker", 4, 2, 2),
    info("Impaling", 4, 2, 5),
    info("Infinity", 8, 4, 1),
    info("Knockback", 2, 1, 2),
    info("Looting", 4, 2, 3),
    info("Loyalty", 1, 1, 3),
    info("Luck of the Sea", 4, 2, 3),
    info("Lure", 4, 2, 3),
    info("Mending", 4, 2, 1),
    info("Multishot", 4, 2, 1),
    info("Piercing", 1, 1, 4),
    info("Power", 1, 1, 5),
    info("Projectile Protection", 2, 1, 4),
    info("Protection", 1, 1, 4),
    info("Punch", 4, 2, 2),
    info("Quick Charge", 2, 1, 3),
    info("Respiration", 4, 2, 3),
    info("Riptide", 4, 2, 3),
    info("Sharpness", 1, 1, 5),
    info("Silk Touch", 8, 4, 1),
    info("Smite", 2, 1, 5),
    info("Soul Speed", 8, 4, 3),
    info("Thorns", 8, 4, 3),
    info("Unbreaking", 2, 1, 3),
    info("Sweeping Edge", 4, 2, 3),
];

static STANDARD: EnchantmentTable = EnchantmentTable {
    entries: &ENTRIES,
    prior_work_penalty: PRIOR_WORK_PENALTY,
};

/// Validated enchantment identifier in `-1..=37`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnchantmentId(i8);

impl EnchantmentId {
    pub const SENTINEL: EnchantmentId = EnchantmentId(-1);

    /// Strict construction: identifiers outside `-1..=37` are rejected.
    pub fn new(raw: i32) -> DomainResult<Self> {
        if (MIN_IDENTIFIER..=MAX_IDENTIFIER).contains(&raw) {
            Ok(Self(raw as i8))
        } else {
            Err(DomainError::InvalidEnchantmentIdentifier(raw))
        }
    }

    /// Lenient construction: out-of-range identifiers become the sentinel.
    pub fn normalize(raw: i32) -> Self {
        Self::new(raw).unwrap_or_else(|_| {
            warn!(raw, "enchantment identifier out of range, normalized to sentinel");
            Self::SENTINEL
        })
    }

    pub fn raw(self) -> i32 {
        i32::from(self.0)
    }

    pub fn is_sentinel(self) -> bool {
        self == Self::SENTINEL
    }

    fn index(self) -> usize {
        (i32::from(self.0) + 1) as usize
    }
}

impl fmt::Display for EnchantmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only enchantment and prior-work tables.
///
/// One process-wide instance exists ([`EnchantmentTable::standard`]); callers
/// hand a reference to whatever needs it instead of reaching for a global.
#[derive(Debug)]
pub struct EnchantmentTable {
    entries: &'static [EnchantmentInfo; 39],
    prior_work_penalty: [u32; 7],
}

impl EnchantmentTable {
    pub fn standard() -> &'static EnchantmentTable {
        &STANDARD
    }

    pub fn info(&self, id: EnchantmentId) -> &EnchantmentInfo {
        &self.entries[id.index()]
    }

    /// Multiplier applied when an enchantment arrives on a sacrifice of `item_type`.
    pub fn multiplier(&self, id: EnchantmentId, item_type: ItemType) -> u32 {
        let info = self.info(id);
        match item_type {
            ItemType::Book => info.book_multiplier,
            ItemType::Item => info.item_multiplier,
        }
    }

    pub fn prior_work_penalty(&self, level: PriorWork) -> u32 {
        self.prior_work_penalty[usize::from(level.value())]
    }

    /// Resolve a display name, ignoring case and `_`/`-` separators.
    pub fn id_by_name(&self, name: &str) -> DomainResult<EnchantmentId> {
        let wanted = normalize_name(name);
        self.iter()
            .find(|(_, info)| normalize_name(info.name) == wanted)
            .map(|(id, _)| id)
            .ok_or_else(|| DomainError::UnknownEnchantment(name.to_string()))
    }

    /// All entries, sentinel first.
    pub fn iter(&self) -> impl Iterator<Item = (EnchantmentId, &EnchantmentInfo)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, info)| (EnchantmentId(i as i8 - 1), info))
    }
}

fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Prior-work level in `0..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PriorWork(u8);

impl PriorWork {
    pub const MAX: u8 = 6;
    pub const ZERO: PriorWork = PriorWork(0);

    pub fn new(level: u8) -> DomainResult<Self> {
        if level <= Self::MAX {
            Ok(Self(level))
        } else {
            Err(DomainError::InvalidPriorWork(level))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Level of a merge result: `min(max(left, right), 5) + 1`.
    pub fn after_merge(left: PriorWork, right: PriorWork) -> PriorWork {
        PriorWork(left.0.max(right.0).min(Self::MAX - 1) + 1)
    }
}

impl fmt::Display for PriorWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One enchantment at a level, with its table data resolved at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enchantment {
    pub id: EnchantmentId,
    pub name: &'static str,
    pub level: u32,
    /// Must survive every merge
    pub keep: bool,
    pub item_multiplier: u32,
    pub book_multiplier: u32,
    pub max_level: u32,
}

impl Enchantment {
    pub fn new(
        table: &EnchantmentTable,
        id: EnchantmentId,
        level: u32,
        keep: bool,
    ) -> DomainResult<Self> {
        if level == 0 || level > MAX_LEVEL {
            return Err(DomainError::InvalidLevel {
                enchantment: table.info(id).name.to_string(),
                level,
            });
        }
        let info = table.info(id);
        Ok(Self {
            id,
            name: info.name,
            level,
            keep,
            item_multiplier: info.item_multiplier,
            book_multiplier: info.book_multiplier,
            max_level: info.max_level,
        })
    }

    pub fn multiplier(&self, item_type: ItemType) -> u32 {
        match item_type {
            ItemType::Book => self.book_multiplier,
            ItemType::Item => self.item_multiplier,
        }
    }

    /// Same enchantment at another level.
    pub fn with_level(&self, level: u32) -> Self {
        Self {
            level,
            ..self.clone()
        }
    }
}

impl fmt::Display for Enchantment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, roman(self.level))?;
        if self.keep {
            write!(f, " (keep)")?;
        }
        Ok(())
    }
}

fn roman(level: u32) -> String {
    const NUMERALS: [&str; 10] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];
    match level {
        1..=10 => NUMERALS[(level - 1) as usize].to_string(),
        _ => level.to_string(),
    }
}

/// Enchantments of one item, unique by identifier and ordered by it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnchantmentSet {
    entries: BTreeMap<EnchantmentId, Enchantment>,
}

impl EnchantmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from input data; a repeated identifier is an error.
    pub fn from_unique(enchantments: impl IntoIterator<Item = Enchantment>) -> DomainResult<Self> {
        let mut set = Self::new();
        for enchantment in enchantments {
            if set.contains(enchantment.id) {
                return Err(DomainError::DuplicateEnchantment(enchantment.name.to_string()));
            }
            set.insert(enchantment);
        }
        Ok(set)
    }

    /// Insert or replace the entry for this identifier. Sentinels are ignored.
    pub fn insert(&mut self, enchantment: Enchantment) {
        if enchantment.id.is_sentinel() {
            return;
        }
        self.entries.insert(enchantment.id, enchantment);
    }

    pub fn get(&self, id: EnchantmentId) -> Option<&Enchantment> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: EnchantmentId) -> bool {
        self.entries.contains_key(&id)
    }

    /// True if `enchantment` is present at its level or higher.
    pub fn covers(&self, enchantment: &Enchantment) -> bool {
        self.get(enchantment.id)
            .is_some_and(|e| e.level >= enchantment.level)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enchantment> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for EnchantmentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        let parts: Vec<String> = self.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_standard_table_when_iterating_then_has_sentinel_and_38_entries() {
        let table = EnchantmentTable::standard();
        let entries: Vec<_> = table.iter().collect();
        assert_eq!(entries.len(), 39);
        assert_eq!(entries[0].0, EnchantmentId::SENTINEL);
        assert_eq!(entries[0].1.book_multiplier, 0);
        assert_eq!(entries[38].0.raw(), 37);
        assert_eq!(entries[38].1.name, "Sweeping Edge");
    }

    #[test]
    fn given_name_variants_when_looking_up_then_resolves_same_id() {
        let table = EnchantmentTable::standard();
        let a = table.id_by_name("Bane of Arthropods").unwrap();
        let b = table.id_by_name("bane_of_arthropods").unwrap();
        let c = table.id_by_name("  BANE-OF-ARTHROPODS ").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert!(table.id_by_name("bane").is_err());
    }

    #[test]
    fn given_out_of_range_id_when_strict_then_errors() {
        assert!(matches!(
            EnchantmentId::new(38),
            Err(DomainError::InvalidEnchantmentIdentifier(38))
        ));
        assert!(EnchantmentId::new(-2).is_err());
        assert_eq!(EnchantmentId::new(-1).unwrap(), EnchantmentId::SENTINEL);
    }

    #[test]
    fn given_out_of_range_id_when_normalizing_then_sentinel() {
        assert_eq!(EnchantmentId::normalize(99), EnchantmentId::SENTINEL);
        assert_eq!(EnchantmentId::normalize(5).raw(), 5);
    }

    #[test]
    fn given_levels_when_merging_prior_work_then_caps_before_increment() {
        let p = |v| PriorWork::new(v).unwrap();
        assert_eq!(PriorWork::after_merge(p(0), p(0)), p(1));
        assert_eq!(PriorWork::after_merge(p(2), p(1)), p(3));
        assert_eq!(PriorWork::after_merge(p(5), p(0)), p(6));
        assert_eq!(PriorWork::after_merge(p(6), p(6)), p(6));
        assert!(PriorWork::new(7).is_err());
    }

    #[test]
    fn given_penalty_table_when_indexed_then_matches_anvil_values() {
        let table = EnchantmentTable::standard();
        let penalties: Vec<u32> = (0..=6)
            .map(|l| table.prior_work_penalty(PriorWork::new(l).unwrap()))
            .collect();
        assert_eq!(penalties, vec![0, 1, 3, 7, 15, 31, 100]);
    }

    #[test]
    fn given_zero_level_when_creating_enchantment_then_errors() {
        let table = EnchantmentTable::standard();
        let id = table.id_by_name("sharpness").unwrap();
        assert!(Enchantment::new(table, id, 0, false).is_err());
    }

    #[test]
    fn given_level_above_cap_when_creating_enchantment_then_errors() {
        let table = EnchantmentTable::standard();
        let id = table.id_by_name("infinity").unwrap();
        assert!(Enchantment::new(table, id, MAX_LEVEL, false).is_ok());
        assert!(matches!(
            Enchantment::new(table, id, 536_870_912, false),
            Err(DomainError::InvalidLevel { level: 536_870_912, .. })
        ));
    }

    #[test]
    fn given_duplicate_ids_when_building_set_then_errors() {
        let table = EnchantmentTable::standard();
        let id = table.id_by_name("sharpness").unwrap();
        let e = Enchantment::new(table, id, 1, false).unwrap();
        let result = EnchantmentSet::from_unique(vec![e.clone(), e.with_level(2)]);
        assert!(matches!(result, Err(DomainError::DuplicateEnchantment(_))));
    }

    #[test]
    fn given_set_when_displayed_then_lists_roman_levels() {
        let table = EnchantmentTable::standard();
        let sharp = table.id_by_name("sharpness").unwrap();
        let unb = table.id_by_name("unbreaking").unwrap();
        let set = EnchantmentSet::from_unique(vec![
            Enchantment::new(table, unb, 3, true).unwrap(),
            Enchantment::new(table, sharp, 5, false).unwrap(),
        ])
        .unwrap();
        assert_eq!(set.to_string(), "Sharpness V, Unbreaking III (keep)");
    }
}
