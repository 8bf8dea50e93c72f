//! Item file parsing
//!
//! ```toml
//! [[items]]
//! name = "Diamond Sword"
//! type = "item"
//! prior_work = 0
//! enchantments = [{ id = "sharpness", level = 3, keep = true }, { id = 36, level = 3 }]
//! ```

use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    DomainResult, Enchantment, EnchantmentId, EnchantmentSet, EnchantmentTable, Item, ItemType,
    PriorWork,
};

/// Top-level layout of an item file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemFile {
    pub items: Vec<ItemSpec>,
}

/// One starting item as written by the user.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub prior_work: Option<u8>,
    #[serde(default)]
    pub enchantments: Vec<EnchantmentSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnchantmentSpec {
    pub id: EnchantmentRef,
    pub level: u32,
    #[serde(default)]
    pub keep: bool,
}

/// Table name or numeric identifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EnchantmentRef {
    Id(i32),
    Name(String),
}

impl EnchantmentRef {
    fn resolve(&self, table: &EnchantmentTable, strict: bool) -> DomainResult<EnchantmentId> {
        match self {
            EnchantmentRef::Name(name) => table.id_by_name(name),
            EnchantmentRef::Id(raw) if strict => EnchantmentId::new(*raw),
            EnchantmentRef::Id(raw) => Ok(EnchantmentId::normalize(*raw)),
        }
    }
}

impl ItemSpec {
    /// Resolve against the table.
    ///
    /// With `strict` off, out-of-range identifiers become the sentinel and are
    /// left out of the item's enchantment set.
    pub fn to_item(
        &self,
        table: &EnchantmentTable,
        strict: bool,
        default_prior_work: u8,
    ) -> DomainResult<Item> {
        let mut enchantments = Vec::with_capacity(self.enchantments.len());
        for spec in &self.enchantments {
            let id = spec.id.resolve(table, strict)?;
            if id.is_sentinel() {
                warn!(item = %self.name, id = ?spec.id, "enchantment without effect dropped");
                continue;
            }
            enchantments.push(Enchantment::new(table, id, spec.level, spec.keep)?);
        }
        let prior_work = PriorWork::new(self.prior_work.unwrap_or(default_prior_work))?;
        Ok(Item::leaf(
            self.name.clone(),
            self.item_type,
            EnchantmentSet::from_unique(enchantments)?,
            prior_work,
        ))
    }
}

/// Parse an item file into leaf items, in file order.
pub fn parse_items(
    content: &str,
    table: &EnchantmentTable,
    strict: bool,
    default_prior_work: u8,
) -> ApplicationResult<Vec<Item>> {
    let file: ItemFile = toml::from_str(content).map_err(|e| ApplicationError::Input {
        message: e.to_string(),
    })?;
    let items = file
        .items
        .iter()
        .map(|spec| spec.to_item(table, strict, default_prior_work))
        .collect::<DomainResult<Vec<_>>>()?;
    debug!(count = items.len(), "items parsed");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    const SAMPLE: &str = r#"
[[items]]
name = "Diamond Sword"
type = "item"
enchantments = [{ id = "sharpness", level = 3, keep = true }]

[[items]]
name = "Old book"
type = "book"
prior_work = 2
enchantments = [{ id = 36, level = 3 }, { id = "Looting", level = 2 }]
"#;

    #[test]
    fn given_sample_file_when_parsing_then_items_resolved_in_order() {
        let table = EnchantmentTable::standard();
        let items = parse_items(SAMPLE, table, true, 0).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Diamond Sword");
        assert_eq!(items[0].item_type, ItemType::Item);
        assert_eq!(items[0].prior_work, PriorWork::ZERO);
        let sharpness = table.id_by_name("sharpness").unwrap();
        assert!(items[0].enchantments.get(sharpness).unwrap().keep);

        assert_eq!(items[1].item_type, ItemType::Book);
        assert_eq!(items[1].prior_work.value(), 2);
        assert_eq!(items[1].enchantments.len(), 2);
    }

    #[test]
    fn given_default_prior_work_when_item_omits_it_then_default_applies() {
        let items = parse_items(SAMPLE, EnchantmentTable::standard(), true, 1).unwrap();
        assert_eq!(items[0].prior_work.value(), 1);
        assert_eq!(items[1].prior_work.value(), 2);
    }

    #[test]
    fn given_out_of_range_id_when_strict_then_errors() {
        let content = r#"
[[items]]
name = "Book"
type = "book"
enchantments = [{ id = 40, level = 1 }]
"#;
        let result = parse_items(content, EnchantmentTable::standard(), true, 0);
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(
                DomainError::InvalidEnchantmentIdentifier(40)
            ))
        ));
    }

    #[test]
    fn given_out_of_range_id_when_lenient_then_dropped() {
        let content = r#"
[[items]]
name = "Book"
type = "book"
enchantments = [{ id = 40, level = 1 }, { id = "mending", level = 1 }]
"#;
        let items = parse_items(content, EnchantmentTable::standard(), false, 0).unwrap();
        assert_eq!(items[0].enchantments.len(), 1);
    }

    #[test]
    fn given_absurd_level_when_parsing_then_invalid_level() {
        let content = r#"
[[items]]
name = "Bow"
type = "item"

[[items]]
name = "Other bow"
type = "item"
enchantments = [{ id = "infinity", level = 536870912 }]
"#;
        let result = parse_items(content, EnchantmentTable::standard(), true, 0);
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::InvalidLevel {
                level: 536_870_912,
                ..
            }))
        ));
    }

    #[test]
    fn given_unknown_field_when_parsing_then_input_error() {
        let content = r#"
[[items]]
name = "Book"
type = "book"
colour = "red"
"#;
        let result = parse_items(content, EnchantmentTable::standard(), true, 0);
        assert!(matches!(result, Err(ApplicationError::Input { .. })));
    }

    #[test]
    fn given_bad_item_type_when_parsing_then_input_error() {
        let content = r#"
[[items]]
name = "Shield"
type = "shield"
"#;
        let result = parse_items(content, EnchantmentTable::standard(), true, 0);
        assert!(matches!(result, Err(ApplicationError::Input { .. })));
    }
}
