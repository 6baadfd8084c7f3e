//! Give-enchanted-book action.

use enchantcraft_core::{EnchantmentHandle, ItemFlags, ItemKind, ItemStack, TextLine};
use serde::{Deserialize, Serialize};

use crate::definition::EnchantmentDefinition;

const ROMAN: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Roman numeral for `value`. Zero renders as an empty string.
pub fn to_roman(mut value: u32) -> String {
    let mut out = String::new();
    for (step, numeral) in ROMAN {
        while value >= step {
            out.push_str(numeral);
            value -= step;
        }
    }
    out
}

/// Hand a player enchanted books carrying a custom enchantment.
///
/// Text fields accept `{enchantment}`, `{enchantment_lore}` and `{level}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiveEnchantmentBook {
    /// Id of the enchantment definition.
    pub enchantment: String,
    /// Stored level; not clamped to the maximum.
    #[serde(default = "one_u8")]
    pub level: u8,
    /// Number of books.
    #[serde(default = "one_u32")]
    pub amount: u32,
    /// Book name.
    #[serde(default = "default_book_name")]
    pub book_name: String,
    /// Lore lines styled like the enchantment name.
    #[serde(default = "default_enchantment_lore")]
    pub enchantment_lore: Vec<String>,
    /// Extra plain lore lines appended after the enchantment lore.
    #[serde(default)]
    pub book_lore: Vec<String>,
}

fn one_u8() -> u8 {
    1
}

fn one_u32() -> u32 {
    1
}

fn default_book_name() -> String {
    "{enchantment} {level}".to_string()
}

fn default_enchantment_lore() -> Vec<String> {
    vec!["{enchantment_lore} {level}".to_string()]
}

impl GiveEnchantmentBook {
    /// Action with default name and lore.
    pub fn new(enchantment: impl Into<String>, level: u8) -> Self {
        Self {
            enchantment: enchantment.into(),
            level,
            amount: 1,
            book_name: default_book_name(),
            enchantment_lore: default_enchantment_lore(),
            book_lore: Vec::new(),
        }
    }

    fn render(&self, template: &str, def: &EnchantmentDefinition) -> String {
        let name = def.description().text;
        let lore = if def.enchantment_lore.trim().is_empty() {
            name.clone()
        } else {
            def.enchantment_lore.clone()
        };
        template
            .replace("{enchantment_lore}", &lore)
            .replace("{enchantment}", &name)
            .replace("{level}", &to_roman(u32::from(self.level)))
    }

    /// Build the book stack for an already bound enchantment.
    pub fn build(&self, def: &EnchantmentDefinition, handle: &EnchantmentHandle) -> ItemStack {
        let mut book = ItemStack::new(ItemKind::enchanted_book(), self.amount);
        book.add_stored_enchantment(handle.id, self.level, def.max_level, true);
        book.flags |= ItemFlags::HIDE_STORED_ENCHANTS;
        book.display_name = Some(TextLine::plain(self.render(&self.book_name, def)));

        let lore: Vec<TextLine> = self
            .enchantment_lore
            .iter()
            .map(|line| {
                TextLine::plain(self.render(line, def))
                    .color_if_absent(def.name_color)
                    .italic(false)
            })
            .chain(
                self.book_lore
                    .iter()
                    .map(|line| TextLine::plain(self.render(line, def))),
            )
            .collect();
        if !lore.is_empty() {
            book.lore = lore;
        }
        book
    }
}
