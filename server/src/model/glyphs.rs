//! The one lookup table for display glyphs. Tickets, chat messages, reports
//! and the categories endpoint all read from here.

use strum::IntoEnumIterator;

use super::{Category, Priority};

impl Category {
    pub fn glyph(self) -> &'static str {
        match self {
            Category::Electrical => "⚡",
            Category::Plumbing => "🚰",
            Category::ItSupport => "💻",
            Category::Hvac => "🌡️",
            Category::GeneralInquiry => "📋",
        }
    }
}

impl Priority {
    pub fn glyph(self) -> &'static str {
        match self {
            Priority::High => "🔴",
            Priority::Medium => "🟡",
            Priority::Low => "🟢",
        }
    }
}

/// Every category with its glyph, in declaration order.
pub fn category_glyphs() -> impl Iterator<Item = (Category, &'static str)> {
    Category::iter().map(|category| (category, category.glyph()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_its_own_glyph() {
        assert_eq!(Category::Electrical.glyph(), "⚡");
        assert_eq!(Category::Plumbing.glyph(), "🚰");
        assert_eq!(Category::ItSupport.glyph(), "💻");
        assert_eq!(Category::Hvac.glyph(), "🌡️");
        assert_eq!(Category::GeneralInquiry.glyph(), "📋");
        let glyphs: Vec<_> = category_glyphs().collect();
        assert_eq!(glyphs.len(), 5);
        assert_eq!(glyphs[0], (Category::Electrical, "⚡"));
        assert_eq!(glyphs[4], (Category::GeneralInquiry, "📋"));
    }

    #[test]
    fn test_priority_glyphs() {
        assert_eq!(Priority::High.glyph(), "🔴");
        assert_eq!(Priority::Medium.glyph(), "🟡");
        assert_eq!(Priority::Low.glyph(), "🟢");
    }
}
