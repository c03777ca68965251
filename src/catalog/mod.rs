//! Creator discovery: category filter and free-text search over creator cards.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ui::{ElementId, UiTree};

pub const ALL_CATEGORIES: &str = "all";
pub const SUBSCRIBE_REDIRECT_MESSAGE: &str = "Redirecting to subscription page...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorCard {
    pub name: String,
    /// Short description line under the name, e.g. "Digital Artist".
    pub kind: String,
    pub category: String,
}

impl CreatorCard {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            category: category.into(),
        }
    }

    pub fn element_id(&self) -> ElementId {
        let slug: String = self
            .name
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() {
                    ch.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect();
        ElementId::new(format!("creator-{slug}"))
    }

    fn matches_term(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.kind.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatorCatalog {
    cards: Vec<CreatorCard>,
}

impl CreatorCatalog {
    pub fn new(cards: Vec<CreatorCard>) -> Self {
        Self { cards }
    }

    /// Cards shown on the discovery page out of the box.
    pub fn featured() -> Self {
        Self::new(vec![
            CreatorCard::new("Sophia Chen", "Digital Artist", "art"),
            CreatorCard::new("Marcus Webb", "Indie Musician", "music"),
            CreatorCard::new("Elena Rossi", "Fitness Coach", "fitness"),
            CreatorCard::new("James Park", "Game Developer", "gaming"),
            CreatorCard::new("Aisha Patel", "Cooking Instructor", "cooking"),
            CreatorCard::new("Leo Martins", "Photography Mentor", "art"),
        ])
    }

    pub fn cards(&self) -> &[CreatorCard] {
        &self.cards
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for card in &self.cards {
            if !seen.contains(&card.category.as_str()) {
                seen.push(&card.category);
            }
        }
        seen
    }

    /// Card whose name equals `name`, ignoring case and surrounding spaces.
    pub fn find(&self, name: &str) -> Option<&CreatorCard> {
        let name = name.trim();
        self.cards
            .iter()
            .find(|card| card.name.eq_ignore_ascii_case(name))
    }

    /// `all` keeps every card; anything else must equal the card's category.
    pub fn filter(&self, category: &str) -> Vec<&CreatorCard> {
        let matches: Vec<&CreatorCard> = self
            .cards
            .iter()
            .filter(|card| category == ALL_CATEGORIES || card.category == category)
            .collect();
        debug!(category, shown = matches.len(), "catalog filtered");
        matches
    }

    /// Case-insensitive substring match on name or kind. An empty term keeps every card.
    pub fn search(&self, term: &str) -> Vec<&CreatorCard> {
        let needle = term.to_lowercase();
        let matches: Vec<&CreatorCard> = self
            .cards
            .iter()
            .filter(|card| card.matches_term(&needle))
            .collect();
        debug!(term, shown = matches.len(), "catalog searched");
        matches
    }

    /// Shows the cards in `visible` and hides the rest. Cards without an element are skipped.
    pub fn apply(&self, ui: &dyn UiTree, visible: &[&CreatorCard]) {
        for card in &self.cards {
            let shown = visible.iter().any(|candidate| *candidate == card);
            ui.set_visible(&card.element_id(), shown);
        }
    }
}
