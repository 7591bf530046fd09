//! Dashboard navigation cards

/// Where a dashboard card leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTarget {
    Posts,
    Profile,
    Settings,
    Notifications,
}

/// A navigation card shown on the dashboard
#[derive(Debug, Clone, Copy)]
pub struct DashboardCard {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub target: CardTarget,
}

impl DashboardCard {
    /// Whether the card opens a screen in this build
    pub fn is_available(&self) -> bool {
        self.target == CardTarget::Posts
    }
}

/// Static list of dashboard cards
pub static CARDS: [DashboardCard; 4] = [
    DashboardCard {
        title: "Posts",
        subtitle: "View all posts",
        target: CardTarget::Posts,
    },
    DashboardCard {
        title: "Profile",
        subtitle: "Manage your profile",
        target: CardTarget::Profile,
    },
    DashboardCard {
        title: "Settings",
        subtitle: "App preferences",
        target: CardTarget::Settings,
    },
    DashboardCard {
        title: "Notifications",
        subtitle: "Your alerts",
        target: CardTarget::Notifications,
    },
];

/// Returns all dashboard cards in display order
pub fn all_cards() -> &'static [DashboardCard] {
    &CARDS
}

/// Display name used on the dashboard header
pub const DEFAULT_USER_NAME: &str = "John Doe";

/// Uppercased first letter of each word, for the avatar badge
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_cards_returns_4() {
        assert_eq!(all_cards().len(), 4);
    }

    #[test]
    fn test_posts_card_is_first_and_available() {
        let first = &all_cards()[0];
        assert_eq!(first.title, "Posts");
        assert!(first.is_available());
    }

    #[test]
    fn test_other_cards_are_unavailable() {
        assert_eq!(all_cards().iter().filter(|c| c.is_available()).count(), 1);
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("John Doe"), "JD");
        assert_eq!(initials("ada  lovelace"), "AL");
        assert_eq!(initials(""), "");
    }
}
