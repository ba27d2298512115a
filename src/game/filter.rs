//! Highlight filtering and display options.

use crate::game::board::CardInstance;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub type_tag: Option<String>,
    pub region_tag: Option<String>,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        self.type_tag.is_some() || self.region_tag.is_some()
    }
}

/// Normalize a filter selection: empty or "none" clears it.
pub fn parse_tag(value: &str) -> Option<String> {
    let v = value.trim();
    if v.is_empty() || v.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(v.to_string())
    }
}

/// Whether a card should be highlighted. Every active filter must match;
/// placeholder cards carry no tags and never match an active filter.
pub fn matches_filter(card: &CardInstance, filter: &FilterState) -> bool {
    if !filter.is_active() {
        return false;
    }
    let type_ok = filter
        .type_tag
        .as_ref()
        .is_none_or(|tag| card.types.iter().any(|t| t == tag));
    let region_ok = filter
        .region_tag
        .as_ref()
        .is_none_or(|tag| card.regions.iter().any(|r| r == tag));
    type_ok && region_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Card, Era, Side};
    use crate::game::board::InstanceId;

    fn instance() -> CardInstance {
        CardInstance::from_card(
            InstanceId(1),
            &Card {
                name: "Decolonization".to_string(),
                short_name: "Decol".to_string(),
                ops_value: 2.0,
                side: Side::Ussr,
                era: Era::Early,
                types: vec!["coup".to_string()],
                regions: vec!["Africa".to_string(), "Asia".to_string()],
                removable: false,
            },
        )
    }

    #[test]
    fn inactive_filter_highlights_nothing() {
        assert!(!matches_filter(&instance(), &FilterState::default()));
    }

    #[test]
    fn filters_combine() {
        let card = instance();
        let region_only = FilterState {
            type_tag: None,
            region_tag: Some("Asia".to_string()),
        };
        assert!(matches_filter(&card, &region_only));

        let both = FilterState {
            type_tag: Some("scoring".to_string()),
            region_tag: Some("Asia".to_string()),
        };
        assert!(!matches_filter(&card, &both));
    }

    #[test]
    fn placeholders_never_match() {
        let filter = FilterState {
            type_tag: Some("coup".to_string()),
            region_tag: None,
        };
        assert!(!matches_filter(&CardInstance::placeholder(InstanceId(2)), &filter));
    }

    #[test]
    fn none_clears_selection() {
        assert_eq!(parse_tag("none"), None);
        assert_eq!(parse_tag(""), None);
        assert_eq!(parse_tag(" Europe "), Some("Europe".to_string()));
    }
}
