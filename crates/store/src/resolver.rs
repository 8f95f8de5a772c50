//! Turning loose user references ("scene 3", "the rooftop one") into scenes.

use cutify_core::model::Scene;

/// How a free-text scene reference should be matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneQuery {
    /// A sequence number, or failing that a scene id
    Number(i64),
    /// Case-insensitive substring of the title
    Title(String),
}

impl SceneQuery {
    /// Strip every "scene" (any case) and surrounding whitespace; digits-only
    /// remainders are numbers, anything else matches titles using the
    /// query as given.
    pub fn parse(query: &str) -> Self {
        let stripped = query.to_lowercase().replace("scene", "");
        let stripped = stripped.trim();

        if !stripped.is_empty() && stripped.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = stripped.parse() {
                return Self::Number(n);
            }
        }
        Self::Title(query.trim().to_string())
    }

    /// Pick a scene out of `scenes`, which must be in sequence order.
    pub fn pick<'a>(&self, scenes: &'a [Scene]) -> Option<&'a Scene> {
        match self {
            Self::Number(n) => scenes
                .iter()
                .find(|s| s.sequence_order == *n)
                .or_else(|| scenes.iter().find(|s| s.id == *n)),
            Self::Title(needle) => {
                let needle = needle.to_lowercase();
                if needle.is_empty() {
                    return None;
                }
                scenes.iter().find(|s| s.title.to_lowercase().contains(&needle))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cutify_core::model::SceneStatus;

    fn scene(id: i64, order: i64, title: &str) -> Scene {
        Scene {
            id,
            project_id: 1,
            sequence_order: order,
            title: title.into(),
            summary: String::new(),
            estimated_duration: None,
            script: None,
            status: SceneStatus::Pending,
            storyboard_url: None,
            location_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn parse_numbers() {
        assert_eq!(SceneQuery::parse("3"), SceneQuery::Number(3));
        assert_eq!(SceneQuery::parse("Scene 3"), SceneQuery::Number(3));
        assert_eq!(SceneQuery::parse("  SCENE12 "), SceneQuery::Number(12));
    }

    #[test]
    fn parse_titles_keep_original_query() {
        assert_eq!(
            SceneQuery::parse("The Rooftop Chase"),
            SceneQuery::Title("The Rooftop Chase".into())
        );
        assert_eq!(
            SceneQuery::parse("scene in the park"),
            SceneQuery::Title("scene in the park".into())
        );
        assert_eq!(SceneQuery::parse("scene"), SceneQuery::Title("scene".into()));
        assert_eq!(SceneQuery::parse("-1"), SceneQuery::Title("-1".into()));
    }

    #[test]
    fn number_prefers_sequence_order_over_id() {
        let scenes = vec![scene(2, 1, "Opening"), scene(7, 2, "Chase")];
        assert_eq!(SceneQuery::Number(2).pick(&scenes).unwrap().id, 7);
        assert_eq!(SceneQuery::Number(7).pick(&scenes).unwrap().title, "Chase");
        assert!(SceneQuery::Number(9).pick(&scenes).is_none());
    }

    #[test]
    fn title_match_is_case_insensitive_substring_first_in_order() {
        let scenes = vec![
            scene(1, 1, "Morning at the docks"),
            scene(2, 2, "Night at the Docks"),
        ];
        assert_eq!(SceneQuery::parse("DOCKS").pick(&scenes).unwrap().id, 1);
        assert_eq!(SceneQuery::parse("night").pick(&scenes).unwrap().id, 2);
        assert!(SceneQuery::parse("desert").pick(&scenes).is_none());
        assert!(SceneQuery::parse("   ").pick(&scenes).is_none());
    }
}
