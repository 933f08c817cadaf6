//! Unit tests for round parsing and evaluation

#[cfg(test)]
mod tests {
    use crate::round::{
        fallback_number_round, ColorRound, GameKind, GameRound, COLOR_PALETTE,
    };
    use serde_json::json;

    fn color_round(target: &str, mix: &[&str]) -> ColorRound {
        ColorRound {
            target_color: target.to_string(),
            required_mix: mix.iter().map(|c| c.to_string()).collect(),
            question: format!("Let's make {target} magic!"),
        }
    }

    #[test]
    fn test_parse_number_round() {
        let value = json!({
            "target": 5,
            "distractors": [1, 2, 3, 4, 6, 7, 8, 9],
            "question": "Can you find the number 5?",
        });

        let round = GameRound::from_value(GameKind::NumberJump, value).unwrap();

        assert!(round.matches_target("5"));
        assert!(!round.matches_target("3"));
        assert_eq!(round.target_key(), "5");
        assert_eq!(round.required_picks(), 1);
    }

    #[test]
    fn test_parse_letter_round() {
        let value = json!({
            "target": "B",
            "distractors": ["A", "C", "D", "E", "F"],
            "question": "Catch the letter B!",
        });

        let round = GameRound::from_value(GameKind::AlphabetCatch, value).unwrap();

        assert!(round.matches_target("B"));
        assert!(!round.matches_target("b"));
        assert_eq!(round.target_key(), "B");
    }

    #[test]
    fn test_parse_color_round_camel_case_fields() {
        let value = json!({
            "targetColor": "Purple",
            "requiredMix": ["Red", "Blue"],
            "question": "Let's make Purple magic!",
        });

        let round = GameRound::from_value(GameKind::ColorMagic, value).unwrap();

        assert_eq!(round.target_key(), "Purple");
        assert_eq!(round.required_picks(), 2);
        // The color board always presents the full palette
        let choices = round.choices();
        for color in COLOR_PALETTE {
            assert!(choices.contains(&color.to_string()));
        }
    }

    #[test]
    fn test_parse_pattern_round() {
        let value = json!({
            "sequence": ["Red", "Blue", "Red", "?"],
            "correctAnswer": "Blue",
            "options": ["Red", "Green", "Yellow"],
            "question": "What comes next?",
        });

        let round = GameRound::from_value(GameKind::RoboPuzzle, value).unwrap();

        assert!(round.matches_target("Blue"));
        assert_eq!(round.target_key(), "Blue");
    }

    #[test]
    fn test_malformed_round_is_rejected() {
        // Missing distractors entirely
        let value = json!({ "target": 5, "question": "Find 5!" });
        assert!(GameRound::from_value(GameKind::NumberJump, value).is_err());

        // Empty question
        let value = json!({
            "target": 5,
            "distractors": [1, 2],
            "question": "  ",
        });
        assert!(GameRound::from_value(GameKind::NumberJump, value).is_err());

        // Color round with a single mix color can never be a two-pick game
        let value = json!({
            "targetColor": "Red",
            "requiredMix": ["Red"],
            "question": "Make Red!",
        });
        assert!(GameRound::from_value(GameKind::ColorMagic, value).is_err());
    }

    #[test]
    fn test_wrong_schema_for_kind_is_rejected() {
        let value = json!({
            "targetColor": "Purple",
            "requiredMix": ["Red", "Blue"],
            "question": "Let's make Purple magic!",
        });

        assert!(GameRound::from_value(GameKind::NumberJump, value).is_err());
    }

    #[test]
    fn test_choices_contain_target_and_distractors() {
        let value = json!({
            "target": 7,
            "distractors": [1, 2, 3],
            "question": "Find 7!",
        });
        let round = GameRound::from_value(GameKind::NumberJump, value).unwrap();

        let choices = round.choices();
        assert_eq!(choices.len(), 4);
        for expected in ["1", "2", "3", "7"] {
            assert!(choices.contains(&expected.to_string()));
        }
    }

    #[test]
    fn test_color_mix_order_independent() {
        let round = color_round("Purple", &["Red", "Blue"]);

        // Reverse pick order is still correct
        assert!(round.check_mix(&["Blue".to_string(), "Red".to_string()]));
        assert!(round.check_mix(&["Red".to_string(), "Blue".to_string()]));
    }

    #[test]
    fn test_color_mix_is_a_multiset_match() {
        let round = color_round("Purple", &["Red", "Blue"]);

        // Duplicate of one required color does not satisfy the mix
        assert!(!round.check_mix(&["Red".to_string(), "Red".to_string()]));
        assert!(!round.check_mix(&["Blue".to_string(), "Blue".to_string()]));
    }

    #[test]
    fn test_color_mix_requires_exact_size() {
        let round = color_round("Purple", &["Red", "Blue"]);

        assert!(!round.check_mix(&["Red".to_string()]));
        assert!(!round.check_mix(&[
            "Red".to_string(),
            "Blue".to_string(),
            "Yellow".to_string()
        ]));
    }

    #[test]
    fn test_fallback_number_round_is_valid() {
        let round = fallback_number_round();

        assert_eq!(round.target_key(), "5");
        assert!(round.matches_target("5"));
        assert_eq!(round.question(), "Find 5!");
        assert_eq!(round.choices().len(), 9);
    }

    #[test]
    fn test_game_kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&GameKind::NumberJump).unwrap(),
            r#""number_jump""#
        );
        assert_eq!(
            serde_json::from_str::<GameKind>(r#""robo_puzzle""#).unwrap(),
            GameKind::RoboPuzzle
        );
    }
}
