//! Requirements model: field-wise merge and the completeness score.

use crate::models::DesignRequirements;

/// Number of canonical requirement fields counted by [`completeness_score`].
pub const CANONICAL_FIELD_COUNT: usize = 8;

/// Merge a patch into the current requirements. A `Some` in the patch wins;
/// `None` leaves the current value untouched.
pub fn merge_requirements(
    current: &DesignRequirements,
    patch: &DesignRequirements,
) -> DesignRequirements {
    fn pick<T: Clone>(current: &Option<T>, patch: &Option<T>) -> Option<T> {
        patch.clone().or_else(|| current.clone())
    }

    DesignRequirements {
        design_type: pick(&current.design_type, &patch.design_type),
        subject: pick(&current.subject, &patch.subject),
        subject_name: pick(&current.subject_name, &patch.subject_name),
        purpose: pick(&current.purpose, &patch.purpose),
        preferred_style_and_inspiration: pick(
            &current.preferred_style_and_inspiration,
            &patch.preferred_style_and_inspiration,
        ),
        color_preferences: pick(&current.color_preferences, &patch.color_preferences),
        functionality_needs: pick(&current.functionality_needs, &patch.functionality_needs),
        content_types: pick(&current.content_types, &patch.content_types),
    }
}

/// Filled flags for the canonical fields, in canonical order.
fn filled_fields(req: &DesignRequirements) -> [bool; CANONICAL_FIELD_COUNT] {
    fn text(value: &Option<String>) -> bool {
        value.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
    fn list(value: &Option<Vec<String>>) -> bool {
        value.as_ref().is_some_and(|v| !v.is_empty())
    }

    [
        req.design_type.is_some(),
        text(&req.subject),
        text(&req.subject_name),
        text(&req.purpose),
        text(&req.preferred_style_and_inspiration),
        list(&req.color_preferences),
        list(&req.functionality_needs),
        list(&req.content_types),
    ]
}

/// Fraction of canonical fields that are filled, in `[0, 1]`.
pub fn completeness_score(req: &DesignRequirements) -> f64 {
    let filled = filled_fields(req).iter().filter(|f| **f).count();
    filled as f64 / CANONICAL_FIELD_COUNT as f64
}

/// Canonical field names still missing, used to steer the next question.
pub fn missing_fields(req: &DesignRequirements) -> Vec<&'static str> {
    const NAMES: [&str; CANONICAL_FIELD_COUNT] = [
        "designType",
        "subject",
        "subjectName",
        "purpose",
        "preferredStyleAndInspiration",
        "colorPreferences",
        "functionalityNeeds",
        "contentTypes",
    ];
    filled_fields(req)
        .iter()
        .zip(NAMES)
        .filter(|(filled, _)| !**filled)
        .map(|(_, name)| name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DesignType;

    fn full() -> DesignRequirements {
        DesignRequirements {
            design_type: Some(DesignType::Portfolio),
            subject: Some("x".into()),
            subject_name: Some("x".into()),
            purpose: Some("x".into()),
            preferred_style_and_inspiration: Some("x".into()),
            color_preferences: Some(vec!["blue".into()]),
            functionality_needs: Some(vec!["contact-form".into()]),
            content_types: Some(vec!["images".into()]),
        }
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(completeness_score(&DesignRequirements::default()), 0.0);
    }

    #[test]
    fn test_all_fields_is_one() {
        assert_eq!(completeness_score(&full()), 1.0);
        assert!(missing_fields(&full()).is_empty());
    }

    #[test]
    fn test_blank_strings_and_empty_lists_do_not_count() {
        let req = DesignRequirements {
            subject: Some("   ".into()),
            color_preferences: Some(vec![]),
            purpose: Some("Show off my photos".into()),
            ..Default::default()
        };
        assert_eq!(completeness_score(&req), 1.0 / 8.0);
        let missing = missing_fields(&req);
        assert!(missing.contains(&"subject"));
        assert!(missing.contains(&"colorPreferences"));
        assert!(!missing.contains(&"purpose"));
    }

    #[test]
    fn test_merge_overrides_only_supplied_fields() {
        let current = DesignRequirements {
            design_type: Some(DesignType::Blog),
            subject: Some("travel".into()),
            ..Default::default()
        };
        let patch = DesignRequirements {
            subject: Some("food travel".into()),
            color_preferences: Some(vec!["teal".into()]),
            ..Default::default()
        };
        let merged = merge_requirements(&current, &patch);
        assert_eq!(merged.design_type, Some(DesignType::Blog));
        assert_eq!(merged.subject.as_deref(), Some("food travel"));
        assert_eq!(merged.color_preferences, Some(vec!["teal".to_string()]));
        assert!(merged.purpose.is_none());
    }

    #[test]
    fn test_merge_empty_patch_is_noop() {
        let current = full();
        assert_eq!(merge_requirements(&current, &DesignRequirements::default()), current);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let current = DesignRequirements {
            subject: Some("bakery".into()),
            ..Default::default()
        };
        let patch = DesignRequirements {
            design_type: Some(DesignType::LandingPage),
            ..Default::default()
        };
        let once = merge_requirements(&current, &patch);
        assert_eq!(merge_requirements(&once, &patch), once);
    }
}
