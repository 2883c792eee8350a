//! Property-based tests for credential injection and metadata annotations.
//!
//! These tests use proptest to generate random tokens and artifact contents
//! and verify that the invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::artifact::{parse_annotations, strip_annotations, CommentSyntax, GeneratedArtifact, GenerationMetadata};
    use crate::config::DistributionTarget;
    use crate::credentials::{resolve, Credential};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn target() -> DistributionTarget {
        DistributionTarget::git("A", "proto://example.com/org/repo", "out")
    }

    proptest! {
        /// Property: a token is embedded as userinfo right after the scheme
        #[test]
        fn token_is_injected_after_scheme(token in "[a-zA-Z0-9]{8,32}") {
            let target = target();
            let url = resolve(&target, &[Credential::new("A", None, &token)]).unwrap();
            prop_assert_eq!(url.expose(), format!("proto://{}@example.com/org/repo", token));
            prop_assert_eq!(url.public_url(), "proto://example.com/org/repo");
        }

        /// Property: the displayed form never contains the token
        #[test]
        fn displayed_url_never_contains_token(token in "[a-zA-Z0-9]{8,32}", user in "[a-z]{1,8}") {
            let url = resolve(&target(), &[Credential::new("A", Some(&user), &token)]).unwrap();
            prop_assert!(!url.to_string().contains(&token));
            let debugged = format!("{:?}", url);
            prop_assert!(!debugged.contains(&token));
            let stderr = format!("fatal: unable to access '{}'", url.expose());
            prop_assert!(!url.redact(&stderr).contains(&token));
        }

        /// Property: resolving never modifies the target
        #[test]
        fn resolve_leaves_target_unchanged(token in "[a-zA-Z0-9]{8,32}") {
            let target = target();
            let before = target.clone();
            resolve(&target, &[Credential::new("A", None, &token)]).unwrap();
            prop_assert_eq!(target, before);
        }

        /// Property: stripping the annotations of a finalised artifact gives
        /// back the generated content, plus the line break inserted before
        /// the annotations when the content lacked one
        #[test]
        fn finalize_then_strip_restores_content(
            lines in prop::collection::vec("[a-z0-9 =;]{0,20}", 0..8),
            terminated in any::<bool>(),
            date in any::<bool>(),
            time in any::<bool>(),
        ) {
            let mut content = lines.join("\n");
            if terminated && !lines.is_empty() {
                content.push('\n');
            }
            let comment = CommentSyntax::line("--");
            let artifact = GeneratedArtifact::new("TestConfig", "es", content.clone(), comment.clone());
            let metadata = GenerationMetadata { include_date: date, include_time: time };
            let now = NaiveDate::from_ymd_opt(2024, 2, 29)
                .unwrap()
                .and_hms_micro_opt(13, 5, 9, 42)
                .unwrap();

            let finalized = artifact.finalize(&metadata, now);
            let mut expected = content.clone().into_bytes();
            if (date || time) && !content.is_empty() && !content.ends_with('\n') {
                expected.push(b'\n');
            }
            prop_assert_eq!(strip_annotations(&finalized, &comment).unwrap(), expected);
            prop_assert!(artifact.matches_published(&finalized).unwrap());

            let annotations = parse_annotations(&finalized, &comment).unwrap();
            prop_assert_eq!(annotations.date.is_some(), date);
            prop_assert_eq!(annotations.time.is_some(), time);
        }
    }
}
