//! Property-based tests for name derivation

use proptest::prelude::*;
use sdkgen::naming::snake_case;
use sdkgen::resolver::DerivedNames;

proptest! {
    /// Output never contains ASCII uppercase letters.
    #[test]
    fn output_is_lowercase(input in "[A-Za-z0-9]{1,24}") {
        let name = snake_case(&input);
        prop_assert!(!name.chars().any(|c| c.is_ascii_uppercase()));
    }

    /// Deriving twice yields the same name.
    #[test]
    fn derivation_is_deterministic(input in "[A-Za-z0-9_]{1,24}") {
        prop_assert_eq!(snake_case(&input), snake_case(&input));
    }

    /// Lowercase identifiers without separators pass through unchanged.
    #[test]
    fn lowercase_is_identity(input in "[a-z0-9]{1,24}") {
        prop_assert_eq!(snake_case(&input), input);
    }

    /// No leading underscore is ever introduced.
    #[test]
    fn no_leading_separator(input in "[A-Z][A-Za-z]{0,16}") {
        prop_assert!(!snake_case(&input).starts_with('_'));
    }

    /// The namespace is always the prefix plus the module name.
    #[test]
    fn namespace_is_prefixed_module(
        segment in "[a-z][a-zA-Z0-9]{0,12}",
        shape in "[A-Z][A-Za-z]{0,12}"
    ) {
        let key = format!("com.amazonaws.{}#{}", segment, shape);
        let names = DerivedNames::from_service_key(&key, "aws.");
        prop_assert_eq!(&names.model_name, &segment);
        prop_assert_eq!(names.namespace, format!("aws.{}", names.module_name));
    }
}
