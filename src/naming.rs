//! Name derivation
//!
//! Converts mixed-case service identifiers (`DynamoDB`, `AWSLambda`) into the
//! lowercase, underscore-delimited form used for generated module names.

/// Literal substitutions applied after underscore insertion, in order.
///
/// Order matters: later entries see the output of earlier ones.
const ABBREVIATION_FIXES: &[(&str, &str)] = &[("a_w_s", "aws"), ("e_c2", "ec2"), ("_d_b", "_db")];

/// Derive a snake_case module name from a mixed-case identifier.
///
/// An underscore goes before every ASCII uppercase letter except one in the
/// leading position, the result is lowercased, and then the abbreviation
/// table is applied.
pub fn snake_case(identifier: &str) -> String {
    let mut split = String::with_capacity(identifier.len() + 8);
    for (index, ch) in identifier.chars().enumerate() {
        if index > 0 && ch.is_ascii_uppercase() {
            split.push('_');
        }
        split.push(ch);
    }

    let mut name = split.to_lowercase();
    for (from, to) in ABBREVIATION_FIXES {
        name = name.replace(from, to);
    }
    name
}
