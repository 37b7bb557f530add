/// Parses a kilometer point (`"245+400"` → 245.4, `"131.926"` → 131.926).
///
/// Returns `None` for anything else (`"N/A"`, `"None"`, blanks, non-finite
/// numbers) so callers can treat the value as missing.
pub fn parse_pk(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if let Some((km, meters)) = raw.split_once('+') {
        if is_digits(km) && is_digits(meters) {
            let km: f64 = km.parse().ok()?;
            let meters: f64 = meters.parse().ok()?;
            return Some(km + meters / 1000.0);
        }
    }
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn is_digits(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_km_plus_meters() {
        assert_eq!(parse_pk("245+400"), Some(245.4));
        assert_eq!(parse_pk("650+000"), Some(650.0));
        assert_eq!(parse_pk(" 12+500 "), Some(12.5));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_pk("131.926"), Some(131.926));
        assert_eq!(parse_pk("42"), Some(42.0));
    }

    #[test]
    fn test_unparseable_is_absent() {
        assert_eq!(parse_pk("N/A"), None);
        assert_eq!(parse_pk("None"), None);
        assert_eq!(parse_pk(""), None);
        assert_eq!(parse_pk("   "), None);
        assert_eq!(parse_pk("12+"), None);
        assert_eq!(parse_pk("+400"), None);
        assert_eq!(parse_pk("NaN"), None);
        assert_eq!(parse_pk("inf"), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_km_plus_meters_matches_formula(km in 0u32..2000, meters in 0u32..1000) {
                let parsed = parse_pk(&format!("{km}+{meters:03}")).unwrap();
                prop_assert_eq!(parsed, km as f64 + meters as f64 / 1000.0);
            }

            #[test]
            fn prop_never_panics(raw in ".{0,16}") {
                let _ = parse_pk(&raw);
            }
        }
    }
}
