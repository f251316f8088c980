//! Determinism and completeness of the derivation pipeline.

use proptest::prelude::*;
use themecraft_theme::{
    Color, ColorScheme, ComponentCatalog, ContrastTarget, CornerStyle, DesignConfiguration, contrast_ratio,
    derive_theme, derive_tokens, generate_variants,
};

fn hex() -> impl Strategy<Value = String> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| format!("#{r:02x}{g:02x}{b:02x}"))
}

fn configuration() -> impl Strategy<Value = DesignConfiguration> {
    (
        hex(),
        proptest::option::of(hex()),
        proptest::option::of(hex()),
        proptest::option::of(hex()),
        any::<bool>(),
        prop_oneof![
            Just(ContrastTarget::Aa),
            Just(ContrastTarget::Aaa),
            (3.0..12.0f64).prop_map(ContrastTarget::Custom),
        ],
        prop_oneof![
            Just(CornerStyle::Sharp),
            Just(CornerStyle::Subtle),
            Just(CornerStyle::Rounded),
            Just(CornerStyle::Pill),
        ],
        1.0..16.0f64,
        (10.0..24.0f64, 1.05..1.6f64),
    )
        .prop_map(|(primary, secondary, tertiary, neutral, dark, contrast, corners, unit, (size, ratio))| {
            let mut config = DesignConfiguration::new(primary);
            config.colors.secondary = secondary;
            config.colors.tertiary = tertiary;
            config.colors.neutral = neutral;
            config.scheme = if dark { ColorScheme::Dark } else { ColorScheme::Light };
            config.contrast = contrast;
            config.shape.corner_style = corners;
            config.spacing.base_unit = unit;
            config.typography.base_size = size;
            config.typography.scale_ratio = ratio;
            config
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn derivation_is_byte_identical(config in configuration()) {
        let first = derive_theme(&config).unwrap();
        let second = derive_theme(&config).unwrap();
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        // A round trip through JSON does not change the result either.
        let reloaded = DesignConfiguration::from_json(&config.to_json().unwrap()).unwrap();
        prop_assert_eq!(derive_tokens(&reloaded).unwrap(), first.tokens);
    }

    #[test]
    fn every_pairing_meets_its_target(config in configuration()) {
        let theme = derive_theme(&config).unwrap();
        for pairing in &theme.pairings {
            let background = Color::from_hex(theme.tokens.get(&pairing.background).unwrap()).unwrap();
            let foreground = Color::from_hex(theme.tokens.get(&pairing.foreground).unwrap()).unwrap();
            prop_assert!(contrast_ratio(background, foreground) >= config.contrast.ratio(), "{:?}", pairing);
        }
    }

    #[test]
    fn variant_references_exist_or_are_reported(config in configuration()) {
        let tokens = derive_tokens(&config).unwrap();
        let map = generate_variants(&tokens, &ComponentCatalog::standard());
        for name in map.references() {
            prop_assert!(tokens.contains(name), "dangling reference {}", name);
        }
        let has_tertiary = config.colors.tertiary.is_some();
        prop_assert_eq!(map.missing.is_empty(), has_tertiary);
        for missing in &map.missing {
            prop_assert!(missing.fallback.is_some());
        }
    }
}

#[test]
fn token_names_do_not_depend_on_values() {
    let a = derive_tokens(&DesignConfiguration::new("#6750a4")).unwrap();
    let mut other = DesignConfiguration::new("#00ff88");
    other.spacing.base_unit = 8.0;
    other.scheme = ColorScheme::Dark;
    let b = derive_tokens(&other).unwrap();
    assert!(a.names().eq(b.names()));
}
