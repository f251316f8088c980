//! The derivation pipeline: configuration in, token set out.
//!
//! [`derive_theme`] is a pure function. The same configuration always yields
//! the same tokens, in the same order, with the same values.

use crate::catalog::STANDARD_COMPONENTS;
use crate::color::Color;
use crate::config::{ColorScheme, DEFAULT_ERROR_SEED, DesignConfiguration};
use crate::contrast::{ContrastPairing, pick_foreground};
use crate::error::ThemeResult;
use crate::palette::{NEUTRAL_CHROMA, SECONDARY_CHROMA_SCALE, TonalPalette};
use crate::scales::{self, elevation_shadow};
use crate::tokens::TokenSet;
use crate::typography;
use serde::{Deserialize, Serialize};

/// Color roles that get a tonal palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorRole {
    Primary,
    Secondary,
    Tertiary,
    Neutral,
    Error,
}

impl ColorRole {
    pub fn name(self) -> &'static str {
        match self {
            ColorRole::Primary => "primary",
            ColorRole::Secondary => "secondary",
            ColorRole::Tertiary => "tertiary",
            ColorRole::Neutral => "neutral",
            ColorRole::Error => "error",
        }
    }
}

/// Palette steps backing the accent roles in one scheme.
struct AccentSteps {
    role: u16,
    container: u16,
    /// Preferred `on-{role}` tones, before falling back to white and black.
    on_role: [u16; 2],
    on_container: [u16; 2],
    light_text_first: bool,
}

/// Palette steps backing the neutral surfaces in one scheme.
struct SurfaceSteps {
    background: u16,
    surface: u16,
    surface_variant: u16,
    outline: u16,
    on_surface: [u16; 2],
    on_surface_variant: [u16; 3],
}

fn accent_steps(scheme: ColorScheme) -> AccentSteps {
    match scheme {
        ColorScheme::Light => AccentSteps {
            role: 600,
            container: 100,
            on_role: [50, 950],
            on_container: [900, 950],
            light_text_first: true,
        },
        ColorScheme::Dark => AccentSteps {
            role: 300,
            container: 800,
            on_role: [950, 50],
            on_container: [100, 50],
            light_text_first: false,
        },
    }
}

fn surface_steps(scheme: ColorScheme) -> SurfaceSteps {
    match scheme {
        ColorScheme::Light => SurfaceSteps {
            background: 50,
            surface: 50,
            surface_variant: 200,
            outline: 500,
            on_surface: [900, 950],
            on_surface_variant: [700, 800, 900],
        },
        ColorScheme::Dark => SurfaceSteps {
            background: 950,
            surface: 900,
            surface_variant: 800,
            outline: 400,
            on_surface: [100, 50],
            on_surface_variant: [300, 200, 100],
        },
    }
}

/// A derived token set plus the contrast checks performed on the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedTheme {
    pub tokens: TokenSet,
    pub pairings: Vec<ContrastPairing>,
}

/// Derive just the token set.
pub fn derive_tokens(config: &DesignConfiguration) -> ThemeResult<TokenSet> {
    derive_theme(config).map(|theme| theme.tokens)
}

/// Validate `config` and derive the full theme.
pub fn derive_theme(config: &DesignConfiguration) -> ThemeResult<DerivedTheme> {
    config.validate()?;
    let mut builder = ThemeBuilder {
        tokens: TokenSet::new(),
        pairings: Vec::new(),
        target: config.contrast.ratio(),
    };

    let palettes = role_palettes(config)?;
    for (role, palette) in &palettes {
        for (step, color) in palette.iter() {
            builder.tokens.insert(format!("color-{}-{step}", role.name()), color.to_hex());
        }
    }

    let accents = accent_steps(config.scheme);
    let mut neutral = None;
    for (role, palette) in &palettes {
        if *role == ColorRole::Neutral {
            neutral = Some(palette);
        } else {
            builder.accent_role(role.name(), palette, &accents);
        }
    }
    // The neutral palette is always present.
    if let Some(neutral) = neutral {
        builder.surfaces(neutral, &surface_steps(config.scheme));
    }
    let shadow = neutral.map_or(Color::BLACK, TonalPalette::darkest);
    builder.tokens.insert("color-shadow", shadow.to_hex());

    typography::write_tokens(&config.typography, &mut builder.tokens);
    scales::write_shape_tokens(&config.shape, &config.spacing, &mut builder.tokens);
    scales::write_spacing_tokens(&config.spacing, &mut builder.tokens);
    scales::write_elevation_tokens(shadow, &mut builder.tokens);
    scales::write_border_and_motion_tokens(&mut builder.tokens);
    builder.component_hints(config, shadow);

    log::debug!(
        "Derived {} tokens and {} contrast pairings for '{}'",
        builder.tokens.len(),
        builder.pairings.len(),
        config.name
    );
    Ok(DerivedTheme { tokens: builder.tokens, pairings: builder.pairings })
}

/// Palettes for every configured role, in role order.
fn role_palettes(config: &DesignConfiguration) -> ThemeResult<Vec<(ColorRole, TonalPalette)>> {
    let seeds = &config.colors;
    let primary = Color::from_hex(&seeds.primary)?;
    let primary_lch = primary.to_oklch();

    let secondary = match &seeds.secondary {
        Some(hex) => TonalPalette::from_seed(Color::from_hex(hex)?),
        None => TonalPalette::from_hue_chroma(primary_lch.h, primary_lch.c * SECONDARY_CHROMA_SCALE),
    };
    let neutral = match &seeds.neutral {
        Some(hex) => TonalPalette::from_seed(Color::from_hex(hex)?),
        None => TonalPalette::from_hue_chroma(primary_lch.h, primary_lch.c.min(NEUTRAL_CHROMA)),
    };
    let error = Color::from_hex(seeds.error.as_deref().unwrap_or(DEFAULT_ERROR_SEED))?;

    let mut palettes = vec![
        (ColorRole::Primary, TonalPalette::from_seed(primary)),
        (ColorRole::Secondary, secondary),
    ];
    if let Some(hex) = &seeds.tertiary {
        palettes.push((ColorRole::Tertiary, TonalPalette::from_seed(Color::from_hex(hex)?)));
    }
    palettes.push((ColorRole::Neutral, neutral));
    palettes.push((ColorRole::Error, TonalPalette::from_seed(error)));
    Ok(palettes)
}

struct ThemeBuilder {
    tokens: TokenSet,
    pairings: Vec<ContrastPairing>,
    target: f64,
}

impl ThemeBuilder {
    /// Insert a contrast-checked background/foreground token pair.
    fn pair(&mut self, background_name: &str, foreground_name: &str, background: Color, candidates: &[Color]) {
        let choice = pick_foreground(background, candidates, self.target);
        self.tokens.insert(background_name, choice.background.to_hex());
        self.tokens.insert(foreground_name, choice.foreground.to_hex());
        self.pairings.push(ContrastPairing {
            background: background_name.to_string(),
            foreground: foreground_name.to_string(),
            ratio: choice.ratio,
            target: self.target,
            adjusted: choice.adjusted,
        });
    }

    fn accent_role(&mut self, role: &str, palette: &TonalPalette, steps: &AccentSteps) {
        let tone = |step: u16| palette.tone(step).unwrap_or(Color::BLACK);
        let (light, dark) = (Color::WHITE, Color::BLACK);
        let (first, second) = if steps.light_text_first { (light, dark) } else { (dark, light) };

        let on_role = [tone(steps.on_role[0]), tone(steps.on_role[1]), first, second];
        self.pair(&format!("color-{role}"), &format!("color-on-{role}"), tone(steps.role), &on_role);

        let on_container = [tone(steps.on_container[0]), tone(steps.on_container[1]), second, first];
        self.pair(
            &format!("color-{role}-container"),
            &format!("color-on-{role}-container"),
            tone(steps.container),
            &on_container,
        );
    }

    fn surfaces(&mut self, neutral: &TonalPalette, steps: &SurfaceSteps) {
        let tone = |step: u16| neutral.tone(step).unwrap_or(Color::BLACK);
        let text = if steps.background > 500 { Color::WHITE } else { Color::BLACK };

        self.tokens.insert("color-background", tone(steps.background).to_hex());
        self.tokens.insert("color-outline", tone(steps.outline).to_hex());

        let on_surface = [tone(steps.on_surface[0]), tone(steps.on_surface[1]), text];
        self.pair("color-surface", "color-on-surface", tone(steps.surface), &on_surface);

        let on_variant = [
            tone(steps.on_surface_variant[0]),
            tone(steps.on_surface_variant[1]),
            tone(steps.on_surface_variant[2]),
            text,
        ];
        self.pair("color-surface-variant", "color-on-surface-variant", tone(steps.surface_variant), &on_variant);
    }

    /// `component-{name}-shadow` and `component-{name}-text-transform` for
    /// the standard catalog entries.
    fn component_hints(&mut self, config: &DesignConfiguration, shadow: Color) {
        for name in config.components.keys() {
            if !STANDARD_COMPONENTS.iter().any(|(standard, _)| *standard == name.as_str()) {
                log::warn!("Ignoring hints for unknown component '{name}'");
            }
        }
        for (name, default_level) in STANDARD_COMPONENTS {
            let hints = config.components.get(name).copied().unwrap_or_default();
            let elevated = hints.elevation.unwrap_or(default_level > 0);
            let level = if elevated { default_level.max(1) } else { 0 };
            self.tokens.insert(format!("component-{name}-shadow"), elevation_shadow(level, shadow));
            self.tokens.insert(
                format!("component-{name}-text-transform"),
                hints.text_casing.unwrap_or_default().as_css(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ComponentHints, TextCasing};
    use crate::contrast::{ContrastTarget, contrast_ratio};
    use crate::error::ThemeError;

    fn color(tokens: &TokenSet, name: &str) -> Color {
        Color::from_hex(tokens.get(name).unwrap()).unwrap()
    }

    #[test]
    fn test_minimal_config_emits_core_tokens() {
        let tokens = derive_tokens(&DesignConfiguration::new("#6750a4")).unwrap();
        for name in [
            "color-primary",
            "color-on-primary",
            "color-primary-container",
            "color-on-primary-container",
            "color-secondary",
            "color-error",
            "color-surface",
            "color-on-surface",
            "color-surface-variant",
            "color-on-surface-variant",
            "color-background",
            "color-outline",
            "color-shadow",
            "color-neutral-500",
            "shape-corner-medium",
            "spacing-md",
            "typescale-title-large-size",
            "elevation-level-3",
            "border-width-thin",
            "motion-duration-short",
            "component-button-shadow",
        ] {
            assert!(tokens.contains(name), "missing {name}");
        }
        assert!(!tokens.contains("color-tertiary"));
        assert!(!tokens.contains("color-tertiary-500"));
    }

    #[test]
    fn test_tertiary_only_when_configured() {
        let mut config = DesignConfiguration::new("#6750a4");
        config.colors.tertiary = Some("#7d5260".to_string());
        let tokens = derive_tokens(&config).unwrap();
        assert!(tokens.contains("color-tertiary"));
        assert!(tokens.contains("color-on-tertiary-container"));
    }

    #[test]
    fn test_pairings_meet_target() {
        for target in [ContrastTarget::Aa, ContrastTarget::Aaa, ContrastTarget::Custom(12.0)] {
            for scheme in [ColorScheme::Light, ColorScheme::Dark] {
                let mut config = DesignConfiguration::new("#ffd600");
                config.contrast = target;
                config.scheme = scheme;
                let theme = derive_theme(&config).unwrap();
                // primary, secondary and error roles plus two surfaces
                assert_eq!(theme.pairings.len(), 3 * 2 + 2);
                for pairing in &theme.pairings {
                    assert!(pairing.passes(), "{pairing:?}");
                    let ratio = contrast_ratio(
                        color(&theme.tokens, &pairing.background),
                        color(&theme.tokens, &pairing.foreground),
                    );
                    assert!(ratio >= target.ratio(), "{pairing:?}");
                }
            }
        }
    }

    #[test]
    fn test_dark_scheme_has_dark_surface() {
        let mut config = DesignConfiguration::new("#0061a4");
        config.scheme = ColorScheme::Dark;
        let tokens = derive_tokens(&config).unwrap();
        assert!(color(&tokens, "color-surface").relative_luminance() < 0.1);
        assert!(color(&tokens, "color-on-surface").relative_luminance() > 0.5);
    }

    #[test]
    fn test_component_hints() {
        let mut config = DesignConfiguration::new("#6750a4");
        config.components.insert(
            "button".to_string(),
            ComponentHints { elevation: Some(false), text_casing: Some(TextCasing::Uppercase) },
        );
        config.components.insert("chip".to_string(), ComponentHints { elevation: Some(true), ..Default::default() });
        config.components.insert("carousel".to_string(), ComponentHints::default());
        let tokens = derive_tokens(&config).unwrap();
        assert_eq!(tokens.get("component-button-shadow"), Some("none"));
        assert_eq!(tokens.get("component-button-text-transform"), Some("uppercase"));
        assert_eq!(tokens.get("component-chip-shadow"), tokens.get("elevation-level-1"));
        assert_eq!(tokens.get("component-dialog-shadow"), tokens.get("elevation-level-3"));
        assert!(!tokens.contains("component-carousel-shadow"));
    }

    #[test]
    fn test_invalid_configuration_aborts() {
        let mut config = DesignConfiguration::new("#6750a4");
        config.spacing.base_unit = 0.0;
        assert!(matches!(derive_theme(&config), Err(ThemeError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_same_input_same_output() {
        let config = DesignConfiguration::new("#3a7d44");
        let a = derive_theme(&config).unwrap();
        let b = derive_theme(&config.clone()).unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }
}
