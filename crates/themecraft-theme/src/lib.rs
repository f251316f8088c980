//! Themecraft Theme Library
//!
//! Turns a declarative [`DesignConfiguration`] into a flat [`TokenSet`] and a
//! catalog of components into token-referencing style variants. Both steps
//! are pure functions; [`DerivationSession`] adds last-write-wins handling
//! for configurations that change while a derivation is running.

pub mod catalog;
pub mod color;
pub mod config;
pub mod contrast;
pub mod derive;
pub mod error;
pub mod palette;
pub mod scales;
pub mod session;
pub mod tokens;
pub mod typography;
pub mod variants;

pub use catalog::{ComponentCatalog, ComponentSpec, StyleRule, TokenRef};
pub use color::{Color, Oklab, Oklch};
pub use config::{
    ColorScheme, ColorSeeds, ComponentHints, CornerStyle, DesignConfiguration, ShapeConfig, SpacingConfig,
    TextCasing, TypographyConfig,
};
pub use contrast::{ContrastPairing, ContrastTarget, contrast_ratio};
pub use derive::{ColorRole, DerivedTheme, derive_theme, derive_tokens};
pub use error::{ThemeError, ThemeResult};
pub use palette::{TONE_STEPS, TonalPalette};
pub use session::{AcceptStatus, DerivationJob, DerivationOutcome, DerivationSession};
pub use tokens::{TokenCategory, TokenSet};
pub use variants::{ComponentVariantMap, ComponentVariants, MissingToken, StyleValue, generate_variants};
