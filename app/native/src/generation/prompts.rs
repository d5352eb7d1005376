//! Preset prompts and prompt resolution.

use rand::Rng;

use crate::error::AiwallError;

/// Preset name that selects a random preset.
pub const RANDOM: &str = "Random";

/// Named prompt presets, in display order.
pub const PRESETS: &[(&str, &str)] = &[
    (
        "Nature Landscapes",
        "A high-resolution photo of a serene mountain valley with a clear blue lake surrounded by pine forests and snow-capped peaks.",
    ),
    (
        "Space and Galaxy",
        "A stunning photo of the Milky Way arching across the night sky over a remote desert with no light pollution.",
    ),
    (
        "Anime and Manga",
        "A high-definition digital artwork featuring a vibrant anime-style cityscape with detailed characters and intricate backgrounds.",
    ),
    (
        "Cityscapes",
        "A breathtaking photo of a metropolitan skyline at sunset, with glowing skyscrapers reflected in a nearby river.",
    ),
    (
        "Underwater Scenes",
        "A real underwater photograph of a coral reef teeming with colorful fish, sea turtles, and rays of sunlight piercing the water.",
    ),
    (
        "Vintage and Retro",
        "A nostalgic photo of a 1950s-style diner with classic cars parked outside and neon signs glowing under the twilight sky.",
    ),
    (
        "Fantasy Worlds",
        "A detailed digital illustration of a mythical forest with glowing fireflies, enchanted waterfalls, and ancient ruins.",
    ),
    (
        "Floral Designs",
        "A vivid macro photograph of fresh tulips and roses in full bloom, with soft natural light accentuating their colors.",
    ),
    (
        "Animal Portraits",
        "A professional wildlife photo of a lion lounging in the golden grasslands, its majestic mane blowing gently in the breeze.",
    ),
    (
        "Seasonal Themes",
        "A cozy winter photo of a snow-covered cabin with smoke rising from the chimney, surrounded by frosty evergreen trees.",
    ),
    (
        "Inspirational Quotes",
        "A motivational design featuring an elegant font overlaying a photo of a calm sunrise over a tranquil ocean.",
    ),
    (
        "Gaming Scenes",
        "A high-quality screenshot or promotional art from a popular video game, showcasing a dynamic action sequence or vivid landscapes.",
    ),
    (
        "Artistic Illustrations",
        "A vibrant digital artwork of a bustling fantasy market filled with colorful stalls and imaginative characters.",
    ),
    (
        "Monochrome Designs",
        "A dramatic black-and-white photo of a solitary lighthouse on a rocky coastline under a cloudy sky.",
    ),
    (
        "Sports Highlights",
        "A dynamic photo of a basketball player mid-dunk, with an excited crowd visible in the background.",
    ),
    (
        "Technological Themes",
        "A photo of an ultramodern data center, with glowing blue servers and neatly organized cables creating a futuristic feel.",
    ),
    (
        "Minimalist Designs",
        "A crisp photo of a single pebble resting on a smooth sandy surface, captured with perfect symmetry and soft lighting.",
    ),
    (
        "Custom Creations",
        "A personalized collage of real-life travel photos and memorabilia, neatly arranged against a corkboard background.",
    ),
    (
        "Woodland Scenes",
        "A tranquil photo of a forest pathway covered with autumn leaves, bathed in warm golden sunlight.",
    ),
    (
        "Beach Vistas",
        "A real photo of a tropical beach with crystal-clear waters, white sand, and gently swaying palm trees.",
    ),
];

/// Looks up a preset's text by name, ignoring case.
#[must_use]
pub fn preset_text(name: &str) -> Option<&'static str> {
    let name = name.trim();
    PRESETS.iter().find(|(preset, _)| preset.eq_ignore_ascii_case(name)).map(|(_, text)| *text)
}

/// Picks one preset text uniformly at random.
pub fn random_preset<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    PRESETS[rng.random_range(0..PRESETS.len())].1
}

/// How the prompt for a generation is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSelection {
    /// Custom prompt. Takes precedence when present and not blank.
    pub custom: Option<String>,
    /// Preset name, or [`RANDOM`].
    pub preset: String,
}

impl Default for PromptSelection {
    fn default() -> Self { Self { custom: None, preset: RANDOM.to_string() } }
}

impl PromptSelection {
    #[must_use]
    pub fn custom(prompt: impl Into<String>) -> Self {
        Self { custom: Some(prompt.into()), ..Self::default() }
    }

    #[must_use]
    pub fn preset(name: impl Into<String>) -> Self { Self { custom: None, preset: name.into() } }

    /// Resolves the prompt text.
    ///
    /// A non-blank custom prompt is used verbatim; otherwise a named preset's
    /// text; otherwise ([`RANDOM`]) a uniformly random preset.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::InvalidArguments`] for an unknown preset name.
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String, AiwallError> {
        if let Some(custom) = self.custom.as_deref().filter(|c| !c.trim().is_empty()) {
            return Ok(custom.to_string());
        }

        if self.preset.trim().eq_ignore_ascii_case(RANDOM) {
            return Ok(random_preset(rng).to_string());
        }

        preset_text(&self.preset)
            .map(str::to_string)
            .ok_or_else(|| AiwallError::InvalidArguments(format!("Unknown preset: {}", self.preset)))
    }
}
