//! Identicon logos for extensions.

use rand::Rng;
use rand::seq::SliceRandom;
use uuid::Builder;

use catalog::Logo;

/// Symmetric 5x5 patterns, row-major, `*` marking primary-colour cells.
const PRESETS: [&str; 10] = [
    "------*-*---*---*-*--*-*-",
    "******---**-*-**---******",
    "*-----*----***----*-----*",
    "------***---*---***------",
    "--*--**-**--*--*****--*--",
    "-------*---***---*-------",
    "------*-*-*-*-*-*-*-*---*",
    "-----------*-*--*-*--***-",
    "-----*----*-*--*-----***-",
    "------*-*-*****----------",
];

const PRIMARY_COLOURS: [&str; 6] = ["#2ecc71", "#3498db", "#e74c3c", "#f39c12", "#1abc9c", "#9b59b6"];

const SECONDARY_COLOURS: [&str; 3] = ["#34495e", "#ecf0f1", "#95a5a6"];

#[derive(Debug, Clone, Default)]
pub struct LogoGenerator;

impl LogoGenerator {
    /// Creates a logo generator drawing from the built-in presets and palettes.
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, rng: &mut impl Rng) -> Logo {
        let preset = PRESETS.choose(rng).copied().unwrap_or(PRESETS[0]);

        let mut cells = [[false; 5]; 5];
        for (i, c) in preset.chars().take(25).enumerate() {
            cells[i / 5][i % 5] = c == '*';
        }

        Logo {
            cells,
            primary: PRIMARY_COLOURS.choose(rng).copied().unwrap_or(PRIMARY_COLOURS[0]).to_string(),
            secondary: SECONDARY_COLOURS
                .choose(rng)
                .copied()
                .unwrap_or(SECONDARY_COLOURS[0])
                .to_string(),
        }
    }

    /// Random `<uuid>.png` name. Drawn from `rng` so seeded runs are reproducible.
    pub fn file_name(&self, rng: &mut impl Rng) -> String {
        let uuid = Builder::from_random_bytes(rng.r#gen()).into_uuid();
        format!("{uuid}.png")
    }
}
