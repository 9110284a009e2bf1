//! Color Lexicon
//!
//! Read-only catalog of learnable colors. Each entry carries the canonical
//! name, a display hex value, the curriculum phase it belongs to, and the
//! spoken variants accepted for it (common child mispronunciations and
//! recognizer near-hits collected from field use).

use serde::{Deserialize, Serialize};

/// A single learnable color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconItem {
    pub name: String,
    pub hex: String,
    pub phase: u32,
    pub variants: Vec<String>,
}

/// The color catalog. Declaration order is the stable catalog order used
/// for deterministic tie-breaking by the scheduler.
#[derive(Debug, Clone)]
pub struct Lexicon {
    items: Vec<LexiconItem>,
}

fn item(name: &str, hex: &str, phase: u32, variants: &[&str]) -> LexiconItem {
    LexiconItem {
        name: name.to_string(),
        hex: hex.to_string(),
        phase,
        variants: variants.iter().map(|v| v.to_string()).collect(),
    }
}

impl Lexicon {
    /// Build a lexicon from an explicit item list
    pub fn new(items: Vec<LexiconItem>) -> Self {
        Self { items }
    }

    /// The built-in curriculum: 36 colors across 7 phases
    pub fn builtin() -> Self {
        Self::new(vec![
            // Phase 1: Primary
            item("Red", "#ef4444", 1, &["red", "read", "rad", "rid"]),
            item("Blue", "#3b82f6", 1, &["blue", "blew", "boo", "blu"]),
            item(
                "Yellow",
                "#facc15",
                1,
                &[
                    "yellow", "yell", "yello", "yella", "yelo", "ellow", "jello", "yallow",
                    "yaller",
                ],
            ),
            // Phase 2: Secondary
            item("Green", "#22c55e", 2, &["green", "grin", "grean", "gren"]),
            item("Orange", "#FFA500", 2, &["orange", "ornge", "orang", "orng"]),
            item("Purple", "#a855f7", 2, &["purple", "purp", "purpel", "perple"]),
            // Phase 3: Neutrals/Common
            item("Black", "#1f2937", 3, &["black", "blak", "bloc"]),
            item("White", "#f8fafc", 3, &["white", "wite", "whit", "wait"]),
            item("Brown", "#8B4513", 3, &["brown", "bron", "brawn"]),
            item("Pink", "#FFC0CB", 3, &["pink", "pank", "pinc"]),
            // Phase 4: Familiar Extended
            item("Gold", "#FFD700", 4, &["gold", "gould", "goald"]),
            item("Silver", "#C0C0C0", 4, &["silver", "silber", "silvr"]),
            item("Coral", "#FF7F50", 4, &["coral", "corral", "corel"]),
            item(
                "Sky Blue",
                "#87CEEB",
                4,
                &["sky blue", "sky", "skyblue", "light blue"],
            ),
            item("Lime", "#32CD32", 4, &["lime", "lyme", "lim"]),
            item("Peach", "#FFDAB9", 4, &["peach", "peech", "pech"]),
            // Phase 5: Nature Colors
            item("Forest", "#228B22", 5, &["forest", "forest green", "forrest"]),
            item("Navy", "#000080", 5, &["navy", "navy blue", "navey"]),
            item(
                "Turquoise",
                "#40E0D0",
                5,
                &["turquoise", "turkoise", "turquois", "turk"],
            ),
            item("Lavender", "#E6E6FA", 5, &["lavender", "lavendar", "lavander"]),
            item("Cream", "#FFFDD0", 5, &["cream", "creme", "creem"]),
            item("Olive", "#808000", 5, &["olive", "oliv", "olives"]),
            // Phase 6: Jewel Tones
            item("Emerald", "#50C878", 6, &["emerald", "emrald", "emereld"]),
            item("Crimson", "#DC143C", 6, &["crimson", "crimsen", "krimson"]),
            item("Teal", "#008080", 6, &["teal", "teel", "teale"]),
            item("Violet", "#8A2BE2", 6, &["violet", "violit", "vilet"]),
            item("Royal Blue", "#4169E1", 6, &["royal blue", "royal", "royalblue"]),
            item("Aqua", "#00FFFF", 6, &["aqua", "aqua blue", "akwa", "agua"]),
            // Phase 7: Subtle/Advanced
            item("Maroon", "#800000", 7, &["maroon", "marune", "marone"]),
            item("Indigo", "#4B0082", 7, &["indigo", "indago", "indego"]),
            item("Beige", "#F5F5DC", 7, &["beige", "bayge", "beig"]),
            item(
                "Chartreuse",
                "#7FFF00",
                7,
                &["chartreuse", "chartroose", "shar truce"],
            ),
            item("Magenta", "#FF00FF", 7, &["magenta", "magenda", "majenta"]),
            item("Slate", "#708090", 7, &["slate", "slayt", "slait"]),
            item("Charcoal", "#36454F", 7, &["charcoal", "charcol", "charcoale"]),
            item("Taupe", "#483C32", 7, &["taupe", "tope", "taup"]),
        ])
    }

    /// All items in catalog order
    pub fn items(&self) -> &[LexiconItem] {
        &self.items
    }

    /// Items belonging to a single phase, in catalog order
    pub fn items_by_phase(&self, phase: u32) -> Vec<&LexiconItem> {
        self.items.iter().filter(|i| i.phase == phase).collect()
    }

    /// Look up an item by canonical name (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&LexiconItem> {
        self.items
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// Spoken variants accepted for an item, always including the
    /// canonical name itself
    pub fn accepted_variants(item: &LexiconItem) -> Vec<String> {
        let canonical = item.name.to_lowercase();
        let mut variants = item.variants.clone();
        if !variants.iter().any(|v| *v == canonical) {
            variants.insert(0, canonical);
        }
        variants
    }

    /// Highest phase present in the catalog
    pub fn max_phase(&self) -> u32 {
        self.items.iter().map(|i| i.phase).max().unwrap_or(1)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}
