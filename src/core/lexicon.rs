//! Fixed dictionaries used by the text feature extractor.
//!
//! Every dictionary-derived attribute goes through [`Lexicon::scan`] and is
//! compared with the one categorical similarity routine.

/// A fixed set of terms matched by substring presence
#[derive(Debug, Clone, Copy)]
pub struct Lexicon {
    pub terms: &'static [&'static str],
}

impl Lexicon {
    /// Terms that occur anywhere in `lowered`, in dictionary order.
    ///
    /// `lowered` must already be lowercase.
    pub fn scan(&self, lowered: &str) -> Vec<String> {
        self.terms
            .iter()
            .filter(|term| lowered.contains(*term))
            .map(|term| term.to_string())
            .collect()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.terms.contains(&word)
    }
}

/// Dictionary-derived attributes of a description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    KeyPhrase,
    Color,
    Brand,
    Material,
    Condition,
}

impl Attribute {
    pub fn lexicon(self) -> &'static Lexicon {
        match self {
            Attribute::KeyPhrase => &KEY_PHRASES,
            Attribute::Color => &COLORS,
            Attribute::Brand => &BRANDS,
            Attribute::Material => &MATERIALS,
            Attribute::Condition => &CONDITIONS,
        }
    }
}

pub const COLORS: Lexicon = Lexicon {
    terms: &[
        "black", "white", "red", "blue", "green", "yellow", "orange", "purple",
        "pink", "brown", "gray", "grey", "silver", "gold", "bronze", "copper",
    ],
};

pub const BRANDS: Lexicon = Lexicon {
    terms: &[
        "apple", "iphone", "samsung", "nike", "adidas", "gucci", "prada",
        "louis vuitton", "chanel", "dior", "versace", "calvin klein",
        "ray ban", "oakley", "sony", "lg", "hp", "dell", "lenovo",
    ],
};

pub const MATERIALS: Lexicon = Lexicon {
    terms: &[
        "leather", "metal", "plastic", "wood", "fabric", "cotton", "denim",
        "silk", "wool", "canvas", "rubber", "glass", "ceramic", "steel",
        "aluminum", "titanium", "gold", "silver", "diamond",
    ],
};

pub const CONDITIONS: Lexicon = Lexicon {
    terms: &[
        "new", "used", "old", "worn", "damaged", "cracked", "broken",
        "scratched", "dirty", "clean", "perfect", "excellent", "good",
        "fair", "poor", "mint", "pristine",
    ],
};

pub const KEY_PHRASES: Lexicon = Lexicon {
    terms: &[
        "cracked screen", "black leather", "silver chain", "gold watch",
        "blue jeans", "red shirt", "white sneakers", "brown wallet",
        "car keys", "house keys", "office keys", "backpack",
        "laptop bag", "phone case", "sunglasses", "headphones",
    ],
};

/// Descriptive words the tagger always treats as adjectives
pub const ADJECTIVES: &[&str] = &[
    "small", "large", "big", "little", "tiny", "huge", "long", "short", "tall",
    "light", "dark", "bright", "pale", "heavy", "thin", "thick", "round",
    "square", "shiny", "matte", "striped", "plain", "vintage", "antique",
    "expensive", "cheap", "favorite", "favourite", "important", "personal",
    "missing", "lost", "found", "precious", "sentimental",
];

/// Function and motion words that never count as nouns
pub const NON_NOUNS: &[&str] = &[
    "near", "around", "behind", "inside", "outside", "left", "dropped",
    "forgot", "forgotten", "seen", "picked", "please", "contact", "call",
    "lost", "found", "missing", "yesterday", "today", "tonight", "morning",
    "evening", "afternoon", "maybe", "probably",
];

/// Words that flip the polarity of the word that follows
pub const NEGATORS: &[&str] = &[
    "not", "no", "never", "dont", "don't", "doesnt", "doesn't", "isnt",
    "isn't", "wasnt", "wasn't", "cant", "can't", "cannot", "without",
];

/// Per-word polarity, AFINN-style integer scale from -5 to +5
const POLARITY: &[(&str, i32)] = &[
    ("amazing", 4), ("awesome", 4), ("beautiful", 3), ("best", 3),
    ("brilliant", 4), ("clean", 2), ("cute", 2), ("excellent", 3),
    ("fantastic", 4), ("favorite", 2), ("favourite", 2), ("fine", 2),
    ("glad", 3), ("good", 3), ("great", 3), ("happy", 3), ("helpful", 2),
    ("hope", 2), ("hopefully", 2), ("kind", 2), ("love", 3), ("loved", 3),
    ("lovely", 3), ("lucky", 3), ("nice", 3), ("perfect", 3), ("precious", 2),
    ("pretty", 1), ("pristine", 2), ("reward", 2), ("safe", 1), ("thank", 2),
    ("thanks", 2), ("valuable", 2), ("wonderful", 4), ("worth", 2),
    ("abandoned", -2), ("angry", -3), ("awful", -3), ("bad", -3),
    ("broken", -1), ("cracked", -1), ("damaged", -3), ("desperate", -3),
    ("devastated", -2), ("dirty", -2), ("fear", -2), ("lost", -3),
    ("missing", -2), ("panic", -3), ("poor", -2), ("ruined", -2), ("sad", -2),
    ("scared", -2), ("scratched", -1), ("stolen", -2), ("terrible", -3),
    ("torn", -2), ("ugly", -3), ("upset", -2), ("urgent", -1), ("worn", -1),
    ("worried", -3), ("worry", -3), ("worse", -3), ("worst", -3),
];

/// Polarity of a lowercase word, if the lexicon knows it
pub fn polarity(word: &str) -> Option<i32> {
    POLARITY
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, score)| *score)
}

pub fn is_negator(word: &str) -> bool {
    NEGATORS.contains(&word)
}
