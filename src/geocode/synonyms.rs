//! Fixed state-name synonym table. Geocoding providers and users spell the
//! same state several ways (English names, abbreviations, hyphen variants);
//! everything downstream works with one canonical German name per state.

/// Canonical names of the sixteen German states.
const STATES: [&str; 16] = [
    "Baden-Württemberg",
    "Bayern",
    "Berlin",
    "Brandenburg",
    "Bremen",
    "Hamburg",
    "Hessen",
    "Mecklenburg-Vorpommern",
    "Niedersachsen",
    "Nordrhein-Westfalen",
    "Rheinland-Pfalz",
    "Saarland",
    "Sachsen",
    "Sachsen-Anhalt",
    "Schleswig-Holstein",
    "Thüringen",
];

/// (variant, canonical) pairs, matched case-insensitively after hyphens
/// are folded to spaces. Canonical names themselves always resolve.
const SYNONYMS: [(&str, &str); 18] = [
    ("baden wuerttemberg", "Baden-Württemberg"),
    ("bw", "Baden-Württemberg"),
    ("bavaria", "Bayern"),
    ("freistaat bayern", "Bayern"),
    ("hesse", "Hessen"),
    ("lower saxony", "Niedersachsen"),
    ("mecklenburg western pomerania", "Mecklenburg-Vorpommern"),
    ("north rhine westphalia", "Nordrhein-Westfalen"),
    ("nrw", "Nordrhein-Westfalen"),
    ("rhineland palatinate", "Rheinland-Pfalz"),
    ("saxony", "Sachsen"),
    ("saxony anhalt", "Sachsen-Anhalt"),
    ("thuringia", "Thüringen"),
    ("thueringen", "Thüringen"),
    ("freie hansestadt bremen", "Bremen"),
    ("freie und hansestadt hamburg", "Hamburg"),
    ("sleswig holsteen", "Schleswig-Holstein"),
    ("schleswig holstein", "Schleswig-Holstein"),
];

/// Map any known spelling of a state to its canonical name. Unknown input
/// passes through unchanged so the caller can still scope by it verbatim.
pub fn canonical_state_name(name: &str) -> &str {
    let folded = fold(name);
    for canonical in STATES {
        if fold(canonical) == folded {
            return canonical;
        }
    }
    for (variant, canonical) in SYNONYMS {
        if variant == folded {
            return canonical;
        }
    }
    name
}

fn fold(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace('-', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
