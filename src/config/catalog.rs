use std::collections::HashMap;

const CARRIERS: &[(&str, &str)] = &[
    ("FR", "Ryanair"),
    ("U2", "easyJet"),
    ("IB", "Iberia"),
    ("UX", "Air Europa"),
    ("VY", "Vueling"),
    ("HV", "Transavia"),
    ("W6", "Wizz Air"),
    ("LH", "Lufthansa"),
    ("AF", "Air France"),
    ("BA", "British Airways"),
    ("TP", "TAP Portugal"),
    ("LX", "Swiss"),
    ("AZ", "ITA Airways"),
    ("KL", "KLM"),
    ("D8", "Norwegian"),
];

const REGIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "UK & Ireland",
        &[
            ("LON", "London"),
            ("DUB", "Dublin"),
            ("EDI", "Edinburgh"),
            ("MAN", "Manchester"),
            ("BRS", "Bristol"),
            ("GLA", "Glasgow"),
            ("BHX", "Birmingham"),
            ("LPL", "Liverpool"),
            ("BFS", "Belfast"),
        ],
    ),
    (
        "France",
        &[
            ("PAR", "Paris"),
            ("NCE", "Nice"),
            ("LYS", "Lyon"),
            ("MRS", "Marseille"),
            ("BOD", "Bordeaux"),
            ("TLS", "Toulouse"),
            ("NTE", "Nantes"),
        ],
    ),
    (
        "Italy",
        &[
            ("ROM", "Rome"),
            ("MIL", "Milan"),
            ("VCE", "Venice"),
            ("NAP", "Naples"),
            ("BLQ", "Bologna"),
            ("PSA", "Pisa"),
            ("FLR", "Florence"),
            ("TRN", "Turin"),
            ("CTA", "Catania"),
            ("PMO", "Palermo"),
            ("BRI", "Bari"),
            ("CAG", "Cagliari"),
            ("BGY", "Bergamo"),
        ],
    ),
    (
        "Germany & Alps",
        &[
            ("BER", "Berlin"),
            ("MUC", "Munich"),
            ("FRA", "Frankfurt"),
            ("HAM", "Hamburg"),
            ("CGN", "Cologne"),
            ("VIE", "Vienna"),
            ("ZRH", "Zurich"),
            ("GVA", "Geneva"),
            ("BSL", "Basel"),
        ],
    ),
    (
        "Spain (islands & north)",
        &[
            ("PMI", "Mallorca"),
            ("IBZ", "Ibiza"),
            ("MAH", "Menorca"),
            ("TCI", "Tenerife"),
            ("LPA", "Gran Canaria"),
            ("ACE", "Lanzarote"),
            ("BIO", "Bilbao"),
            ("SCQ", "Santiago"),
        ],
    ),
    (
        "Portugal",
        &[
            ("LIS", "Lisbon"),
            ("OPO", "Porto"),
            ("FAO", "Faro"),
            ("FNC", "Madeira"),
            ("PDL", "Azores"),
        ],
    ),
    (
        "Benelux",
        &[
            ("AMS", "Amsterdam"),
            ("EIN", "Eindhoven"),
            ("BRU", "Brussels"),
            ("CRL", "Charleroi"),
            ("LUX", "Luxembourg"),
        ],
    ),
    (
        "Eastern Europe",
        &[
            ("PRG", "Prague"),
            ("BUD", "Budapest"),
            ("WAW", "Warsaw"),
            ("KRK", "Krakow"),
            ("OTP", "Bucharest"),
            ("SOF", "Sofia"),
        ],
    ),
    (
        "Nordics",
        &[
            ("CPH", "Copenhagen"),
            ("STO", "Stockholm"),
            ("OSL", "Oslo"),
            ("HEL", "Helsinki"),
            ("KEF", "Reykjavik"),
        ],
    ),
    (
        "Mediterranean",
        &[
            ("ATH", "Athens"),
            ("JTR", "Santorini"),
            ("JMK", "Mykonos"),
            ("IST", "Istanbul"),
            ("MLA", "Malta"),
            ("DBV", "Dubrovnik"),
            ("SPU", "Split"),
        ],
    ),
    ("North Africa", &[("RAK", "Marrakesh")]),
];

/// Static lookup tables for display names. Lookups never fail: unknown codes
/// fall back to the code itself at the call site.
#[derive(Debug, Clone)]
pub struct Catalog {
    carriers: HashMap<String, String>,
    destinations: HashMap<String, String>,
}

impl Catalog {
    pub fn builtin() -> Self {
        let carriers = CARRIERS
            .iter()
            .map(|(code, name)| (code.to_string(), name.to_string()))
            .collect();
        let destinations = REGIONS
            .iter()
            .flat_map(|(_, cities)| cities.iter())
            .map(|(code, name)| (code.to_string(), name.to_string()))
            .collect();
        Self {
            carriers,
            destinations,
        }
    }

    pub fn empty() -> Self {
        Self {
            carriers: HashMap::new(),
            destinations: HashMap::new(),
        }
    }

    pub fn carrier_name(&self, code: &str) -> Option<&str> {
        self.carriers.get(&code.to_ascii_uppercase()).map(String::as_str)
    }

    pub fn destination_name(&self, code: &str) -> Option<&str> {
        self.destinations
            .get(&code.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Destination codes of a region, matched case-insensitively by name.
    pub fn region(&self, name: &str) -> Option<Vec<String>> {
        REGIONS
            .iter()
            .find(|(region, _)| region.eq_ignore_ascii_case(name.trim()))
            .map(|(_, cities)| cities.iter().map(|(code, _)| code.to_string()).collect())
    }

    pub fn region_names() -> Vec<&'static str> {
        REGIONS.iter().map(|(name, _)| *name).collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
