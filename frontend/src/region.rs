use web_sys::window;

const EU_MARKERS: &[&str] = &[
    "DE", "AT", "FR", "IT", "ES", "NL", "BE", "LU", "PT", "IE", "FI", "SE", "DK", "PL",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Ch,
    Eu,
    Int,
}

impl Region {
    pub fn code(self) -> &'static str {
        match self {
            Region::Ch => "CH",
            Region::Eu => "EU",
            Region::Int => "INT",
        }
    }

    pub fn currency(self) -> &'static str {
        match self {
            Region::Ch => "CHF",
            Region::Eu => "EUR",
            Region::Int => "USD",
        }
    }
}

/// Best-effort guess from a locale tag such as `de-CH`. Plain substring
/// matching, so it is only as good as the locale the browser reports.
pub fn detect_region(locale: &str) -> Region {
    if locale.contains("CH") {
        Region::Ch
    } else if EU_MARKERS.iter().any(|marker| locale.contains(marker)) {
        Region::Eu
    } else {
        Region::Int
    }
}

pub fn browser_locale() -> String {
    window()
        .and_then(|w| w.navigator().language())
        .unwrap_or_else(|| "en-US".to_string())
}

pub fn detect_browser_region() -> Region {
    detect_region(&browser_locale())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swiss_locales_win_over_eu_markers() {
        assert_eq!(detect_region("de-CH"), Region::Ch);
        assert_eq!(detect_region("fr-CH"), Region::Ch);
    }

    #[test]
    fn eu_country_codes_map_to_eu() {
        assert_eq!(detect_region("de-DE"), Region::Eu);
        assert_eq!(detect_region("fi-FI"), Region::Eu);
        assert_eq!(detect_region("nl-BE"), Region::Eu);
    }

    #[test]
    fn everything_else_is_international() {
        assert_eq!(detect_region("en-US"), Region::Int);
        assert_eq!(detect_region("ja-JP"), Region::Int);
        assert_eq!(detect_region(""), Region::Int);
    }

    #[test]
    fn matching_is_case_sensitive() {
        // language subtags alone are not country markers
        assert_eq!(detect_region("de"), Region::Int);
    }

    #[test]
    fn currency_follows_region() {
        assert_eq!(Region::Ch.currency(), "CHF");
        assert_eq!(Region::Eu.code(), "EU");
    }
}
