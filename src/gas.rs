//! Gas name spellings.
//!
//! The service labels gases with Unicode subscripts (`N₂O`), callers usually
//! type plain ASCII (`N2O`). [`denormalize`] maps the known ASCII aliases to
//! the service spelling; [`normalize`] transliterates subscripts back.

use std::borrow::Cow;

/// ASCII alias → service spelling.
pub const GAS_ALIASES: [(&str, &str); 8] = [
    ("CO2", "CO₂"),
    ("CH4", "CH₄"),
    ("N2O", "N₂O"),
    ("SF6", "SF₆"),
    ("NF3", "NF₃"),
    ("NOx", "NOₓ"),
    ("SO2", "SO₂"),
    ("CF4", "CF₄"),
];

/// Service spelling for a known ASCII alias; anything else passes through.
pub fn denormalize(name: &str) -> &str {
    GAS_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, native)| *native)
        .unwrap_or(name)
}

/// Replace subscript digits and subscript x with their ASCII counterparts.
pub fn normalize(label: &str) -> Cow<'_, str> {
    if !label.chars().any(is_subscript) {
        return Cow::Borrowed(label);
    }
    Cow::Owned(label.chars().map(plain_char).collect())
}

fn is_subscript(c: char) -> bool {
    matches!(c, '₀'..='₉' | 'ₓ')
}

fn plain_char(c: char) -> char {
    match c {
        '₀'..='₉' => char::from_digit(c as u32 - '₀' as u32, 10).unwrap_or(c),
        'ₓ' => 'x',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_map_to_service_spelling() {
        assert_eq!(denormalize("N2O"), "N₂O");
        assert_eq!(denormalize("NOx"), "NOₓ");
        assert_eq!(denormalize("HFCs"), "HFCs");
        assert_eq!(denormalize("N₂O"), "N₂O");
    }

    #[test]
    fn subscripts_become_ascii() {
        assert_eq!(normalize("N₂O"), "N2O");
        assert_eq!(normalize("kt CO₂ equivalent"), "kt CO2 equivalent");
        assert_eq!(normalize("C₁₀H₈ₓ"), "C10H8x");
        assert!(matches!(normalize("Aggregate GHGs"), Cow::Borrowed(_)));
    }

    #[test]
    fn alias_table_round_trips() {
        for (alias, native) in GAS_ALIASES {
            assert_eq!(normalize(native), alias);
            assert_eq!(denormalize(&normalize(native)), native);
        }
    }
}
