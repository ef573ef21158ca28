use phf::{Set, phf_set};

static ELEMENT_SYMBOLS: Set<&'static str> = phf_set! {
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
    "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm",
    "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
    // Isotope and vacancy conventions accepted by common CIF readers.
    "D", "T", "Va",
};

/// Extracts the element symbol from an element/oxidation-state tag.
///
/// Tags such as `Fe3+`, `O2-`, `Mn` or `Ni2+` are accepted; the leading
/// alphabetic run is normalized to the conventional capitalization and looked
/// up in the periodic table. Returns `None` for anything that does not name a
/// known element.
pub fn element_symbol(tag: &str) -> Option<&'static str> {
    let trimmed = tag.trim();
    let alpha_len = trimmed
        .char_indices()
        .find(|(_, c)| !c.is_ascii_alphabetic())
        .map_or(trimmed.len(), |(i, _)| i);
    if alpha_len == 0 || alpha_len > 2 {
        return None;
    }

    let rest = &trimmed[alpha_len..];
    if !is_valid_charge_suffix(rest) {
        return None;
    }

    let mut symbol = String::with_capacity(alpha_len);
    for (i, c) in trimmed[..alpha_len].chars().enumerate() {
        if i == 0 {
            symbol.push(c.to_ascii_uppercase());
        } else {
            symbol.push(c.to_ascii_lowercase());
        }
    }
    ELEMENT_SYMBOLS.get_key(symbol.as_str()).copied()
}

pub fn is_valid_element_tag(tag: &str) -> bool {
    element_symbol(tag).is_some()
}

// Accepts "", "+", "-", "2+", "3-", "+2", "-1".
fn is_valid_charge_suffix(rest: &str) -> bool {
    if rest.is_empty() {
        return true;
    }
    let digits: String = rest.chars().filter(|c| c.is_ascii_digit()).collect();
    let signs: Vec<char> = rest.chars().filter(|c| *c == '+' || *c == '-').collect();
    if signs.len() != 1 || digits.len() + 1 != rest.len() {
        return false;
    }
    rest.starts_with(['+', '-']) || rest.ends_with(['+', '-'])
}
