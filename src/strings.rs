//! String transformation helpers: slugs, case conversion, transliteration.
//!
//! Unicode case mapping is the standard library's; this module only
//! composes it. Transliteration covers the common Latin diacritics and
//! ligatures — characters without a mapping pass through unchanged.

/// Folds common Latin diacritics and ligatures to ASCII.
///
/// # Examples
///
/// ```
/// assert_eq!(sundry::strings::transliterate("Crème Brûlée"), "Creme Brulee");
/// assert_eq!(sundry::strings::transliterate("Straße"), "Strasse");
/// ```
pub fn transliterate(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match fold_char(c) {
            Some(folded) => out.push_str(folded),
            None => out.push(c),
        }
    }
    out
}

fn fold_char(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => "A",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' => "E",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' | 'Į' | 'İ' => "I",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' | 'Ő' => "O",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' | 'Ű' => "U",
        'ý' | 'ÿ' => "y",
        'Ý' | 'Ÿ' => "Y",
        'ç' | 'ć' | 'č' => "c",
        'Ç' | 'Ć' | 'Č' => "C",
        'ñ' | 'ń' | 'ň' => "n",
        'Ñ' | 'Ń' | 'Ň' => "N",
        'š' | 'ś' => "s",
        'Š' | 'Ś' => "S",
        'ž' | 'ź' | 'ż' => "z",
        'Ž' | 'Ź' | 'Ż' => "Z",
        'ł' => "l",
        'Ł' => "L",
        'đ' | 'ð' => "d",
        'Đ' | 'Ð' => "D",
        'þ' => "th",
        'Þ' => "Th",
        'ß' => "ss",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        _ => return None,
    };
    Some(folded)
}

/// Normalizes a string into a URL-safe slug: transliterate, lowercase,
/// strip non-alphanumerics, collapse runs, hyphen-join.
///
/// # Examples
///
/// ```
/// assert_eq!(sundry::strings::slugify("Lake Street Church"), "lake-street-church");
/// assert_eq!(sundry::strings::slugify("Lake St. Church!!!"), "lake-st-church");
/// assert_eq!(sundry::strings::slugify("  Multiple   Spaces  "), "multiple-spaces");
/// ```
pub fn slugify(input: &str) -> String {
    let folded = transliterate(input).to_lowercase();
    let cleaned: String = folded
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<&str>>().join("-")
}

/// Splits an identifier into words on `_`, `-`, whitespace, and case
/// boundaries. Acronym runs stay together: `HTTPRequest` → `HTTP`,
/// `Request`.
fn split_words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            // `current` is non-empty, so chars[i - 1] exists and was not a
            // delimiter.
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Converts snake_case, kebab-case, spaced, or PascalCase input to
/// camelCase.
pub fn to_camel_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (i, word) in split_words(input).iter().enumerate() {
        let mut chars = word.chars();
        if i == 0 {
            out.extend(word.chars().flat_map(char::to_lowercase));
        } else if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars.flat_map(char::to_lowercase));
        }
    }
    out
}

/// Converts camelCase, PascalCase, kebab-case, or spaced input to
/// snake_case. Acronym runs are kept together: `HTTPRequest` →
/// `http_request`.
pub fn to_snake_case(input: &str) -> String {
    split_words(input)
        .iter()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Truncates to at most `max_chars` characters (not bytes), ending with a
/// `…` when anything was cut. `max_chars` of zero yields an empty string.
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = input.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}
