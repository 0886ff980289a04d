//! Slug derivation for note titles.
//!
//! Produces lowercase ASCII slugs from arbitrary titles, transliterating
//! Russian letters and discarding everything else that is not URL-safe.

use crate::types::SLUG_MAX_LENGTH;

/// Derive a slug from `title`, truncated to [`SLUG_MAX_LENGTH`] characters.
///
/// Separators are collapsed before unsupported characters are dropped, so
/// `"a ! b"` keeps both hyphens (`"a--b"`) and stays distinct from `"a b"`.
pub fn slugify(title: &str) -> String {
    let lowered = title
        .to_lowercase()
        .replace("&amp;", " and ")
        .replace('&', " and ");

    let mut collapsed = String::with_capacity(lowered.len());
    let mut in_separator = false;
    for ch in lowered.chars() {
        if ch.is_whitespace() || ch == '-' {
            if !in_separator {
                collapsed.push('-');
                in_separator = true;
            }
        } else {
            collapsed.push(ch);
            in_separator = false;
        }
    }

    let mut slug = String::with_capacity(collapsed.len());
    for ch in collapsed.chars() {
        if ch == '-' || ch == '_' || ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            slug.push(ch);
        } else if let Some(latin) = transliterate(ch) {
            slug.push_str(latin);
        }
    }

    slug.chars().take(SLUG_MAX_LENGTH).collect()
}

fn transliterate(ch: char) -> Option<&'static str> {
    let latin = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ы' => "yi",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        // hard and soft signs carry no sound of their own
        'ъ' | 'ь' => "",
        _ => return None,
    };
    Some(latin)
}
