//! Edit distance between selector strings.

/// Unit-cost insert/delete/substitute distance.
///
/// Compares `char`s (Unicode scalar values), not graphemes, so a
/// multi-scalar emoji may count as several edits. Uses one rolling row
/// sized by the shorter input.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (short, long) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };

    let mut row: Vec<usize> = (0..=short.len()).collect();

    for (i, long_char) in long.iter().enumerate() {
        let mut diagonal = i;
        let mut left = i.saturating_add(1);
        for (slot, short_char) in row.iter_mut().skip(1).zip(&short) {
            let above = *slot;
            let substitute = diagonal.saturating_add(usize::from(long_char != short_char));
            let current = substitute.min(above.saturating_add(1)).min(left.saturating_add(1));
            diagonal = above;
            *slot = current;
            left = current;
        }
        if let Some(first) = row.first_mut() {
            *first = i.saturating_add(1);
        }
    }

    return row.last().copied().unwrap_or(0);
}

/// Similarity in `[0, 1]`: `(max_len - distance) / max_len`, with two empty
/// strings counting as identical.
pub fn similarity_ratio(a: &str, b: &str, distance: usize) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let same = max_len.saturating_sub(distance);
    return to_f64(same) / to_f64(max_len);
}

/// Lossless for any realistic selector length.
fn to_f64(n: usize) -> f64 {
    return u32::try_from(n).map_or(f64::from(u32::MAX), f64::from);
}
