//! Excel-style A1 cell references.

/// Columns in a worksheet (A..XFD).
pub(crate) const MAX_COLUMNS: usize = 16_384;
/// Rows in a worksheet.
pub(crate) const MAX_ROWS: usize = 1_048_576;

/// Converts 0-based row and column indexes to an A1 reference.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut reference = col_to_name(col);
    reference.push_str(&(row + 1).to_string());
    reference
}

/// Converts a 0-based column index to its letters (0 → A, 26 → AA).
pub(crate) fn col_to_name(col: usize) -> String {
    let mut column = col + 1;
    let mut name = Vec::<u8>::new();
    while column > 0 {
        column -= 1;
        name.push(b'A' + (column % 26) as u8);
        column /= 26;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

/// Converts column letters to a 0-based index, None past column XFD.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters
        .bytes()
        .try_fold(0usize, |index, letter| {
            if !letter.is_ascii_alphabetic() {
                return None;
            }
            let digit = (letter.to_ascii_uppercase() - b'A') as usize + 1;
            index.checked_mul(26)?.checked_add(digit).filter(|index| *index <= MAX_COLUMNS)
        })
        .map(|index| index - 1)
}

/// Converts a 1-based row number to a 0-based index, None past the last row.
pub(crate) fn row_to_index(digits: &str) -> Option<usize> {
    digits
        .parse::<usize>()
        .ok()
        .filter(|row| (1..=MAX_ROWS).contains(row))
        .map(|row| row - 1)
}

/// Converts an A1 reference to 0-based (row, col) indexes.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|character: char| character.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    Some((row_to_index(digits)?, col_to_index(letters)?))
}
