//! Popular-search suggestion filtering.

/// Fixed suggestion set matched against live input. Read-only for the whole
/// process lifetime.
pub const POPULAR_SEARCHES: [&str; 12] = [
    "Innamal a'malu binniyat",
    "Tuntutlah ilmu sampai ke negeri China",
    "Kebersihan sebahagian dari iman",
    "Syurga di bawah telapak kaki ibu",
    "Tidur selepas asar gila",
    "Cinta hubbul watan minal iman",
    "Ikhtilaf umatku adalah rahmat",
    "Siapa kenal dirinya kenal Tuhannya",
    "Solat tiang agama",
    "Malu itu sebahagian daripada iman",
    "Tangan yang memberi lebih baik",
    "Jangan marah maka bagimu syurga",
];

/// Entries whose lowercase form contains the lowercase input as a substring,
/// original order preserved. Inputs of one character or less produce nothing,
/// so the dropdown never opens on a single keystroke.
#[must_use]
pub fn filter_suggestions(input: &str) -> Vec<&'static str> {
    if input.chars().count() <= 1 {
        return Vec::new();
    }

    let needle = input.to_lowercase();
    POPULAR_SEARCHES
        .iter()
        .copied()
        .filter(|entry| entry.to_lowercase().contains(&needle))
        .collect()
}
