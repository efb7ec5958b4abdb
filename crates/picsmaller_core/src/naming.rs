use std::collections::HashSet;

/// Returns `candidate` if unused, otherwise `stem(n).ext` for the smallest
/// `n >= 1` that is not in `used`. The extension is kept so the file type
/// can still be inferred from the name.
pub fn unique_name(used: &HashSet<String>, candidate: &str) -> String {
    if !used.contains(candidate) {
        return candidate.to_string();
    }
    let (stem, ext) = split_extension(candidate);
    (1u64..)
        .map(|n| format!("{stem}({n}){ext}"))
        .find(|name| !used.contains(name))
        .unwrap_or_else(|| unreachable!("a finite set cannot hold every suffix"))
}

/// Splits at the last dot. A leading dot (`.hidden`) belongs to the stem.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::{split_extension, unique_name};
    use std::collections::HashSet;

    fn used(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unused_name_is_returned_unchanged() {
        assert_eq!(unique_name(&used(&[]), "b.jpg"), "b.jpg");
    }

    #[test]
    fn collision_keeps_extension() {
        let names = used(&["a.png"]);
        let name = unique_name(&names, "a.png");
        assert_ne!(name, "a.png");
        assert!(name.ends_with(".png"));
        assert!(!names.contains(&name));
        assert_eq!(name, "a(1).png");
    }

    #[test]
    fn counter_skips_taken_suffixes() {
        let names = used(&["a.png", "a(1).png", "a(2).png"]);
        assert_eq!(unique_name(&names, "a.png"), "a(3).png");
    }

    #[test]
    fn names_without_extension() {
        assert_eq!(unique_name(&used(&["README"]), "README"), "README(1)");
        assert_eq!(unique_name(&used(&[".hidden"]), ".hidden"), ".hidden(1)");
    }

    #[test]
    fn only_last_dot_splits() {
        assert_eq!(split_extension("photo.final.jpeg"), ("photo.final", ".jpeg"));
        assert_eq!(
            unique_name(&used(&["photo.final.jpeg"]), "photo.final.jpeg"),
            "photo.final(1).jpeg"
        );
    }
}
