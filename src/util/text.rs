//! Text layout helpers.

/// Right-pads `text` with spaces to at least `width` characters.
///
/// Text that is already `width` characters or longer is returned unchanged.
#[must_use]
pub fn pad(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_shorter_text() {
        assert_eq!(pad("I0:empty", 12), "I0:empty    ");
    }

    #[test]
    fn test_pad_exact_and_longer_text() {
        assert_eq!(pad("Instances:", 10), "Instances:");
        assert_eq!(pad("I100:active!", 4), "I100:active!");
    }
}
