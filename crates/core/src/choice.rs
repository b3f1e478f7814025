//! Closed enums addressed by name.

/// A closed set of named values.
///
/// Request arguments carry enum values as text (they arrive from the outside as
/// JSON strings); `Choice` lets validation check membership case-insensitively
/// and lets tests enumerate every value.
pub trait Choice: Sized + Copy + PartialEq + core::fmt::Debug + 'static {
    /// Every value, in declaration order.
    const ALL: &'static [Self];

    /// Canonical name.
    fn name(self) -> &'static str;

    /// Case-insensitive lookup by canonical name.
    fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(s))
    }

    /// Comma-separated canonical names, for error messages.
    fn expected() -> String {
        Self::ALL
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Colour {
        Red,
        DarkBlue,
    }

    impl Choice for Colour {
        const ALL: &'static [Self] = &[Colour::Red, Colour::DarkBlue];

        fn name(self) -> &'static str {
            match self {
                Colour::Red => "Red",
                Colour::DarkBlue => "DarkBlue",
            }
        }
    }

    #[test]
    fn parse_ignores_case_and_surrounding_whitespace() {
        assert_eq!(Colour::parse(" darkblue "), Some(Colour::DarkBlue));
        assert_eq!(Colour::parse("RED"), Some(Colour::Red));
        assert_eq!(Colour::parse("green"), None);
    }

    #[test]
    fn expected_lists_every_name() {
        assert_eq!(Colour::expected(), "Red, DarkBlue");
    }
}
