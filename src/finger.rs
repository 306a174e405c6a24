/// Finger expected to hit a key on a German (QWERTZ) keyboard.
///
/// The display names double as the `Finger;<name>` field of the statistics
/// file, so they must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum_macros::Display)]
pub enum Finger {
    #[strum(serialize = "left Pinky")]
    LeftPinky,
    #[strum(serialize = "left RingFinger")]
    LeftRing,
    #[strum(serialize = "left MiddleFinger")]
    LeftMiddle,
    #[strum(serialize = "left IndexFinger")]
    LeftIndex,
    #[strum(serialize = "Thumbs")]
    Thumbs,
    #[strum(serialize = "right Pinky")]
    RightPinky,
    #[strum(serialize = "right RingFinger")]
    RightRing,
    #[strum(serialize = "right MiddleFinger")]
    RightMiddle,
    #[strum(serialize = "right IndexFinger")]
    RightIndex,
}

// Lowercase key sets, searched in order; the first group containing a key wins.
const GROUPS: [(Finger, &str); 9] = [
    (Finger::LeftPinky, "qay"),
    (Finger::LeftRing, "wsx"),
    (Finger::LeftMiddle, "edc"),
    (Finger::LeftIndex, "rtfgvb"),
    (Finger::Thumbs, " "),
    (Finger::RightPinky, "zuhjnm"),
    (Finger::RightRing, "ik,"),
    (Finger::RightMiddle, "ol."),
    (Finger::RightIndex, "ßpüöä"),
];

impl Finger {
    pub const ALL: [Finger; 9] = [
        Finger::LeftPinky,
        Finger::LeftRing,
        Finger::LeftMiddle,
        Finger::LeftIndex,
        Finger::Thumbs,
        Finger::RightPinky,
        Finger::RightRing,
        Finger::RightMiddle,
        Finger::RightIndex,
    ];

    /// Finger assigned to `c`, ignoring case. `None` for unmapped keys.
    pub fn for_char(c: char) -> Option<Finger> {
        let mut lower = c.to_lowercase();
        let key = match (lower.next(), lower.next()) {
            (Some(l), None) => l,
            // multi-char lowercase forms never appear in the table
            _ => c,
        };

        GROUPS
            .iter()
            .find(|(_, keys)| keys.contains(key))
            .map(|(finger, _)| *finger)
    }

    /// Finger for a ledger key; only single-character keys map to a finger.
    pub fn for_key(key: &str) -> Option<Finger> {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Finger::for_char(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_row_letters() {
        assert_eq!(Finger::for_char('a'), Some(Finger::LeftPinky));
        assert_eq!(Finger::for_char('s'), Some(Finger::LeftRing));
        assert_eq!(Finger::for_char('d'), Some(Finger::LeftMiddle));
        assert_eq!(Finger::for_char('f'), Some(Finger::LeftIndex));
        assert_eq!(Finger::for_char('j'), Some(Finger::RightPinky));
        assert_eq!(Finger::for_char('k'), Some(Finger::RightRing));
        assert_eq!(Finger::for_char('l'), Some(Finger::RightMiddle));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(Finger::for_char('Q'), Finger::for_char('q'));
        assert_eq!(Finger::for_char('Ü'), Some(Finger::RightIndex));
        assert_eq!(Finger::for_char('ß'), Some(Finger::RightIndex));
    }

    #[test]
    fn test_space_is_thumbs() {
        assert_eq!(Finger::for_char(' '), Some(Finger::Thumbs));
    }

    #[test]
    fn test_unmapped() {
        assert_eq!(Finger::for_char('1'), None);
        assert_eq!(Finger::for_char(';'), None);
        assert_eq!(Finger::for_key("ab"), None);
        assert_eq!(Finger::for_key(""), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Finger::LeftIndex.to_string(), "left IndexFinger");
        assert_eq!(Finger::RightRing.to_string(), "right RingFinger");
        assert_eq!(Finger::Thumbs.to_string(), "Thumbs");
    }
}
