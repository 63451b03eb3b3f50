//! Three-month meteorological seasons.

/// Meteorological season, ordered DJF, MAM, JJA, SON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Season {
    /// December, January, February.
    Djf,
    /// March, April, May.
    Mam,
    /// June, July, August.
    Jja,
    /// September, October, November.
    Son,
}

impl Season {
    /// All seasons in output order.
    pub const ALL: [Season; 4] = [Season::Djf, Season::Mam, Season::Jja, Season::Son];

    /// Season containing calendar month `month` (1..=12).
    ///
    /// Callers pass months that were validated by [`crate::YearMonth`].
    pub fn from_month(month: u8) -> Self {
        match month {
            12 | 1 | 2 => Season::Djf,
            3..=5 => Season::Mam,
            6..=8 => Season::Jja,
            _ => Season::Son,
        }
    }

    /// Position of this season in [`Season::ALL`].
    pub fn index(self) -> usize {
        match self {
            Season::Djf => 0,
            Season::Mam => 1,
            Season::Jja => 2,
            Season::Son => 3,
        }
    }

    /// Upper-case label, e.g. `"DJF"`.
    pub fn label(self) -> &'static str {
        match self {
            Season::Djf => "DJF",
            Season::Mam => "MAM",
            Season::Jja => "JJA",
            Season::Son => "SON",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_month_maps_to_one_season() {
        let mut counts = [0usize; 4];
        for m in 1..=12u8 {
            counts[Season::from_month(m).index()] += 1;
        }
        assert_eq!(counts, [3, 3, 3, 3]);
    }

    #[test]
    fn december_is_djf() {
        assert_eq!(Season::from_month(12), Season::Djf);
        assert_eq!(Season::from_month(2), Season::Djf);
        assert_eq!(Season::from_month(9), Season::Son);
    }

    #[test]
    fn index_matches_all_order() {
        for (i, s) in Season::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
        let labels: Vec<_> = Season::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["DJF", "MAM", "JJA", "SON"]);
    }
}
