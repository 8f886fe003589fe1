use serde::{Deserialize, Serialize};

/// Requested number of results.
///
/// `Unlimited` ("all the cats") is kept distinct from `Unset` ("cats") even though
/// dispatch resolves both to the handler default: the cascade uses the difference
/// to decide whether a quantity was spoken at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Limit {
    #[default]
    Unset,
    Unlimited,
    Count(u32),
}

impl Limit {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Number of results to ask a provider for.
    pub fn resolve(&self, default: u32) -> u32 {
        match self {
            Self::Count(count) if *count > 0 => *count,
            Self::Unset | Self::Unlimited | Self::Count(_) => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Limit;

    #[test]
    fn explicit_counts_win_over_defaults() {
        assert_eq!(Limit::Count(5).resolve(50), 5);
        assert_eq!(Limit::Unset.resolve(50), 50);
        assert_eq!(Limit::Unlimited.resolve(20), 20);
    }

    #[test]
    fn zero_count_falls_back_to_default() {
        assert_eq!(Limit::Count(0).resolve(7), 7);
        assert!(!Limit::Unlimited.is_unset());
    }
}
