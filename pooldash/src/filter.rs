//! Client-side chain filtering for block and payment lists.

use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Sentinel selecting every chain.
pub const ALL_CHAINS: &str = "all";

/// A record that belongs to exactly one chain.
pub trait ChainTagged {
    fn chain(&self) -> &str;
}

/// Which chain a history page is narrowed to.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub enum ChainSelection {
    #[default]
    All,
    Chain(String),
}

impl ChainSelection {
    pub fn matches(&self, chain: &str) -> bool {
        match self {
            ChainSelection::All => true,
            ChainSelection::Chain(selected) => selected == chain,
        }
    }
}

impl FromStr for ChainSelection {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            ALL_CHAINS => ChainSelection::All,
            chain => ChainSelection::Chain(chain.to_string()),
        })
    }
}

impl fmt::Display for ChainSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainSelection::All => f.write_str(ALL_CHAINS),
            ChainSelection::Chain(chain) => f.write_str(chain),
        }
    }
}

/// Narrow `records` to the selected chain, keeping their order.
///
/// Selecting [`ChainSelection::All`] hands back the input slice itself.
pub fn filter_by_chain<'a, R>(records: &'a [R], selection: &ChainSelection) -> Cow<'a, [R]>
where
    R: ChainTagged + Clone,
{
    match selection {
        ChainSelection::All => Cow::Borrowed(records),
        ChainSelection::Chain(_) => Cow::Owned(
            records
                .iter()
                .filter(|r| selection.matches(r.chain()))
                .cloned()
                .collect(),
        ),
    }
}
