//! Rule order as a position chain.
//!
//! On import, sheet row order becomes a chain of "insert after the previous
//! row" positions. On export the provider's order is authoritative and is
//! reproduced unchanged.
//!
//! Duplicate rule names are not de-duplicated: the chain always points at the
//! literal previous row, so a consumer must resolve an `afterRule` name to the
//! most recently placed rule with that name.

use crate::model::Position;

/// Positions for rules listed in evaluation order: the first is `first`, each
/// later one follows the name immediately before it.
pub fn chain_positions<'a, I>(names: I) -> Vec<Position>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .scan(None::<&str>, |previous, name| {
            let position = match previous.replace(name) {
                Some(prev) => Position::after(prev),
                None => Position::first(),
            };
            Some(position)
        })
        .collect()
}
