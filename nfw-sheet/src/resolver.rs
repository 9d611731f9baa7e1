//! Address literal to address-list name substitution.
//!
//! The map is rebuilt from the address lists of each run and never persisted.
//! Resolution is idempotent as long as no list name is itself an address
//! literal owned by another list; that case is left to the operator.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::AddressList;
use crate::sheets::split_cell;

/// Which list owns a literal that appears in more than one list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// The first list (in sheet order) containing the literal owns it.
    #[default]
    FirstSeen,
    /// The last list containing the literal owns it.
    LastSeen,
}

/// A literal claimed by more than one list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressCollision {
    pub address: String,
    pub owner: String,
    pub others: Vec<String>,
}

/// Address literal to owning list name map.
#[derive(Debug, Clone, Default)]
pub struct AddressResolver {
    owner_of: HashMap<String, String>,
    claims: BTreeMap<String, Vec<String>>,
    policy: CollisionPolicy,
}

impl AddressResolver {
    pub fn build<'a, I>(lists: I, policy: CollisionPolicy) -> Self
    where
        I: IntoIterator<Item = &'a AddressList>,
    {
        let mut resolver = Self {
            policy,
            ..Self::default()
        };
        let mut list_count = 0usize;
        for list in lists {
            list_count += 1;
            for address in &list.addresses {
                resolver.claim(address, &list.name);
            }
        }
        debug!(
            literals = resolver.owner_of.len(),
            lists = list_count,
            "address resolver built"
        );
        resolver
    }

    fn claim(&mut self, address: &str, list: &str) {
        let claimants = self.claims.entry(address.to_string()).or_default();
        if !claimants.iter().any(|c| c == list) {
            claimants.push(list.to_string());
        }
        match self.policy {
            CollisionPolicy::FirstSeen => {
                self.owner_of
                    .entry(address.to_string())
                    .or_insert_with(|| list.to_string());
            }
            CollisionPolicy::LastSeen => {
                self.owner_of.insert(address.to_string(), list.to_string());
            }
        }
    }

    /// List that owns `literal`, if any.
    pub fn owner(&self, literal: &str) -> Option<&str> {
        self.owner_of.get(literal.trim()).map(String::as_str)
    }

    /// Replace each owned literal by its list name; misses pass through.
    pub fn resolve<I, S>(&self, tokens: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tokens
            .into_iter()
            .map(|token| {
                let token = token.as_ref().trim();
                self.owner(token).unwrap_or(token).to_string()
            })
            .collect()
    }

    /// Split a delimited cell and resolve each token.
    pub fn resolve_cell(&self, cell: &str) -> Vec<String> {
        self.resolve(split_cell(cell))
    }

    /// Literals claimed by more than one list, with the owner chosen by policy.
    pub fn collisions(&self) -> Vec<AddressCollision> {
        self.claims
            .iter()
            .filter(|(_, lists)| lists.len() > 1)
            .filter_map(|(address, lists)| {
                let owner = self.owner_of.get(address)?;
                Some(AddressCollision {
                    address: address.clone(),
                    owner: owner.clone(),
                    others: lists.iter().filter(|l| *l != owner).cloned().collect(),
                })
            })
            .collect()
    }
}
